//! Footer newsletter signup.

use tracing::{info, instrument, warn};

use crate::api::Ack;
use crate::error::{Result, StorefrontError};
use crate::state::PageState;

const SUBSCRIBE_FAILED: &str = "An error occurred during subscription";

#[derive(Clone)]
pub struct NewsletterController {
    state: PageState,
}

impl NewsletterController {
    #[must_use]
    pub const fn new(state: PageState) -> Self {
        Self { state }
    }

    /// Subscribe the address typed into the newsletter form.
    ///
    /// Returns `Ok(None)` without a request when the input is empty. On
    /// success the input is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::MissingElement`] if the page has no
    /// newsletter form, or the API failure.
    #[instrument(skip(self))]
    pub async fn subscribe(&self) -> Result<Option<Ack>> {
        let email = self
            .state
            .page()
            .read(|page| page.newsletter.as_ref().map(|form| form.email.trim().to_string()))
            .ok_or(StorefrontError::MissingElement("newsletter form"))?;

        if email.is_empty() {
            return Ok(None);
        }

        match self.state.api().subscribe_newsletter(&email).await {
            Ok(ack) => {
                info!("Newsletter subscription accepted");
                self.state.toaster().success(ack.message.clone());
                self.state.page().update(|page| {
                    if let Some(form) = page.newsletter.as_mut() {
                        form.email.clear();
                    }
                });
                Ok(Some(ack))
            }
            Err(e) => {
                warn!(error = %e, "Newsletter subscription failed");
                self.state.toaster().error(e.user_message(SUBSCRIBE_FAILED));
                Err(e.into())
            }
        }
    }
}
