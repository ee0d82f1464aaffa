//! Product review form: star widget and submission.

use tracing::{info, instrument, warn};

use nutriharvest_core::ProductId;

use crate::api::Ack;
use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::page::{Page, ReviewForm, StarRating};
use crate::state::PageState;
use crate::validation::ValidationError;

const SUBMIT_FAILED: &str = "An error occurred while submitting your review";

/// Product id of a product detail path (`/product/{id}/`).
#[must_use]
pub fn product_id_from_path(path: &str) -> Option<ProductId> {
    path.split('/').nth(2)?.parse().ok()
}

/// Drives the review form of a product page.
#[derive(Clone)]
pub struct ReviewController {
    state: PageState,
}

impl ReviewController {
    #[must_use]
    pub const fn new(state: PageState) -> Self {
        Self { state }
    }

    /// Commit a rating (1 to 5).
    pub fn click(&self, rating: u8) {
        self.with_stars(|stars| {
            stars.committed = rating.clamp(1, StarRating::STARS);
            stars.preview = None;
        });
    }

    /// Preview a rating under the pointer.
    pub fn hover(&self, rating: u8) {
        self.with_stars(|stars| stars.preview = Some(rating.clamp(1, StarRating::STARS)));
    }

    /// Pointer left the widget; show the committed rating again.
    pub fn leave(&self) {
        self.with_stars(|stars| stars.preview = None);
    }

    fn with_stars(&self, f: impl FnOnce(&mut StarRating)) {
        self.state.page().update(|page| {
            if let Some(form) = page.review_form.as_mut() {
                f(&mut form.stars);
            }
        });
    }

    /// Validate and post the review.
    ///
    /// On success the form is reset and a full reload is scheduled. The
    /// submit button is busy during the request and restored afterwards;
    /// submitting again while it is busy sends nothing.
    ///
    /// # Errors
    ///
    /// Returns a validation error (no request sent), [`StorefrontError::Busy`]
    /// while an earlier submission is in flight, or the API failure.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<Ack> {
        let (path, form) = self
            .state
            .page()
            .read(|page| (page.location.path.clone(), page.review_form.clone()));
        let form = form.ok_or(StorefrontError::MissingElement("review form"))?;
        if form.submit.disabled {
            return Err(StorefrontError::Busy("review submission"));
        }

        let comment = form.comment.trim().to_string();
        let checked = if form.stars.committed == 0 {
            Err(ValidationError::MissingRating)
        } else if comment.is_empty() {
            Err(ValidationError::MissingComment)
        } else {
            product_id_from_path(&path).ok_or(ValidationError::UnknownProduct)
        };
        let product_id = match checked {
            Ok(id) => id,
            Err(e) => {
                self.state.toaster().warning(e.to_string());
                return Err(e.into());
            }
        };

        let id = product_id.to_string();
        add_breadcrumb("review", "Submit review", Some(&[("product_id", id.as_str())]));
        if !self.claim_submit() {
            return Err(StorefrontError::Busy("review submission"));
        }

        let result = self
            .state
            .api()
            .submit_review(product_id, form.stars.committed, &comment)
            .await;

        self.release_submit();

        match result {
            Ok(ack) => {
                info!(product_id = %product_id, rating = form.stars.committed, "Review submitted");
                self.state.toaster().success(ack.message.clone());
                self.state.page().update(|page| {
                    if let Some(form) = page.review_form.as_mut() {
                        form.comment.clear();
                        form.stars = StarRating::default();
                    }
                });
                let page = self.state.page().clone();
                self.state
                    .lifecycle()
                    .spawn_after(self.state.timings().review_reload, move || {
                        page.update(Page::reload);
                    });
                Ok(ack)
            }
            Err(e) => {
                warn!(error = %e, "Review submission failed");
                self.state.toaster().error(e.user_message(SUBMIT_FAILED));
                Err(e.into())
            }
        }
    }

    /// Mark the submit button busy; false when it already was.
    fn claim_submit(&self) -> bool {
        self.state.page().update(|page| match page.review_form.as_mut() {
            Some(form) if !form.submit.disabled => {
                form.submit.disabled = true;
                ReviewForm::BUSY_LABEL.clone_into(&mut form.submit.label);
                true
            }
            _ => false,
        })
    }

    fn release_submit(&self) {
        self.state.page().update(|page| {
            if let Some(form) = page.review_form.as_mut() {
                form.submit.disabled = false;
                ReviewForm::SUBMIT_LABEL.clone_into(&mut form.submit.label);
            }
        });
    }
}
