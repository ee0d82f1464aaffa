//! Unified error handling with Sentry integration.
//!
//! Controllers surface failures to the shopper themselves (toasts, inline
//! errors) and then return a [`StorefrontError`] so callers can log or
//! report it. Only server-class failures are sent to Sentry.

use thiserror::Error;

use crate::api::{ApiError, FailureKind};
use crate::config::ConfigError;
use crate::validation::ValidationError;

/// Top-level error type for the storefront interaction layer.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed or was rejected.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input failed client-side validation; no request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The action needs a logged-in shopper; no request was sent.
    #[error("Login required")]
    LoginRequired,

    /// The page lacks the element an action needs.
    #[error("Missing page element: {0}")]
    MissingElement(&'static str),

    /// The same action is already waiting on the backend; nothing was sent.
    #[error("Already in progress: {0}")]
    Busy(&'static str),
}

impl StorefrontError {
    /// Whether this failure points at the backend or this program rather
    /// than at the shopper's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Api(err) => matches!(err.kind(), FailureKind::Transport),
            Self::Validation(_)
            | Self::LoginRequired
            | Self::MissingElement(_)
            | Self::Busy(_) => false,
        }
    }

    /// Log the error, capturing server errors to Sentry.
    pub fn report(&self, context: &str) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                context,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, context, "Storefront action not completed");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Add to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
