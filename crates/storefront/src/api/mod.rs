//! Storefront backend JSON API.
//!
//! # Architecture
//!
//! - [`StorefrontApi`] is the seam every controller talks through
//! - [`HttpApi`] implements it with `reqwest`
//! - Every response is a JSON envelope with a `success` flag; a `false`
//!   flag becomes [`ApiError::Rejected`] carrying the server's message, so
//!   controllers only see typed payloads on the success path
//!
//! # Example
//!
//! ```rust,ignore
//! use nutriharvest_storefront::api::{HttpApi, StorefrontApi};
//!
//! let api = HttpApi::new(&config, &session)?;
//! let mutation = api.add_to_cart(ProductId::new(7), 2).await?;
//! println!("{} items in cart", mutation.cart_count.unwrap_or_default());
//! ```

mod client;
pub mod types;

pub use client::HttpApi;
pub use types::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use nutriharvest_core::{CartItemId, ProductId};

/// Message used when the backend rejects a request without saying why.
const DEFAULT_REJECTION: &str = "Request could not be completed";

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configured header value (session cookie) is not valid in HTTP.
    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend answered `success: false`.
    #[error("Rejected: {message}")]
    Rejected { message: String },
}

/// Which class of failure an error belongs to.
///
/// Business failures carry a message written for the shopper; transport
/// failures get a fixed message chosen by the calling controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Business,
    Transport,
}

impl ApiError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Rejected { .. } => FailureKind::Business,
            Self::Http(_)
            | Self::Status { .. }
            | Self::Parse(_)
            | Self::Header(_)
            | Self::Url(_) => FailureKind::Transport,
        }
    }

    /// The text to show the shopper: the server's message for business
    /// failures, `fallback` for everything else.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Rejected { message } => message,
            _ => fallback,
        }
    }
}

/// Backend endpoints used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AddToCart,
    UpdateCart,
    RemoveFromCart,
    ToggleWishlist,
    WishlistCount,
    SystemNotifications,
    UserNotifications,
    ActiveBanners,
    NewsletterSubscribe,
    SubmitReview(ProductId),
}

impl Endpoint {
    /// Path relative to the backend origin.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::AddToCart => "/api/orders/add-to-cart/".to_string(),
            Self::UpdateCart => "/api/orders/update-cart/".to_string(),
            Self::RemoveFromCart => "/api/orders/remove-from-cart/".to_string(),
            Self::ToggleWishlist => "/api/orders/add-to-wishlist/".to_string(),
            Self::WishlistCount => "/api/orders/api/wishlist-count/".to_string(),
            Self::SystemNotifications => "/api/notifications/system-notifications/".to_string(),
            Self::UserNotifications => "/api/notifications/user-notifications/".to_string(),
            Self::ActiveBanners => "/api/cms/banners/active/".to_string(),
            Self::NewsletterSubscribe => "/api/cms/newsletter/subscribe/".to_string(),
            Self::SubmitReview(product_id) => format!("/api/shop/submit-review/{product_id}/"),
        }
    }

    /// Whether the endpoint mutates state (POST with CSRF token).
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::WishlistCount
                | Self::SystemNotifications
                | Self::UserNotifications
                | Self::ActiveBanners
        )
    }
}

/// Operations the storefront backend offers.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Add `quantity` units of a product to the cart.
    async fn add_to_cart(&self, product_id: ProductId, quantity: u32)
    -> Result<CartMutation, ApiError>;

    /// Set a cart line's quantity; zero or less removes it server-side.
    async fn update_cart(
        &self,
        cart_item_id: CartItemId,
        quantity: i64,
    ) -> Result<CartMutation, ApiError>;

    /// Remove a cart line.
    async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<CartMutation, ApiError>;

    /// Add the product to the wishlist, or remove it if already there.
    async fn toggle_wishlist(&self, product_id: ProductId) -> Result<WishlistToggle, ApiError>;

    /// Number of products on the shopper's wishlist.
    async fn wishlist_count(&self) -> Result<WishlistCount, ApiError>;

    /// Site-wide notifications currently active.
    async fn system_notifications(&self) -> Result<SystemNotifications, ApiError>;

    /// The shopper's own notifications, newest first.
    async fn user_notifications(&self) -> Result<UserNotifications, ApiError>;

    /// Promotional banners currently active.
    async fn active_banners(&self) -> Result<Banners, ApiError>;

    /// Subscribe an address to the newsletter.
    async fn subscribe_newsletter(&self, email: &str) -> Result<Ack, ApiError>;

    /// Post a product review.
    async fn submit_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Ack, ApiError>;
}

/// Decode a response envelope.
///
/// `success: false` (or a missing flag) becomes [`ApiError::Rejected`];
/// otherwise the whole body is decoded as `T`.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] for malformed JSON or a payload that does
/// not match `T`, and [`ApiError::Rejected`] for business failures.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    decode_value(value)
}

/// Decode an already-parsed response envelope.
///
/// # Errors
///
/// Same as [`decode_envelope`].
pub fn decode_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    let success = value
        .get("success")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    if !success {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_REJECTION)
            .to_string();
        return Err(ApiError::Rejected { message });
    }

    Ok(serde_json::from_value(value)?)
}
