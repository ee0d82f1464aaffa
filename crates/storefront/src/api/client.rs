//! `reqwest` implementation of [`StorefrontApi`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use nutriharvest_core::{CartItemId, ProductId};

use super::types::{
    Ack, AddToCartRequest, Banners, CartMutation, NewsletterRequest, RemoveFromCartRequest,
    ReviewRequest, SystemNotifications, UpdateCartRequest, UserNotifications, WishlistCount,
    WishlistRequest, WishlistToggle,
};
use super::{ApiError, Endpoint, StorefrontApi, decode_envelope};
use crate::config::{StorefrontConfig, session_cookie_header};
use crate::session::SessionContext;

/// Header carrying the anti-forgery token on mutating requests.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Maximum number of body characters kept in errors and logs.
const BODY_EXCERPT: usize = 200;

/// HTTP client for the storefront backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpApi {
    inner: Arc<HttpApiInner>,
}

struct HttpApiInner {
    client: reqwest::Client,
    base_url: Url,
    csrf_token: String,
}

impl HttpApi {
    /// Create a new client for the configured backend.
    ///
    /// The CSRF token is resolved from `session` once, at construction.
    ///
    /// # Errors
    ///
    /// Returns error if the session cookie is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, session: &SessionContext) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(&session_cookie_header(cookie))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpApiInner {
                client,
                base_url: config.base_url.clone(),
                csrf_token: session.csrf_token().to_string(),
            }),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(&endpoint.path())?)
    }

    /// Execute a GET against `endpoint`.
    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let response = self.inner.client.get(self.url(endpoint)?).send().await?;
        Self::finish(endpoint, response).await
    }

    /// Execute a JSON POST against `endpoint` with the CSRF header.
    async fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(self.url(endpoint)?)
            .header(CSRF_HEADER, &self.inner.csrf_token)
            .json(body)
            .send()
            .await?;
        Self::finish(endpoint, response).await
    }

    /// Check the status and decode the envelope.
    async fn finish<T: DeserializeOwned>(
        endpoint: Endpoint,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        debug!(path = %endpoint.path(), status = %status, "Storefront API response");

        if !status.is_success() {
            let excerpt: String = body.chars().take(BODY_EXCERPT).collect();
            tracing::warn!(
                path = %endpoint.path(),
                status = %status,
                body = %excerpt,
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt,
            });
        }

        decode_envelope(&body).inspect_err(|e| {
            if matches!(e, ApiError::Parse(_)) {
                tracing::warn!(
                    path = %endpoint.path(),
                    error = %e,
                    body = %body.chars().take(BODY_EXCERPT).collect::<String>(),
                    "Failed to parse storefront API response"
                );
            }
        })
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    #[instrument(skip(self))]
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartMutation, ApiError> {
        self.post(
            Endpoint::AddToCart,
            &AddToCartRequest {
                product_id,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn update_cart(
        &self,
        cart_item_id: CartItemId,
        quantity: i64,
    ) -> Result<CartMutation, ApiError> {
        self.post(
            Endpoint::UpdateCart,
            &UpdateCartRequest {
                cart_item_id,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<CartMutation, ApiError> {
        self.post(
            Endpoint::RemoveFromCart,
            &RemoveFromCartRequest { cart_item_id },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn toggle_wishlist(&self, product_id: ProductId) -> Result<WishlistToggle, ApiError> {
        self.post(Endpoint::ToggleWishlist, &WishlistRequest { product_id })
            .await
    }

    #[instrument(skip(self))]
    async fn wishlist_count(&self) -> Result<WishlistCount, ApiError> {
        self.get(Endpoint::WishlistCount).await
    }

    #[instrument(skip(self))]
    async fn system_notifications(&self) -> Result<SystemNotifications, ApiError> {
        self.get(Endpoint::SystemNotifications).await
    }

    #[instrument(skip(self))]
    async fn user_notifications(&self) -> Result<UserNotifications, ApiError> {
        self.get(Endpoint::UserNotifications).await
    }

    #[instrument(skip(self))]
    async fn active_banners(&self) -> Result<Banners, ApiError> {
        self.get(Endpoint::ActiveBanners).await
    }

    #[instrument(skip(self, email))]
    async fn subscribe_newsletter(&self, email: &str) -> Result<Ack, ApiError> {
        self.post(
            Endpoint::NewsletterSubscribe,
            &NewsletterRequest {
                email: email.to_string(),
            },
        )
        .await
    }

    #[instrument(skip(self, comment))]
    async fn submit_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Ack, ApiError> {
        self.post(
            Endpoint::SubmitReview(product_id),
            &ReviewRequest {
                rating,
                comment: comment.to_string(),
            },
        )
        .await
    }
}
