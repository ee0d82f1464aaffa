//! Scripted backend for controller tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use nutriharvest_core::{CartItemId, ProductId};

use crate::api::{
    Ack, ApiError, Banners, CartMutation, Endpoint, StorefrontApi, SystemNotifications,
    UserNotifications, WishlistCount, WishlistToggle, decode_value,
};
use crate::config::Timings;
use crate::page::{Page, PageHandle};
use crate::session::{MemorySessionStorage, SessionContext};
use crate::state::PageState;

/// A canned reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// JSON envelope, decoded exactly like a real response.
    Json(Value),
    /// JSON envelope delivered after a delay.
    Delayed(Duration, Value),
    /// Connection-level failure.
    Transport,
}

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub body: Value,
}

/// In-memory [`StorefrontApi`] answering from per-endpoint queues.
///
/// The last reply of a queue is sticky so pollers keep getting answers.
/// An endpoint with nothing scripted fails like a transport error.
#[derive(Debug, Default)]
pub struct FakeApi {
    replies: Mutex<HashMap<Endpoint, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(reply);
        self
    }

    pub fn json(&self, endpoint: Endpoint, body: Value) -> &Self {
        self.reply(endpoint, Reply::Json(body))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == endpoint)
            .collect()
    }

    async fn answer<T: DeserializeOwned>(&self, endpoint: Endpoint, body: Value) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(Call { endpoint, body });

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            replies.get_mut(&endpoint).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match reply {
            Some(Reply::Json(value)) => decode_value(value),
            Some(Reply::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                decode_value(value)
            }
            Some(Reply::Transport) | None => Err(ApiError::Status {
                status: 502,
                body: "Bad Gateway".to_string(),
            }),
        }
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<CartMutation, ApiError> {
        self.answer(
            Endpoint::AddToCart,
            json!({"product_id": product_id, "quantity": quantity}),
        )
        .await
    }

    async fn update_cart(&self, cart_item_id: CartItemId, quantity: i64) -> Result<CartMutation, ApiError> {
        self.answer(
            Endpoint::UpdateCart,
            json!({"cart_item_id": cart_item_id, "quantity": quantity}),
        )
        .await
    }

    async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<CartMutation, ApiError> {
        self.answer(Endpoint::RemoveFromCart, json!({"cart_item_id": cart_item_id}))
            .await
    }

    async fn toggle_wishlist(&self, product_id: ProductId) -> Result<WishlistToggle, ApiError> {
        self.answer(Endpoint::ToggleWishlist, json!({"product_id": product_id}))
            .await
    }

    async fn wishlist_count(&self) -> Result<WishlistCount, ApiError> {
        self.answer(Endpoint::WishlistCount, Value::Null).await
    }

    async fn system_notifications(&self) -> Result<SystemNotifications, ApiError> {
        self.answer(Endpoint::SystemNotifications, Value::Null).await
    }

    async fn user_notifications(&self) -> Result<UserNotifications, ApiError> {
        self.answer(Endpoint::UserNotifications, Value::Null).await
    }

    async fn active_banners(&self) -> Result<Banners, ApiError> {
        self.answer(Endpoint::ActiveBanners, Value::Null).await
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<Ack, ApiError> {
        self.answer(Endpoint::NewsletterSubscribe, json!({"email": email}))
            .await
    }

    async fn submit_review(&self, product_id: ProductId, rating: u8, comment: &str) -> Result<Ack, ApiError> {
        self.answer(
            Endpoint::SubmitReview(product_id),
            json!({"rating": rating, "comment": comment}),
        )
        .await
    }
}

/// Page state over `api` for a logged-in shopper.
pub fn shopper_state(api: &Arc<FakeApi>, page: Page) -> PageState {
    state(api, page, SessionContext::authenticated().with_csrf_form_field("test-token"))
}

/// Page state over `api` for an anonymous visitor.
pub fn visitor_state(api: &Arc<FakeApi>, page: Page) -> PageState {
    state(api, page, SessionContext::anonymous())
}

pub fn state(api: &Arc<FakeApi>, page: Page, session: SessionContext) -> PageState {
    PageState::new(
        Arc::clone(api) as Arc<dyn StorefrontApi>,
        PageHandle::new(page),
        session,
        Arc::new(MemorySessionStorage::new()),
        Timings::default(),
    )
}

/// Messages of the toasts currently shown.
pub fn toast_messages(state: &PageState) -> Vec<String> {
    state
        .page()
        .read(|p| p.toasts.iter().map(|t| t.message.clone()).collect())
}
