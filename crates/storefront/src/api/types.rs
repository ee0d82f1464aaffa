//! Request and response payloads for the storefront backend.
//!
//! Field names follow the backend's snake_case JSON. Response structs
//! ignore the `success` flag; [`super::decode_envelope`] has already
//! checked it by the time they are built.

use serde::{Deserialize, Serialize};

use nutriharvest_core::{BannerId, CartItemId, NotificationId, NotificationKind, ProductId};

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /api/orders/add-to-cart/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /api/orders/update-cart/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCartRequest {
    pub cart_item_id: CartItemId,
    pub quantity: i64,
}

/// Body of `POST /api/orders/remove-from-cart/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveFromCartRequest {
    pub cart_item_id: CartItemId,
}

/// Body of `POST /api/orders/add-to-wishlist/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// Body of `POST /api/cms/newsletter/subscribe/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsletterRequest {
    pub email: String,
}

/// Body of `POST /api/shop/submit-review/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewRequest {
    pub rating: u8,
    pub comment: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Plain acknowledgement with a message for the shopper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

/// Result of a cart mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartMutation {
    #[serde(default)]
    pub message: String,
    /// Units in the cart after the change (add-to-cart only).
    #[serde(default)]
    pub cart_count: Option<u32>,
}

/// What a wishlist toggle did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WishlistAction {
    Added,
    Removed,
}

/// Result of a wishlist toggle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistToggle {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub wishlist_count: Option<u32>,
    /// Explicit outcome; older backends omit it.
    #[serde(default)]
    pub action: Option<WishlistAction>,
}

impl WishlistToggle {
    /// What the toggle did.
    ///
    /// Prefers the explicit `action` field. Without it the message text
    /// decides: a message mentioning "removed", in any letter case, means
    /// the product left the wishlist, anything else means it was added.
    #[must_use]
    pub fn outcome(&self) -> WishlistAction {
        self.action.unwrap_or_else(|| {
            if self.message.to_lowercase().contains("removed") {
                WishlistAction::Removed
            } else {
                WishlistAction::Added
            }
        })
    }
}

/// Wishlist size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistCount {
    pub count: u32,
}

/// A site-wide notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemNotification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", alias = "notification_type", default)]
    pub kind: NotificationKind,
}

/// Site-wide notifications currently active.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemNotifications {
    #[serde(default)]
    pub notifications: Vec<SystemNotification>,
}

/// A notification addressed to the shopper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserNotification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    /// Timestamp as sent by the backend (ISO 8601).
    #[serde(default)]
    pub created_at: String,
}

/// The shopper's notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserNotifications {
    #[serde(default)]
    pub notifications: Vec<UserNotification>,
}

impl UserNotifications {
    /// Number of notifications not yet read.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

/// A promotional banner.
///
/// The backend sends blank text fields as `""` and a missing image as
/// `null`; the accessors treat both as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
}

impl Banner {
    #[must_use]
    pub fn subtitle(&self) -> Option<&str> {
        non_empty(self.subtitle.as_deref())
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        non_empty(self.description.as_deref())
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        non_empty(self.image.as_deref())
    }

    /// Button label and link, only when both are present.
    #[must_use]
    pub fn call_to_action(&self) -> Option<(&str, &str)> {
        non_empty(self.button_text.as_deref()).zip(non_empty(self.button_link.as_deref()))
    }
}

/// Active promotional banners.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Banners {
    #[serde(default)]
    pub banners: Vec<Banner>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
