//! Wishlist toggle buttons and count badges.

use tracing::{debug, info, instrument, warn};

use nutriharvest_core::ProductId;

use crate::api::{WishlistAction, WishlistToggle};
use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::page::{Page, WishlistButton};
use crate::session::LOGIN_PATH;
use crate::state::PageState;

const TOGGLE_FAILED: &str = "An error occurred while updating wishlist";

/// Drives the wishlist regions of a page.
#[derive(Clone)]
pub struct WishlistController {
    state: PageState,
}

impl WishlistController {
    #[must_use]
    pub const fn new(state: PageState) -> Self {
        Self { state }
    }

    /// Add the product to the wishlist, or take it off.
    ///
    /// The product's buttons show a loading label and are disabled while
    /// the request runs; they are re-enabled whatever the outcome. A toggle
    /// for a product whose buttons are still disabled sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::LoginRequired`] for anonymous visitors,
    /// [`StorefrontError::Busy`] while an earlier toggle is in flight, or
    /// the API failure.
    #[instrument(skip(self))]
    pub async fn toggle(&self, product_id: ProductId) -> Result<WishlistToggle> {
        let id = product_id.to_string();
        add_breadcrumb("wishlist", "Toggle wishlist", Some(&[("product_id", id.as_str())]));

        if !self.state.session().is_authenticated() {
            self.state
                .toaster()
                .warning("Please login to add items to wishlist");
            self.state.page().update(|page| page.redirect(LOGIN_PATH));
            return Err(StorefrontError::LoginRequired);
        }

        let original_labels = self
            .state
            .page()
            .update(|page| begin_loading(page, product_id))
            .ok_or(StorefrontError::Busy("wishlist toggle"))?;

        match self.state.api().toggle_wishlist(product_id).await {
            Ok(toggle) => {
                let action = toggle.outcome();
                info!(action = ?action, count = ?toggle.wishlist_count, "Wishlist toggled");
                self.state.toaster().success(toggle.message.clone());
                self.state.page().update(|page| {
                    if let Some(count) = toggle.wishlist_count {
                        show_wishlist_count(page, count);
                    }
                    for button in buttons_for(page, product_id) {
                        button.set_wishlisted(action == WishlistAction::Added);
                        button.disabled = false;
                    }
                });
                Ok(toggle)
            }
            Err(e) => {
                warn!(error = %e, "Wishlist toggle failed");
                self.state.toaster().error(e.user_message(TOGGLE_FAILED));
                self.state.page().update(|page| {
                    for (button, label) in buttons_for(page, product_id).zip(original_labels) {
                        button.label = label;
                        button.disabled = false;
                    }
                });
                Err(e.into())
            }
        }
    }

    /// Refresh the wishlist badges from the backend.
    ///
    /// Returns the count, or `None` for anonymous visitors (no request).
    ///
    /// # Errors
    ///
    /// Returns the API failure (already logged).
    #[instrument(skip(self))]
    pub async fn refresh_count(&self) -> Result<Option<u32>> {
        if !self.state.session().is_authenticated() {
            return Ok(None);
        }

        let response = self
            .state
            .api()
            .wishlist_count()
            .await
            .inspect_err(|e| debug!(error = %e, "Failed to fetch wishlist count"))?;

        self.state
            .page()
            .update(|page| show_wishlist_count(page, response.count));
        Ok(Some(response.count))
    }
}

fn buttons_for(page: &mut Page, product_id: ProductId) -> impl Iterator<Item = &mut WishlistButton> {
    page.wishlist_buttons
        .iter_mut()
        .filter(move |b| b.product_id == product_id)
}

/// Put the product's buttons into the loading state, returning their
/// labels for restoring on failure. `None` when a toggle is already running.
fn begin_loading(page: &mut Page, product_id: ProductId) -> Option<Vec<String>> {
    if buttons_for(page, product_id).any(|button| button.disabled) {
        return None;
    }
    Some(
        buttons_for(page, product_id)
            .map(|button| {
                button.disabled = true;
                std::mem::replace(&mut button.label, WishlistButton::LOADING_LABEL.to_string())
            })
            .collect(),
    )
}

fn show_wishlist_count(page: &mut Page, count: u32) {
    for badge in &mut page.wishlist_badges {
        badge.show_count(count as usize);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::api::Endpoint;
    use crate::page::ButtonStyle;
    use crate::test_support::{FakeApi, Reply, shopper_state, toast_messages, visitor_state};

    fn product_page(wishlisted: bool) -> Page {
        Page::new("/product/9/")
            .with_wishlist_badges(1)
            .with_wishlist_button(ProductId::new(9), wishlisted)
    }

    fn button(state: &PageState) -> WishlistButton {
        state.page().read(|p| p.wishlist_buttons[0].clone())
    }

    #[tokio::test]
    async fn test_anonymous_toggle_redirects() {
        let api = FakeApi::new();
        let state = visitor_state(&api, product_page(false));

        let err = WishlistController::new(state.clone())
            .toggle(ProductId::new(9))
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::LoginRequired));
        assert!(api.calls().is_empty());
        assert_eq!(toast_messages(&state), vec!["Please login to add items to wishlist"]);
        assert_eq!(
            state.page().read(|p| p.location.redirect.clone()).as_deref(),
            Some("/login/")
        );
    }

    #[tokio::test]
    async fn test_explicit_action_drives_button() {
        let api = FakeApi::new();
        api.json(
            Endpoint::ToggleWishlist,
            json!({"success": true, "message": "Saved for later", "wishlist_count": 4, "action": "added"}),
        );
        let state = shopper_state(&api, product_page(false));

        WishlistController::new(state.clone())
            .toggle(ProductId::new(9))
            .await
            .unwrap();

        let button = button(&state);
        assert_eq!(button.label, "Wishlisted");
        assert_eq!(button.style, ButtonStyle::Danger);
        assert!(!button.disabled);
        let badge = state.page().read(|p| p.wishlist_badges[0].clone());
        assert_eq!(badge.text, "4");
        assert!(badge.visible);
    }

    #[tokio::test]
    async fn test_removed_message_without_action() {
        let api = FakeApi::new();
        api.json(
            Endpoint::ToggleWishlist,
            json!({"success": true, "message": "Product removed from wishlist", "wishlist_count": 0}),
        );
        let state = shopper_state(&api, product_page(true));

        WishlistController::new(state.clone())
            .toggle(ProductId::new(9))
            .await
            .unwrap();

        let button = button(&state);
        assert_eq!(button.label, "Wishlist");
        assert_eq!(button.style, ButtonStyle::OutlinePrimary);
        assert!(!state.page().read(|p| p.wishlist_badges[0].visible));
    }

    #[tokio::test(start_paused = true)]
    async fn test_button_is_busy_during_request() {
        let api = FakeApi::new();
        api.reply(
            Endpoint::ToggleWishlist,
            Reply::Delayed(
                Duration::from_secs(1),
                json!({"success": true, "message": "Product added to wishlist"}),
            ),
        );
        let state = shopper_state(&api, product_page(false));
        let wishlist = WishlistController::new(state.clone());

        let pending = tokio::spawn(async move { wishlist.toggle(ProductId::new(9)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let busy = button(&state);
        assert_eq!(busy.label, "Loading...");
        assert!(busy.disabled);

        pending.await.unwrap().unwrap();
        assert_eq!(button(&state).label, "Wishlisted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_toggle_while_busy_sends_nothing() {
        let api = FakeApi::new();
        api.reply(
            Endpoint::ToggleWishlist,
            Reply::Delayed(
                Duration::from_secs(1),
                json!({"success": true, "message": "Product added to wishlist"}),
            ),
        );
        let state = shopper_state(&api, product_page(false));
        let wishlist = WishlistController::new(state.clone());

        let first = {
            let wishlist = wishlist.clone();
            tokio::spawn(async move { wishlist.toggle(ProductId::new(9)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = wishlist.toggle(ProductId::new(9)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Busy(_)));

        first.await.unwrap().unwrap();
        assert_eq!(api.calls_to(Endpoint::ToggleWishlist).len(), 1);
        let button = button(&state);
        assert_eq!(button.label, "Wishlisted");
        assert!(!button.disabled);
    }

    #[tokio::test]
    async fn test_failure_restores_label() {
        let api = FakeApi::new();
        api.reply(Endpoint::ToggleWishlist, Reply::Transport);
        let state = shopper_state(&api, product_page(true));

        let _ = WishlistController::new(state.clone())
            .toggle(ProductId::new(9))
            .await;

        let button = button(&state);
        assert_eq!(button.label, "Wishlisted");
        assert_eq!(button.style, ButtonStyle::Danger);
        assert!(!button.disabled);
        assert_eq!(
            toast_messages(&state),
            vec!["An error occurred while updating wishlist"]
        );
    }

    #[tokio::test]
    async fn test_rejection_shows_server_message() {
        let api = FakeApi::new();
        api.json(
            Endpoint::ToggleWishlist,
            json!({"success": false, "message": "Product not found"}),
        );
        let state = shopper_state(&api, product_page(false));

        let _ = WishlistController::new(state.clone())
            .toggle(ProductId::new(9))
            .await;

        assert_eq!(toast_messages(&state), vec!["Product not found"]);
        assert_eq!(button(&state).label, "Wishlist");
    }

    #[tokio::test]
    async fn test_refresh_count() {
        let api = FakeApi::new();
        api.json(Endpoint::WishlistCount, json!({"success": true, "count": 2}));

        let state = shopper_state(&api, product_page(false));
        assert_eq!(
            WishlistController::new(state.clone()).refresh_count().await.unwrap(),
            Some(2)
        );
        assert_eq!(state.page().read(|p| p.wishlist_badges[0].text.clone()), "2");

        let state = visitor_state(&api, product_page(false));
        assert_eq!(WishlistController::new(state).refresh_count().await.unwrap(), None);
        assert_eq!(api.calls_to(Endpoint::WishlistCount).len(), 1);
    }
}
