//! Storefront controllers driven end to end over HTTP.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;

use nutriharvest_core::{CartItemId, NotificationId, Price, ProductId};
use nutriharvest_integration_tests::{CSRF_TOKEN, StubBackend};
use nutriharvest_storefront::notifications::system_popup_id;
use nutriharvest_storefront::page::Page;
use nutriharvest_storefront::{Storefront, StorefrontError};

/// Wait until `check` holds, giving spawned pollers time to hit the stub.
async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

fn home_page() -> Page {
    Page::new("/")
        .with_alert_container()
        .with_popup_container()
        .with_bell()
        .with_wishlist_badges(1)
        .with_nav_links(["/", "/shop/", "/about/"])
}

// =============================================================================
// Page start-up
// =============================================================================

#[tokio::test]
async fn test_start_polls_and_renders() {
    let stub = StubBackend::start().await;
    stub.json(
        "/api/notifications/system-notifications/",
        &json!({"success": true, "notifications": [
            {"id": 9, "title": "Diwali sale", "message": "20% off dry fruits", "notification_type": "promotion"}
        ]}),
    )
    .json(
        "/api/notifications/user-notifications/",
        &json!({"success": true, "notifications": [
            {"id": 1, "title": "Order shipped", "message": "Your order is on its way", "is_read": false, "created_at": "2026-10-01T09:30:00Z"},
            {"id": 2, "title": "Welcome", "message": "Thanks for joining", "is_read": true, "created_at": "2026-09-28T18:05:00Z"}
        ]}),
    )
    .json(
        "/api/orders/api/wishlist-count/",
        &json!({"success": true, "count": 3}),
    )
    .json(
        "/api/cms/banners/active/",
        &json!({"success": true, "banners": [{"id": 4, "title": "Fresh Medjool dates"}]}),
    );

    let storefront = Storefront::connect(&stub.config(), home_page()).expect("connect");
    let report = storefront.start().await;

    assert_eq!(report.active_links, 1);
    assert_eq!(report.pollers, 2);
    assert_eq!(report.wishlist_count, Some(3));
    assert_eq!(report.banners, 1);

    let popup_id = system_popup_id(NotificationId::new(9));
    let page = storefront.page().clone();
    assert!(eventually(|| page.read(|p| p.has_popup(&popup_id))).await);
    assert!(
        eventually(|| page.read(|p| p.bell.as_ref().is_some_and(|b| b.entries.len() == 2))).await
    );

    let snapshot = page.snapshot();
    assert_eq!(snapshot.wishlist_badges[0].text, "3");
    assert_eq!(snapshot.bell.unwrap().count.text, "1");

    storefront.shutdown().await;
    assert_eq!(storefront.state().lifecycle().active_tasks(), 0);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_update_and_remove() {
    let stub = StubBackend::start().await;
    stub.json(
        "/api/orders/update-cart/",
        &json!({"success": true, "message": "Cart updated", "cart_count": 3}),
    )
    .json(
        "/api/orders/remove-from-cart/",
        &json!({"success": true, "message": "Item removed from cart", "cart_count": 0}),
    );
    let page = Page::new("/cart/")
        .with_alert_container()
        .with_cart_badges(1)
        .with_cart_line(CartItemId::new(7), Price::from_paise(25_000), 1)
        .with_cart_line(CartItemId::new(8), Price::from_paise(10_000), 2)
        .with_cart_totals(1);
    let storefront = Storefront::connect(&stub.config(), page).expect("connect");

    storefront
        .cart()
        .update_cart(CartItemId::new(7), 3)
        .await
        .expect("update should succeed");

    let snapshot = storefront.page().snapshot();
    assert_eq!(snapshot.cart_lines[0].quantity.value, 3);
    assert_eq!(snapshot.cart_totals[0], Price::from_paise(95_000).to_string());

    storefront
        .cart()
        .remove_from_cart(CartItemId::new(8))
        .await
        .expect("remove should succeed");

    let snapshot = storefront.page().snapshot();
    assert_eq!(snapshot.cart_lines.len(), 1);
    assert_eq!(snapshot.cart_totals[0], Price::from_paise(75_000).to_string());
    assert_eq!(snapshot.cart_badges[0].text, "0");

    let update = &stub.recorded_for("/api/orders/update-cart/")[0];
    assert_eq!(update.csrf_token.as_deref(), Some(CSRF_TOKEN));
    storefront.shutdown().await;
}

#[tokio::test]
async fn test_rejected_add_leaves_badges_alone() {
    let stub = StubBackend::start().await;
    stub.json(
        "/api/orders/add-to-cart/",
        &json!({"success": false, "message": "Insufficient stock available"}),
    );
    let page = Page::new("/shop/").with_alert_container().with_cart_badges(2);
    let storefront = Storefront::connect(&stub.config(), page).expect("connect");

    let err = storefront
        .cart()
        .add_to_cart(ProductId::new(5), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, StorefrontError::Api(_)));
    let snapshot = storefront.page().snapshot();
    assert!(snapshot.cart_badges.iter().all(|b| b.text.is_empty()));
    assert_eq!(snapshot.toasts[0].message, "Insufficient stock available");
    storefront.shutdown().await;
}

#[tokio::test]
async fn test_visitor_is_sent_to_login() {
    let stub = StubBackend::start().await;
    let mut config = stub.config();
    config.authenticated = false;
    let storefront =
        Storefront::connect(&config, Page::new("/shop/").with_alert_container()).expect("connect");

    let err = storefront
        .cart()
        .add_to_cart(ProductId::new(5), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, StorefrontError::LoginRequired));
    assert!(stub.recorded().is_empty());
    assert_eq!(
        storefront.page().snapshot().location.redirect.as_deref(),
        Some("/login/")
    );
    storefront.shutdown().await;
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_review_submission() {
    let stub = StubBackend::start().await;
    stub.json(
        "/api/shop/submit-review/42/",
        &json!({"success": true, "message": "Review submitted successfully"}),
    );
    let page = Page::new("/product/42/")
        .with_alert_container()
        .with_review_form();
    let storefront = Storefront::connect(&stub.config(), page).expect("connect");

    storefront.review().click(5);
    storefront.page().update(|page| {
        if let Some(form) = page.review_form.as_mut() {
            form.comment = "  Best almonds I have bought  ".to_string();
        }
    });

    let ack = storefront.review().submit().await.expect("submit");

    assert_eq!(ack.message, "Review submitted successfully");
    assert_eq!(
        stub.recorded_for("/api/shop/submit-review/42/")[0].body,
        json!({"rating": 5, "comment": "Best almonds I have bought"})
    );
    let form = storefront.page().snapshot().review_form.unwrap();
    assert_eq!(form.stars.committed, 0);
    assert!(form.comment.is_empty());
    assert!(!form.submit.disabled);

    // The scheduled reload is cancelled with the page.
    storefront.shutdown().await;
    assert_eq!(storefront.page().snapshot().location.reloads, 0);
}
