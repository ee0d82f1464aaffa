//! Headless page model.
//!
//! [`Page`] is the in-memory stand-in for the rendered document. It holds
//! only the regions the controllers touch; a region the page was rendered
//! without is `None` (or empty), and controllers treat that as "nothing to
//! do", the same way a script skips a missing element.
//!
//! Controllers share the page through a [`PageHandle`]. Every access goes
//! through a closure so the lock can never be held across an `.await`.

mod regions;

pub use regions::*;

use std::sync::{Arc, Mutex, PoisonError};

use nutriharvest_core::{CartItemId, Price, ProductId};

/// Where the page is and where it is going.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Navigation requested by a controller, if any.
    pub redirect: Option<String>,
    /// Number of full reloads requested.
    pub reloads: u32,
}

/// Something that fades out and is then removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FadeTarget {
    Toast(ToastId),
    Popup(PopupId),
}

/// The rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub location: Location,

    /// Whether the page has a dedicated alert container.
    pub alert_container: bool,
    pub toasts: Vec<Toast>,
    next_toast_id: u64,

    /// `None` when the page has no popup container.
    pub popups: Option<Vec<Popup>>,
    next_popup_id: u64,

    pub cart_badges: Vec<CountBadge>,
    pub cart_lines: Vec<CartLine>,
    /// Text of every cart total node.
    pub cart_totals: Vec<String>,
    /// Quantity input of a product detail page.
    pub product_quantity: Option<QuantityInput>,

    pub wishlist_badges: Vec<CountBadge>,
    pub wishlist_buttons: Vec<WishlistButton>,

    pub bell: Option<NotificationBell>,
    pub review_form: Option<ReviewForm>,
    pub forms: Vec<Form>,
    pub newsletter: Option<NewsletterForm>,
    pub navigation: Navigation,
    pub reveal_targets: Vec<RevealTarget>,
    pub filters: Option<ProductFilters>,
    pub bulk_actions: Option<BulkActionPanel>,
}

impl Page {
    /// An empty page at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            location: Location {
                path: path.into(),
                ..Location::default()
            },
            ..Self::default()
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    #[must_use]
    pub const fn with_alert_container(mut self) -> Self {
        self.alert_container = true;
        self
    }

    /// Add a flash message rendered by the server.
    #[must_use]
    pub fn with_server_alert(mut self, message: impl Into<String>, kind: ToastKind) -> Self {
        self.push_toast(message.into(), kind, true);
        self
    }

    #[must_use]
    pub fn with_popup_container(mut self) -> Self {
        self.popups = Some(Vec::new());
        self
    }

    #[must_use]
    pub fn with_cart_badges(mut self, count: usize) -> Self {
        self.cart_badges = vec![CountBadge::default(); count];
        self
    }

    #[must_use]
    pub fn with_cart_line(mut self, id: CartItemId, unit_price: Price, quantity: u32) -> Self {
        self.cart_lines.push(CartLine {
            id,
            unit_price,
            quantity: QuantityInput::new(quantity),
        });
        self
    }

    #[must_use]
    pub fn with_cart_totals(mut self, count: usize) -> Self {
        self.cart_totals = vec![String::new(); count];
        self
    }

    #[must_use]
    pub fn with_product_quantity(mut self, input: QuantityInput) -> Self {
        self.product_quantity = Some(input);
        self
    }

    #[must_use]
    pub fn with_wishlist_badges(mut self, count: usize) -> Self {
        self.wishlist_badges = vec![CountBadge::default(); count];
        self
    }

    #[must_use]
    pub fn with_wishlist_button(mut self, product_id: ProductId, wishlisted: bool) -> Self {
        self.wishlist_buttons
            .push(WishlistButton::new(product_id, wishlisted));
        self
    }

    #[must_use]
    pub fn with_bell(mut self) -> Self {
        self.bell = Some(NotificationBell::default());
        self
    }

    #[must_use]
    pub fn with_review_form(mut self) -> Self {
        self.review_form = Some(ReviewForm::default());
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: Form) -> Self {
        self.forms.push(form);
        self
    }

    #[must_use]
    pub fn with_newsletter(mut self) -> Self {
        self.newsletter = Some(NewsletterForm::default());
        self
    }

    #[must_use]
    pub fn with_nav_links<I, S>(mut self, hrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.navigation.links.extend(hrefs.into_iter().map(|href| NavLink {
            href: href.into(),
            active: false,
        }));
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, id: impl Into<String>) -> Self {
        self.navigation.anchors.push(id.into());
        self
    }

    #[must_use]
    pub fn with_reveal_target(mut self, id: impl Into<String>, kind: RevealKind) -> Self {
        self.reveal_targets.push(RevealTarget {
            id: id.into(),
            kind,
            revealed: false,
        });
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: ProductFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    #[must_use]
    pub fn with_bulk_actions<I, S>(mut self, item_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bulk_actions = Some(BulkActionPanel {
            items: item_ids
                .into_iter()
                .map(|id| BulkItem {
                    id: id.into(),
                    checked: false,
                })
                .collect(),
            ..BulkActionPanel::default()
        });
        self
    }

    // =========================================================================
    // Mutations shared by controllers
    // =========================================================================

    /// Append a toast and return its id.
    pub fn push_toast(&mut self, message: String, kind: ToastKind, server_rendered: bool) -> ToastId {
        self.next_toast_id += 1;
        let id = ToastId(self.next_toast_id);
        let placement = if self.alert_container {
            ToastPlacement::Container
        } else {
            ToastPlacement::Body
        };
        self.toasts.push(Toast {
            id,
            message,
            kind,
            placement,
            server_rendered,
            fading: false,
        });
        id
    }

    /// Whether a popup with `dom_id` is currently shown.
    #[must_use]
    pub fn has_popup(&self, dom_id: &str) -> bool {
        self.popups
            .as_ref()
            .is_some_and(|popups| popups.iter().any(|p| p.dom_id == dom_id))
    }

    /// Show a popup unless one with the same element id is already shown.
    ///
    /// Returns `None` without a popup container or for a duplicate.
    pub fn push_popup(&mut self, dom_id: String, content: PopupContent) -> Option<PopupId> {
        if self.has_popup(&dom_id) {
            return None;
        }
        let popups = self.popups.as_mut()?;
        self.next_popup_id += 1;
        let id = PopupId(self.next_popup_id);
        popups.push(Popup {
            id,
            dom_id,
            content,
            fading: false,
        });
        Some(id)
    }

    /// Close the popup shown under `dom_id`; returns whether there was one.
    pub fn remove_popup(&mut self, dom_id: &str) -> bool {
        self.popups.as_mut().is_some_and(|popups| {
            let before = popups.len();
            popups.retain(|p| p.dom_id != dom_id);
            popups.len() != before
        })
    }

    /// Start the fade of `target`; false when it is already gone.
    pub fn start_fade(&mut self, target: &FadeTarget) -> bool {
        match target {
            FadeTarget::Toast(id) => self
                .toasts
                .iter_mut()
                .find(|t| t.id == *id)
                .map(|t| t.fading = true)
                .is_some(),
            FadeTarget::Popup(id) => self
                .popups
                .iter_mut()
                .flatten()
                .find(|p| p.id == *id)
                .map(|p| p.fading = true)
                .is_some(),
        }
    }

    /// Remove `target` if still present; returns whether it was.
    pub fn remove(&mut self, target: &FadeTarget) -> bool {
        match target {
            FadeTarget::Toast(id) => {
                let before = self.toasts.len();
                self.toasts.retain(|t| t.id != *id);
                self.toasts.len() != before
            }
            FadeTarget::Popup(id) => self.popups.as_mut().is_some_and(|popups| {
                let before = popups.len();
                popups.retain(|p| p.id != *id);
                popups.len() != before
            }),
        }
    }

    /// Ask the browser to navigate away.
    pub fn redirect(&mut self, to: impl Into<String>) {
        self.location.redirect = Some(to.into());
    }

    /// Ask the browser for a full reload.
    pub fn reload(&mut self) {
        self.location.reloads += 1;
    }

    /// Find a field of a validated form.
    pub fn field_mut(&mut self, form_id: &str, name: &str) -> Option<&mut Field> {
        self.forms
            .iter_mut()
            .find(|f| f.id == form_id)?
            .fields
            .iter_mut()
            .find(|f| f.name == name)
    }
}

/// Shared, lockable handle to the page.
#[derive(Debug, Clone, Default)]
pub struct PageHandle {
    inner: Arc<Mutex<Page>>,
}

impl PageHandle {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            inner: Arc::new(Mutex::new(page)),
        }
    }

    /// Mutate the page.
    ///
    /// A panic in an earlier closure does not lock the page forever; the
    /// page is used as the panicking closure left it.
    pub fn update<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        let mut page = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut page)
    }

    /// Read the page.
    pub fn read<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        let page = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&page)
    }

    /// Copy of the current page.
    #[must_use]
    pub fn snapshot(&self) -> Page {
        self.read(Page::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_placement_falls_back_to_body() {
        let mut page = Page::new("/");
        page.push_toast("Saved".to_string(), ToastKind::Success, false);
        assert_eq!(page.toasts[0].placement, ToastPlacement::Body);

        let mut page = Page::new("/").with_alert_container();
        page.push_toast("Saved".to_string(), ToastKind::Success, false);
        assert_eq!(page.toasts[0].placement, ToastPlacement::Container);
    }

    #[test]
    fn test_toast_ids_are_unique() {
        let mut page = Page::new("/").with_server_alert("Welcome back", ToastKind::Info);
        let id = page.push_toast("Saved".to_string(), ToastKind::Success, false);
        assert_ne!(page.toasts[0].id, id);
    }

    #[test]
    fn test_fade_and_remove_missing_target() {
        let mut page = Page::new("/").with_popup_container();
        let target = FadeTarget::Popup(PopupId(1));
        assert!(!page.start_fade(&target));
        assert!(!page.remove(&target));

        let target = FadeTarget::Toast(ToastId(99));
        assert!(!page.start_fade(&target));
        assert!(!page.remove(&target));
    }

    #[test]
    fn test_reshown_popup_is_a_new_instance() {
        let content = || PopupContent::System {
            title: "Diwali sale".to_string(),
            message: "20% off".to_string(),
            style: PopupStyle::Success,
            view_all_href: "/".to_string(),
        };
        let mut page = Page::new("/").with_popup_container();

        let first = page.push_popup("system-notification-1".to_string(), content());
        assert!(first.is_some());
        assert_eq!(page.push_popup("system-notification-1".to_string(), content()), None);

        assert!(page.remove_popup("system-notification-1"));
        let second = page.push_popup("system-notification-1".to_string(), content());
        assert_ne!(first, second);

        let stale = FadeTarget::Popup(first.unwrap_or(PopupId(0)));
        assert!(!page.start_fade(&stale));
        assert!(!page.remove(&stale));
        assert!(page.has_popup("system-notification-1"));
    }

    #[test]
    fn test_handle_updates_are_shared() {
        let handle = PageHandle::new(Page::new("/cart/"));
        let other = handle.clone();

        handle.update(|page| page.redirect("/login/"));
        assert_eq!(
            other.read(|page| page.location.redirect.clone()).as_deref(),
            Some("/login/")
        );
    }
}
