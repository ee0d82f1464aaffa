//! The page regions controllers read and patch.

use nutriharvest_core::{CartItemId, NotificationKind, Price, ProductId};

// =============================================================================
// Alerts
// =============================================================================

/// Identifier of a toast within one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

/// Identifier of one rendered popup. A popup shown again under the same
/// element id gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

/// Severity of a toast, mapped to the alert style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    /// Alert style class suffix (`alert-{style}`).
    #[must_use]
    pub const fn style(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Where a toast was attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPlacement {
    /// The dedicated alert container.
    Container,
    /// Top of the page body, when the page has no alert container.
    Body,
}

/// A dismissible alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub placement: ToastPlacement,
    /// Rendered by the server with the page rather than by a controller.
    pub server_rendered: bool,
    pub fading: bool,
}

// =============================================================================
// Popups
// =============================================================================

/// Visual style of a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupStyle {
    Success,
    Info,
    Primary,
    Warning,
}

impl From<NotificationKind> for PopupStyle {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Promotion => Self::Success,
            NotificationKind::Announcement => Self::Primary,
            NotificationKind::Alert => Self::Warning,
            NotificationKind::NewArrival | NotificationKind::Other => Self::Info,
        }
    }
}

/// What a popup shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupContent {
    System {
        title: String,
        message: String,
        style: PopupStyle,
        view_all_href: String,
    },
    Banner {
        title: String,
        subtitle: Option<String>,
        description: Option<String>,
        image: Option<String>,
        /// Button label and link.
        call_to_action: Option<(String, String)>,
    },
}

/// A popup in the popup container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub id: PopupId,
    /// Element id, e.g. `system-notification-4`; unique among shown popups.
    pub dom_id: String,
    pub content: PopupContent,
    pub fading: bool,
}

// =============================================================================
// Counts and cart
// =============================================================================

/// A small count bubble (cart, wishlist, bell).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountBadge {
    pub text: String,
    pub visible: bool,
}

impl CountBadge {
    /// Display `count`, hiding the badge at zero.
    pub fn show_count(&mut self, count: usize) {
        self.text = count.to_string();
        self.visible = count > 0;
    }
}

/// A bounded numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityInput {
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

impl QuantityInput {
    /// Default upper bound when the input declares none.
    pub const DEFAULT_MAX: u32 = 999;

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self {
            value,
            min: 1,
            max: Self::DEFAULT_MAX,
        }
    }

    /// Apply a stepper press; returns whether the value changed.
    pub fn step(&mut self, step: Step) -> bool {
        match step {
            Step::Down if self.value > self.min => self.value -= 1,
            Step::Up if self.value < self.max => self.value += 1,
            _ => return false,
        }
        true
    }
}

impl Default for QuantityInput {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Direction of a quantity stepper press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Down,
    Up,
}

/// One row of the cart table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: CartItemId,
    pub unit_price: Price,
    pub quantity: QuantityInput,
}

// =============================================================================
// Wishlist
// =============================================================================

/// Style of a wishlist button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    OutlinePrimary,
    Danger,
}

/// A per-product wishlist toggle button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistButton {
    pub product_id: ProductId,
    pub label: String,
    pub style: ButtonStyle,
    pub disabled: bool,
    /// Times the heart icon was re-rendered after a label swap.
    pub icon_renders: u32,
}

impl WishlistButton {
    pub const ADD_LABEL: &'static str = "Wishlist";
    pub const ADDED_LABEL: &'static str = "Wishlisted";
    pub const LOADING_LABEL: &'static str = "Loading...";

    #[must_use]
    pub fn new(product_id: ProductId, wishlisted: bool) -> Self {
        let mut button = Self {
            product_id,
            label: String::new(),
            style: ButtonStyle::OutlinePrimary,
            disabled: false,
            icon_renders: 0,
        };
        button.set_wishlisted(wishlisted);
        button
    }

    /// Swap label and style to reflect wishlist membership.
    pub fn set_wishlisted(&mut self, wishlisted: bool) {
        if wishlisted {
            Self::ADDED_LABEL.clone_into(&mut self.label);
            self.style = ButtonStyle::Danger;
        } else {
            Self::ADD_LABEL.clone_into(&mut self.label);
            self.style = ButtonStyle::OutlinePrimary;
        }
        self.icon_renders += 1;
    }
}

// =============================================================================
// Notification bell
// =============================================================================

/// One row of the bell dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BellEntry {
    pub title: String,
    /// Shows the "New" marker.
    pub unread: bool,
    pub excerpt: String,
    pub timestamp: String,
}

/// The notification bell and its dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationBell {
    pub count: CountBadge,
    pub entries: Vec<BellEntry>,
    /// "View all notifications" link shown.
    pub view_all: bool,
    /// "No notifications" placeholder shown.
    pub empty_visible: bool,
}

// =============================================================================
// Review form
// =============================================================================

/// Five-star rating widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarRating {
    /// Value of the hidden rating field; 0 means unrated.
    pub committed: u8,
    /// Rating under the pointer, if hovering.
    pub preview: Option<u8>,
}

impl StarRating {
    pub const STARS: u8 = 5;

    /// Number of stars currently drawn filled.
    #[must_use]
    pub fn filled(&self) -> u8 {
        self.preview.unwrap_or(self.committed)
    }

    /// Whether star `index` (0-based) is filled.
    #[must_use]
    pub fn is_filled(&self, index: u8) -> bool {
        index < self.filled()
    }
}

/// A submit button that can show a busy label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

/// The product review form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub stars: StarRating,
    pub comment: String,
    pub submit: SubmitButton,
}

impl ReviewForm {
    pub const SUBMIT_LABEL: &'static str = "Submit Review";
    pub const BUSY_LABEL: &'static str = "Submitting...";
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self {
            stars: StarRating::default(),
            comment: String::new(),
            submit: SubmitButton {
                label: Self::SUBMIT_LABEL.to_string(),
                disabled: false,
            },
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
}

/// A form field with its inline error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub invalid: bool,
    /// Sibling error text, present only while invalid.
    pub error: Option<String>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            value: String::new(),
            invalid: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// A form opted in to client-side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub id: String,
    pub fields: Vec<Field>,
    pub was_validated: bool,
}

impl Form {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            fields,
            was_validated: false,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The footer newsletter form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsletterForm {
    pub email: String,
}

// =============================================================================
// Navigation and reveal
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub menu_open: bool,
    pub links: Vec<NavLink>,
    /// Element ids reachable by in-page anchors.
    pub anchors: Vec<String>,
    /// Element currently being smooth-scrolled to.
    pub scroll_target: Option<String>,
}

/// Card families that fade in when scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealKind {
    ProductCard,
    FeatureCard,
    TestimonialCard,
    DashboardCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTarget {
    pub id: String,
    pub kind: RevealKind,
    pub revealed: bool,
}

/// Shop listing filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub search: String,
    pub category: String,
    pub price_range: String,
    pub sort: String,
}

// =============================================================================
// Admin bulk actions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    pub id: String,
    pub checked: bool,
}

/// Bulk action bar of an admin list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkActionPanel {
    pub select_all: bool,
    /// Selected action, empty when none is chosen.
    pub action: String,
    pub items: Vec<BulkItem>,
}
