//! Shopper session context and browser-session storage.
//!
//! The session context is handed to every controller explicitly. It decides
//! whether shopper-only actions (cart, wishlist, bell) are offered; the
//! backend still enforces authentication on every request, so this is a UI
//! gate and never a security boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Storage key recording that the shopper dismissed a banner.
pub const BANNERS_DISMISSED: &str = "bannersDismissed";

/// Where anonymous visitors are sent for shopper-only actions.
pub const LOGIN_PATH: &str = "/login/";

/// Identity and anti-forgery state for the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    authenticated: bool,
    csrf_form_field: Option<String>,
    csrf_meta_tag: Option<String>,
}

impl SessionContext {
    /// Context for a visitor who is not logged in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for a logged-in shopper.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// Build a context from what the rendered page exposes.
    ///
    /// The shopper counts as logged in when the body carries the
    /// `authenticated` class or the user menu is rendered.
    #[must_use]
    pub fn from_markup(
        body_authenticated_class: bool,
        user_menu_present: bool,
        csrf_form_field: Option<String>,
        csrf_meta_tag: Option<String>,
    ) -> Self {
        Self {
            authenticated: body_authenticated_class || user_menu_present,
            csrf_form_field,
            csrf_meta_tag,
        }
    }

    /// Set the hidden `csrfmiddlewaretoken` form field value.
    #[must_use]
    pub fn with_csrf_form_field(mut self, token: impl Into<String>) -> Self {
        self.csrf_form_field = Some(token.into());
        self
    }

    /// Set the `csrf-token` meta tag value.
    #[must_use]
    pub fn with_csrf_meta_tag(mut self, token: impl Into<String>) -> Self {
        self.csrf_meta_tag = Some(token.into());
        self
    }

    /// Whether shopper-only actions should be offered.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// CSRF token for mutating requests.
    ///
    /// The hidden form field wins over the meta tag; empty when neither is
    /// present (the backend then rejects the POST).
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        [&self.csrf_form_field, &self.csrf_meta_tag]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|token| !token.is_empty())
            .unwrap_or("")
    }
}

/// Key/value storage scoped to one browser session.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str);

    /// Delete a value.
    fn remove(&self, key: &str);
}

/// In-process [`SessionStorage`]; lives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
