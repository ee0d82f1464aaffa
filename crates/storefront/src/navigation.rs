//! Navigation chrome: mobile menu, active links, anchors, scroll reveal,
//! and the shop filter controls.

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::page::{Page, ProductFilters};
use crate::state::PageState;

/// Shop listing path the filters navigate to.
pub const SHOP_PATH: &str = "/shop/";

/// Intersection ratio at which a card is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Visibility report for one observed element.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub id: String,
    pub ratio: f64,
}

/// A filter select on the shop page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    PriceRange,
    Sort,
}

/// Shop URL for the given filter values; empty values are left out.
#[must_use]
pub fn shop_url(filters: &ProductFilters) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in [
        ("search", &filters.search),
        ("category", &filters.category),
        ("price_range", &filters.price_range),
        ("sort", &filters.sort),
    ] {
        if !value.is_empty() {
            query.append_pair(key, value);
        }
    }

    let query = query.finish();
    if query.is_empty() {
        SHOP_PATH.to_string()
    } else {
        format!("{SHOP_PATH}?{query}")
    }
}

/// Handles navigation events of a page.
#[derive(Clone)]
pub struct Navigator {
    state: PageState,
    pending_search: Arc<Mutex<Option<CancellationToken>>>,
}

impl Navigator {
    #[must_use]
    pub fn new(state: PageState) -> Self {
        Self {
            state,
            pending_search: Arc::new(Mutex::new(None)),
        }
    }

    /// Open or close the collapsed mobile menu; returns whether it is open.
    pub fn toggle_menu(&self) -> bool {
        self.state.page().update(|page| {
            page.navigation.menu_open = !page.navigation.menu_open;
            page.navigation.menu_open
        })
    }

    /// Mark the nav links pointing at the current path.
    pub fn highlight_active_links(&self) -> usize {
        self.state.page().update(|page| {
            let path = page.location.path.clone();
            let mut active = 0;
            for link in &mut page.navigation.links {
                link.active = link.href == path;
                active += usize::from(link.active);
            }
            active
        })
    }

    /// Smooth-scroll to an in-page anchor (`#id`), if the target exists.
    pub fn scroll_to(&self, anchor: &str) -> bool {
        let id = anchor.trim_start_matches('#');
        self.state.page().update(|page| {
            if id.is_empty() || !page.navigation.anchors.iter().any(|a| a == id) {
                return false;
            }
            page.navigation.scroll_target = Some(id.to_string());
            true
        })
    }

    /// Reveal the observed cards that became visible enough. Revealed
    /// cards stay revealed.
    pub fn on_intersection(&self, entries: &[Intersection]) -> usize {
        self.state.page().update(|page| {
            let mut revealed = 0;
            for entry in entries.iter().filter(|e| e.ratio >= REVEAL_THRESHOLD) {
                if let Some(target) = page
                    .reveal_targets
                    .iter_mut()
                    .find(|t| t.id == entry.id && !t.revealed)
                {
                    target.revealed = true;
                    revealed += 1;
                }
            }
            revealed
        })
    }

    /// A filter select changed: navigate right away.
    pub fn select_filter(&self, field: FilterField, value: &str) -> Option<String> {
        self.state.page().update(|page| {
            let filters = page.filters.as_mut()?;
            let slot = match field {
                FilterField::Category => &mut filters.category,
                FilterField::PriceRange => &mut filters.price_range,
                FilterField::Sort => &mut filters.sort,
            };
            value.clone_into(slot);
            Some(navigate_to_shop(page))
        })
    }

    /// The search box changed. Navigation happens once typing pauses for
    /// the debounce period; every keystroke restarts the wait.
    pub fn search_input(&self, text: &str) {
        let has_filters = self.state.page().update(|page| {
            page.filters
                .as_mut()
                .map(|filters| text.clone_into(&mut filters.search))
                .is_some()
        });
        if !has_filters {
            return;
        }

        let token = self.state.lifecycle().child_token();
        if let Some(previous) = self
            .pending_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone())
        {
            previous.cancel();
        }

        let page = self.state.page().clone();
        let delay = self.state.timings().search_debounce;
        self.state.lifecycle().spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    page.update(navigate_to_shop);
                }
            }
        });
    }
}

fn navigate_to_shop(page: &mut Page) -> String {
    let url = page.filters.as_ref().map_or_else(|| SHOP_PATH.to_string(), shop_url);
    debug!(url = %url, "Applying shop filters");
    page.redirect(url.clone());
    url
}
