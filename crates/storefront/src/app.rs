//! Application root: wires the controllers of one page together.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, instrument};

use crate::api::{HttpApi, StorefrontApi};
use crate::banners::BannerController;
use crate::bulk::BulkActions;
use crate::cart::CartController;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::navigation::Navigator;
use crate::newsletter::NewsletterController;
use crate::notifications::NotificationCenter;
use crate::page::{Page, PageHandle};
use crate::poller::Poller;
use crate::review::ReviewController;
use crate::session::{MemorySessionStorage, SessionContext};
use crate::state::PageState;
use crate::wishlist::WishlistController;

/// What [`Storefront::start`] set up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    pub active_links: usize,
    pub server_alerts: usize,
    pub pollers: usize,
    pub wishlist_count: Option<u32>,
    pub banners: usize,
}

/// Every controller of one page, sharing one [`PageState`].
pub struct Storefront {
    state: PageState,
    cart: CartController,
    wishlist: WishlistController,
    notifications: NotificationCenter,
    banners: BannerController,
    review: ReviewController,
    newsletter: NewsletterController,
    navigator: Navigator,
    bulk: BulkActions,
    pollers: Mutex<Vec<Poller>>,
}

impl Storefront {
    #[must_use]
    pub fn new(state: PageState) -> Self {
        Self {
            cart: CartController::new(state.clone()),
            wishlist: WishlistController::new(state.clone()),
            notifications: NotificationCenter::new(state.clone()),
            banners: BannerController::new(state.clone()),
            review: ReviewController::new(state.clone()),
            newsletter: NewsletterController::new(state.clone()),
            navigator: Navigator::new(state.clone()),
            bulk: BulkActions::new(state.clone()),
            pollers: Mutex::new(Vec::new()),
            state,
        }
    }

    /// Drive `page` against the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: &StorefrontConfig, page: Page) -> Result<Self> {
        let mut session = if config.authenticated {
            SessionContext::authenticated()
        } else {
            SessionContext::anonymous()
        };
        if let Some(token) = &config.csrf_token {
            session = session.with_csrf_form_field(token.clone());
        }

        let api: Arc<dyn StorefrontApi> = Arc::new(HttpApi::new(config, &session)?);
        let state = PageState::new(
            api,
            PageHandle::new(page),
            session,
            Arc::new(MemorySessionStorage::new()),
            config.timings,
        );
        Ok(Self::new(state))
    }

    /// Run page-ready initialization.
    ///
    /// Every step runs regardless of the others; failures are reported and
    /// leave their part of the report empty.
    #[instrument(skip(self))]
    pub async fn start(&self) -> StartReport {
        let active_links = self.navigator.highlight_active_links();
        let server_alerts = self.state.toaster().adopt_server_alerts();

        let pollers = self.notifications.start();
        let poller_count = pollers.len();
        self.pollers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(pollers);

        let (wishlist, banners) = tokio::join!(self.wishlist.refresh_count(), self.banners.init());

        let wishlist_count = wishlist
            .inspect_err(|e| e.report("wishlist count"))
            .ok()
            .flatten();
        let banners = banners
            .inspect_err(|e| e.report("banners"))
            .map_or(0, |added| added.len());

        let report = StartReport {
            active_links,
            server_alerts,
            pollers: poller_count,
            wishlist_count,
            banners,
        };
        info!(?report, "Storefront page initialized");
        report
    }

    /// Stop every poller and timer and wait for them to exit.
    pub async fn shutdown(&self) {
        let pollers = std::mem::take(&mut *self.pollers.lock().unwrap_or_else(PoisonError::into_inner));
        for poller in &pollers {
            poller.stop();
        }
        self.state.lifecycle().shutdown().await;
        info!("Storefront page shut down");
    }

    #[must_use]
    pub const fn state(&self) -> &PageState {
        &self.state
    }

    #[must_use]
    pub fn page(&self) -> &PageHandle {
        self.state.page()
    }

    #[must_use]
    pub const fn cart(&self) -> &CartController {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistController {
        &self.wishlist
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    #[must_use]
    pub const fn banners(&self) -> &BannerController {
        &self.banners
    }

    #[must_use]
    pub const fn review(&self) -> &ReviewController {
        &self.review
    }

    #[must_use]
    pub const fn newsletter(&self) -> &NewsletterController {
        &self.newsletter
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub const fn bulk(&self) -> &BulkActions {
        &self.bulk
    }
}
