//! State shared by every controller of one page.

use std::sync::Arc;

use crate::api::StorefrontApi;
use crate::config::Timings;
use crate::lifecycle::Lifecycle;
use crate::page::PageHandle;
use crate::session::{SessionContext, SessionStorage};
use crate::toast::Toaster;

/// Page-scoped state shared across all controllers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend, the page model, the session and the task lifecycle.
#[derive(Clone)]
pub struct PageState {
    inner: Arc<PageStateInner>,
}

struct PageStateInner {
    api: Arc<dyn StorefrontApi>,
    page: PageHandle,
    session: SessionContext,
    storage: Arc<dyn SessionStorage>,
    lifecycle: Lifecycle,
    toaster: Toaster,
    timings: Timings,
}

impl PageState {
    /// Create the state for one page.
    ///
    /// # Arguments
    ///
    /// * `api` - Backend the controllers talk to
    /// * `page` - The page model controllers patch
    /// * `session` - Who is browsing
    /// * `storage` - Browser-session storage
    /// * `timings` - Poll periods and display durations
    #[must_use]
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        page: PageHandle,
        session: SessionContext,
        storage: Arc<dyn SessionStorage>,
        timings: Timings,
    ) -> Self {
        let lifecycle = Lifecycle::new();
        let toaster = Toaster::new(page.clone(), lifecycle.clone(), timings.toast, timings.fade);

        Self {
            inner: Arc::new(PageStateInner {
                api,
                page,
                session,
                storage,
                lifecycle,
                toaster,
                timings,
            }),
        }
    }

    #[must_use]
    pub fn api(&self) -> &dyn StorefrontApi {
        self.inner.api.as_ref()
    }

    #[must_use]
    pub fn page(&self) -> &PageHandle {
        &self.inner.page
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    #[must_use]
    pub fn storage(&self) -> &dyn SessionStorage {
        self.inner.storage.as_ref()
    }

    /// Owner of every timer and poller of this page.
    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.inner.lifecycle
    }

    #[must_use]
    pub fn toaster(&self) -> &Toaster {
        &self.inner.toaster
    }

    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.inner.timings
    }
}
