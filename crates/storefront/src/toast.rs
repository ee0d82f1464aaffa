//! Transient alerts.

use std::time::Duration;

use tracing::debug;

use crate::lifecycle::Lifecycle;
use crate::page::{FadeTarget, PageHandle, ToastId, ToastKind};

/// Shows toasts and schedules their expiry.
#[derive(Debug, Clone)]
pub struct Toaster {
    page: PageHandle,
    lifecycle: Lifecycle,
    duration: Duration,
    fade: Duration,
}

impl Toaster {
    /// `duration` is how long a toast stays before fading; `fade` is how
    /// long the fade runs before the toast is removed.
    #[must_use]
    pub const fn new(page: PageHandle, lifecycle: Lifecycle, duration: Duration, fade: Duration) -> Self {
        Self {
            page,
            lifecycle,
            duration,
            fade,
        }
    }

    /// Show a toast for `duration`.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> ToastId {
        let message = message.into();
        debug!(kind = kind.style(), message = %message, "Showing toast");
        let id = self.page.update(|page| page.push_toast(message, kind, false));
        schedule_fade_out(
            &self.lifecycle,
            &self.page,
            FadeTarget::Toast(id),
            duration,
            self.fade,
        );
        id
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Success, self.duration)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Error, self.duration)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Warning, self.duration)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Info, self.duration)
    }

    /// Close a toast right away.
    pub fn dismiss(&self, id: ToastId) -> bool {
        self.page.update(|page| page.remove(&FadeTarget::Toast(id)))
    }

    /// Expire the flash messages the server rendered with the page.
    pub fn adopt_server_alerts(&self) -> usize {
        let ids: Vec<ToastId> = self.page.read(|page| {
            page.toasts
                .iter()
                .filter(|t| t.server_rendered)
                .map(|t| t.id)
                .collect()
        });

        for id in &ids {
            schedule_fade_out(
                &self.lifecycle,
                &self.page,
                FadeTarget::Toast(*id),
                self.duration,
                self.fade,
            );
        }
        ids.len()
    }
}

/// Fade `target` after `delay`, then remove it `fade` later.
///
/// Either step is a no-op if the target was already removed.
pub(crate) fn schedule_fade_out(
    lifecycle: &Lifecycle,
    page: &PageHandle,
    target: FadeTarget,
    delay: Duration,
    fade: Duration,
) {
    let page = page.clone();
    lifecycle.spawn(async move {
        tokio::time::sleep(delay).await;
        if !page.update(|p| p.start_fade(&target)) {
            return;
        }
        tokio::time::sleep(fade).await;
        page.update(|p| p.remove(&target));
    });
}
