//! System notification popups and the shopper's notification bell.
//!
//! Both are fed by pollers. Responses are applied through a [`StaleGuard`]
//! per source, so a slow response never overwrites a newer one. Failures
//! are logged and never shown to the shopper.

use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, instrument, warn};

use nutriharvest_core::NotificationId;

use crate::api::{SystemNotification, UserNotification, UserNotifications};
use crate::error::Result;
use crate::page::{BellEntry, FadeTarget, NotificationBell, Page, PopupContent, PopupId};
use crate::poller::{Poller, StaleGuard};
use crate::state::PageState;
use crate::toast::schedule_fade_out;

/// Link to the full notification list.
pub const VIEW_ALL_PATH: &str = "/api/notifications/user-notifications/all/";

/// Entries shown in the bell dropdown.
pub const BELL_LIMIT: usize = 5;

/// Characters of a message shown in the bell before it is cut.
pub const EXCERPT_CHARS: usize = 60;

/// Element id of a system notification popup.
#[must_use]
pub fn system_popup_id(id: NotificationId) -> String {
    format!("system-notification-{id}")
}

/// Polls notifications and renders them.
#[derive(Clone)]
pub struct NotificationCenter {
    state: PageState,
    system_guard: StaleGuard,
    bell_guard: StaleGuard,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(state: PageState) -> Self {
        Self {
            state,
            system_guard: StaleGuard::new(),
            bell_guard: StaleGuard::new(),
        }
    }

    /// Start the pollers: system notifications always, the bell only when
    /// the page has one and the shopper is logged in.
    pub fn start(&self) -> Vec<Poller> {
        let timings = self.state.timings();
        let lifecycle = self.state.lifecycle();
        let mut pollers = Vec::with_capacity(2);

        let center = self.clone();
        pollers.push(Poller::spawn(
            "system-notifications",
            timings.system_poll,
            lifecycle,
            move || {
                let center = center.clone();
                async move {
                    let _ = center.refresh_system().await;
                }
            },
        ));

        if self.bell_enabled() {
            let center = self.clone();
            pollers.push(Poller::spawn(
                "user-notifications",
                timings.user_poll,
                lifecycle,
                move || {
                    let center = center.clone();
                    async move {
                        let _ = center.refresh_bell().await;
                    }
                },
            ));
        } else {
            debug!("Notification bell disabled for this page");
        }

        pollers
    }

    fn bell_enabled(&self) -> bool {
        self.state.session().is_authenticated() && self.state.page().read(|p| p.bell.is_some())
    }

    /// Fetch system notifications and show the ones not already on screen.
    ///
    /// Returns the ids of the popups added.
    ///
    /// # Errors
    ///
    /// Returns the API failure (already logged).
    #[instrument(skip(self))]
    pub async fn refresh_system(&self) -> Result<Vec<String>> {
        let ticket = self.system_guard.begin();
        let response = self
            .state
            .api()
            .system_notifications()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch system notifications"))?;

        let added: Vec<(String, PopupId)> = self.state.page().update(|page| {
            if !self.system_guard.try_apply(ticket) {
                debug!(generation = ticket.generation(), "Discarding stale system notifications");
                return Vec::new();
            }
            if page.popups.is_none() {
                debug!("Page has no popup container");
                return Vec::new();
            }
            response
                .notifications
                .iter()
                .filter_map(|n| render_system_popup(page, n))
                .collect()
        });

        let timings = self.state.timings();
        for (_, id) in &added {
            schedule_fade_out(
                self.state.lifecycle(),
                self.state.page(),
                FadeTarget::Popup(*id),
                timings.system_popup,
                timings.fade,
            );
        }
        Ok(added.into_iter().map(|(dom_id, _)| dom_id).collect())
    }

    /// Fetch the shopper's notifications and rebuild the bell.
    ///
    /// Returns whether the bell was updated.
    ///
    /// # Errors
    ///
    /// Returns the API failure (already logged).
    #[instrument(skip(self))]
    pub async fn refresh_bell(&self) -> Result<bool> {
        if !self.bell_enabled() {
            return Ok(false);
        }

        let ticket = self.bell_guard.begin();
        let response = self
            .state
            .api()
            .user_notifications()
            .await
            .inspect_err(|e| debug!(error = %e, "Failed to fetch user notifications"))?;

        Ok(self.state.page().update(|page| {
            if !self.bell_guard.try_apply(ticket) {
                debug!(generation = ticket.generation(), "Discarding stale user notifications");
                return false;
            }
            page.bell.as_mut().is_some_and(|bell| {
                render_bell(bell, &response);
                true
            })
        }))
    }

    /// Close a popup right away.
    pub fn dismiss(&self, dom_id: &str) -> bool {
        self.state
            .page()
            .update(|page| page.remove_popup(dom_id))
    }
}

/// Add a popup for `notification` unless one is already shown.
fn render_system_popup(
    page: &mut Page,
    notification: &SystemNotification,
) -> Option<(String, PopupId)> {
    let dom_id = system_popup_id(notification.id);
    let id = page.push_popup(
        dom_id.clone(),
        PopupContent::System {
            title: notification.title.clone(),
            message: notification.message.clone(),
            style: notification.kind.into(),
            view_all_href: VIEW_ALL_PATH.to_string(),
        },
    )?;
    debug!(notification_id = %notification.id, "Rendered system notification");
    Some((dom_id, id))
}

/// Rebuild the bell from scratch.
fn render_bell(bell: &mut NotificationBell, list: &UserNotifications) {
    bell.count.show_count(list.unread_count());
    bell.entries = list
        .notifications
        .iter()
        .take(BELL_LIMIT)
        .map(bell_entry)
        .collect();
    bell.view_all = list.notifications.len() > BELL_LIMIT;
    bell.empty_visible = list.notifications.is_empty();
}

fn bell_entry(notification: &UserNotification) -> BellEntry {
    BellEntry {
        title: notification.title.clone(),
        unread: !notification.is_read,
        excerpt: excerpt(&notification.message),
        timestamp: format_timestamp(&notification.created_at),
    }
}

/// First [`EXCERPT_CHARS`] characters, with "..." when cut.
fn excerpt(message: &str) -> String {
    if message.chars().count() > EXCERPT_CHARS {
        let mut cut: String = message.chars().take(EXCERPT_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        message.to_string()
    }
}

/// Human-readable timestamp; the raw value when it cannot be parsed.
fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%b %-d, %Y, %-I:%M %p";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(DISPLAY).to_string();
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_or_else(|_| raw.to_string(), |naive| naive.format(DISPLAY).to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};

    use super::*;
    use crate::api::Endpoint;
    use crate::page::PopupStyle;
    use crate::test_support::{FakeApi, Reply, shopper_state, toast_messages, visitor_state};

    fn system_reply() -> Value {
        json!({
            "success": true,
            "notifications": [
                {"id": 1, "title": "Diwali sale", "message": "20% off cashews", "type": "promotion"},
                {"id": 2, "title": "Maintenance", "message": "Checkout down at 2am", "type": "alert"}
            ]
        })
    }

    fn user_reply(count: usize, unread: usize) -> Value {
        let notifications: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": i + 1,
                    "title": format!("Order update {i}"),
                    "message": "Your order of premium Afghan raisins and Californian almonds has shipped",
                    "is_read": i >= unread,
                    "created_at": "2025-01-05T15:04:00Z"
                })
            })
            .collect();
        json!({"success": true, "notifications": notifications})
    }

    fn page() -> Page {
        Page::new("/").with_popup_container().with_bell()
    }

    #[tokio::test]
    async fn test_system_popups_render_once() {
        let api = FakeApi::new();
        api.json(Endpoint::SystemNotifications, system_reply());
        let state = shopper_state(&api, page());
        let center = NotificationCenter::new(state.clone());

        let first = center.refresh_system().await.unwrap();
        let second = center.refresh_system().await.unwrap();

        assert_eq!(first, vec!["system-notification-1", "system-notification-2"]);
        assert!(second.is_empty());

        let popups = state.page().read(|p| p.popups.clone().unwrap());
        assert_eq!(popups.len(), 2);
        match &popups[0].content {
            PopupContent::System {
                style,
                view_all_href,
                ..
            } => {
                assert_eq!(*style, PopupStyle::Success);
                assert_eq!(view_all_href, VIEW_ALL_PATH);
            }
            PopupContent::Banner { .. } => panic!("expected a system popup"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_popup_fades_after_ten_seconds() {
        let api = FakeApi::new();
        api.json(Endpoint::SystemNotifications, system_reply());
        let state = shopper_state(&api, page());
        let center = NotificationCenter::new(state.clone());

        center.refresh_system().await.unwrap();

        tokio::time::sleep(Duration::from_millis(10_001)).await;
        assert!(state.page().read(|p| p.popups.as_ref().unwrap()[0].fading));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(state.page().read(|p| p.popups.as_ref().unwrap().is_empty()));
    }

    #[tokio::test]
    async fn test_dismissed_popup_comes_back_on_next_poll() {
        let api = FakeApi::new();
        api.json(Endpoint::SystemNotifications, system_reply());
        let state = shopper_state(&api, page());
        let center = NotificationCenter::new(state.clone());

        center.refresh_system().await.unwrap();
        assert!(center.dismiss("system-notification-1"));
        let again = center.refresh_system().await.unwrap();

        assert_eq!(again, vec!["system-notification-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reshown_popup_keeps_its_full_window() {
        let api = FakeApi::new();
        api.json(Endpoint::SystemNotifications, system_reply());
        let state = shopper_state(&api, page());
        let center = NotificationCenter::new(state.clone());
        let shown = |state: &PageState| state.page().read(|p| p.has_popup("system-notification-1"));

        center.refresh_system().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(center.dismiss("system-notification-1"));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(center.refresh_system().await.unwrap(), vec!["system-notification-1"]);

        // The first popup's timer fires here and must leave the new one alone.
        tokio::time::sleep(Duration::from_millis(5_400)).await;
        assert!(shown(&state));

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert!(!shown(&state));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_silent() {
        let api = FakeApi::new();
        api.reply(Endpoint::SystemNotifications, Reply::Transport);
        let state = shopper_state(&api, page());

        assert!(NotificationCenter::new(state.clone()).refresh_system().await.is_err());
        assert!(toast_messages(&state).is_empty());
    }

    #[tokio::test]
    async fn test_bell_shows_first_five_and_unread_count() {
        let api = FakeApi::new();
        api.json(Endpoint::UserNotifications, user_reply(7, 3));
        let state = shopper_state(&api, page());

        assert!(NotificationCenter::new(state.clone()).refresh_bell().await.unwrap());

        let bell = state.page().read(|p| p.bell.clone().unwrap());
        assert_eq!(bell.count.text, "3");
        assert!(bell.count.visible);
        assert_eq!(bell.entries.len(), 5);
        assert!(bell.entries[0].unread);
        assert!(!bell.entries[4].unread);
        assert!(bell.view_all);
        assert!(!bell.empty_visible);
        assert!(bell.entries[0].excerpt.ends_with("..."));
        assert_eq!(bell.entries[0].excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert_eq!(bell.entries[0].timestamp, "Jan 5, 2025, 3:04 PM");
    }

    #[tokio::test]
    async fn test_empty_bell() {
        let api = FakeApi::new();
        api.json(Endpoint::UserNotifications, user_reply(0, 0));
        let state = shopper_state(&api, page());

        NotificationCenter::new(state.clone()).refresh_bell().await.unwrap();

        let bell = state.page().read(|p| p.bell.clone().unwrap());
        assert!(!bell.count.visible);
        assert!(bell.entries.is_empty());
        assert!(bell.empty_visible);
        assert!(!bell.view_all);
    }

    #[tokio::test]
    async fn test_bell_skipped_for_visitors() {
        let api = FakeApi::new();
        let state = visitor_state(&api, page());

        assert!(!NotificationCenter::new(state).refresh_bell().await.unwrap());
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_bell_response_is_discarded() {
        let api = FakeApi::new();
        api.reply(
            Endpoint::UserNotifications,
            Reply::Delayed(Duration::from_secs(5), user_reply(2, 2)),
        );
        api.json(Endpoint::UserNotifications, user_reply(1, 0));
        let state = shopper_state(&api, page());
        let center = NotificationCenter::new(state.clone());

        let slow = tokio::spawn({
            let center = center.clone();
            async move { center.refresh_bell().await.unwrap() }
        });
        tokio::task::yield_now().await;

        assert!(center.refresh_bell().await.unwrap());
        assert!(!slow.await.unwrap());

        let bell = state.page().read(|p| p.bell.clone().unwrap());
        assert_eq!(bell.entries.len(), 1);
        assert!(!bell.count.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pollers_follow_their_periods() {
        let api = FakeApi::new();
        api.json(Endpoint::SystemNotifications, json!({"success": true, "notifications": []}));
        api.json(Endpoint::UserNotifications, user_reply(1, 1));
        let state = shopper_state(&api, page());

        let pollers = NotificationCenter::new(state.clone()).start();
        assert_eq!(pollers.len(), 2);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(api.calls_to(Endpoint::SystemNotifications).len(), 1);
        assert_eq!(api.calls_to(Endpoint::UserNotifications).len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.calls_to(Endpoint::SystemNotifications).len(), 1);
        assert_eq!(api.calls_to(Endpoint::UserNotifications).len(), 2);

        state.lifecycle().shutdown().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(api.calls_to(Endpoint::UserNotifications).len(), 2);
    }

    #[test]
    fn test_excerpt_and_timestamp_fallbacks() {
        assert_eq!(excerpt("short"), "short");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_timestamp("2025-03-01T09:30:00"), "Mar 1, 2025, 9:30 AM");
    }
}
