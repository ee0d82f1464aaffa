//! Promotional banner popups.
//!
//! A single dismissal hides every banner for the rest of the browser
//! session; the flag is checked before any request is made.

use tracing::{debug, error, info, instrument, warn};

use nutriharvest_core::BannerId;

use crate::api::Banner;
use crate::error::Result;
use crate::page::{FadeTarget, Page, PopupContent, PopupId};
use crate::session::BANNERS_DISMISSED;
use crate::state::PageState;
use crate::toast::schedule_fade_out;

/// Element id of a banner popup.
#[must_use]
pub fn banner_popup_id(id: BannerId) -> String {
    format!("banner-popup-{id}")
}

/// Shows and dismisses banner popups.
#[derive(Clone)]
pub struct BannerController {
    state: PageState,
}

impl BannerController {
    #[must_use]
    pub const fn new(state: PageState) -> Self {
        Self { state }
    }

    /// Whether the shopper dismissed a banner earlier this session.
    #[must_use]
    pub fn dismissed(&self) -> bool {
        self.state.storage().get(BANNERS_DISMISSED).is_some()
    }

    /// Fetch active banners and show the ones not already on screen.
    ///
    /// Returns the ids of the popups added; empty without a request when
    /// banners were dismissed this session.
    ///
    /// # Errors
    ///
    /// Returns the API failure (already logged).
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<Vec<String>> {
        if self.dismissed() {
            debug!("Banners dismissed for this session");
            return Ok(Vec::new());
        }

        let response = self
            .state
            .api()
            .active_banners()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch banners"))?;

        let added: Vec<(String, PopupId)> = self.state.page().update(|page| {
            if page.popups.is_none() {
                error!("Popup container not found, skipping banners");
                return Vec::new();
            }
            response
                .banners
                .iter()
                .filter_map(|banner| render_banner(page, banner))
                .collect()
        });

        let timings = self.state.timings();
        for (_, id) in &added {
            schedule_fade_out(
                self.state.lifecycle(),
                self.state.page(),
                FadeTarget::Popup(*id),
                timings.banner_popup,
                timings.fade,
            );
        }
        Ok(added.into_iter().map(|(dom_id, _)| dom_id).collect())
    }

    /// Close a banner and suppress all banners for the session.
    pub fn dismiss(&self, banner_id: BannerId) -> bool {
        let dom_id = banner_popup_id(banner_id);
        let removed = self
            .state
            .page()
            .update(|page| page.remove_popup(&dom_id));
        self.state.storage().set(BANNERS_DISMISSED, "true");
        info!(banner_id = %banner_id, "Banner dismissed");
        removed
    }

    /// Forget the dismissal so banners show again.
    pub fn reset_dismissal(&self) {
        self.state.storage().remove(BANNERS_DISMISSED);
        debug!("Banner dismissal reset");
    }
}

fn render_banner(page: &mut Page, banner: &Banner) -> Option<(String, PopupId)> {
    let dom_id = banner_popup_id(banner.id);
    let id = page.push_popup(
        dom_id.clone(),
        PopupContent::Banner {
            title: banner.title.clone(),
            subtitle: banner.subtitle().map(str::to_string),
            description: banner.description().map(str::to_string),
            image: banner.image().map(str::to_string),
            call_to_action: banner
                .call_to_action()
                .map(|(text, link)| (text.to_string(), link.to_string())),
        },
    )?;
    Some((dom_id, id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};

    use super::*;
    use crate::api::Endpoint;
    use crate::test_support::{FakeApi, shopper_state, visitor_state};

    fn banners_reply() -> Value {
        json!({
            "success": true,
            "banners": [
                {
                    "id": 3,
                    "title": "Fresh Medjool dates",
                    "subtitle": "Just landed",
                    "description": "",
                    "image": "/media/banners/dates.jpg",
                    "button_text": "Shop now",
                    "button_link": "/shop/?category=dates"
                },
                {"id": 4, "title": "Free shipping over ₹999", "button_text": "Shop now"}
            ]
        })
    }

    #[tokio::test]
    async fn test_banners_render_with_optional_parts() {
        let api = FakeApi::new();
        api.json(Endpoint::ActiveBanners, banners_reply());
        let state = visitor_state(&api, Page::new("/").with_popup_container());

        let added = BannerController::new(state.clone()).init().await.unwrap();
        assert_eq!(added, vec!["banner-popup-3", "banner-popup-4"]);

        let popups = state.page().read(|p| p.popups.clone().unwrap());
        assert_eq!(
            popups[0].content,
            PopupContent::Banner {
                title: "Fresh Medjool dates".to_string(),
                subtitle: Some("Just landed".to_string()),
                description: None,
                image: Some("/media/banners/dates.jpg".to_string()),
                call_to_action: Some(("Shop now".to_string(), "/shop/?category=dates".to_string())),
            }
        );
        assert!(matches!(
            &popups[1].content,
            PopupContent::Banner { call_to_action: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_dismissal_suppresses_fetch_for_session() {
        let api = FakeApi::new();
        api.json(Endpoint::ActiveBanners, banners_reply());
        let state = shopper_state(&api, Page::new("/").with_popup_container());
        let banners = BannerController::new(state.clone());

        banners.init().await.unwrap();
        assert!(banners.dismiss(BannerId::new(3)));
        assert!(state.page().read(|p| !p.has_popup("banner-popup-3")));

        assert!(banners.init().await.unwrap().is_empty());
        assert_eq!(api.calls_to(Endpoint::ActiveBanners).len(), 1);

        banners.reset_dismissal();
        banners.init().await.unwrap();
        assert_eq!(api.calls_to(Endpoint::ActiveBanners).len(), 2);
    }

    #[tokio::test]
    async fn test_missing_container_skips_render() {
        let api = FakeApi::new();
        api.json(Endpoint::ActiveBanners, banners_reply());
        let state = visitor_state(&api, Page::new("/"));

        assert!(BannerController::new(state).init().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banners_fade_after_fifteen_seconds() {
        let api = FakeApi::new();
        api.json(Endpoint::ActiveBanners, banners_reply());
        let state = visitor_state(&api, Page::new("/").with_popup_container());

        BannerController::new(state.clone()).init().await.unwrap();

        tokio::time::sleep(Duration::from_millis(14_999)).await;
        assert_eq!(state.page().read(|p| p.popups.as_ref().unwrap().len()), 2);

        tokio::time::sleep(Duration::from_millis(302)).await;
        assert!(state.page().read(|p| p.popups.as_ref().unwrap().is_empty()));
    }
}
