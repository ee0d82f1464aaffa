//! Nutriharvest storefront runner.
//!
//! Drives one storefront page headlessly against a live backend: polls
//! notifications, shows banners and keeps the wishlist badge current until
//! interrupted.
//!
//! # Architecture
//!
//! - `reqwest` client for the backend JSON endpoints
//! - Tokio tasks for pollers and timers, all cancelled on shutdown
//! - Tracing with an `EnvFilter`, forwarded to Sentry when configured

#![cfg_attr(not(test), forbid(unsafe_code))]

use nutriharvest_storefront::config::StorefrontConfig;
use nutriharvest_storefront::page::Page;
use nutriharvest_storefront::{Storefront, StorefrontError};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// The regions every storefront page is rendered with.
fn page_shell(config: &StorefrontConfig) -> Page {
    let page = Page::new(config.page_path.clone())
        .with_alert_container()
        .with_popup_container()
        .with_cart_badges(1)
        .with_wishlist_badges(1)
        .with_nav_links(["/", "/shop/", "/about/", "/contact/"]);

    if config.authenticated {
        page.with_bell()
    } else {
        page
    }
}

#[tokio::main]
async fn main() -> Result<(), StorefrontError> {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nutriharvest_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let storefront = Storefront::connect(&config, page_shell(&config))?;
    tracing::info!(
        base_url = %config.base_url,
        path = %config.page_path,
        authenticated = config.authenticated,
        "Driving storefront page"
    );

    storefront.start().await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
    tracing::info!("Shutdown signal received, stopping pollers");

    storefront.shutdown().await;

    let page = storefront.page().snapshot();
    tracing::info!(
        toasts = page.toasts.len(),
        popups = page.popups.as_ref().map_or(0, Vec::len),
        "Final page state"
    );
    Ok(())
}
