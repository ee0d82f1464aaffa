//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NUTRIHARVEST_BASE_URL` - Origin of the storefront backend (e.g., <https://shop.nutriharvest.in>)
//!
//! ## Optional
//! - `NUTRIHARVEST_SESSION_COOKIE` - Backend `sessionid` cookie value for a logged-in shopper
//! - `NUTRIHARVEST_CSRF_TOKEN` - Anti-forgery token sent as `X-CSRFToken` on POSTs
//! - `NUTRIHARVEST_AUTHENTICATED` - Whether the page is rendered for a logged-in shopper (default: false)
//! - `NUTRIHARVEST_PAGE_PATH` - Path of the page being driven (default: /)
//! - `NUTRIHARVEST_SYSTEM_POLL_SECS` - System notification poll period (default: 300)
//! - `NUTRIHARVEST_USER_POLL_SECS` - User notification poll period (default: 60)
//! - `NUTRIHARVEST_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront interaction layer configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend origin all API paths are joined onto
    pub base_url: Url,
    /// Session cookie identifying the shopper to the backend
    pub session_cookie: Option<SecretString>,
    /// CSRF token copied from the rendered page
    pub csrf_token: Option<String>,
    /// Whether the page was rendered for a logged-in shopper
    pub authenticated: bool,
    /// Path of the page being driven
    pub page_path: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Poll periods and display durations
    pub timings: Timings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Poll periods and display durations.
///
/// Defaults match what shoppers see on the live site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// How often site-wide notifications are fetched.
    pub system_poll: Duration,
    /// How often the bell's notifications are fetched.
    pub user_poll: Duration,
    /// How long a toast stays before fading.
    pub toast: Duration,
    /// Fade-out length before an element is removed.
    pub fade: Duration,
    /// How long a system notification popup stays.
    pub system_popup: Duration,
    /// How long a banner popup stays.
    pub banner_popup: Duration,
    /// Delay between a successful review and the page reload.
    pub review_reload: Duration,
    /// Quiet period before a product search navigates.
    pub search_debounce: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            system_poll: Duration::from_secs(5 * 60),
            user_poll: Duration::from_secs(60),
            toast: Duration::from_secs(5),
            fade: Duration::from_millis(300),
            system_popup: Duration::from_secs(10),
            banner_popup: Duration::from_secs(15),
            review_reload: Duration::from_secs(2),
            search_debounce: Duration::from_millis(300),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session cookie looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let base_url = vars.required("NUTRIHARVEST_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("NUTRIHARVEST_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "NUTRIHARVEST_BASE_URL".to_string(),
                "must be an http(s) origin".to_string(),
            ));
        }

        let session_cookie = vars
            .optional("NUTRIHARVEST_SESSION_COOKIE")
            .map(|value| {
                validate_not_placeholder(&value, "NUTRIHARVEST_SESSION_COOKIE")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        let mut timings = Timings::default();
        timings.system_poll = Duration::from_secs(vars.parsed_or(
            "NUTRIHARVEST_SYSTEM_POLL_SECS",
            timings.system_poll.as_secs(),
        )?);
        timings.user_poll = Duration::from_secs(
            vars.parsed_or("NUTRIHARVEST_USER_POLL_SECS", timings.user_poll.as_secs())?,
        );
        if timings.system_poll.is_zero() || timings.user_poll.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "NUTRIHARVEST_*_POLL_SECS".to_string(),
                "poll periods must be positive".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            session_cookie,
            csrf_token: vars.optional("NUTRIHARVEST_CSRF_TOKEN"),
            authenticated: vars.parsed_or("NUTRIHARVEST_AUTHENTICATED", false)?,
            page_path: vars
                .optional("NUTRIHARVEST_PAGE_PATH")
                .unwrap_or_else(|| "/".to_string()),
            request_timeout: Duration::from_secs(
                vars.parsed_or("NUTRIHARVEST_REQUEST_TIMEOUT_SECS", 15)?,
            ),
            timings,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Typed access to a variable lookup.
struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Reject values copied verbatim from `.env.example`.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Render a session cookie header value.
pub(crate) fn session_cookie_header(cookie: &SecretString) -> String {
    format!("sessionid={}", cookie.expose_secret())
}
