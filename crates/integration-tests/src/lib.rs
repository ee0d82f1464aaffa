//! Integration tests for the Nutriharvest storefront.
//!
//! The tests run the real `reqwest` client against [`StubBackend`], an axum
//! server on an ephemeral port that records every request and answers from
//! a per-path script.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nutriharvest-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `http_client` - Paths, headers, bodies and failure mapping of `HttpApi`
//! - `storefront_flows` - Controllers driven end to end over HTTP

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::Url;

use nutriharvest_storefront::config::StorefrontConfig;

/// Session cookie value the stub expects.
pub const SESSION_COOKIE: &str = "k3v9q2x7m1n8b4c6";

/// CSRF token the stub expects.
pub const CSRF_TOKEN: &str = "f8d2a1c9e7b3";

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub csrf_token: Option<String>,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<String, (StatusCode, String)>>,
    recorded: Mutex<Vec<Recorded>>,
}

/// Scriptable stand-in for the storefront backend.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Answer `path` with a 200 JSON body.
    pub fn json(&self, path: &str, body: &Value) -> &Self {
        self.raw(path, StatusCode::OK, &body.to_string())
    }

    /// Answer `path` with an arbitrary status and body.
    pub fn raw(&self, path: &str, status: StatusCode, body: &str) -> &Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// Every request received so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<Recorded> {
        self.state.recorded.lock().unwrap().clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn recorded_for(&self, path: &str) -> Vec<Recorded> {
        self.recorded()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Configuration pointing at this stub, as a logged-in shopper.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let base_url = self.base_url().to_string();
        StorefrontConfig::from_lookup(|key| match key {
            "NUTRIHARVEST_BASE_URL" => Some(base_url.clone()),
            "NUTRIHARVEST_SESSION_COOKIE" => Some(SESSION_COOKIE.to_string()),
            "NUTRIHARVEST_CSRF_TOKEN" => Some(CSRF_TOKEN.to_string()),
            "NUTRIHARVEST_AUTHENTICATED" => Some("true".to_string()),
            _ => None,
        })
        .unwrap()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let path = uri.path().to_string();
    state.recorded.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        csrf_token: header_value("x-csrftoken"),
        cookie: header_value(header::COOKIE.as_str()),
        content_type: header_value(header::CONTENT_TYPE.as_str()),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let reply = state.replies.lock().unwrap().get(&path).cloned();
    match reply {
        Some((status, body)) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "<h1>Not Found</h1>").into_response(),
    }
}
