//! Test helpers for gateway integration tests.
//!
//! Provides StubBackend, a scripted HTTP server that records every request
//! it receives, plus helpers to build gateways pointed at it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;

use filevault::config::ApiConfig;
use filevault::{AuthContext, Gateway, SessionStore};

/// Path prefix the stub serves under, mirroring a real deployment.
pub const API_PREFIX: &str = "/api";

/// A scripted response for one route.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    pub set_cookie: Option<String>,
}

impl StubResponse {
    /// JSON response with the given status.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type: Some("application/json"),
            body: body.to_string().into_bytes(),
            set_cookie: None,
        }
    }

    /// Plain-text response with the given status.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type: Some("text/plain"),
            body: body.as_bytes().to_vec(),
            set_cookie: None,
        }
    }

    /// Response with no body at all.
    pub fn empty(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type: None,
            body: Vec::new(),
            set_cookie: None,
        }
    }

    /// Binary response, as served for downloads.
    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some("application/octet-stream"),
            body: body.to_vec(),
            set_cookie: None,
        }
    }

    /// Attach a Set-Cookie header.
    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.set_cookie = Some(cookie.to_string());
        self
    }
}

/// A request as the stub received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path relative to the API prefix, still percent-encoded.
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub cookie: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Request body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<(Method, String), StubResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Scripted backend bound to an ephemeral local port.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubBackend {
    /// Start a backend with no routes; unscripted paths answer 404.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    /// Script the response for a method and path.
    pub fn route(&self, method: Method, path: &str, response: StubResponse) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
        self
    }

    /// Base address clients should be configured with.
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Most recent request.
    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request was received")
    }

    /// Gateway over a fresh in-memory session.
    pub fn gateway(&self) -> Gateway {
        self.gateway_with(Arc::new(SessionStore::in_memory()))
    }

    /// Gateway over the given session store.
    pub fn gateway_with(&self, session: Arc<SessionStore>) -> Gateway {
        let config = ApiConfig {
            base_url: self.base_url(),
            ..ApiConfig::default()
        };
        Gateway::new(&config, session).expect("Failed to create gateway")
    }

    /// Auth context over a fresh in-memory session.
    pub fn auth_context(&self) -> AuthContext {
        AuthContext::new(self.gateway())
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let full_path = uri.path();
    let path = full_path
        .strip_prefix(API_PREFIX)
        .unwrap_or(full_path)
        .to_string();

    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        cookie: header_str(header::COOKIE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let scripted = state.routes.lock().unwrap().get(&(method, path)).cloned();
    let Some(stub) = scripted else {
        return (StatusCode::NOT_FOUND, "no such route").into_response();
    };

    let mut response = (stub.status, stub.body).into_response();
    let response_headers = response.headers_mut();
    response_headers.remove(header::CONTENT_TYPE);
    if let Some(content_type) = stub.content_type {
        response_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(content_type),
        );
    }
    if let Some(cookie) = stub.set_cookie {
        if let Ok(value) = header::HeaderValue::from_str(&cookie) {
            response_headers.insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Login payload as the backend returns it.
pub fn login_payload(token: &str, username: &str, role: &str) -> Value {
    serde_json::json!({
        "token": token,
        "user": {
            "id": "1",
            "name": "Test User",
            "username": username,
            "role": role,
            "email": format!("{username}@filevault.com"),
        }
    })
}
