//! The request gateway.
//!
//! All backend calls go through `Gateway`. It attaches the bearer token from
//! the session store, keeps a cookie jar, classifies responses and clears the
//! session on every 401.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::client::classify::{self, DOWNLOAD_FAILED_PREFIX};
use crate::client::error::{ApiError, ErrorKind, FILENAME_REQUIRED_MESSAGE};
use crate::client::request::RequestOptions;
use crate::config::ApiConfig;
use crate::session::SessionStore;
use crate::{FileVaultError, Result};

/// Backend client bound to one base address and one session store.
///
/// Cloning is cheap; clones share the HTTP client, cookie jar and session.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: Arc<str>,
    session: Arc<SessionStore>,
}

impl Gateway {
    /// Create a gateway for the configured base address.
    ///
    /// The base address is fixed for the lifetime of the gateway.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FileVaultError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            session,
        })
    }

    /// Base address every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session store this gateway reads and clears.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer_header(&self) -> std::result::Result<Option<HeaderValue>, ApiError> {
        let Some(token) = self.session.token() else {
            return Ok(None);
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::validation("stored token is not a valid header value"))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    fn invalidate_session(&self, path: &str) {
        warn!(path = %path, "Authentication rejected, clearing session");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session storage");
        }
    }

    /// Issue a JSON request and classify its outcome.
    ///
    /// Returns the parsed payload unchanged on success.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> std::result::Result<Value, ApiError> {
        let result = self.send_json(path, options).await;
        if let Err(e) = &result {
            error!(path = %path, kind = ?e.kind(), error = %e, "API request failed");
        }
        result
    }

    async fn send_json(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> std::result::Result<Value, ApiError> {
        let RequestOptions {
            method,
            body,
            headers: mut caller_headers,
        } = options;

        // Only the session store decides the credential.
        caller_headers.remove(AUTHORIZATION);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(caller_headers);
        if let Some(bearer) = self.bearer_header()? {
            headers.insert(AUTHORIZATION, bearer);
        }

        debug!(method = %method, path = %path, "Sending request");

        let mut builder = self.client.request(method, self.url(path)).headers(headers);
        if let Some(body) = &body {
            // Keeps the Content-Type already set above.
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::network)?;
        let status = response.status();
        debug!(path = %path, status = status.as_u16(), "Received response");

        if status.is_success() {
            let body = response.bytes().await.map_err(ApiError::network)?;
            return classify::interpret(status, &body);
        }

        if status.as_u16() == 401 {
            self.invalidate_session(path);
        }

        // A body that cannot be read only costs the backend message.
        let body = response.bytes().await.ok();
        Err(classify::failure(
            status,
            body.as_deref(),
            classify::REQUEST_FAILED_PREFIX,
        ))
    }

    /// POST credentials; stores the returned token before handing back the payload.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<Value, ApiError> {
        let options = RequestOptions::post().json(json!({
            "username": username,
            "password": password,
        }));

        let payload = self
            .request("/login/", options)
            .await
            .inspect_err(|e| error!(username = %username, error = %e, "Login failed"))?;

        if let Some(token) = classify::extract_token(&payload) {
            // The store keeps the token in memory even if persisting it fails.
            if let Err(e) = self.session.set_token(token) {
                warn!(error = %e, "Failed to persist session token");
            }
        }

        Ok(payload)
    }

    /// POST logout. The session is cleared whatever the outcome.
    pub async fn logout(&self) -> std::result::Result<Value, ApiError> {
        let result = self.request("/logout/", RequestOptions::post()).await;

        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session storage");
        }
        if let Err(e) = &result {
            error!(error = %e, "Logout error");
        }

        result
    }

    /// GET the current identity.
    pub async fn current_user(&self) -> std::result::Result<Value, ApiError> {
        self.request("/user/", RequestOptions::get()).await
    }

    /// GET the server's view of the session.
    pub async fn check_auth_status(&self) -> std::result::Result<Value, ApiError> {
        match self.request("/check-auth/", RequestOptions::get()).await {
            Err(e) if e.kind() == ErrorKind::Authentication => {
                if let Err(clear_err) = self.session.clear() {
                    warn!(error = %clear_err, "Failed to clear session storage");
                }
                Err(e)
            }
            other => other,
        }
    }

    /// GET the file listing.
    pub async fn list_files(&self) -> std::result::Result<Value, ApiError> {
        self.request("/files/", RequestOptions::get())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch files"))
    }

    /// GET whether a file exists locally on the backend.
    pub async fn check_file_exists(&self, filename: &str) -> std::result::Result<Value, ApiError> {
        let path = file_path("check", filename)?;
        self.request(&path, RequestOptions::get())
            .await
            .inspect_err(|e| error!(filename = %filename, error = %e, "Failed to check file"))
    }

    /// GET the backend to open a local file.
    pub async fn open_file(&self, filename: &str) -> std::result::Result<Value, ApiError> {
        let path = file_path("open", filename)?;
        self.request(&path, RequestOptions::get())
            .await
            .inspect_err(|e| error!(filename = %filename, error = %e, "Failed to open file"))
    }

    /// GET the activity log.
    pub async fn get_activity_logs(&self) -> std::result::Result<Value, ApiError> {
        self.request("/activity-logs/", RequestOptions::get())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch activity logs"))
    }

    /// GET a file's content.
    ///
    /// Returns the raw response so the caller can stream or buffer the bytes.
    pub async fn download_file(&self, filename: &str) -> std::result::Result<Response, ApiError> {
        let path = file_path("download", filename)?;
        self.fetch_raw(&path)
            .await
            .inspect_err(|e| error!(filename = %filename, error = %e, "Failed to download file"))
    }

    async fn fetch_raw(&self, path: &str) -> std::result::Result<Response, ApiError> {
        let mut builder = self.client.get(self.url(path));
        if let Some(bearer) = self.bearer_header()? {
            builder = builder.header(AUTHORIZATION, bearer);
        }

        debug!(path = %path, "Sending download request");

        let response = builder.send().await.map_err(ApiError::network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            self.invalidate_session(path);
        }

        let body = response.bytes().await.ok();
        Err(classify::failure(
            status,
            body.as_deref(),
            DOWNLOAD_FAILED_PREFIX,
        ))
    }
}

/// Build `/files/{action}/{filename}/`, rejecting blank filenames.
fn file_path(action: &str, filename: &str) -> std::result::Result<String, ApiError> {
    if filename.trim().is_empty() {
        return Err(ApiError::validation(FILENAME_REQUIRED_MESSAGE));
    }
    Ok(format!(
        "/files/{action}/{}/",
        urlencoding::encode(filename)
    ))
}
