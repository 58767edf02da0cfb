//! Identity lifecycle on top of the gateway.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{ApiError, Gateway};
use crate::model::{AuthStatus, UserSummary};

/// Login state as a UI sees it.
///
/// Wraps a gateway and keeps the session store's cached identity in step
/// with the server: restored on startup, replaced on login, dropped on
/// logout.
#[derive(Debug, Clone)]
pub struct AuthContext {
    gateway: Gateway,
}

impl AuthContext {
    /// Create a context over the given gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Underlying gateway.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Cached identity of the logged-in user.
    pub fn user(&self) -> Option<UserSummary> {
        self.gateway.session().user()
    }

    /// Re-validate a persisted token with the server.
    ///
    /// Without a token this returns `None` and sends nothing. A rejected or
    /// unverifiable session is cleared; errors are logged, not returned.
    pub async fn restore(&self) -> Option<UserSummary> {
        let session = self.gateway.session();
        if !session.is_authenticated() {
            debug!("No stored token, skipping session restore");
            return None;
        }

        let payload = match self.gateway.check_auth_status().await {
            Ok(payload) => payload,
            Err(e) => {
                info!(error = %e, "Session invalid or expired");
                self.discard_session();
                return None;
            }
        };

        match serde_json::from_value::<AuthStatus>(payload) {
            Ok(status) if status.authenticated => {
                let user = status.user?;
                session.set_user(user.clone());
                info!(username = %user.username, role = %user.role, "Session restored");
                Some(user)
            }
            Ok(_) => {
                info!("Server no longer recognizes the session");
                self.discard_session();
                None
            }
            Err(e) => {
                warn!(error = %e, "Unreadable auth status, discarding session");
                self.discard_session();
                None
            }
        }
    }

    /// Log in and cache the returned identity.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSummary, ApiError> {
        let payload = self.gateway.login(username, password).await?;
        let user = user_from_payload(&payload)?;

        self.gateway.session().set_user(user.clone());
        info!(username = %user.username, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Log out. Identity and token are gone afterwards even if the call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.logout().await {
            warn!(error = %e, "Logout call failed; local session cleared anyway");
        }
    }

    fn discard_session(&self) {
        if let Err(e) = self.gateway.session().clear() {
            warn!(error = %e, "Failed to clear session storage");
        }
    }
}

fn user_from_payload(payload: &Value) -> Result<UserSummary, ApiError> {
    let user = payload
        .get("user")
        .ok_or_else(|| ApiError::validation("login response did not include a user"))?;

    UserSummary::deserialize(user)
        .map_err(|e| ApiError::validation(format!("login response has an invalid user: {e}")))
}
