//! Activity log records.

use serde::{Deserialize, Serialize};

use crate::model::Role;

/// Kind of file access recorded by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    /// File was checked or opened.
    View,
    /// File was fetched from the remote store.
    Download,
}

/// One entry of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Record ID.
    pub id: i64,
    /// Username of the actor.
    #[serde(rename = "user_name", alias = "user")]
    pub user: String,
    /// Role of the actor at the time of the request.
    #[serde(default)]
    pub user_role: Option<Role>,
    /// File the action targeted.
    pub filename: String,
    /// Action performed.
    pub action: FileAction,
    /// Backend timestamp, passed through as sent.
    pub timestamp: String,
    /// Client address, when recorded.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Whether the action succeeded.
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}
