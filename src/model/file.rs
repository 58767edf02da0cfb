//! File metadata as served by the listing and check endpoints.

use serde::{Deserialize, Serialize};

/// Where the backend currently holds a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileLocation {
    /// Present on the backend's local disk.
    Local,
    /// Only available from the remote store; must be downloaded first.
    Remote,
}

/// A listed file.
///
/// Size and modification time are display strings produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// File ID.
    pub id: String,
    /// Filename.
    pub name: String,
    /// Human-readable size, e.g. "2.4 KB".
    pub size: String,
    /// Human-readable modification time.
    pub last_modified: String,
    /// Storage location.
    #[serde(rename = "type")]
    pub location: FileLocation,
}

impl FileDescriptor {
    /// Whether the file can be opened without a download.
    pub fn is_local(&self) -> bool {
        self.location == FileLocation::Local
    }
}

/// Result of a local-existence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCheck {
    /// Whether the backend handled the check.
    #[serde(default)]
    pub success: bool,
    /// Whether the file exists locally.
    pub exists: bool,
    /// Backend-supplied explanation.
    #[serde(default)]
    pub message: Option<String>,
    /// Whether a remote download is possible.
    #[serde(default, alias = "download_available")]
    pub download_available: Option<bool>,
}

impl FileCheck {
    /// Whether the caller should fetch the file from the remote store.
    pub fn needs_download(&self) -> bool {
        !self.exists && self.download_available.unwrap_or(true)
    }
}
