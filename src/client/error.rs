//! Error taxonomy for gateway calls.

use thiserror::Error;

/// Message used for 401 responses that carry none.
pub const AUTHENTICATION_MESSAGE: &str = "Authentication failed. Please log in again.";

/// Message used for 403 responses that carry none.
pub const PERMISSION_MESSAGE: &str =
    "Access forbidden. You do not have permission to perform this action.";

/// Message used for 404 responses that carry none.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";

/// Message used for 5xx responses that carry none.
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";

/// Message used when no response was received.
pub const NETWORK_MESSAGE: &str = "Network error occurred. Please check your connection.";

/// Message used when a file operation gets an empty filename.
pub const FILENAME_REQUIRED_MESSAGE: &str = "Filename is required";

/// Discriminant of an `ApiError`, for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Token missing, expired or rejected (401).
    Authentication,
    /// Authenticated but not authorized (403).
    Permission,
    /// Resource absent (404).
    NotFound,
    /// Backend fault (5xx).
    Server,
    /// Any other non-success status.
    Request,
    /// No response was received.
    Network,
    /// Invalid argument, rejected before any network call.
    Validation,
}

/// Failure of a single gateway call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401. The session store has already been cleared.
    #[error("{message}")]
    Authentication {
        /// Backend message or the default.
        message: String,
    },

    /// HTTP 403.
    #[error("{message}")]
    Permission {
        /// Backend message or the default.
        message: String,
    },

    /// HTTP 404.
    #[error("{message}")]
    NotFound {
        /// Backend message or the default.
        message: String,
    },

    /// HTTP 5xx.
    #[error("{message}")]
    Server {
        /// Response status code.
        status: u16,
        /// Backend message or the default.
        message: String,
    },

    /// Any other failure status.
    #[error("{message}")]
    Request {
        /// Response status code.
        status: u16,
        /// Canonical reason phrase of the status.
        status_text: String,
        /// Backend message or a generic status message.
        message: String,
    },

    /// Transport failure before a usable response arrived.
    #[error("{message}")]
    Network {
        /// Human-readable summary.
        message: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Argument rejected locally.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Wrap a transport error.
    pub fn network(source: reqwest::Error) -> Self {
        let message = if source.is_timeout() {
            format!("{NETWORK_MESSAGE} (request timed out)")
        } else {
            NETWORK_MESSAGE.to_string()
        };
        ApiError::Network { message, source }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Authentication { .. } => ErrorKind::Authentication,
            ApiError::Permission { .. } => ErrorKind::Permission,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Request { .. } => ErrorKind::Request,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// HTTP status, for errors derived from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { .. } => Some(401),
            ApiError::Permission { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Server { status, .. } | ApiError::Request { status, .. } => Some(*status),
            ApiError::Network { .. } | ApiError::Validation(_) => None,
        }
    }

    /// Message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Authentication { message }
            | ApiError::Permission { message }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. }
            | ApiError::Request { message, .. }
            | ApiError::Network { message, .. } => message,
            ApiError::Validation(message) => message,
        }
    }

    /// Whether the caller should send the user back to login.
    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
