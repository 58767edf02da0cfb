//! FileVault - client request and session layer
//!
//! Talks to the FileVault backend on behalf of a UI: keeps the bearer token
//! and the logged-in identity, attaches credentials to every call and turns
//! HTTP outcomes into typed errors.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;

pub use auth::AuthContext;
pub use client::{ApiError, ErrorKind, Gateway, RequestOptions};
pub use config::Config;
pub use error::{FileVaultError, Result};
pub use model::{
    ActivityRecord, AuthStatus, FileAction, FileCheck, FileDescriptor, FileLocation, Role,
    UserSummary,
};
pub use session::{FileStorage, MemoryStorage, SessionStore, TokenSlot, TokenStorage};
