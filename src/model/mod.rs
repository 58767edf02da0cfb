//! Typed views of backend payloads.
//!
//! The gateway returns payloads unchanged; these types are for callers that
//! want to deserialize them with `serde_json::from_value`.

mod activity;
mod file;
mod user;

pub use activity::{ActivityRecord, FileAction};
pub use file::{FileCheck, FileDescriptor, FileLocation};
pub use user::{AuthStatus, Role, UserSummary};
