//! Backend request layer.
//!
//! - `Gateway`: issues every call, attaches credentials, classifies outcomes
//! - `ApiError` / `ErrorKind`: the error taxonomy callers match on
//! - `RequestOptions`: method, body and headers of a single call

pub mod classify;
mod error;
mod gateway;
mod request;

pub use error::{
    ApiError, ErrorKind, AUTHENTICATION_MESSAGE, FILENAME_REQUIRED_MESSAGE, NETWORK_MESSAGE,
    NOT_FOUND_MESSAGE, PERMISSION_MESSAGE, SERVER_MESSAGE,
};
pub use gateway::Gateway;
pub use request::RequestOptions;
