//! Authentication module for FileVault.
//!
//! This module provides the `AuthContext`, which restores, establishes and
//! tears down the logged-in identity through the gateway.

mod context;

pub use context::AuthContext;
