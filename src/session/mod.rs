//! Client-held session state.
//!
//! This module provides:
//! - The `SessionStore` holding the token and cached user identity
//! - Slot storage backends (`MemoryStorage`, `FileStorage`)

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, TokenStorage};
pub use store::{SessionStore, TokenSlot};
