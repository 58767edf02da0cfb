//! The session store: current token and derived identity.

use std::fmt;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::model::UserSummary;
use crate::session::storage::{FileStorage, MemoryStorage, TokenStorage};
use crate::Result;

/// A named location a token may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlot {
    /// Canonical persisted slot; the only one written by login.
    Primary,
    /// Legacy persisted alias `authToken`.
    LegacyAuthToken,
    /// Legacy persisted alias `access_token`.
    LegacyAccessToken,
    /// Process-scoped slot, never persisted.
    SessionScoped,
}

impl TokenSlot {
    /// Slots in the order `SessionStore::token` consults them.
    pub const LOOKUP_ORDER: [TokenSlot; 4] = [
        TokenSlot::Primary,
        TokenSlot::LegacyAuthToken,
        TokenSlot::LegacyAccessToken,
        TokenSlot::SessionScoped,
    ];

    /// Storage key of the slot.
    pub fn key(&self) -> &'static str {
        match self {
            TokenSlot::Primary | TokenSlot::SessionScoped => "token",
            TokenSlot::LegacyAuthToken => "authToken",
            TokenSlot::LegacyAccessToken => "access_token",
        }
    }

    /// Whether the slot lives in persistent storage.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, TokenSlot::SessionScoped)
    }
}

/// Single source of truth for "are we authenticated, and as whom".
///
/// The gateway and auth context share one store through an `Arc`; nothing
/// else writes it.
pub struct SessionStore {
    persistent: Box<dyn TokenStorage>,
    ephemeral: MemoryStorage,
    user: RwLock<Option<UserSummary>>,
}

impl SessionStore {
    /// Create a store over the given persistent backend.
    pub fn new(persistent: impl TokenStorage + 'static) -> Self {
        Self {
            persistent: Box::new(persistent),
            ephemeral: MemoryStorage::new(),
            user: RwLock::new(None),
        }
    }

    /// Create a store that keeps everything in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Create a store persisted to a JSON session file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(FileStorage::open(path)?))
    }

    fn backend(&self, slot: TokenSlot) -> &dyn TokenStorage {
        if slot.is_persistent() {
            self.persistent.as_ref()
        } else {
            &self.ephemeral
        }
    }

    /// Read a single slot.
    pub fn slot(&self, slot: TokenSlot) -> Option<String> {
        self.backend(slot)
            .get(slot.key())
            .filter(|token| !token.is_empty())
    }

    /// Current token, taken from the first occupied slot.
    pub fn token(&self) -> Option<String> {
        TokenSlot::LOOKUP_ORDER
            .iter()
            .find_map(|slot| self.slot(*slot))
    }

    /// Persist a token to the primary slot.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.persistent.set(TokenSlot::Primary.key(), token)?;
        debug!("Stored session token");
        Ok(())
    }

    /// Write the process-scoped slot.
    pub fn set_session_token(&self, token: &str) -> Result<()> {
        self.ephemeral.set(TokenSlot::SessionScoped.key(), token)
    }

    /// Check for a token without touching the network.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Identity of the logged-in user, if known.
    pub fn user(&self) -> Option<UserSummary> {
        self.user.read().unwrap().clone()
    }

    /// Replace the cached identity.
    pub fn set_user(&self, user: UserSummary) {
        *self.user.write().unwrap() = Some(user);
    }

    /// Remove the token from every slot and drop the identity.
    ///
    /// Every slot is attempted even if one fails; the first failure is
    /// returned. Calling this on an empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        *self.user.write().unwrap() = None;

        let mut first_error = None;
        for slot in TokenSlot::LOOKUP_ORDER {
            if let Err(e) = self.backend(slot).remove(slot.key()) {
                warn!(slot = slot.key(), error = %e, "Failed to clear token slot");
                first_error.get_or_insert(e);
            }
        }

        debug!("Session cleared");
        first_error.map_or(Ok(()), Err)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user().map(|u| u.username))
            .finish()
    }
}
