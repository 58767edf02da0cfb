//! Key-value backends for token slots.
//!
//! Two backends are provided:
//! - `MemoryStorage`: process-local, lost on exit
//! - `FileStorage`: a JSON object on disk, loaded at open and written
//!   through on every change

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::Result;

/// Storage for named token slots.
///
/// Implementations must be safe to share between concurrent gateway calls.
pub trait TokenStorage: Send + Sync {
    /// Read the value held in a slot.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a slot, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory slot storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap().len()
    }

    /// Check if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.write().unwrap().remove(key);
        Ok(())
    }
}

/// Open the session file for rewriting. On unix it is readable by its
/// owner only, including files created before with looser permissions.
fn open_session_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    Ok(file)
}

/// JSON-file slot storage.
///
/// The in-memory view is updated before the file is rewritten, so a failed
/// write never leaves a removed slot readable.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    slots: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage at `path`, loading existing slots.
    ///
    /// A missing file is treated as empty storage; it is created on the
    /// first write along with its parent directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let slots = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), slots = slots.len(), "Opened session file");

        Ok(Self {
            path,
            slots: RwLock::new(slots),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(slots)?;
        let mut file = open_session_file(&self.path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap();
        slots.insert(key.to_string(), value.to_string());
        self.persist(&slots)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap();
        if slots.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&slots)
    }
}
