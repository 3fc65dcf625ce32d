use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{error, info};
use thiserror::Error;

use super::types::UserProfile;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence seam for the single profile record. Whole-record reads and
/// writes only: no partial updates, no migrations.
pub trait ProfileStore: Send + Sync {
    /// Returns the persisted profile, or the default profile when nothing is
    /// stored or the stored record cannot be parsed. Never fails.
    fn load(&self) -> UserProfile;

    /// Writes the whole profile. Best-effort: failures are logged by the
    /// caller and never surfaced to the user.
    fn save(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Removes the persisted record entirely (reset/logout).
    fn clear(&self) -> Result<(), StoreError>;
}

/// Single JSON file at a fixed path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self) -> UserProfile {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return UserProfile::default();
            }
            Err(e) => {
                error!("Failed to read profile from {}: {}", self.path.display(), e);
                return UserProfile::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => profile,
            Err(e) => {
                // Treat a corrupt record as absence rather than an error.
                error!("Failed to parse stored profile, using defaults: {}", e);
                UserProfile::default()
            }
        }
    }

    fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared stored profile at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// In-memory slot, used by tests in place of the file store.
#[derive(Default, Clone)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with a raw string, parseable or not.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.to_string()))),
        }
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self) -> UserProfile {
        let slot = self.slot.lock().expect("store lock poisoned");
        match slot.as_deref() {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                error!("Failed to parse stored profile, using defaults: {}", e);
                UserProfile::default()
            }),
            None => UserProfile::default(),
        }
    }

    fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let raw = serde_json::to_string(profile)?;
        *self.slot.lock().expect("store lock poisoned") = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}
