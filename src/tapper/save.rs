//! Pelmeni Tapper save/load.
//!
//! The snapshot is the bare `GameState` JSON object. Loading is the one place
//! untrusted data enters the engine: anything that does not decode into a
//! valid state is treated as "no save" and the game starts fresh. Saving is
//! best-effort; failures are logged and dropped.
//!
//! ## Keys
//!
//! - `TapperConfig::storage_key` (`pelmeni-save-v2`) is read and written.
//! - `TapperConfig::legacy_storage_keys` (`pelmeni-save-v1`) are only read,
//!   when the current key is empty. A hit is re-saved under the current key.

use log::{info, warn};
use thiserror::Error;

use crate::config::TapperConfig;

use super::state::GameState;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("localStorage is not available")]
    Unavailable,
    #[error("storage call failed: {0}")]
    Js(String),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("snapshot has per_tap == 0")]
    Invalid,
}

/// Raw string key-value storage.
pub trait SnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`. Missing or disabled storage behaves as an empty,
/// read-only store.
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage unavailable; progress will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl SnapshotStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.storage.as_ref() {
            Some(s) => s.get_item(key).map_err(|e| StorageError::Js(format!("{e:?}"))),
            None => Ok(None),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Js(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Js(format!("{e:?}")))
    }
}

pub fn encode(state: &GameState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode(raw: &str) -> Result<GameState, SnapshotError> {
    let state: GameState = serde_json::from_str(raw)?;
    if !state.is_valid() {
        return Err(SnapshotError::Invalid);
    }
    Ok(state)
}

/// Read-only copy-out projection of the state. Same shape as the snapshot.
pub fn export_json(state: &GameState) -> String {
    encode(state).unwrap_or_else(|e| {
        warn!("export failed: {e}");
        String::new()
    })
}

/// Persistence adapter bound to one store and one save slot.
pub struct Persistence<S> {
    store: S,
    key: String,
    legacy_keys: Vec<String>,
}

impl<S: SnapshotStore> Persistence<S> {
    pub fn new(store: S, config: &TapperConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            legacy_keys: config.legacy_storage_keys.clone(),
        }
    }

    /// The saved state, or `None` when there is nothing usable.
    pub fn load(&mut self) -> Option<GameState> {
        match self.read_slot(&self.key) {
            Ok(Some(state)) => return Some(state),
            Ok(None) => {}
            Err(e) => {
                warn!("discarding save under {:?}: {e}", self.key);
                if let Err(e) = self.store.remove(&self.key) {
                    warn!("could not remove broken save: {e}");
                }
                return None;
            }
        }

        for legacy in self.legacy_keys.clone() {
            match self.read_slot(&legacy) {
                Ok(Some(state)) => {
                    info!("migrating save from {legacy:?} to {:?}", self.key);
                    self.save(&state);
                    return Some(state);
                }
                Ok(None) => {}
                Err(e) => warn!("ignoring legacy save under {legacy:?}: {e}"),
            }
        }
        None
    }

    /// Write the full state. Never fails from the caller's point of view.
    pub fn save(&mut self, state: &GameState) {
        if let Err(e) = self.try_save(state) {
            warn!("save failed: {e}");
        }
    }

    fn try_save(&mut self, state: &GameState) -> Result<(), SnapshotError> {
        let json = encode(state)?;
        self.store.write(&self.key, &json)?;
        Ok(())
    }

    fn read_slot(&self, key: &str) -> Result<Option<GameState>, SnapshotError> {
        let Some(raw) = self.store.read(key)? else {
            return Ok(None);
        };
        decode(&raw).map(Some)
    }
}

#[cfg(test)]
pub use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::{SnapshotStore, StorageError};

    #[derive(Default)]
    struct Inner {
        entries: HashMap<String, String>,
        writes: usize,
        fail_writes: bool,
    }

    /// In-memory store. Clones share contents, so a test can keep a handle
    /// after moving one into a session.
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        inner: Rc<RefCell<Inner>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::new();
            store
                .inner
                .borrow_mut()
                .entries
                .insert(key.to_string(), value.to_string());
            store
        }

        pub fn get(&self, key: &str) -> Option<String> {
            self.inner.borrow().entries.get(key).cloned()
        }

        pub fn writes(&self) -> usize {
            self.inner.borrow().writes
        }

        /// Simulate quota exhaustion / disabled storage.
        pub fn fail_writes(&self, fail: bool) {
            self.inner.borrow_mut().fail_writes = fail;
        }
    }

    impl SnapshotStore for MemoryStore {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.get(key))
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            let mut inner = self.inner.borrow_mut();
            if inner.fail_writes {
                return Err(StorageError::Js("QuotaExceededError".into()));
            }
            inner.writes += 1;
            inner.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.borrow_mut().entries.remove(key);
            Ok(())
        }
    }
}
