//! Local key-value storage for the pyramid and the contact book.
//!
//! Each key is one JSON document. The file store keeps them as
//! `<data_dir>/<key>.json`; the memory store backs the tests.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::contacts::Contact;
use crate::pyramid::PyramidState;

pub const PYRAMID_KEY: &str = "pyramidData";
pub const CONTACTS_KEY: &str = "pyramidContacts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored record {key} is corrupt: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    /// Raw document under `key`, or `None` if nothing was saved
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
            .join("tennis-pyramid");
        Ok(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io)?;

        // Write then rename so a crash never leaves half a record behind
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io)?;
        std::fs::rename(&tmp, &path).map_err(io)?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Decode the document under `key`. `Ok(None)` means nothing was saved.
pub fn read<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::CorruptState {
            key: key.to_string(),
            source,
        })
}

pub fn write<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Load the saved pyramid, falling back to defaults when the record is
/// missing or unreadable. Filled-in defaults are saved straight back.
pub fn load_pyramid(store: &mut dyn KeyValueStore) -> PyramidState {
    let mut state = match read::<PyramidState>(store, PYRAMID_KEY) {
        Ok(Some(state)) => state,
        Ok(None) => PyramidState {
            row_count: crate::pyramid::DEFAULT_ROWS,
            slots: Vec::new(),
        },
        Err(e) => {
            tracing::warn!("Falling back to default pyramid: {}", e);
            return PyramidState::default();
        }
    };

    if state.normalize() {
        if let Err(e) = save_pyramid(store, &state) {
            tracing::warn!("Could not save pyramid defaults: {}", e);
        }
    }
    state
}

pub fn save_pyramid(store: &mut dyn KeyValueStore, state: &PyramidState) -> Result<(), StoreError> {
    write(store, PYRAMID_KEY, state)?;
    tracing::debug!(rows = state.row_count, "Saved pyramid");
    Ok(())
}

pub fn load_contacts(store: &dyn KeyValueStore) -> Vec<Contact> {
    match read::<Vec<Contact>>(store, CONTACTS_KEY) {
        Ok(Some(contacts)) => contacts,
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("Ignoring saved contacts: {}", e);
            Vec::new()
        }
    }
}

pub fn save_contacts(store: &mut dyn KeyValueStore, contacts: &[Contact]) -> Result<(), StoreError> {
    write(store, CONTACTS_KEY, &contacts)
}
