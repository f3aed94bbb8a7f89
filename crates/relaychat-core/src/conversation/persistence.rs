use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::Conversation;
use crate::error::ChatError;

/// The document stored under the state key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub current_conversation_id: Option<String>,
}

/// A durable string-keyed store. Implementations are accessed synchronously.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ChatError>;
    fn remove(&self, key: &str) -> Result<(), ChatError>;
}

/// Stores each key as `<key>.json` inside a directory.
pub struct FileKvStore {
    base_dir: PathBuf,
}

impl FileKvStore {
    /// Open the store in a custom directory, creating it if needed
    pub fn with_dir(base_dir: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|e| {
            ChatError::persistence(format!("Failed to create data directory: {}", e))
        })?;

        Ok(Self { base_dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path).map(Some).map_err(|e| {
            ChatError::persistence(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value).map_err(|e| {
            ChatError::persistence(format!("Failed to write temporary state file: {}", e))
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            ChatError::persistence(format!("Failed to rename state file: {}", e))
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                ChatError::persistence(format!("Failed to delete state file: {}", e))
            })?;
        }
        Ok(())
    }
}

/// Volatile store backing `--ephemeral` runs and tests.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        self.entries().remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        (**self).remove(key)
    }
}
