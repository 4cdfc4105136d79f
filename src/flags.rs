use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::RwLock,
};

pub const DID_SHOW_INTRO: &str = "didShowIntro";

/// Durable boolean flags, injected wherever process-wide state like
/// "has the intro been shown" is needed. Missing keys read as false.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> bool;
    fn set(&self, key: &str, value: bool) -> Result<()>;
}

/// JSON-file-backed flags, one object of booleans persisted on every write.
pub struct FileFlagStore {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
}

impl FileFlagStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read flags from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &Map<String, Value>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write flags to {}", self.path.display()))
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> bool {
        self.data
            .read()
            .unwrap()
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn set(&self, key: &str, value: bool) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.insert(key.to_string(), Value::Bool(value));
        self.persist(&guard)
    }
}

/// In-memory flags for tests.
#[derive(Default)]
pub struct MemoryFlagStore {
    data: RwLock<HashMap<String, bool>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: bool) -> Self {
        let store = Self::default();
        store.data.write().unwrap().insert(key.to_string(), value);
        store
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> bool {
        self.data.read().unwrap().get(key).copied().unwrap_or(false)
    }

    fn set(&self, key: &str, value: bool) -> Result<()> {
        self.data.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn missing_key_reads_false() {
        let store = MemoryFlagStore::new();
        assert!(!store.get(DID_SHOW_INTRO));
    }

    #[test]
    fn file_store_round_trips() -> Result<()> {
        let path = std::env::temp_dir().join(format!("bugsweep-flags-{}.json", Uuid::new_v4()));

        let store = FileFlagStore::new(path.clone())?;
        assert!(!store.get(DID_SHOW_INTRO));
        store.set(DID_SHOW_INTRO, true)?;

        // A fresh store over the same file sees the persisted value.
        let reopened = FileFlagStore::new(path.clone())?;
        assert!(reopened.get(DID_SHOW_INTRO));

        let _ = fs::remove_file(path);
        Ok(())
    }
}
