//! Persistence seam for cross-tick memory
//!
//! The engine offers an opaque key-value store; the bot keys its memory
//! blob by version string so that a code update never reads a blob written
//! by an older schema.

use std::fs;
use std::path::PathBuf;

use ahash::AHashMap;

use crate::core::error::Result;

/// Key-value store that survives between ticks
pub trait MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, blob: &str) -> Result<()>;
}

/// Store kept in process memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: AHashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for InMemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, one entry per key
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Entries on disk; a file that does not parse is treated as empty and
    /// is overwritten by the next save
    fn read_entries(&self) -> Result<AHashMap<String, String>> {
        if !self.path.exists() {
            return Ok(AHashMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(AHashMap::new());
        }
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Discarding corrupt store {}: {}", self.path.display(), e);
                Ok(AHashMap::new())
            }
        }
    }
}

impl MemoryStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), blob.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}
