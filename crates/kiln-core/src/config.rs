//! Persisted project configuration (`.kilnrc`).
//!
//! A single JSON object keyed by composite command key. The core only
//! consumes the capability contract: `get(key)` returns the object
//! stored under a command's key (empty when absent) and `set(key, obj)`
//! replaces it and persists the file.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration store errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading or writing the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not a JSON object.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config file parsed but is not an object.
    #[error("config file {0} must contain a JSON object")]
    NotAnObject(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// On-disk configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Loads the store from `path`. A missing file reads as an empty
    /// object.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&raw)? {
                Value::Object(map) => map,
                _ => return Err(ConfigError::NotAnObject(path.display().to_string())),
            }
        } else {
            Map::new()
        };
        Ok(Self { path, values })
    }

    /// Creates an empty in-memory store persisted at `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), values: Map::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the object stored under `key`, empty when absent.
    pub fn get(&self, key: &str) -> Map<String, Value> {
        match self.values.get(key) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Replaces the object under `key` and persists the file.
    pub fn set(&mut self, key: &str, object: Map<String, Value>) -> Result<()> {
        self.values.insert(key.to_string(), Value::Object(object));
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&Value::Object(self.values.clone()))?;
        fs::write(&self.path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::load(temp_dir.path().join(".kilnrc")).unwrap();
        assert!(store.get("build-webpack").is_empty());
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".kilnrc");
        let mut store = ConfigStore::load(&path).unwrap();

        let mut object = Map::new();
        object.insert("mode".to_string(), json!("production"));
        store.set("build-webpack", object).unwrap();

        let reloaded = ConfigStore::load(&path).unwrap();
        assert_eq!(reloaded.get("build-webpack").get("mode"), Some(&json!("production")));
    }

    #[test]
    fn test_set_is_scoped_per_key() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ConfigStore::load(temp_dir.path().join(".kilnrc")).unwrap();

        let mut object = Map::new();
        object.insert("mode".to_string(), json!("dev"));
        store.set("build-webpack", object).unwrap();

        assert!(store.get("build-rollup").is_empty());
    }

    #[test]
    fn test_load_rejects_non_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".kilnrc");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(ConfigStore::load(&path), Err(ConfigError::NotAnObject(_))));
    }
}
