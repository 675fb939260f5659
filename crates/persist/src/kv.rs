use std::collections::BTreeMap;

use serde_json::Value;

/// Errors from key-value backends.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Minimal key-value API: JSON values under string keys.
pub trait KvStore {
    /// Read a key. `Ok(None)` when the key is absent or holds `null`.
    fn get(&self, key: &str) -> Result<Option<Value>, KvError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), KvError>;
}

/// Process-local store, used by tests and the offline CLI.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    values: BTreeMap<String, Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.values.get(key).filter(|v| !v.is_null()).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), KvError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}
