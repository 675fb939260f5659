//! JSON-file key-value store: one object mapping keys to values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::kv::{KvError, KvStore};

#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl FileKvStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(&path)?))?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "opened kv file");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename over the real one.
    fn flush(&self) -> Result<(), KvError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        serde_json::to_writer_pretty(std::fs::File::create(&tmp)?, &self.values)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.values.get(key).filter(|v| !v.is_null()).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), KvError> {
        self.values.insert(key.to_owned(), value);
        self.flush()
    }
}
