use std::fs;
use std::path::PathBuf;

use super::Store;
use crate::error::StorageError;

/// File-backed store: one file per key under a base directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never observes a half-written value.
#[derive(Clone, Debug)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store with the default base directory ("./x402_data")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./x402_data"),
        }
    }

    /// Create a store with a custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_key(key)))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            log::warn!("Failed to replace {:?}: {}", path, e);
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        log::debug!("Persisted {} ({} bytes)", key, value.len());
        Ok(())
    }
}

/// Map arbitrary keys onto portable file names.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => out.push(byte as char),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
