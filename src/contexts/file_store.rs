use crate::data::KeyValueStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// FileStore is an implementation of the KeyValueStore trait that keeps each
/// value in its own file under a folder.
///
/// The store is organized as: `{folder}/{key}`
#[derive(Debug, Clone)]
pub struct FileStore {
    /// The root folder path for the store (defaults to ".dadjoke")
    folder: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore instance
    ///
    /// # Arguments
    /// * `folder` - Optional root folder path. If None, defaults to ".dadjoke"
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self {
            folder: folder.unwrap_or_else(|| PathBuf::from(".dadjoke")),
        }
    }

    pub fn folder(&self) -> &PathBuf {
        &self.folder
    }

    /// Constructs the file path for a given key
    ///
    /// Keys are fixed identifiers such as `openai_api_key`, which are already
    /// safe for filenames.
    fn get_value_path(&self, key: &str) -> PathBuf {
        self.folder.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.get_value_path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            // File not found or read error - treat as absent
            Err(_) => None,
        }
    }

    /// Creates the folder if it doesn't exist. Errors are logged.
    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.folder) {
            log::error!(
                "[store] Failed to create store directory {:?}: {}",
                self.folder,
                e
            );
            return;
        }

        let path = self.get_value_path(key);
        if let Err(e) = fs::write(&path, value) {
            log::error!("[store] Failed to write {:?}: {}", path, e);
        }
    }

    fn remove(&self, key: &str) {
        let path = self.get_value_path(key);
        if !path.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&path) {
            log::error!("[store] Failed to remove {:?}: {}", path, e);
        }
    }
}

/// In-process store. Values are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.set(key, value);
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}
