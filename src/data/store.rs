/// Key-value storage for small string settings such as the API key.
///
/// Implementations should handle errors gracefully without panicking.
pub trait KeyValueStore {
    /// Retrieves the stored value for the given key.
    ///
    /// # Returns
    /// * `Some(String)` - The stored value if found
    /// * `None` - If the key doesn't exist or retrieval fails
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value under the given key, replacing any previous value.
    ///
    /// # Notes
    /// Errors during storage are logged, not returned. This keeps the
    /// fire-and-forget semantics of browser local storage.
    fn set(&self, key: &str, value: &str);

    /// Removes the value stored under the given key, if any.
    fn remove(&self, key: &str);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}
