use crate::data::KeyValueStore;
use sha2::{Digest, Sha256};
use std::fmt;

/// Storage key under which the user's API key is persisted.
pub const API_KEY_STORAGE_KEY: &str = "openai_api_key";

/// Where a resolved API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    Storage,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiKeySource::Environment => write!(f, "environment"),
            ApiKeySource::Storage => write!(f, "local storage"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedApiKey {
    pub value: String,
    pub source: ApiKeySource,
}

// Keeps the key itself out of debug logs.
impl fmt::Debug for ResolvedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResolvedApiKey")
            .field("value", &mask_api_key(&self.value))
            .field("source", &self.source)
            .finish()
    }
}

/// Errors from API key management
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    Empty,
}

impl fmt::Display for ApiKeyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiKeyError::Empty => write!(f, "Please enter an API key"),
        }
    }
}

impl std::error::Error for ApiKeyError {}

/// Resolves the API key to use for a request.
///
/// A non-blank environment value wins; otherwise the stored value is used.
/// Returns `None` when neither source has a key.
pub fn resolve_api_key<S: KeyValueStore>(
    env_key: Option<&str>,
    store: &S,
) -> Option<ResolvedApiKey> {
    if let Some(key) = env_key.map(str::trim).filter(|key| !key.is_empty()) {
        return Some(ResolvedApiKey {
            value: key.to_string(),
            source: ApiKeySource::Environment,
        });
    }

    store
        .get(API_KEY_STORAGE_KEY)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(|value| ResolvedApiKey {
            value,
            source: ApiKeySource::Storage,
        })
}

/// Trims and stores `raw` as the user's API key.
pub fn save_api_key<S: KeyValueStore>(store: &S, raw: &str) -> Result<(), ApiKeyError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(ApiKeyError::Empty);
    }
    store.set(API_KEY_STORAGE_KEY, key);
    log::info!("[api-key] Stored API key {}", key_fingerprint(key));
    Ok(())
}

pub fn clear_api_key<S: KeyValueStore>(store: &S) {
    store.remove(API_KEY_STORAGE_KEY);
}

/// Masks all but the first three and last four characters.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Short SHA-256 fingerprint, for comparing keys without showing them.
pub fn key_fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::MemoryStore;

    #[test]
    fn test_environment_key_wins() {
        let store = MemoryStore::with_value(API_KEY_STORAGE_KEY, "sk-stored");
        let resolved = resolve_api_key(Some("sk-env"), &store).unwrap();
        assert_eq!(resolved.value, "sk-env");
        assert_eq!(resolved.source, ApiKeySource::Environment);
    }

    #[test]
    fn test_blank_environment_falls_back_to_storage() {
        let store = MemoryStore::with_value(API_KEY_STORAGE_KEY, "sk-stored");
        for env in [None, Some(""), Some("   ")] {
            let resolved = resolve_api_key(env, &store).unwrap();
            assert_eq!(resolved.value, "sk-stored");
            assert_eq!(resolved.source, ApiKeySource::Storage);
        }
    }

    #[test]
    fn test_no_key_anywhere() {
        let store = MemoryStore::new();
        assert_eq!(resolve_api_key(None, &store), None);

        store.set(API_KEY_STORAGE_KEY, "");
        assert_eq!(resolve_api_key(Some(""), &store), None);
    }

    #[test]
    fn test_save_trims_and_rejects_blank() {
        let store = MemoryStore::new();
        assert_eq!(save_api_key(&store, "   "), Err(ApiKeyError::Empty));
        assert_eq!(store.get(API_KEY_STORAGE_KEY), None);

        save_api_key(&store, "  sk-new  ").unwrap();
        assert_eq!(store.get(API_KEY_STORAGE_KEY), Some("sk-new".to_string()));

        clear_api_key(&store);
        assert_eq!(store.get(API_KEY_STORAGE_KEY), None);
    }

    #[test]
    fn test_mask_and_fingerprint() {
        assert_eq!(mask_api_key("sk-abcdefghijkl"), "sk-...ijkl");
        assert_eq!(mask_api_key("short"), "*****");

        let fingerprint = key_fingerprint("sk-abcdefghijkl");
        assert_eq!(fingerprint.len(), 12);
        assert_eq!(fingerprint, key_fingerprint("sk-abcdefghijkl"));
        assert_ne!(fingerprint, key_fingerprint("sk-other"));
    }

    #[test]
    fn test_debug_hides_key() {
        let resolved = ResolvedApiKey {
            value: "sk-secretsecret".to_string(),
            source: ApiKeySource::Storage,
        };
        assert!(!format!("{:?}", resolved).contains("secretsecret"));
    }
}
