use crate::contexts::{JokeClientConfig, SEEN_JOKES_CAPACITY, SamplingParams, mask_api_key};
use crate::registries::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default location of the joke backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Environment variables that can supply the API key, in priority order
const API_KEY_VARS: &[&str] = &["DADJOKE_API_KEY", "OPENAI_API_KEY"];

/// Errors that can occur while loading settings
#[derive(Debug)]
pub enum SettingsError {
    NotFound(PathBuf),
    Read(PathBuf, String),
    Parse(String),
    InvalidValue { name: String, value: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingsError::NotFound(path) => {
                write!(f, "Settings file {} not found", path.display())
            }
            SettingsError::Read(path, details) => {
                write!(f, "Failed to read settings {}: {}", path.display(), details)
            }
            SettingsError::Parse(details) => write!(f, "Invalid settings YAML: {}", details),
            SettingsError::InvalidValue { name, value } => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

/// Application settings
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub model: String,
    pub backend_url: String,
    pub store_dir: PathBuf,
    pub max_attempts: u32,
    pub sampling: SamplingParams,
    /// Only ever read from the environment, never from the settings file.
    #[serde(skip)]
    pub env_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            store_dir: PathBuf::from(".dadjoke"),
            max_attempts: 5,
            sampling: SamplingParams::default(),
            env_api_key: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("backend_url", &self.backend_url)
            .field("store_dir", &self.store_dir)
            .field("max_attempts", &self.max_attempts)
            .field("sampling", &self.sampling)
            .field(
                "env_api_key",
                &self.env_api_key.as_deref().map(mask_api_key),
            )
            .finish()
    }
}

impl Settings {
    pub fn client_config(&self) -> JokeClientConfig {
        JokeClientConfig {
            env_api_key: self.env_api_key.clone(),
            model: self.model.clone(),
            sampling: self.sampling,
            max_attempts: self.max_attempts,
            seen_capacity: SEEN_JOKES_CAPACITY,
        }
    }
}

/// File-based settings registry
/// Loads settings from a YAML file, then applies environment overrides
#[derive(Clone)]
pub struct FileSettingsRegistry {
    settings_path: PathBuf,
    /// Whether the path was given explicitly, in which case it must exist
    required: bool,
}

impl FileSettingsRegistry {
    /// Creates a new FileSettingsRegistry
    ///
    /// # Arguments
    /// * `settings_path` - Optional path to the settings file (defaults to "dadjoke.yml")
    pub fn new(settings_path: Option<PathBuf>) -> Self {
        Self {
            required: settings_path.is_some(),
            settings_path: settings_path.unwrap_or_else(|| PathBuf::from("dadjoke.yml")),
        }
    }

    /// Loads settings from the file and the process environment
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let mut settings = self.load_file()?;
        apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
        log::debug!("[settings] Loaded {:?}", settings);
        Ok(settings)
    }

    fn load_file(&self) -> Result<Settings, SettingsError> {
        if !self.settings_path.exists() {
            if self.required {
                return Err(SettingsError::NotFound(self.settings_path.clone()));
            }
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.settings_path)
            .map_err(|e| SettingsError::Read(self.settings_path.clone(), e.to_string()))?;

        parse_settings(&content)
    }
}

/// Parses YAML settings. Missing fields keep their defaults.
pub fn parse_settings(yaml_content: &str) -> Result<Settings, SettingsError> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(yaml_content).map_err(|e| SettingsError::Parse(e.to_string()))
}

/// Applies environment overrides using `lookup` to read variables.
///
/// Blank values are ignored.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(key) = API_KEY_VARS.iter().find_map(|name| read(*name)) {
        settings.env_api_key = Some(key);
    }
    if let Some(model) = read("DADJOKE_MODEL") {
        settings.model = model;
    }
    if let Some(url) = read("DADJOKE_API_BASE") {
        settings.api_base_url = url;
    }
    if let Some(url) = read("DADJOKE_BACKEND_URL") {
        settings.backend_url = url;
    }
    if let Some(dir) = read("DADJOKE_STORE_DIR") {
        settings.store_dir = PathBuf::from(dir);
    }
    if let Some(value) = read("DADJOKE_MAX_ATTEMPTS") {
        settings.max_attempts = value
            .parse::<u32>()
            .ok()
            .filter(|attempts| *attempts > 0)
            .ok_or(SettingsError::InvalidValue {
                name: "DADJOKE_MAX_ATTEMPTS".to_string(),
                value,
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_partial_settings() {
        let yaml = r#"
model: gpt-4o-mini
backend_url: http://jokes.internal:8000
sampling:
  temperature: 1.3
"#;

        let settings = parse_settings(yaml).unwrap();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.backend_url, "http://jokes.internal:8000");
        assert_eq!(settings.sampling.temperature, 1.3);
        assert_eq!(settings.sampling.top_p, SamplingParams::default().top_p);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.max_attempts, 5);
    }

    #[test]
    fn test_parse_empty_settings() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_invalid_settings() {
        let result = parse_settings("max_attempts: lots");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut settings = parse_settings("model: from-file\nmax_attempts: 2").unwrap();
        let lookup = lookup_from(&[
            ("DADJOKE_MODEL", "from-env"),
            ("DADJOKE_MAX_ATTEMPTS", "7"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]);

        apply_env_overrides(&mut settings, lookup).unwrap();

        assert_eq!(settings.model, "from-env");
        assert_eq!(settings.max_attempts, 7);
        assert_eq!(settings.env_api_key.as_deref(), Some("sk-openai"));
    }

    #[test]
    fn test_api_key_variable_priority_and_blanks() {
        let mut settings = Settings::default();
        let lookup = lookup_from(&[("DADJOKE_API_KEY", "sk-dadjoke"), ("OPENAI_API_KEY", "sk-openai")]);
        apply_env_overrides(&mut settings, lookup).unwrap();
        assert_eq!(settings.env_api_key.as_deref(), Some("sk-dadjoke"));

        let mut settings = Settings::default();
        let lookup = lookup_from(&[("DADJOKE_API_KEY", "  "), ("DADJOKE_MODEL", "")]);
        apply_env_overrides(&mut settings, lookup).unwrap();
        assert_eq!(settings.env_api_key, None);
        assert_eq!(settings.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_invalid_max_attempts() {
        let mut settings = Settings::default();
        let result = apply_env_overrides(&mut settings, lookup_from(&[("DADJOKE_MAX_ATTEMPTS", "0")]));
        assert!(matches!(
            result,
            Err(SettingsError::InvalidValue { ref name, .. }) if name == "DADJOKE_MAX_ATTEMPTS"
        ));
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let registry = FileSettingsRegistry::new(None);
        let registry = FileSettingsRegistry {
            settings_path: PathBuf::from("/nonexistent/dadjoke.yml"),
            ..registry
        };
        assert_eq!(registry.load_file().unwrap(), Settings::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let registry = FileSettingsRegistry::new(Some(PathBuf::from("/nonexistent/custom.yml")));
        assert!(matches!(registry.load_file(), Err(SettingsError::NotFound(_))));
    }

    #[test]
    fn test_client_config_carries_settings() {
        let settings = Settings {
            env_api_key: Some("sk-env".to_string()),
            model: "gpt-4o-mini".to_string(),
            max_attempts: 3,
            ..Settings::default()
        };
        let config = settings.client_config();
        assert_eq!(config.env_api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.seen_capacity, 100);
    }

    #[test]
    fn test_debug_masks_api_key() {
        let settings = Settings {
            env_api_key: Some("sk-verysecretvalue".to_string()),
            ..Settings::default()
        };
        assert!(!format!("{:?}", settings).contains("verysecret"));
    }
}
