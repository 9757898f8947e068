mod openai_upstream;
mod settings_registry;

pub use openai_upstream::{DEFAULT_API_BASE_URL, HttpCompletionUpstream};
pub use settings_registry::{
    DEFAULT_BACKEND_URL, FileSettingsRegistry, Settings, SettingsError, apply_env_overrides,
    parse_settings,
};
