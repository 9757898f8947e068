mod api_key;
mod backend_client;
mod file_store;
mod joke_client;
mod seen_jokes;

pub use api_key::{
    API_KEY_STORAGE_KEY, ApiKeyError, ApiKeySource, ResolvedApiKey, clear_api_key,
    key_fingerprint, mask_api_key, resolve_api_key, save_api_key,
};
pub use backend_client::{BackendClient, BackendError};
pub use file_store::{FileStore, MemoryStore};
pub use joke_client::{
    CompletionUpstream, JokeClient, JokeClientConfig, JokeError, Notification, Notifier,
    SamplingParams, UpstreamReply, build_request,
};
pub use seen_jokes::{SEEN_JOKES_CAPACITY, SeenJokes};
