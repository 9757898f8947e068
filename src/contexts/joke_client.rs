use crate::contexts::api_key::{ResolvedApiKey, resolve_api_key};
use crate::contexts::seen_jokes::{SEEN_JOKES_CAPACITY, SeenJokes};
use crate::data::{
    ApiErrorBody, ApiErrorDetail, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    JokeResult, KeyValueStore,
};
use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;
use std::fmt;

const SYSTEM_PROMPT: &str = "You are a dad joke generator. Respond with exactly one short, \
    original dad joke that you have not told before. Respond with only the joke text: \
    no introduction, explanation, commentary or formatting.";

const GENERIC_FAILURE: &str = "failed to fetch joke";
const SEED_LENGTH: usize = 16;

/// Error codes and types that identify an authentication failure.
const AUTH_CODES: &[&str] = &[
    "invalid_api_key",
    "invalid_authentication",
    "authentication_error",
    "insufficient_permissions",
    "unauthorized",
];

/// Fallback markers, matched against the error message.
const AUTH_MESSAGE_MARKERS: &[&str] = &["API key", "auth", "Authentication"];

/// Errors that can occur while fetching a joke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JokeError {
    MissingKey,
    Upstream { status: u16, message: String },
    Auth { status: u16, message: String },
    EmptyCompletion,
    DuplicateExhausted { attempts: u32 },
    Transport(String),
    MalformedResponse(String),
}

impl fmt::Display for JokeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JokeError::MissingKey => write!(f, "no API key available"),
            JokeError::Upstream { message, .. } | JokeError::Auth { message, .. } => {
                write!(f, "{}", message)
            }
            JokeError::EmptyCompletion => write!(f, "no joke was returned"),
            JokeError::DuplicateExhausted { attempts } => {
                write!(f, "no new joke after {} attempts", attempts)
            }
            JokeError::Transport(details) => {
                write!(f, "failed to reach the joke service: {}", details)
            }
            JokeError::MalformedResponse(details) => {
                write!(f, "invalid response from joke service: {}", details)
            }
        }
    }
}

impl std::error::Error for JokeError {}

impl JokeError {
    /// The user-visible notification for this failure.
    pub fn notification(&self) -> Notification {
        let message = self.to_string();
        match self {
            JokeError::MissingKey => Notification::MissingKey(message),
            JokeError::Auth { .. } => Notification::AuthFailure(message),
            _ => Notification::Failure(message),
        }
    }
}

/// User-visible notifications emitted by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    MissingKey(String),
    AuthFailure(String),
    Failure(String),
    Success(String),
}

/// Sink for user-visible notifications
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Raw status and body of an upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for sending chat-completion requests to the LLM API
#[allow(async_fn_in_trait)]
pub trait CompletionUpstream {
    /// Sends `request` authorized with `api_key`.
    ///
    /// Any HTTP status is a reply; only failures to get a response are errors.
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, JokeError>;
}

impl<T: CompletionUpstream> CompletionUpstream for &T {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, JokeError> {
        (**self).complete(api_key, request).await
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.1,
            top_p: 0.95,
            frequency_penalty: 1.0,
            presence_penalty: 1.0,
            max_tokens: 100,
        }
    }
}

#[derive(Clone)]
pub struct JokeClientConfig {
    /// Key supplied through the environment. Takes precedence over storage.
    pub env_api_key: Option<String>,
    pub model: String,
    pub sampling: SamplingParams,
    /// Requests per `fetch_joke` call before giving up on duplicates.
    pub max_attempts: u32,
    pub seen_capacity: usize,
}

impl Default for JokeClientConfig {
    fn default() -> Self {
        Self {
            env_api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            sampling: SamplingParams::default(),
            max_attempts: 5,
            seen_capacity: SEEN_JOKES_CAPACITY,
        }
    }
}

/// Joke Client context: resolves a key, asks the LLM for a joke and keeps
/// jokes it already handed out from being returned again.
pub struct JokeClient<S, U, N>
where
    S: KeyValueStore,
    U: CompletionUpstream,
    N: Notifier,
{
    config: JokeClientConfig,
    /// Store holding the user's API key
    store: S,
    upstream: U,
    notifier: N,
    seen: SeenJokes,
}

impl<S, U, N> JokeClient<S, U, N>
where
    S: KeyValueStore,
    U: CompletionUpstream,
    N: Notifier,
{
    pub fn new(config: JokeClientConfig, store: S, upstream: U, notifier: N) -> Self {
        let seen = SeenJokes::with_capacity(config.seen_capacity);
        Self {
            config,
            store,
            upstream,
            notifier,
            seen,
        }
    }

    /// Replaces the seen-jokes cache, e.g. to share history between clients.
    pub fn with_seen_jokes(mut self, seen: SeenJokes) -> Self {
        self.seen = seen;
        self
    }

    pub fn seen_jokes(&self) -> &SeenJokes {
        &self.seen
    }

    /// The key the next request would use, if any.
    pub fn resolved_key(&self) -> Option<ResolvedApiKey> {
        resolve_api_key(self.config.env_api_key.as_deref(), &self.store)
    }

    /// Builds the request the next attempt would send, without sending it.
    pub fn preview_request(&self) -> ChatCompletionRequest {
        build_request(&self.config, &new_seed(), Utc::now())
    }

    /// Fetches one joke that this client has not returned before.
    ///
    /// Never fails: errors are logged, reported to the notifier and returned
    /// in the result's `error` field.
    pub async fn fetch_joke(&mut self) -> JokeResult {
        match self.try_fetch_joke().await {
            Ok(text) => JokeResult::joke(text),
            Err(e) => {
                log::error!("[joke-client] Error fetching dad joke: {}", e);
                self.notifier.notify(e.notification());
                JokeResult::failure(e.to_string())
            }
        }
    }

    async fn try_fetch_joke(&mut self) -> Result<String, JokeError> {
        let key = self.resolved_key().ok_or(JokeError::MissingKey)?;
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            log::debug!(
                "[joke-client] Requesting joke (attempt {}/{}, key from {})",
                attempt,
                max_attempts,
                key.source
            );

            let request = build_request(&self.config, &new_seed(), Utc::now());
            let reply = self.upstream.complete(&key.value, &request).await?;
            let joke = interpret_reply(reply)?;

            if self.seen.contains(&joke) {
                log::info!("[joke-client] Got a joke already seen this session, retrying");
                continue;
            }

            if let Some(evicted) = self.seen.insert(joke.clone()) {
                log::debug!("[joke-client] Forgot oldest seen joke: {}", evicted);
            }
            return Ok(joke);
        }

        Err(JokeError::DuplicateExhausted {
            attempts: max_attempts,
        })
    }
}

/// Builds a chat-completion request carrying `seed` and `timestamp` so that
/// repeated calls are never served as the same cached completion.
pub fn build_request(
    config: &JokeClientConfig,
    seed: &str,
    timestamp: DateTime<Utc>,
) -> ChatCompletionRequest {
    let user_prompt = format!(
        "Tell me a fresh dad joke I haven't heard yet. (seed: {}, time: {})",
        seed,
        timestamp.to_rfc3339()
    );

    ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ],
        temperature: config.sampling.temperature,
        top_p: config.sampling.top_p,
        frequency_penalty: config.sampling.frequency_penalty,
        presence_penalty: config.sampling.presence_penalty,
        max_tokens: config.sampling.max_tokens,
    }
}

fn new_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SEED_LENGTH)
        .map(char::from)
        .collect()
}

/// Turns an upstream reply into the joke text or a classified failure.
fn interpret_reply(reply: UpstreamReply) -> Result<String, JokeError> {
    if !reply.is_success() {
        return Err(upstream_failure(reply.status, &reply.body));
    }

    let response: ChatCompletionResponse = serde_json::from_str(&reply.body)
        .map_err(|e| JokeError::MalformedResponse(e.to_string()))?;

    response
        .first_content()
        .map(str::to_string)
        .ok_or(JokeError::EmptyCompletion)
}

fn upstream_failure(status: u16, body: &str) -> JokeError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error);

    let message = detail
        .as_ref()
        .and_then(|detail| detail.message.as_deref())
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(GENERIC_FAILURE)
        .to_string();

    if is_auth_failure(status, detail.as_ref(), &message) {
        JokeError::Auth { status, message }
    } else {
        JokeError::Upstream { status, message }
    }
}

/// Decides whether an upstream failure is an authentication problem.
///
/// Structured `code`/`type` fields decide first, then HTTP 401. A non-auth
/// `code` rules out auth; only without one is the message searched.
fn is_auth_failure(status: u16, detail: Option<&ApiErrorDetail>, message: &str) -> bool {
    let code = detail.and_then(ApiErrorDetail::code_str);
    let kind = detail.and_then(|detail| detail.kind.as_deref());

    if [code, kind]
        .into_iter()
        .flatten()
        .any(|value| AUTH_CODES.contains(&value))
    {
        return true;
    }
    if status == 401 {
        return true;
    }
    if code.is_some() {
        return false;
    }

    AUTH_MESSAGE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
