use crate::contexts::{CompletionUpstream, JokeError, UpstreamReply};
use crate::data::ChatCompletionRequest;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA};

/// Default base URL of the chat-completion API
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP implementation of CompletionUpstream for OpenAI-compatible APIs
#[derive(Debug, Clone)]
pub struct HttpCompletionUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompletionUpstream {
    /// Creates a new HttpCompletionUpstream
    ///
    /// # Arguments
    /// * `base_url` - Optional API base URL (defaults to "https://api.openai.com/v1")
    pub fn new(base_url: Option<String>) -> Self {
        Self::from_client(reqwest::Client::new(), base_url)
    }

    pub fn from_client(client: reqwest::Client, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionUpstream for HttpCompletionUpstream {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, JokeError> {
        let url = self.completions_url();
        log::debug!("[upstream] POST {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(PRAGMA, "no-cache")
            .header(EXPIRES, "0")
            .json(request)
            .send()
            .await
            .map_err(|e| JokeError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| JokeError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            log::warn!("[upstream] API error {}: {}", status, body);
        }

        Ok(UpstreamReply { status, body })
    }
}
