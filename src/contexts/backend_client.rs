use crate::data::JokeRecord;
use serde::Deserialize;
use std::fmt;

/// Errors from the joke backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    Request(String),
    Status { status: u16, body: String },
    InvalidResponse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendError::Request(details) => write!(f, "{}", details),
            BackendError::Status { status, body } if body.trim().is_empty() => {
                write!(f, "{}", status)
            }
            BackendError::Status { status, body } => write!(f, "{} {}", status, body.trim()),
            BackendError::InvalidResponse(details) => {
                write!(f, "Invalid response format: {}", details)
            }
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Request(e.to_string())
    }
}

#[derive(Deserialize)]
struct BackendJoke {
    #[serde(default)]
    joke: Option<String>,
}

/// Client for the joke backend's `/joke` and `/jokes/recent` endpoints.
///
/// Failures are returned as-is; nothing is retried.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_client(reqwest::Client::new(), base_url)
    }

    pub fn from_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /joke`
    pub async fn fetch_joke(&self) -> Result<String, BackendError> {
        let url = self.endpoint("/joke");
        log::debug!("[backend] GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: BackendJoke = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        parsed
            .joke
            .map(|joke| joke.trim().to_string())
            .filter(|joke| !joke.is_empty())
            .ok_or_else(|| BackendError::InvalidResponse("missing joke".to_string()))
    }

    /// `GET /jokes/recent`, newest first as ordered by the backend.
    pub async fn recent_jokes(&self) -> Result<Vec<JokeRecord>, BackendError> {
        let url = self.endpoint("/jokes/recent");
        log::debug!("[backend] GET {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await?;
        let records: Vec<JokeRecord> = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        log::info!("[backend] Fetched {} recent jokes", records.len());
        Ok(records)
    }
}
