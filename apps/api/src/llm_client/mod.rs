//! Model client — the single point of entry for all model calls in the service.
//!
//! Handlers never talk to the model server directly; they go through the
//! `ModelBackend` seam held in `AppState`. The default backend is a local
//! Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model server error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Model server unavailable after {retries} attempts: {last_error}")]
    Unavailable { retries: u32, last_error: String },
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Sends `prompt` and returns the model's full reply.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Names of the models the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Model used by `generate`.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Ollama HTTP client with retry on transport errors, 429 and 5xx.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request built by `make`, retrying with exponential backoff
    /// (1s, 2s) on transport errors, 429 and 5xx.
    async fn send_with_retry<F>(&self, make: F) -> Result<reqwest::Response, LlmError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Model call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match make().send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Model server returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(&body),
                });
            }

            return Ok(response);
        }

        Err(retries_exhausted(last_error))
    }
}

#[async_trait]
impl ModelBackend for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let url = self.url("/api/generate");

        let response = self
            .send_with_retry(|| self.client.post(url.as_str()).json(&body))
            .await?;
        let text = response.text().await?;
        parse_generate_response(&text)
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = self.url("/api/tags");
        let response = self.send_with_retry(|| self.client.get(url.as_str())).await?;
        let text = response.text().await?;
        parse_tags_response(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Final error once every attempt hit a retryable failure.
fn retries_exhausted(last_error: Option<LlmError>) -> LlmError {
    LlmError::Unavailable {
        retries: MAX_ATTEMPTS,
        last_error: last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string()),
    }
}

fn parse_generate_response(body: &str) -> Result<String, LlmError> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;

    debug!(
        "Model call succeeded: prompt_tokens={:?}, output_tokens={:?}",
        parsed.prompt_eval_count, parsed.eval_count
    );

    if parsed.response.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(parsed.response)
}

fn parse_tags_response(body: &str) -> Result<Vec<String>, LlmError> {
    let parsed: TagsResponse = serde_json::from_str(body)?;
    Ok(parsed.models.into_iter().map(|m| m.name).collect())
}

/// Ollama reports failures as `{"error": "..."}`; anything else is passed through.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<OllamaError>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}
