use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::llm_client::{LlmError, ModelBackend};
use crate::report::clock::FixedClock;
use crate::routes::build_router;
use crate::state::AppState;

pub const TEST_API_KEY: &str = "test-key";

/// Backend that answers every prompt with a canned reply and remembers the last prompt.
pub struct StubModel {
    pub reply: Result<String, u16>,
    pub last_prompt: std::sync::Mutex<Option<String>>,
}

impl StubModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            last_prompt: Default::default(),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            last_prompt: Default::default(),
        })
    }
}

#[async_trait]
impl ModelBackend for StubModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::Api {
                status: *status,
                message: "stub failure".to_string(),
            }),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(vec!["llama3:latest".to_string(), "meditron:7b".to_string()])
    }

    fn model_name(&self) -> &str {
        "llama3"
    }
}

pub fn test_app(model: Arc<StubModel>) -> Router {
    let config = Config {
        api_key: TEST_API_KEY.to_string(),
        ollama_url: "http://localhost:11434".to_string(),
        model_name: "llama3".to_string(),
        model_timeout_secs: 5,
        port: 0,
        rust_log: "info".to_string(),
    };
    let now = NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap();
    build_router(AppState {
        config,
        model,
        clock: Arc::new(FixedClock(now)),
    })
}

/// Sends one request through the router and returns status plus parsed JSON body.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (axum::http::StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let req = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
