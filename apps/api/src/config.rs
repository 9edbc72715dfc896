use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret expected in the `X-API-Key` header of model-invoking routes.
    pub api_key: String,
    pub ollama_url: String,
    pub model_name: String,
    pub model_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_key: require_env("API_KEY")?,
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model_name: env_or("MODEL_NAME", "llama3"),
            model_timeout_secs: env_or("MODEL_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("MODEL_TIMEOUT_SECS must be a whole number of seconds")?,
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
