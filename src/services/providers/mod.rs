// Provider Adapters
// One adapter per external classifier behind a single async interface

use crate::models::{AnalysisRequest, ProviderInfo, ProviderMethod, ProviderResult};
use crate::services::lenient_json::{DecodeStrategy, Judgment};
use crate::services::ConfigStore;
use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub mod gemini;
pub mod huggingface;
pub mod ollama;

pub use gemini::{GeminiTextProvider, GeminiVisionProvider};
pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;

/// Every outbound provider call shares this timeout.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

/// One external (or local) classifier. A `None` from analyze means the
/// provider has nothing usable for this request: unsupported content type,
/// missing configuration, rate limiting or a transport failure. Operational
/// problems never surface as errors.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn method(&self) -> ProviderMethod;
    async fn analyze(&self, request: &AnalysisRequest) -> Option<ProviderResult>;
}

/// Shared HTTP client for all adapters; cloning reuses the connection pool.
pub fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

/// Get API key from environment or config file
pub fn get_api_key(provider: &str) -> Option<String> {
    // Try environment variables first
    let env_keys = match provider {
        "gemini" => vec!["GEMINI_API_KEY", "SATYACHECK_GEMINI_API_KEY"],
        "huggingface" => vec!["HF_API_KEY", "HUGGINGFACE_API_KEY", "SATYACHECK_HF_API_KEY"],
        _ => vec![],
    };

    for key in env_keys {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    // Try config file
    if let Some(config_dir) = ConfigStore::default_config_dir() {
        let store = ConfigStore::new(config_dir);
        if let Ok(Some(key)) = store.get_api_key(provider) {
            return Some(key);
        }
    }

    None
}

/// Resolve a provider base URL: env override, then config file, then the
/// compiled-in default (None means the provider stays disabled without one).
pub fn resolve_base_url(env_var: &str, provider: &str, default: Option<&str>) -> Option<String> {
    if let Ok(val) = env::var(env_var) {
        let v = val.trim();
        if !v.is_empty() {
            return Some(v.to_string());
        }
    }

    if let Some(config_dir) = ConfigStore::default_config_dir() {
        let store = ConfigStore::new(config_dir);
        if let Ok(Some(url)) = store.get_provider_url(provider) {
            return Some(url);
        }
    }

    default.map(str::to_string)
}

/// Cut text to a character budget without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Turn a decoded judgment into the normalized result shape. Sub-score
/// mapping stays with the individual adapters since support differs.
pub(crate) fn result_from_judgment(
    judgment: &Judgment,
    provider: ProviderInfo,
    fallback_summary: &str,
) -> ProviderResult {
    let mut result = ProviderResult::new(
        judgment.confidence,
        judgment
            .reasoning
            .clone()
            .unwrap_or_else(|| fallback_summary.to_string()),
        provider,
    );
    if let Some(verdict) = judgment.verdict {
        result.verdict = verdict;
    }
    result.flags = judgment.flags.clone();
    if judgment.strategy != DecodeStrategy::Strict {
        result.meta.insert(
            "decodeStrategy".to_string(),
            serde_json::Value::String(judgment.strategy.as_str().to_string()),
        );
    }
    result
}
