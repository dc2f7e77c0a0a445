// Ollama Provider
// Optional local model gateway; enabled only when a base URL is configured

use crate::models::{AnalysisRequest, ProviderInfo, ProviderMethod, ProviderResult};
use crate::services::lenient_json::decode_judgment;
use crate::services::rate_limiter::RateLimiter;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::{resolve_base_url, truncate_chars, ProviderAdapter, ProviderError};

const OLLAMA_DEFAULT_MODEL: &str = "llama3";
const MAX_PROMPT_CHARS: usize = 4_000;

const LOCAL_DETECTION_PROMPT: &str = r#"You are an AI-generated text detector.
Judge whether the text below was written by an AI system.

Respond with JSON only, using exactly these fields:
- confidence: integer 0-100, likelihood the text is AI-generated
- verdict: "AI", "HUMAN" or "UNCERTAIN"
- reasoning: one short sentence
- scores: object with integers 0-100 for textPatterns, languageModel, semanticCoherence and humanLikeness"#;

const FALLBACK_SUMMARY: &str = "Local model analysis completed without a stated rationale.";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaProvider {
    client: Client,
    limiter: Arc<RateLimiter>,
    base_url: Option<String>,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        let base_url = resolve_base_url("OLLAMA_URL", "ollama", None);
        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| OLLAMA_DEFAULT_MODEL.to_string());
        Self::configured(client, limiter, base_url, model)
    }

    fn configured(
        client: Client,
        limiter: Arc<RateLimiter>,
        base_url: Option<String>,
        model: String,
    ) -> Self {
        Self {
            client,
            limiter,
            base_url,
            model,
        }
    }

    async fn call_generate(&self, base_url: &str, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let payload = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json"
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;
        if envelope.response.is_empty() {
            return Err(ProviderError::MissingContent);
        }
        Ok(envelope.response)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn method(&self) -> ProviderMethod {
        ProviderMethod::LocalModel
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Option<ProviderResult> {
        let AnalysisRequest::Text { text } = request else {
            return None;
        };

        // URL presence doubles as the enabled flag for the local gateway.
        let Some(base_url) = self.base_url.clone() else {
            debug!("[OLLAMA] no base URL configured, skipping");
            return None;
        };

        if !self.limiter.try_acquire(self.name()) {
            warn!("[OLLAMA] rate limit window exhausted, skipping");
            return None;
        }

        let prompt = format!(
            "{}\n\nTEXT:\n{}",
            LOCAL_DETECTION_PROMPT,
            truncate_chars(text, MAX_PROMPT_CHARS)
        );
        let started = Instant::now();

        match self.call_generate(&base_url, &prompt).await {
            Ok(content) => {
                let judgment = decode_judgment(&content);
                let provider =
                    ProviderInfo::with_model(self.name(), self.method(), self.model.clone());
                let mut result =
                    super::result_from_judgment(&judgment, provider, FALLBACK_SUMMARY);
                result.detail.text_patterns = judgment.scores.text_patterns_score();
                result.detail.language_model = judgment.scores.language_model_score();
                result.detail.semantic_coherence = judgment.scores.semantic_coherence_score();
                result.detail.human_likeness = judgment.scores.human_likeness_score();
                result.meta.insert(
                    "latencyMs".to_string(),
                    serde_json::json!(started.elapsed().as_millis() as u64),
                );
                Some(result)
            }
            Err(e) => {
                warn!("[OLLAMA] local analysis failed: {}", e);
                None
            }
        }
    }
}
