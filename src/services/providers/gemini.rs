// Gemini Provider
// Text and vision detection through the Gemini generateContent API

use crate::models::{AnalysisRequest, ProviderInfo, ProviderMethod, ProviderResult};
use crate::services::lenient_json::decode_judgment;
use crate::services::rate_limiter::RateLimiter;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::{
    get_api_key, resolve_base_url, result_from_judgment, truncate_chars, ProviderAdapter,
    ProviderError,
};

const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const MAX_PROMPT_CHARS: usize = 4_000;
const MAX_INLINE_IMAGE_BYTES: usize = 4 * 1024 * 1024;
const MAX_OUTPUT_TOKENS: i32 = 512;

const TEXT_DETECTION_PROMPT: &str = r#"You are an expert AI-generated content detector for a fact-checking service.
Analyze the text below and judge whether it was written by an AI system.

Respond with JSON only, using exactly these fields:
- confidence: integer 0-100, likelihood the text is AI-generated
- verdict: "AI", "HUMAN" or "UNCERTAIN"
- reasoning: one or two short sentences
- flags: array of short strings naming notable signals
- scores: object with integers 0-100 for textPatterns, languageModel, semanticCoherence and humanLikeness

Return the JSON object with no surrounding prose."#;

const VISION_DETECTION_PROMPT: &str = r#"You are an expert at spotting AI-generated and manipulated images for a fact-checking service.
Examine the attached image for generation artifacts: implausible anatomy, texture smearing, inconsistent lighting, distorted text or watermark remnants.

Respond with JSON only, using exactly these fields:
- confidence: integer 0-100, likelihood the image is AI-generated or manipulated
- verdict: "AI", "HUMAN" or "UNCERTAIN"
- reasoning: one or two short sentences
- flags: array of short strings naming notable artifacts
- scores: object with an integer 0-100 for humanLikeness

Return the JSON object with no surrounding prose."#;

const FALLBACK_SUMMARY: &str = "Gemini analysis completed without a stated rationale.";

async fn call_generate(
    client: &Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    payload: &serde_json::Value,
) -> Result<String, ProviderError> {
    let url = format!("{}/models/{}:generateContent", base_url.trim_end_matches('/'), model);

    let response = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    // Response format: {"candidates":[{"content":{"parts":[{"text":"..."}]}}]}
    let data: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ProviderError::JsonError(e.to_string()))?;

    data["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or(ProviderError::MissingContent)
}

fn build_text_payload(text: &str) -> serde_json::Value {
    let prompt = format!(
        "{}\n\nTEXT:\n{}",
        TEXT_DETECTION_PROMPT,
        truncate_chars(text, MAX_PROMPT_CHARS)
    );
    serde_json::json!({
        "contents": [{"parts": [{"text": prompt}]}],
        "generationConfig": {"temperature": 0.0, "maxOutputTokens": MAX_OUTPUT_TOKENS}
    })
}

fn build_vision_payload(mime: &str, bytes: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "contents": [{"parts": [
            {"text": VISION_DETECTION_PROMPT},
            {"inline_data": {"mime_type": mime, "data": BASE64.encode(bytes)}}
        ]}],
        "generationConfig": {"temperature": 0.0, "maxOutputTokens": MAX_OUTPUT_TOKENS}
    })
}

// ============ Text Adapter ============

pub struct GeminiTextProvider {
    client: Client,
    limiter: Arc<RateLimiter>,
    base_url: String,
    model: String,
}

impl GeminiTextProvider {
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        let base_url = resolve_base_url("GEMINI_API_URL", "gemini", Some(GEMINI_DEFAULT_URL))
            .unwrap_or_else(|| GEMINI_DEFAULT_URL.to_string());
        Self {
            client,
            limiter,
            base_url,
            model: GEMINI_MODEL.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for GeminiTextProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn method(&self) -> ProviderMethod {
        ProviderMethod::TextLlm
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Option<ProviderResult> {
        let AnalysisRequest::Text { text } = request else {
            return None;
        };

        let api_key = match get_api_key("gemini") {
            Some(key) => key,
            None => {
                debug!("[GEMINI] API key not configured, skipping");
                return None;
            }
        };

        if !self.limiter.try_acquire(self.name()) {
            warn!("[GEMINI] rate limit window exhausted, skipping");
            return None;
        }

        let payload = build_text_payload(text);
        let started = Instant::now();

        match call_generate(&self.client, &self.base_url, &self.model, &api_key, &payload).await {
            Ok(content) => {
                let judgment = decode_judgment(&content);
                let provider =
                    ProviderInfo::with_model(self.name(), self.method(), self.model.clone());
                let mut result = result_from_judgment(&judgment, provider, FALLBACK_SUMMARY);
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
                warn!("[GEMINI] text analysis failed: {}", e);
                None
            }
        }
    }
}

// ============ Vision Adapter ============

pub struct GeminiVisionProvider {
    client: Client,
    limiter: Arc<RateLimiter>,
    base_url: String,
    model: String,
}

impl GeminiVisionProvider {
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        let base_url = resolve_base_url("GEMINI_API_URL", "gemini", Some(GEMINI_DEFAULT_URL))
            .unwrap_or_else(|| GEMINI_DEFAULT_URL.to_string());
        Self {
            client,
            limiter,
            base_url,
            model: GEMINI_MODEL.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for GeminiVisionProvider {
    fn name(&self) -> &str {
        "Gemini Vision"
    }

    fn method(&self) -> ProviderMethod {
        ProviderMethod::VisionLlm
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Option<ProviderResult> {
        let AnalysisRequest::File { bytes, mime, name } = request else {
            return None;
        };
        if !mime.starts_with("image/") {
            return None;
        }
        if bytes.len() > MAX_INLINE_IMAGE_BYTES {
            debug!(
                "[GEMINI_VISION] {} exceeds inline payload budget ({} bytes), skipping",
                name,
                bytes.len()
            );
            return None;
        }

        let api_key = match get_api_key("gemini") {
            Some(key) => key,
            None => {
                debug!("[GEMINI_VISION] API key not configured, skipping");
                return None;
            }
        };

        if !self.limiter.try_acquire(self.name()) {
            warn!("[GEMINI_VISION] rate limit window exhausted, skipping");
            return None;
        }

        let payload = build_vision_payload(mime, bytes);
        let started = Instant::now();

        match call_generate(&self.client, &self.base_url, &self.model, &api_key, &payload).await {
            Ok(content) => {
                let judgment = decode_judgment(&content);
                let provider =
                    ProviderInfo::with_model(self.name(), self.method(), self.model.clone());
                let mut result = result_from_judgment(&judgment, provider, FALLBACK_SUMMARY);
                result.detail.human_likeness = judgment.scores.human_likeness_score();
                result.meta.insert(
                    "latencyMs".to_string(),
                    serde_json::json!(started.elapsed().as_millis() as u64),
                );
                result
                    .meta
                    .insert("fileName".to_string(), serde_json::json!(name));
                Some(result)
            }
            Err(e) => {
                warn!("[GEMINI_VISION] image analysis failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::build_http_client;

    #[test]
    fn test_provider_identity() {
        let limiter = Arc::new(RateLimiter::new());
        let text = GeminiTextProvider::new(build_http_client(), limiter.clone());
        let vision = GeminiVisionProvider::new(build_http_client(), limiter);

        assert_eq!(text.name(), "Gemini");
        assert_eq!(text.method(), ProviderMethod::TextLlm);
        assert_eq!(vision.name(), "Gemini Vision");
        assert_eq!(vision.method(), ProviderMethod::VisionLlm);
    }

    #[test]
    fn test_text_payload_truncates_input() {
        let long_text = "a".repeat(10_000);
        let payload = build_text_payload(&long_text);
        let prompt = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.len() < 6_000);
    }

    #[test]
    fn test_vision_payload_encodes_bytes() {
        let payload = build_vision_payload("image/png", &[1, 2, 3, 4]);
        let part = &payload["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(part["mime_type"], "image/png");
        assert_eq!(part["data"], BASE64.encode([1, 2, 3, 4]));
    }

    #[tokio::test]
    async fn test_text_adapter_ignores_file_requests() {
        let limiter = Arc::new(RateLimiter::new());
        let provider = GeminiTextProvider::new(build_http_client(), limiter);
        let request = AnalysisRequest::file(vec![0u8; 16], "image/png", "x.png");
        assert!(provider.analyze(&request).await.is_none());
    }

    #[tokio::test]
    async fn test_vision_adapter_ignores_non_image_files() {
        let limiter = Arc::new(RateLimiter::new());
        let provider = GeminiVisionProvider::new(build_http_client(), limiter);
        let request = AnalysisRequest::file(vec![0u8; 16], "application/pdf", "x.pdf");
        assert!(provider.analyze(&request).await.is_none());
    }
}
