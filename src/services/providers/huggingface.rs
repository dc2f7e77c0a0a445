// HuggingFace Provider
// Hosted classifier models for text and image authenticity scoring

use crate::models::{clamp_score, AnalysisRequest, ProviderInfo, ProviderMethod, ProviderResult};
use crate::services::rate_limiter::RateLimiter;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, warn};

use super::{get_api_key, resolve_base_url, truncate_chars, ProviderAdapter, ProviderError};

const HF_DEFAULT_TEXT_URL: &str =
    "https://api-inference.huggingface.co/models/openai-community/roberta-base-openai-detector";
const HF_DEFAULT_IMAGE_URL: &str =
    "https://api-inference.huggingface.co/models/umm-maybe/AI-image-detector";
const MAX_CLASSIFIER_CHARS: usize = 2_000;
const NEUTRAL_CONFIDENCE: u8 = 50;

fn ai_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)fake|ai|machine|generated|artificial|synthetic")
            .expect("ai label regex")
    })
}

fn human_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)real|human|authentic|original").expect("human label regex"))
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

// Inference API returns either [[{label,score},...]] or [{label,score},...]
// depending on the model pipeline.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifierResponse {
    fn into_labels(self) -> Vec<LabelScore> {
        match self {
            ClassifierResponse::Nested(mut rows) => {
                if rows.is_empty() {
                    Vec::new()
                } else {
                    rows.remove(0)
                }
            }
            ClassifierResponse::Flat(labels) => labels,
        }
    }
}

fn model_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("classifier")
        .to_string()
}

// Maps the top-scored label to an AI-likelihood confidence. Labels that
// match neither polarity produce a neutral score plus an audit flag.
fn confidence_from_labels(labels: &[LabelScore]) -> (u8, String, Vec<String>) {
    let Some(top) = labels.iter().max_by(|a, b| a.score.total_cmp(&b.score)) else {
        return (
            NEUTRAL_CONFIDENCE,
            "Classifier returned no scored labels.".to_string(),
            vec!["Empty classifier response".to_string()],
        );
    };

    let scaled = top.score * 100.0;
    if ai_label_re().is_match(&top.label) {
        (
            clamp_score(scaled),
            format!(
                "Classifier label '{}' indicates machine-generated content.",
                top.label
            ),
            Vec::new(),
        )
    } else if human_label_re().is_match(&top.label) {
        (
            clamp_score(100.0 - scaled),
            format!(
                "Classifier label '{}' indicates human-authored content.",
                top.label
            ),
            Vec::new(),
        )
    } else {
        (
            NEUTRAL_CONFIDENCE,
            format!("Classifier label '{}' is not mapped to a polarity.", top.label),
            vec![format!("Unrecognized classifier label: {}", top.label)],
        )
    }
}

pub struct HuggingFaceProvider {
    client: Client,
    limiter: Arc<RateLimiter>,
    text_url: String,
    image_url: String,
}

impl HuggingFaceProvider {
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        let text_url = resolve_base_url("HF_API_URL", "huggingface", Some(HF_DEFAULT_TEXT_URL))
            .unwrap_or_else(|| HF_DEFAULT_TEXT_URL.to_string());
        let image_url =
            resolve_base_url("HF_IMAGE_API_URL", "huggingface_image", Some(HF_DEFAULT_IMAGE_URL))
                .unwrap_or_else(|| HF_DEFAULT_IMAGE_URL.to_string());
        Self {
            client,
            limiter,
            text_url,
            image_url,
        }
    }

    async fn call_classifier(
        &self,
        url: &str,
        api_key: &str,
        payload: serde_json::Value,
    ) -> Result<Vec<LabelScore>, ProviderError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&payload)
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

        let parsed: ClassifierResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;
        let labels = parsed.into_labels();
        if labels.is_empty() {
            return Err(ProviderError::MissingContent);
        }
        Ok(labels)
    }

    async fn classify(&self, url: &str, payload: serde_json::Value) -> Option<ProviderResult> {
        let api_key = match get_api_key("huggingface") {
            Some(key) => key,
            None => {
                debug!("[HUGGINGFACE] API key not configured, skipping");
                return None;
            }
        };

        if !self.limiter.try_acquire(self.name()) {
            warn!("[HUGGINGFACE] rate limit window exhausted, skipping");
            return None;
        }

        let started = Instant::now();
        match self.call_classifier(url, &api_key, payload).await {
            Ok(labels) => {
                let (confidence, summary, flags) = confidence_from_labels(&labels);
                let provider = ProviderInfo::with_model(
                    self.name(),
                    self.method(),
                    model_from_url(url),
                );
                let mut result = ProviderResult::new(confidence, summary, provider);
                result.flags = flags;
                result.detail.language_model = Some(confidence);
                result.meta.insert(
                    "latencyMs".to_string(),
                    serde_json::json!(started.elapsed().as_millis() as u64),
                );
                Some(result)
            }
            Err(ProviderError::ApiError { status: 503, .. }) => {
                warn!("[HUGGINGFACE] model cold start (503), skipping");
                None
            }
            Err(e) => {
                warn!("[HUGGINGFACE] classification failed: {}", e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for HuggingFaceProvider {
    fn name(&self) -> &str {
        "HuggingFace"
    }

    fn method(&self) -> ProviderMethod {
        ProviderMethod::Ensemble
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Option<ProviderResult> {
        match request {
            AnalysisRequest::Text { text } => {
                let payload =
                    serde_json::json!({"inputs": truncate_chars(text, MAX_CLASSIFIER_CHARS)});
                self.classify(&self.text_url, payload).await
            }
            AnalysisRequest::File { bytes, mime, .. } if mime.starts_with("image/") => {
                let payload = serde_json::json!({"inputs": BASE64.encode(bytes)});
                self.classify(&self.image_url, payload).await
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::build_http_client;

    #[test]
    fn test_nested_response_shape() {
        let raw = r#"[[{"label":"Fake","score":0.91},{"label":"Real","score":0.09}]]"#;
        let parsed: ClassifierResponse = serde_json::from_str(raw).unwrap();
        let labels = parsed.into_labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, "Fake");
    }

    #[test]
    fn test_flat_response_shape() {
        let raw = r#"[{"label":"artificial","score":0.75}]"#;
        let parsed: ClassifierResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_labels().len(), 1);
    }

    #[test]
    fn test_ai_label_polarity() {
        let labels = vec![
            LabelScore {
                label: "Fake".to_string(),
                score: 0.91,
            },
            LabelScore {
                label: "Real".to_string(),
                score: 0.09,
            },
        ];
        let (confidence, _, flags) = confidence_from_labels(&labels);
        assert_eq!(confidence, 91);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_human_label_polarity_inverts_score() {
        let labels = vec![LabelScore {
            label: "Real".to_string(),
            score: 0.8,
        }];
        let (confidence, _, _) = confidence_from_labels(&labels);
        assert_eq!(confidence, 20);
    }

    #[test]
    fn test_unknown_label_is_neutral_and_flagged() {
        let labels = vec![LabelScore {
            label: "LABEL_0".to_string(),
            score: 0.99,
        }];
        let (confidence, _, flags) = confidence_from_labels(&labels);
        assert_eq!(confidence, 50);
        assert_eq!(flags.len(), 1);
        assert!(flags[0].contains("LABEL_0"));
    }

    #[test]
    fn test_model_name_from_url() {
        assert_eq!(model_from_url(HF_DEFAULT_TEXT_URL), "roberta-base-openai-detector");
        assert_eq!(model_from_url("https://host/models/x/"), "x");
    }

    #[tokio::test]
    async fn test_adapter_ignores_unrelated_files() {
        let limiter = Arc::new(RateLimiter::new());
        let provider = HuggingFaceProvider::new(build_http_client(), limiter);
        let request = AnalysisRequest::file(vec![0u8; 16], "application/pdf", "doc.pdf");
        assert!(provider.analyze(&request).await.is_none());
    }
}
