// Analysis Orchestrator
// Routes requests through providers, heuristic fallback and context overlays

use crate::models::{AnalysisRequest, ProviderInfo, ProviderMethod, ProviderResult, Verdict};
use crate::services::analysis::aggregation::aggregate_results;
use crate::services::analysis::deepfake::analyze_deepfake_artifacts;
use crate::services::analysis::heuristics::{heuristic_file_result, heuristic_text_result};
use crate::services::analysis::misinformation::analyze_misinformation;
use crate::services::analysis::political::{analyze_political_context, political_bias_score};
use crate::services::config_store::{AnalysisConfig, ConfigStore};
use crate::services::link_fetcher::{LinkFetcher, MAX_CONTENT_CHARS, MIN_CONTENT_CHARS};
use crate::services::providers::{
    truncate_chars, GeminiTextProvider, GeminiVisionProvider, HuggingFaceProvider, OllamaProvider,
    ProviderAdapter,
};
use crate::services::rate_limiter::RateLimiter;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const ELECTION_CONFIDENCE_BONUS: u8 = 10;
const ELECTION_CONFIDENCE_CAP: u8 = 95;
const ELECTION_FLAG: &str = "Election-related content; heightened scrutiny applied";
const NO_PROVIDERS_FLAG: &str = "External verification unavailable; heuristic analysis only";
const LINK_FETCH_FLAG: &str = "Unable to fetch link content for verification";
const LINK_THIN_FLAG: &str = "Insufficient content extracted from link";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("text input is empty")]
    EmptyText,
    #[error("file payload is empty")]
    EmptyFile,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

pub struct AnalysisEngine {
    text_providers: Vec<Arc<dyn ProviderAdapter>>,
    vision_providers: Vec<Arc<dyn ProviderAdapter>>,
    fetcher: LinkFetcher,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        let limiter = Arc::new(RateLimiter::with_limits(
            config.rate_limit_max_calls,
            Duration::from_secs(config.rate_limit_window_secs),
        ));
        let client = Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .unwrap_or_default();

        let gemini_text = Arc::new(GeminiTextProvider::new(client.clone(), limiter.clone()));
        let gemini_vision = Arc::new(GeminiVisionProvider::new(client.clone(), limiter.clone()));
        let huggingface = Arc::new(HuggingFaceProvider::new(client.clone(), limiter.clone()));
        let ollama = Arc::new(OllamaProvider::new(client, limiter));

        // Declaration order fixes the ai_providers order in every result.
        let text_providers: Vec<Arc<dyn ProviderAdapter>> =
            vec![gemini_text, huggingface.clone(), ollama];
        let vision_providers: Vec<Arc<dyn ProviderAdapter>> = vec![gemini_vision, huggingface];

        Self {
            text_providers,
            vision_providers,
            fetcher: LinkFetcher::new(),
        }
    }

    pub fn from_env() -> Self {
        let config = ConfigStore::default_config_dir()
            .map(ConfigStore::new)
            .and_then(|store| store.load().ok())
            .map(|app| app.analysis)
            .unwrap_or_default();
        Self::new(config)
    }

    pub fn with_providers(
        text_providers: Vec<Arc<dyn ProviderAdapter>>,
        vision_providers: Vec<Arc<dyn ProviderAdapter>>,
    ) -> Self {
        Self {
            text_providers,
            vision_providers,
            fetcher: LinkFetcher::new(),
        }
    }

    // Concurrent fan-out over the text providers; one failing adapter never
    // aborts its siblings because adapters settle to Option internally.
    async fn run_text_pipeline(&self, text: &str) -> ProviderResult {
        let request = AnalysisRequest::text(text);
        let calls = self.text_providers.iter().map(|p| p.analyze(&request));
        let results: Vec<ProviderResult> = join_all(calls).await.into_iter().flatten().collect();

        if results.is_empty() {
            info!("[ORCHESTRATOR] no providers available, using heuristic fallback");
            let mut fallback = heuristic_text_result(text);
            fallback.flags.push(NO_PROVIDERS_FLAG.to_string());
            fallback
        } else {
            info!(
                "[ORCHESTRATOR] aggregating {} provider result(s)",
                results.len()
            );
            aggregate_results(&results)
        }
    }

    pub async fn analyze_text(&self, text: &str) -> Result<ProviderResult, EngineError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::EmptyText);
        }

        let political = analyze_political_context(trimmed);
        let misinformation = analyze_misinformation(trimmed);
        let mut result = self.run_text_pipeline(trimmed).await;

        if political.is_election_related {
            info!("[ORCHESTRATOR] election-related content, applying heightened scrutiny");
            if result.confidence < ELECTION_CONFIDENCE_CAP {
                result.confidence =
                    (result.confidence + ELECTION_CONFIDENCE_BONUS).min(ELECTION_CONFIDENCE_CAP);
            }
            result.verdict = Verdict::from_confidence(result.confidence);
            result.flags.push(ELECTION_FLAG.to_string());
            result.detail.political_bias = Some(political_bias_score(&political));
            result.political_context = Some(political);
        }

        result.detail.misinformation_risk = Some(misinformation.risk_score);
        result.misinformation = Some(misinformation);
        Ok(result)
    }

    pub async fn analyze_file(
        &self,
        bytes: &[u8],
        mime: &str,
        name: &str,
    ) -> Result<ProviderResult, EngineError> {
        if bytes.is_empty() {
            return Err(EngineError::EmptyFile);
        }

        let request = AnalysisRequest::file(bytes.to_vec(), mime, name);
        let mut primary = None;
        for provider in &self.vision_providers {
            if let Some(result) = provider.analyze(&request).await {
                info!(
                    "[ORCHESTRATOR] file analysis served by {}",
                    result.provider.name
                );
                primary = Some(result);
                break;
            }
        }

        let mut result = primary.unwrap_or_else(|| {
            info!("[ORCHESTRATOR] no vision providers available, using heuristic fallback");
            let mut fallback = heuristic_file_result(bytes, mime, name);
            fallback.flags.push(NO_PROVIDERS_FLAG.to_string());
            fallback
        });

        if let Some(deepfake) = analyze_deepfake_artifacts(bytes, mime) {
            result.detail.deepfake_score = Some(deepfake.artifact_score);
            result.deepfake = Some(deepfake);
        }
        Ok(result)
    }

    pub async fn analyze_link(&self, url: &str) -> Result<ProviderResult, EngineError> {
        let trimmed = url.trim();
        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(EngineError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                trimmed,
                parsed.scheme()
            )));
        }

        match self.fetcher.fetch_text(parsed.as_str()).await {
            Ok(text) => self.analyze_fetched_text(parsed.as_str(), &text).await,
            Err(e) => {
                warn!("[ORCHESTRATOR] link fetch failed for {}: {}", parsed, e);
                Ok(link_failure_result(parsed.as_str()))
            }
        }
    }

    async fn analyze_fetched_text(
        &self,
        url: &str,
        text: &str,
    ) -> Result<ProviderResult, EngineError> {
        let trimmed = text.trim();
        let extracted_chars = trimmed.chars().count();
        if extracted_chars < MIN_CONTENT_CHARS {
            info!(
                "[ORCHESTRATOR] link {} yielded {} chars, below the analysis minimum",
                url, extracted_chars
            );
            return Ok(insufficient_content_result(url, extracted_chars));
        }

        let truncated = truncate_chars(trimmed, MAX_CONTENT_CHARS);
        let mut result = self.analyze_text(&truncated).await?;
        result
            .meta
            .insert("sourceUrl".to_string(), serde_json::json!(url));
        result.meta.insert(
            "extractedChars".to_string(),
            serde_json::json!(extracted_chars),
        );
        Ok(result)
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ProviderResult, EngineError> {
        match request {
            AnalysisRequest::Text { text } => self.analyze_text(text).await,
            AnalysisRequest::Link { url } => self.analyze_link(url).await,
            AnalysisRequest::File { bytes, mime, name } => {
                self.analyze_file(bytes, mime, name).await
            }
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

fn link_failure_result(url: &str) -> ProviderResult {
    let provider = ProviderInfo::new("Link Analysis", ProviderMethod::Heuristic);
    let mut result = ProviderResult::new(
        0,
        "The link could not be fetched, so its content remains unverified.",
        provider,
    );
    result.verdict = Verdict::Uncertain;
    result.flags.push(LINK_FETCH_FLAG.to_string());
    result
        .meta
        .insert("sourceUrl".to_string(), serde_json::json!(url));
    result
}

fn insufficient_content_result(url: &str, extracted_chars: usize) -> ProviderResult {
    let provider = ProviderInfo::new("Link Analysis", ProviderMethod::Heuristic);
    let mut result = ProviderResult::new(
        50,
        "Too little readable text could be extracted from the link for a reliable analysis.",
        provider,
    );
    result.flags.push(LINK_THIN_FLAG.to_string());
    result
        .meta
        .insert("sourceUrl".to_string(), serde_json::json!(url));
    result.meta.insert(
        "extractedChars".to_string(),
        serde_json::json!(extracted_chars),
    );
    result
}
