// SatyaCheck Data Models
// Shared schema for analysis requests, provider results and context overlays

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confidence above this value means the content is judged AI-generated.
pub const AI_VERDICT_THRESHOLD: u8 = 75;
/// Confidence below this value means the content is judged human-authored.
pub const HUMAN_VERDICT_THRESHOLD: u8 = 25;

const INPUT_LABEL_MAX_CHARS: usize = 1_000;

// ============ Analysis Request ============

/// Submitted content, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnalysisRequest {
    Text { text: String },
    Link { url: String },
    File { bytes: Vec<u8>, mime: String, name: String },
}

impl AnalysisRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self::Link { url: url.into() }
    }

    pub fn file(bytes: Vec<u8>, mime: impl Into<String>, name: impl Into<String>) -> Self {
        Self::File {
            bytes,
            mime: mime.into(),
            name: name.into(),
        }
    }

    /// Stable tag used for routing logs and scan records.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Link { .. } => "link",
            Self::File { .. } => "file",
        }
    }
}

// ============ Verdict ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Human,
    Ai,
    Uncertain,
}

impl Verdict {
    /// Single source of truth for the confidence-to-verdict mapping.
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence > AI_VERDICT_THRESHOLD {
            Verdict::Ai
        } else if confidence < HUMAN_VERDICT_THRESHOLD {
            Verdict::Human
        } else {
            Verdict::Uncertain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Human => "HUMAN",
            Verdict::Ai => "AI",
            Verdict::Uncertain => "UNCERTAIN",
        }
    }
}

/// Round and clamp an arbitrary score into the canonical [0, 100] range.
pub fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

// ============ Provider Identity ============

/// Closed set of analysis method tags; unrecognized providers map to Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMethod {
    TextLlm,
    VisionLlm,
    Ensemble,
    LocalModel,
    Heuristic,
    Unknown,
}

impl ProviderMethod {
    /// Relative reliability weight used during aggregation.
    pub fn weight(self) -> f64 {
        match self {
            ProviderMethod::TextLlm | ProviderMethod::VisionLlm => 1.2,
            ProviderMethod::Ensemble => 1.0,
            ProviderMethod::LocalModel => 0.8,
            ProviderMethod::Heuristic => 0.6,
            ProviderMethod::Unknown => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub name: String,
    pub method: ProviderMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, method: ProviderMethod) -> Self {
        Self {
            name: name.into(),
            method,
            model: None,
        }
    }

    pub fn with_model(name: impl Into<String>, method: ProviderMethod, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            model: Some(model.into()),
        }
    }
}

// ============ Detail Scores ============

/// Per-dimension sub-scores in [0, 100]; absent means the producing
/// provider does not support that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_patterns: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_model: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_coherence: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_likeness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepfake_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub political_bias: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misinformation_risk: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manipulation_detection: Option<u8>,
}

// ============ Context Overlays ============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliticalContext {
    pub is_election_related: bool,
    #[serde(default)]
    pub detected_parties: Vec<String>,
    #[serde(default)]
    pub detected_leaders: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisinformationAnalysis {
    pub risk_score: u8,
    #[serde(default)]
    pub propaganda_terms: Vec<String>,
    #[serde(default)]
    pub emotional_triggers: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepfakeAnalysis {
    pub artifact_score: u8,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub requires_frame_review: bool,
}

// ============ Provider Result ============

/// Normalized output of one provider (or of the aggregator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    /// Likelihood the content is AI-generated, always in [0, 100].
    pub confidence: u8,
    pub verdict: Verdict,
    #[serde(default)]
    pub flags: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub detail: DetailScores,
    pub provider: ProviderInfo,
    /// Names of contributing providers, in fixed declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_providers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub political_context: Option<PoliticalContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misinformation: Option<MisinformationAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepfake: Option<DeepfakeAnalysis>,
}

impl ProviderResult {
    /// Build a result with the verdict derived from the confidence thresholds.
    pub fn new(confidence: u8, summary: impl Into<String>, provider: ProviderInfo) -> Self {
        let confidence = confidence.min(100);
        Self {
            confidence,
            verdict: Verdict::from_confidence(confidence),
            flags: Vec::new(),
            summary: summary.into(),
            detail: DetailScores::default(),
            provider,
            ai_providers: None,
            meta: HashMap::new(),
            political_context: None,
            misinformation: None,
            deepfake: None,
        }
    }
}

// ============ Scan Record ============

/// Analysis outcome packaged for the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub content_type: String,
    pub input_label: String,
    pub result: ProviderResult,
    pub created_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(content_type: &str, input_label: &str, result: ProviderResult) -> Self {
        let label: String = input_label.chars().take(INPUT_LABEL_MAX_CHARS).collect();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content_type: content_type.to_string(),
            input_label: label,
            result,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_confidence(76), Verdict::Ai);
        assert_eq!(Verdict::from_confidence(75), Verdict::Uncertain);
        assert_eq!(Verdict::from_confidence(25), Verdict::Uncertain);
        assert_eq!(Verdict::from_confidence(24), Verdict::Human);
        assert_eq!(Verdict::from_confidence(0), Verdict::Human);
        assert_eq!(Verdict::from_confidence(100), Verdict::Ai);
    }

    #[test]
    fn test_verdict_serialization() {
        assert_eq!(serde_json::to_string(&Verdict::Ai).unwrap(), "\"AI\"");
        assert_eq!(serde_json::to_string(&Verdict::Human).unwrap(), "\"HUMAN\"");
        assert_eq!(
            serde_json::to_string(&Verdict::Uncertain).unwrap(),
            "\"UNCERTAIN\""
        );
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5.0), 0);
        assert_eq!(clamp_score(49.6), 50);
        assert_eq!(clamp_score(140.0), 100);
        assert_eq!(clamp_score(66.4), 66);
    }

    #[test]
    fn test_method_weights() {
        assert_eq!(ProviderMethod::TextLlm.weight(), 1.2);
        assert_eq!(ProviderMethod::VisionLlm.weight(), 1.2);
        assert_eq!(ProviderMethod::Ensemble.weight(), 1.0);
        assert_eq!(ProviderMethod::LocalModel.weight(), 0.8);
        assert_eq!(ProviderMethod::Heuristic.weight(), 0.6);
        assert_eq!(ProviderMethod::Unknown.weight(), 0.5);
    }

    #[test]
    fn test_result_serialization_camel_case() {
        let mut result = ProviderResult::new(
            80,
            "test",
            ProviderInfo::new("Gemini", ProviderMethod::TextLlm),
        );
        result.detail.text_patterns = Some(70);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "AI");
        assert_eq!(json["detail"]["textPatterns"], 70);
        // Unsupported sub-scores stay off the wire entirely.
        assert!(json["detail"].get("deepfakeScore").is_none());
        assert!(json.get("aiProviders").is_none());
    }

    #[test]
    fn test_new_result_derives_verdict() {
        let info = ProviderInfo::new("Heuristic Analysis", ProviderMethod::Heuristic);
        assert_eq!(ProviderResult::new(90, "", info.clone()).verdict, Verdict::Ai);
        assert_eq!(ProviderResult::new(10, "", info.clone()).verdict, Verdict::Human);
        assert_eq!(ProviderResult::new(50, "", info).verdict, Verdict::Uncertain);
    }

    #[test]
    fn test_scan_record_truncates_label() {
        let info = ProviderInfo::new("Heuristic Analysis", ProviderMethod::Heuristic);
        let result = ProviderResult::new(50, "test", info);
        let long_label = "x".repeat(5_000);
        let record = ScanRecord::new("text", &long_label, result);
        assert_eq!(record.input_label.chars().count(), 1_000);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_scan_record_serialization() {
        let info = ProviderInfo::new("Gemini", ProviderMethod::TextLlm);
        let result = ProviderResult::new(82, "likely generated", info);
        let record = ScanRecord::new("text", "sample input", result);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["contentType"], "text");
        assert_eq!(json["result"]["confidence"], 82);
        assert!(json["createdAt"].is_string());

        let back: ScanRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.created_at, record.created_at);
    }

    #[test]
    fn test_request_kind_labels() {
        assert_eq!(AnalysisRequest::text("hello").kind_label(), "text");
        assert_eq!(AnalysisRequest::link("https://example.com").kind_label(), "link");
        assert_eq!(
            AnalysisRequest::file(vec![1, 2], "image/png", "a.png").kind_label(),
            "file"
        );
    }
}
