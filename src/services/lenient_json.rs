// Lenient Judgment Decoding
// Recovers structured detection judgments from imperfect model output

use crate::models::{clamp_score, Verdict};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

const NEUTRAL_CONFIDENCE: u8 = 50;

/// Which recovery strategy produced the judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Strict,
    FieldExtraction,
    Neutral,
}

impl DecodeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeStrategy::Strict => "strict",
            DecodeStrategy::FieldExtraction => "fieldExtraction",
            DecodeStrategy::Neutral => "neutral",
        }
    }
}

/// Normalized judgment extracted from a provider's free-form response.
#[derive(Debug, Clone)]
pub struct Judgment {
    pub confidence: u8,
    pub verdict: Option<Verdict>,
    pub reasoning: Option<String>,
    pub flags: Vec<String>,
    pub scores: JudgmentScores,
    pub strategy: DecodeStrategy,
}

/// Optional sub-scores a model may report; values accepted on either scale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentScores {
    #[serde(default)]
    pub text_patterns: Option<f64>,
    #[serde(default)]
    pub language_model: Option<f64>,
    #[serde(default)]
    pub semantic_coherence: Option<f64>,
    #[serde(default)]
    pub human_likeness: Option<f64>,
}

impl JudgmentScores {
    pub fn text_patterns_score(&self) -> Option<u8> {
        self.text_patterns.map(normalize_confidence)
    }

    pub fn language_model_score(&self) -> Option<u8> {
        self.language_model.map(normalize_confidence)
    }

    pub fn semantic_coherence_score(&self) -> Option<u8> {
        self.semantic_coherence.map(normalize_confidence)
    }

    pub fn human_likeness_score(&self) -> Option<u8> {
        self.human_likeness.map(normalize_confidence)
    }
}

/// Permissive wire shape; every field is optional so a partially valid
/// response still decodes.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawJudgment {
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, alias = "ai_probability", alias = "aiProbability")]
    probability: Option<f64>,
    #[serde(default)]
    verdict: Option<String>,
    #[serde(default, alias = "explanation", alias = "analysis")]
    reasoning: Option<String>,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    scores: JudgmentScores,
}

/// Map a reported confidence onto [0, 100]. Fractions in [0, 1] are treated
/// as probabilities and scaled up; everything else is rounded and clamped.
pub fn normalize_confidence(value: f64) -> u8 {
    if !value.is_finite() {
        return NEUTRAL_CONFIDENCE;
    }
    if (0.0..=1.0).contains(&value) {
        clamp_score(value * 100.0)
    } else {
        clamp_score(value)
    }
}

/// Map a verdict word onto the closed verdict set; None for anything else.
pub fn parse_verdict(word: &str) -> Option<Verdict> {
    match word.trim().to_ascii_uppercase().as_str() {
        "AI" | "AI_GENERATED" | "GENERATED" | "FAKE" | "SYNTHETIC" | "MACHINE" => Some(Verdict::Ai),
        "HUMAN" | "REAL" | "AUTHENTIC" | "ORIGINAL" => Some(Verdict::Human),
        "UNCERTAIN" | "UNKNOWN" | "MIXED" | "INCONCLUSIVE" => Some(Verdict::Uncertain),
        _ => None,
    }
}

/// Decode a model response with three ordered strategies: strict JSON after
/// fence and prose stripping, then per-field regex extraction, then a
/// neutral judgment so analysis always continues.
pub fn decode_judgment(content: &str) -> Judgment {
    if let Some(judgment) = decode_strict(content) {
        return judgment;
    }
    if let Some(judgment) = decode_fields(content) {
        debug!("[LENIENT_JSON] strict parse failed, recovered via field extraction");
        return judgment;
    }
    debug!("[LENIENT_JSON] unusable response, falling back to neutral judgment");
    neutral_judgment()
}

fn decode_strict(content: &str) -> Option<Judgment> {
    let json_str = extract_json(content)?;
    let raw: RawJudgment = serde_json::from_str(&json_str).ok()?;
    let confidence = raw.confidence.or(raw.probability)?;

    Some(Judgment {
        confidence: normalize_confidence(confidence),
        verdict: raw.verdict.as_deref().and_then(parse_verdict),
        reasoning: raw.reasoning.filter(|r| !r.trim().is_empty()),
        flags: raw.flags,
        scores: raw.scores,
        strategy: DecodeStrategy::Strict,
    })
}

fn decode_fields(content: &str) -> Option<Judgment> {
    let confidence = confidence_re()
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())?;

    let verdict = verdict_re()
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_verdict(m.as_str()));

    let reasoning = reasoning_re()
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|r| !r.trim().is_empty());

    Some(Judgment {
        confidence: normalize_confidence(confidence),
        verdict,
        reasoning,
        flags: Vec::new(),
        scores: JudgmentScores::default(),
        strategy: DecodeStrategy::FieldExtraction,
    })
}

fn neutral_judgment() -> Judgment {
    Judgment {
        confidence: NEUTRAL_CONFIDENCE,
        verdict: None,
        reasoning: None,
        flags: Vec::new(),
        scores: JudgmentScores::default(),
        strategy: DecodeStrategy::Neutral,
    }
}

/// Slice out the JSON object, tolerating markdown fences and surrounding
/// prose (first '{' through last '}').
fn extract_json(content: &str) -> Option<String> {
    let stripped = strip_code_fences(content);
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end < start {
        return None;
    }
    Some(stripped[start..=end].to_string())
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

fn confidence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)"?(?:confidence|probability)"?\s*[:=]\s*"?(-?[0-9]+(?:\.[0-9]+)?)"#)
            .expect("confidence regex")
    })
}

fn verdict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)"?verdict"?\s*[:=]\s*"?([A-Za-z_]+)"#).expect("verdict regex")
    })
}

fn reasoning_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)"?reasoning"?\s*[:=]\s*"((?:[^"\\]|\\.)*)""#).expect("reasoning regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_clean_json() {
        let judgment =
            decode_judgment(r#"{"confidence": 82, "verdict": "AI", "reasoning": "formulaic"}"#);
        assert_eq!(judgment.strategy, DecodeStrategy::Strict);
        assert_eq!(judgment.confidence, 82);
        assert_eq!(judgment.verdict, Some(Verdict::Ai));
        assert_eq!(judgment.reasoning.as_deref(), Some("formulaic"));
    }

    #[test]
    fn test_strict_with_markdown_fence() {
        let content = "```json\n{\"confidence\": 0.9, \"verdict\": \"AI\"}\n```";
        let judgment = decode_judgment(content);
        assert_eq!(judgment.strategy, DecodeStrategy::Strict);
        assert_eq!(judgment.confidence, 90);
    }

    #[test]
    fn test_strict_with_leading_prose() {
        let content = "Here is my analysis:\n{\"confidence\": 35, \"verdict\": \"UNCERTAIN\"}";
        let judgment = decode_judgment(content);
        assert_eq!(judgment.strategy, DecodeStrategy::Strict);
        assert_eq!(judgment.confidence, 35);
        assert_eq!(judgment.verdict, Some(Verdict::Uncertain));
    }

    #[test]
    fn test_strict_reads_sub_scores() {
        let content = r#"{"confidence": 70, "scores": {"textPatterns": 0.6, "humanLikeness": 40}}"#;
        let judgment = decode_judgment(content);
        assert_eq!(judgment.scores.text_patterns_score(), Some(60));
        assert_eq!(judgment.scores.human_likeness_score(), Some(40));
        assert_eq!(judgment.scores.language_model_score(), None);
    }

    #[test]
    fn test_field_extraction_on_broken_json() {
        // Trailing junk breaks the object, so strict parsing cannot succeed.
        let content = r#"The result is {"confidence": 0.9, "verdict": "AI", oops"#;
        let judgment = decode_judgment(content);
        assert_eq!(judgment.strategy, DecodeStrategy::FieldExtraction);
        assert_eq!(judgment.confidence, 90);
        assert_eq!(judgment.verdict, Some(Verdict::Ai));
    }

    #[test]
    fn test_field_extraction_without_braces() {
        let content = "confidence: 64\nverdict: HUMAN\nreasoning: \"natural phrasing\"";
        let judgment = decode_judgment(content);
        assert_eq!(judgment.strategy, DecodeStrategy::FieldExtraction);
        assert_eq!(judgment.confidence, 64);
        assert_eq!(judgment.verdict, Some(Verdict::Human));
        assert_eq!(judgment.reasoning.as_deref(), Some("natural phrasing"));
    }

    #[test]
    fn test_neutral_fallback() {
        let judgment = decode_judgment("I am unable to analyze this content.");
        assert_eq!(judgment.strategy, DecodeStrategy::Neutral);
        assert_eq!(judgment.confidence, 50);
        assert_eq!(judgment.verdict, None);
    }

    #[test]
    fn test_normalize_confidence_scales() {
        assert_eq!(normalize_confidence(0.42), 42);
        assert_eq!(normalize_confidence(1.0), 100);
        assert_eq!(normalize_confidence(0.0), 0);
        assert_eq!(normalize_confidence(42.0), 42);
        assert_eq!(normalize_confidence(250.0), 100);
        assert_eq!(normalize_confidence(-3.0), 0);
        assert_eq!(normalize_confidence(f64::NAN), 50);
    }

    #[test]
    fn test_parse_verdict_synonyms() {
        assert_eq!(parse_verdict("fake"), Some(Verdict::Ai));
        assert_eq!(parse_verdict("Real"), Some(Verdict::Human));
        assert_eq!(parse_verdict("INCONCLUSIVE"), Some(Verdict::Uncertain));
        assert_eq!(parse_verdict("banana"), None);
    }
}
