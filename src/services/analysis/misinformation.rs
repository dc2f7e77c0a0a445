// Misinformation Overlay
// Propaganda phrasing, sourcing gaps and viral-forward pressure signals

use crate::models::{clamp_score, MisinformationAnalysis};
use regex::Regex;
use std::sync::OnceLock;

const PROPAGANDA_SCORE: f64 = 8.0;
const TRIGGER_SCORE: f64 = 6.0;
const MISSING_ATTRIBUTION_SCORE: f64 = 15.0;
const ANONYMOUS_SOURCING_SCORE: f64 = 12.0;
const CONSPIRACY_SCORE: f64 = 18.0;
const CALL_TO_ACTION_SCORE: f64 = 15.0;
// Inputs at or below this length are not expected to carry sourcing phrases.
const ATTRIBUTION_WORD_FLOOR: usize = 40;

const PROPAGANDA_TERMS: &[&str] = &[
    "mainstream media won't tell you",
    "the truth they hide",
    "do your own research",
    "wake up",
    "sheeple",
    "presstitute",
    "godi media",
    "urban naxal",
    "tukde tukde",
];

const EMOTIONAL_TRIGGERS: &[&str] = &[
    "shocking",
    "outrageous",
    "you won't believe",
    "must watch",
    "horrifying",
    "danger to our nation",
    "before it's deleted",
    "exposed",
];

fn attribution_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)according to|reported by|sources? said|as per|official statement|study")
            .expect("attribution regex")
    })
}

fn anonymous_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)sources say|insiders claim|forwarded as received|whatsapp forward")
            .expect("anonymous sourcing regex")
    })
}

fn conspiracy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)first they|then they|connect the dots|this is how they")
            .expect("conspiracy regex")
    })
}

fn call_to_action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)share (this )?(immediately|before)|forward (this )?to (all|everyone)|make (this|it) viral",
        )
        .expect("call to action regex")
    })
}

pub fn analyze_misinformation(text: &str) -> MisinformationAnalysis {
    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();

    let propaganda_terms: Vec<String> = PROPAGANDA_TERMS
        .iter()
        .filter(|t| lower.contains(*t))
        .map(|t| (*t).to_string())
        .collect();
    let emotional_triggers: Vec<String> = EMOTIONAL_TRIGGERS
        .iter()
        .filter(|t| lower.contains(*t))
        .map(|t| (*t).to_string())
        .collect();

    let mut score = propaganda_terms.len() as f64 * PROPAGANDA_SCORE
        + emotional_triggers.len() as f64 * TRIGGER_SCORE;
    let mut patterns = Vec::new();

    if word_count > ATTRIBUTION_WORD_FLOOR && !attribution_re().is_match(text) {
        score += MISSING_ATTRIBUTION_SCORE;
        patterns.push("Missing source attribution".to_string());
    }
    if anonymous_re().is_match(text) {
        score += ANONYMOUS_SOURCING_SCORE;
        patterns.push("Anonymous or unverifiable sourcing".to_string());
    }
    if conspiracy_re().is_match(text) {
        score += CONSPIRACY_SCORE;
        patterns.push("Conspiratorial narrative structure".to_string());
    }
    if call_to_action_re().is_match(text) {
        score += CALL_TO_ACTION_SCORE;
        patterns.push("Viral call-to-action pressure".to_string());
    }

    MisinformationAnalysis {
        risk_score: clamp_score(score),
        propaganda_terms,
        emotional_triggers,
        patterns,
    }
}
