// Political Context Overlay
// Multilingual election-content detection for Indian political discourse

use crate::models::{clamp_score, PoliticalContext};
use regex::Regex;
use std::sync::OnceLock;

// Display name plus lowercase aliases, English and regional scripts.
const PARTY_TERMS: &[(&str, &[&str])] = &[
    ("BJP", &["bjp", "bharatiya janata party", "भाजपा"]),
    ("Congress", &["congress", "inc", "कांग्रेस"]),
    ("AAP", &["aap", "aam aadmi party", "आम आदमी पार्टी"]),
    ("TMC", &["tmc", "trinamool", "তৃণমূল"]),
    ("DMK", &["dmk", "திமுக"]),
    ("AIADMK", &["aiadmk", "அதிமுக"]),
    ("Shiv Sena", &["shiv sena", "शिवसेना"]),
    ("NCP", &["ncp", "nationalist congress party"]),
    ("BSP", &["bsp", "bahujan samaj party"]),
    ("Samajwadi Party", &["samajwadi party", "समाजवादी पार्टी"]),
    ("JD(U)", &["jdu", "jd(u)", "janata dal united"]),
    ("RJD", &["rjd", "rashtriya janata dal"]),
    ("BJD", &["bjd", "biju janata dal"]),
    ("YSRCP", &["ysrcp", "ysr congress"]),
    ("TDP", &["tdp", "telugu desam"]),
    ("BRS", &["brs", "bharat rashtra samithi"]),
];

const LEADER_TERMS: &[(&str, &[&str])] = &[
    ("Narendra Modi", &["narendra modi", "modi", "मोदी"]),
    ("Rahul Gandhi", &["rahul gandhi", "राहुल गांधी"]),
    ("Amit Shah", &["amit shah", "अमित शाह"]),
    ("Arvind Kejriwal", &["arvind kejriwal", "kejriwal", "केजरीवाल"]),
    ("Mamata Banerjee", &["mamata banerjee", "mamata", "মমতা"]),
    ("Yogi Adityanath", &["yogi adityanath", "adityanath", "योगी"]),
    ("M.K. Stalin", &["m.k. stalin", "mk stalin", "stalin", "ஸ்டாலின்"]),
    ("Akhilesh Yadav", &["akhilesh yadav", "akhilesh", "अखिलेश"]),
    ("Mayawati", &["mayawati", "मायावती"]),
    ("Nitish Kumar", &["nitish kumar", "nitish", "नीतीश"]),
];

const ELECTION_TERMS_EN: &[&str] = &[
    "election",
    "vote",
    "voting",
    "ballot",
    "polling",
    "constituency",
    "exit poll",
    "lok sabha",
    "vidhan sabha",
    "evm",
    "manifesto",
];

const ELECTION_TERMS_HI: &[&str] = &["चुनाव", "मतदान", "वोट", "भाजपा", "कांग्रेस"];
const ELECTION_TERMS_BN: &[&str] = &["নির্বাচন", "ভোট"];
const ELECTION_TERMS_TA: &[&str] = &["தேர்தல்", "வாக்கு"];
const ELECTION_TERMS_TE: &[&str] = &["ఎన్నికలు", "ఓటు"];

fn absolutist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)will definitely (win|lose)|never (lose|win)|100% (win|victory|sure)|guaranteed (win|victory)")
            .expect("absolutist regex")
    })
}

fn inflammatory_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)anti-national|traitor|deshdrohi|देशद्रोही|गद्दार")
            .expect("inflammatory regex")
    })
}

fn prediction_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)will (win|sweep) \d+|\d+\+? seats|landslide (victory|win)")
            .expect("prediction regex")
    })
}

// Substring match guarded by non-alphanumeric neighbors, so short aliases
// like "inc" or "aap" do not fire inside ordinary words. Match offsets from
// `find` are char boundaries, which keeps the slicing safe for all scripts.
fn has_term(haystack: &str, term: &str) -> bool {
    let mut searched = haystack;
    let mut offset = 0;
    while let Some(pos) = searched.find(term) {
        let start = offset + pos;
        let end = start + term.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        let step = pos + term.len();
        searched = &searched[step..];
        offset += step;
    }
    false
}

fn detect_names(lower: &str, table: &[(&str, &[&str])]) -> Vec<String> {
    table
        .iter()
        .filter(|(_, aliases)| aliases.iter().any(|alias| has_term(lower, alias)))
        .map(|(display, _)| (*display).to_string())
        .collect()
}

pub fn analyze_political_context(text: &str) -> PoliticalContext {
    let lower = text.to_lowercase();

    let detected_parties = detect_names(&lower, PARTY_TERMS);
    let detected_leaders = detect_names(&lower, LEADER_TERMS);

    let script_sets: [(&str, &[&str]); 4] = [
        ("hi", ELECTION_TERMS_HI),
        ("bn", ELECTION_TERMS_BN),
        ("ta", ELECTION_TERMS_TA),
        ("te", ELECTION_TERMS_TE),
    ];
    let mut regional_matches = 0;
    let mut detected_language = None;
    let mut best = 0;
    for (code, terms) in script_sets {
        let matched = terms.iter().filter(|t| has_term(&lower, t)).count();
        regional_matches += matched;
        if matched > best {
            best = matched;
            detected_language = Some(code.to_string());
        }
    }
    let english_matches = ELECTION_TERMS_EN
        .iter()
        .filter(|t| has_term(&lower, t))
        .count();

    let is_election_related = !detected_parties.is_empty()
        || !detected_leaders.is_empty()
        || english_matches > 0
        || regional_matches > 0;

    let mut risk_factors = Vec::new();
    if (!detected_parties.is_empty() || !detected_leaders.is_empty())
        && absolutist_re().is_match(text)
    {
        risk_factors.push("Absolutist claims about electoral outcomes".to_string());
    }
    if inflammatory_re().is_match(text) {
        risk_factors.push("Inflammatory labeling of political actors".to_string());
    }
    if prediction_re().is_match(text) {
        risk_factors.push("Unverifiable electoral predictions".to_string());
    }

    PoliticalContext {
        is_election_related,
        detected_parties,
        detected_leaders,
        detected_language,
        risk_factors,
    }
}

// Coarse bias-exposure reading for the detail block, not a verdict input.
pub fn political_bias_score(context: &PoliticalContext) -> u8 {
    let mut score = 0.0;
    if context.is_election_related {
        score += 15.0;
    }
    score += context.detected_parties.len() as f64 * 12.0;
    score += context.detected_leaders.len() as f64 * 10.0;
    score += context.risk_factors.len() as f64 * 18.0;
    clamp_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_parties_and_one_leader() {
        let context = analyze_political_context(
            "The BJP and Congress are campaigning hard while Narendra Modi tours the state.",
        );
        assert!(context.is_election_related);
        assert_eq!(context.detected_parties.len(), 2);
        assert_eq!(context.detected_leaders, vec!["Narendra Modi".to_string()]);
    }

    #[test]
    fn test_short_aliases_respect_word_boundaries() {
        let context = analyze_political_context(
            "The incredible aapke incident included nothing remarkable.",
        );
        assert!(!context.is_election_related);
        assert!(context.detected_parties.is_empty());
    }

    #[test]
    fn test_hindi_detection() {
        let context = analyze_political_context("चुनाव में मतदान करें और भाजपा को वोट दें");
        assert!(context.is_election_related);
        assert_eq!(context.detected_language.as_deref(), Some("hi"));
        assert!(context.detected_parties.contains(&"BJP".to_string()));
    }

    #[test]
    fn test_risk_factors_detected() {
        let context = analyze_political_context(
            "Modi will definitely win this election with a landslide victory.",
        );
        assert_eq!(context.detected_leaders, vec!["Narendra Modi".to_string()]);
        assert!(context
            .risk_factors
            .iter()
            .any(|r| r == "Absolutist claims about electoral outcomes"));
        assert!(context
            .risk_factors
            .iter()
            .any(|r| r == "Unverifiable electoral predictions"));
    }

    #[test]
    fn test_neutral_text_has_no_signal() {
        let context = analyze_political_context(
            "The new metro line between the airport and the business district opens in March.",
        );
        assert!(!context.is_election_related);
        assert!(context.detected_language.is_none());
        assert!(context.risk_factors.is_empty());
    }

    #[test]
    fn test_bias_score_scales_with_signals() {
        let strong = analyze_political_context(
            "BJP and Congress clash as Modi predicts a landslide victory with 400+ seats.",
        );
        let weak = analyze_political_context("Voters discussed the election calmly.");
        assert!(political_bias_score(&strong) > political_bias_score(&weak));
        assert!(political_bias_score(&strong) <= 100);
    }
}
