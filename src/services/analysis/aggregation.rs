// Result Aggregation
// Weighted merge of provider results into a single consensus result

use crate::models::{
    clamp_score, DetailScores, ProviderInfo, ProviderMethod, ProviderResult, Verdict,
};
use std::collections::{HashMap, HashSet};

pub const HIGH_CONFIDENCE_FLOOR: u8 = 70;

fn mean_of(
    results: &[ProviderResult],
    pick: impl Fn(&DetailScores) -> Option<u8>,
) -> Option<u8> {
    let values: Vec<u8> = results.iter().filter_map(|r| pick(&r.detail)).collect();
    if values.is_empty() {
        None
    } else {
        Some(clamp_score(
            values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64,
        ))
    }
}

// Panics on an empty slice: the orchestrator routes to the heuristic
// fallback before aggregation, so an empty input is a caller bug.
pub fn aggregate_results(results: &[ProviderResult]) -> ProviderResult {
    assert!(
        !results.is_empty(),
        "aggregate_results requires at least one provider result"
    );

    let names: Vec<String> = results.iter().map(|r| r.provider.name.clone()).collect();

    if results.len() == 1 {
        let mut single = results[0].clone();
        single.ai_providers = Some(names);
        let audit = serde_json::json!({
            "confidence": single.confidence,
            "verdict": single.verdict.as_str(),
        });
        single.meta.insert(single.provider.name.clone(), audit);
        single
            .meta
            .insert("aggregatedFrom".to_string(), serde_json::json!(1));
        return single;
    }

    let mut weight_sum = 0.0;
    let mut weighted = 0.0;
    for result in results {
        let weight = result.provider.method.weight();
        weight_sum += weight;
        weighted += result.confidence as f64 * weight;
    }
    let confidence = clamp_score(weighted / weight_sum);

    let detail = DetailScores {
        text_patterns: mean_of(results, |d| d.text_patterns),
        language_model: mean_of(results, |d| d.language_model),
        semantic_coherence: mean_of(results, |d| d.semantic_coherence),
        human_likeness: mean_of(results, |d| d.human_likeness),
        deepfake_score: mean_of(results, |d| d.deepfake_score),
        political_bias: mean_of(results, |d| d.political_bias),
        misinformation_risk: mean_of(results, |d| d.misinformation_risk),
        manipulation_detection: mean_of(results, |d| d.manipulation_detection),
    };

    let mut seen = HashSet::new();
    let mut flags = Vec::new();
    for result in results {
        for flag in &result.flags {
            if seen.insert(flag.clone()) {
                flags.push(flag.clone());
            }
        }
    }

    let high_count = results
        .iter()
        .filter(|r| r.confidence > HIGH_CONFIDENCE_FLOOR)
        .count();
    let roster = names.join(", ");
    let summary = if high_count * 2 > results.len() {
        format!(
            "{} of {} providers ({}) report strong indicators of AI-generated content.",
            high_count,
            results.len(),
            roster
        )
    } else if high_count == 0 {
        format!(
            "All {} providers ({}) report signals consistent with human authorship.",
            results.len(),
            roster
        )
    } else {
        format!(
            "Provider opinions are mixed across {} sources ({}); treat the verdict as indicative.",
            results.len(),
            roster
        )
    };

    let mut meta = HashMap::new();
    for result in results {
        meta.insert(
            result.provider.name.clone(),
            serde_json::json!({
                "confidence": result.confidence,
                "verdict": result.verdict.as_str(),
            }),
        );
    }
    meta.insert(
        "aggregatedFrom".to_string(),
        serde_json::json!(results.len()),
    );

    ProviderResult {
        confidence,
        verdict: Verdict::from_confidence(confidence),
        flags,
        summary,
        detail,
        provider: ProviderInfo::new("Aggregated Analysis", ProviderMethod::Ensemble),
        ai_providers: Some(names),
        meta,
        political_context: None,
        misinformation: None,
        deepfake: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, method: ProviderMethod, confidence: u8) -> ProviderResult {
        ProviderResult::new(
            confidence,
            format!("{} summary", name),
            ProviderInfo::new(name, method),
        )
    }

    #[test]
    #[should_panic(expected = "at least one provider result")]
    fn test_empty_input_panics() {
        aggregate_results(&[]);
    }

    #[test]
    fn test_single_result_is_identity() {
        let mut original = result("Gemini", ProviderMethod::TextLlm, 82);
        original.flags.push("Formulaic transition phrases".to_string());
        original.detail.text_patterns = Some(77);

        let aggregated = aggregate_results(std::slice::from_ref(&original));
        assert_eq!(aggregated.confidence, 82);
        assert_eq!(aggregated.verdict, original.verdict);
        assert_eq!(aggregated.flags, original.flags);
        assert_eq!(aggregated.detail.text_patterns, Some(77));
        assert_eq!(aggregated.provider.name, "Gemini");
        assert_eq!(aggregated.ai_providers, Some(vec!["Gemini".to_string()]));
        assert!(aggregated.meta.contains_key("aggregatedFrom"));
        assert_eq!(aggregated.meta["Gemini"]["confidence"], 82);
    }

    #[test]
    fn test_weighted_average() {
        let results = vec![
            result("Gemini", ProviderMethod::TextLlm, 90),
            result("Mystery", ProviderMethod::Unknown, 10),
        ];
        let aggregated = aggregate_results(&results);
        // (90 * 1.2 + 10 * 0.5) / 1.7 = 66.47 -> 66
        assert_eq!(aggregated.confidence, 66);
        assert_eq!(aggregated.verdict, Verdict::Uncertain);
        assert_eq!(
            aggregated.ai_providers,
            Some(vec!["Gemini".to_string(), "Mystery".to_string()])
        );
    }

    #[test]
    fn test_flags_dedup_keeps_first_occurrence() {
        let mut first = result("Gemini", ProviderMethod::TextLlm, 80);
        first.flags = vec!["A".to_string(), "B".to_string()];
        let mut second = result("HuggingFace", ProviderMethod::Ensemble, 78);
        second.flags = vec!["B".to_string(), "C".to_string()];

        let aggregated = aggregate_results(&[first, second]);
        assert_eq!(
            aggregated.flags,
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_detail_mean_skips_absent_scores() {
        let mut first = result("Gemini", ProviderMethod::TextLlm, 60);
        first.detail.text_patterns = Some(80);
        first.detail.language_model = Some(70);
        let mut second = result("Ollama", ProviderMethod::LocalModel, 60);
        second.detail.language_model = Some(30);

        let aggregated = aggregate_results(&[first, second]);
        assert_eq!(aggregated.detail.text_patterns, Some(80));
        assert_eq!(aggregated.detail.language_model, Some(50));
        assert_eq!(aggregated.detail.deepfake_score, None);
    }

    #[test]
    fn test_summary_templates() {
        let strong = aggregate_results(&[
            result("Gemini", ProviderMethod::TextLlm, 90),
            result("HuggingFace", ProviderMethod::Ensemble, 85),
        ]);
        assert!(strong.summary.contains("strong indicators"));

        let clean = aggregate_results(&[
            result("Gemini", ProviderMethod::TextLlm, 30),
            result("HuggingFace", ProviderMethod::Ensemble, 20),
        ]);
        assert!(clean.summary.contains("human authorship"));

        let mixed = aggregate_results(&[
            result("Gemini", ProviderMethod::TextLlm, 90),
            result("HuggingFace", ProviderMethod::Ensemble, 20),
        ]);
        assert!(mixed.summary.contains("mixed"));
    }

    #[test]
    fn test_per_provider_meta_recorded() {
        let aggregated = aggregate_results(&[
            result("Gemini", ProviderMethod::TextLlm, 90),
            result("Ollama", ProviderMethod::LocalModel, 40),
        ]);
        let gemini = &aggregated.meta["Gemini"];
        assert_eq!(gemini["confidence"], 90);
        assert_eq!(gemini["verdict"], "AI");
    }
}
