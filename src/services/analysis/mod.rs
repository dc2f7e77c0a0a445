// Analysis Module
// Content authenticity analysis organized into specialized submodules:
// - orchestrator: Routes requests through providers, fallback and overlays
// - aggregation: Merges provider results into a single consensus result
// - heuristics: Offline fallback scoring for text and binary content
// - political: Election-content detection for Indian political discourse
// - misinformation: Propaganda phrasing and viral-forward pressure signals
// - deepfake: Byte-level artifact screening for media payloads

pub mod aggregation;
pub mod deepfake;
pub mod heuristics;
pub mod misinformation;
pub mod orchestrator;
pub mod political;

// Re-export commonly used functions
pub use aggregation::aggregate_results;
pub use deepfake::analyze_deepfake_artifacts;
pub use heuristics::{heuristic_file_result, heuristic_text_result, shannon_entropy};
pub use misinformation::analyze_misinformation;
pub use orchestrator::{AnalysisEngine, EngineError};
pub use political::{analyze_political_context, political_bias_score};
