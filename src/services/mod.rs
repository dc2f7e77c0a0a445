// SatyaCheck Core Services
// Analysis orchestration, provider adapters and supporting stores

pub mod analysis;
pub mod config_store;
pub mod lenient_json;
pub mod link_fetcher;
pub mod providers;
pub mod rate_limiter;

pub use config_store::*;
pub use lenient_json::*;
pub use link_fetcher::*;
pub use rate_limiter::*;

// Re-export the analysis and provider surface
pub use analysis::{
    aggregate_results,
    analyze_deepfake_artifacts,
    analyze_misinformation,
    analyze_political_context,
    heuristic_file_result,
    heuristic_text_result,
    AnalysisEngine,
    EngineError,
};
pub use providers::{ProviderAdapter, ProviderError};
