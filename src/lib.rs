//! Assess Signals - feature extraction and weighted scoring engine for
//! child behavioral assessment sessions.
//!
//! The engine turns captured behavioral signals into scored, human-readable
//! results through a deterministic pipeline: signal reduction → metric
//! synthesis → normalization → weighted scoring → aggregate merge.
//!
//! ## Modalities
//!
//! - **Voice**: per-callback audio windows and spectra → `VoiceMetrics`
//! - **Attention**: pointer/target tracking runs → `AttentionMetrics`
//! - **Facial / Writing**: metric sets inferred by an external model, scored
//!   and merged here

pub mod aggregate;
pub mod attention;
pub mod error;
pub mod pipeline;
pub mod profiles;
pub mod reducers;
pub mod scorer;
pub mod store;
pub mod types;
pub mod voice;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregate::AssessmentAggregate;
pub use attention::synthesize_attention_metrics;
pub use error::EngineError;
pub use pipeline::{
    analyze_attention, analyze_voice, score_modality, AssessmentEngine, AttentionAnalysis,
    VoiceAnalysis,
};
pub use scorer::score;
pub use store::AssessmentStore;
pub use types::{
    AttentionMetrics, AudioConfig, Comparator, MetricSet, Modality, QuestionnaireData,
    ScoredResult, SuggestionRule, TrackingConfig, TrackingSample, VoiceMetrics, WeightTable,
};
pub use voice::synthesize_voice_metrics;

/// Engine version stamped into exported payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for exported payloads
pub const PRODUCER_NAME: &str = "assess-signals";
