//! Pipeline orchestration
//!
//! This module provides the public API of the engine. Each modality runs the
//! same stages: synthesize a metric record from captured signals (or accept
//! one from an external inference collaborator), normalize it into a metric
//! set, score it against the modality's profile, and merge the scored result
//! into the assessment aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::AssessmentAggregate;
use crate::attention::synthesize_attention_metrics;
use crate::error::EngineError;
use crate::profiles::{attention_metric_set, profile_for, voice_metric_set};
use crate::scorer::score;
use crate::store::AssessmentStore;
use crate::types::{
    AttentionMetrics, AudioConfig, MetricSet, Modality, QuestionnaireData, ScoredResult,
    TrackingConfig, TrackingSample, VoiceMetrics,
};
use crate::voice::synthesize_voice_metrics;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Raw and scored output of one voice analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAnalysis {
    pub metrics: VoiceMetrics,
    pub scored: ScoredResult,
}

/// Raw and scored output of one completed tracking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionAnalysis {
    pub metrics: AttentionMetrics,
    pub scored: ScoredResult,
}

/// Analyze one audio callback's window and spectrum.
///
/// Stages: synthesize `VoiceMetrics`, normalize to a metric set, score with
/// the voice profile.
pub fn analyze_voice(
    window: &[f32],
    spectrum: &[f32],
    config: &AudioConfig,
) -> Result<VoiceAnalysis, EngineError> {
    let metrics = synthesize_voice_metrics(window, spectrum, config)?;
    let set = voice_metric_set(&metrics);
    let profile = profile_for(Modality::Voice, &set);
    let scored = score(&set, &profile.weights, &profile.rules)?;
    Ok(VoiceAnalysis { metrics, scored })
}

/// Analyze one completed attention exercise run.
pub fn analyze_attention(
    samples: &[TrackingSample],
    config: &TrackingConfig,
) -> Result<AttentionAnalysis, EngineError> {
    let metrics = synthesize_attention_metrics(samples, config)?;
    let set = attention_metric_set(&metrics);
    let profile = profile_for(Modality::Attention, &set);
    let scored = score(&set, &profile.weights, &profile.rules)?;
    Ok(AttentionAnalysis { metrics, scored })
}

/// Score a ready-made metric set under the named modality's profile.
///
/// This is the entry point for modalities whose metrics come from an
/// external inference collaborator (facial expression, handwriting); they
/// bypass the synthesizers and join the pipeline here.
pub fn score_modality(modality: Modality, metrics: &MetricSet) -> Result<ScoredResult, EngineError> {
    let profile = profile_for(modality, metrics);
    score(metrics, &profile.weights, &profile.rules)
}

// ----------------------------------------------------------------------------
// Request shapes shared by the CLI and FFI surfaces
// ----------------------------------------------------------------------------

/// One audio callback's capture, as submitted over the JSON boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceFrameRequest {
    pub window: Vec<f32>,
    pub spectrum: Vec<f32>,
    #[serde(default)]
    pub config: AudioConfig,
}

/// One completed tracking run, as submitted over the JSON boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRunRequest {
    pub samples: Vec<TrackingSample>,
    #[serde(default)]
    pub config: TrackingConfig,
}

/// Externally inferred metrics for one modality, as submitted over the JSON
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalMetricsRequest {
    pub modality: Modality,
    pub metrics: MetricSet,
}

/// Parse a voice frame request, analyze it, and serialize the analysis.
pub fn analyze_voice_json(request_json: &str) -> Result<String, EngineError> {
    let request: VoiceFrameRequest = serde_json::from_str(request_json)?;
    let analysis = analyze_voice(&request.window, &request.spectrum, &request.config)?;
    Ok(serde_json::to_string_pretty(&analysis)?)
}

/// Parse a tracking run request, analyze it, and serialize the analysis.
pub fn analyze_attention_json(request_json: &str) -> Result<String, EngineError> {
    let request: TrackingRunRequest = serde_json::from_str(request_json)?;
    let analysis = analyze_attention(&request.samples, &request.config)?;
    Ok(serde_json::to_string_pretty(&analysis)?)
}

/// Parse an external metrics request, score it, and serialize the result.
pub fn score_metrics_json(request_json: &str) -> Result<String, EngineError> {
    let request: ExternalMetricsRequest = serde_json::from_str(request_json)?;
    let scored = score_modality(request.modality, &request.metrics)?;
    Ok(serde_json::to_string_pretty(&scored)?)
}

// ----------------------------------------------------------------------------
// Stateful engine facade
// ----------------------------------------------------------------------------

/// Versioned hand-off payload for the diagnostic-synthesis collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
    pub producer: ProducerInfo,
    pub exported_at: DateTime<Utc>,
    pub assessment: AssessmentAggregate,
}

/// Engine identification stamped into every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub name: String,
    pub version: String,
}

impl ProducerInfo {
    fn current() -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
        }
    }
}

/// Stateful facade over the store and the per-session capture configs.
///
/// Use this when running whole assessment sessions; the free functions above
/// stay available for one-shot analysis.
#[derive(Debug, Default)]
pub struct AssessmentEngine {
    store: AssessmentStore,
    audio: AudioConfig,
    tracking: TrackingConfig,
}

impl AssessmentEngine {
    /// Engine with default capture configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with session-specific capture configuration.
    pub fn with_configs(audio: AudioConfig, tracking: TrackingConfig) -> Self {
        Self {
            store: AssessmentStore::new(),
            audio,
            tracking,
        }
    }

    pub fn audio_config(&self) -> &AudioConfig {
        &self.audio
    }

    pub fn tracking_config(&self) -> &TrackingConfig {
        &self.tracking
    }

    /// Open a new assessment and return its id.
    pub fn create_assessment(&self, child_age: Option<u32>) -> Uuid {
        self.store.create(child_age)
    }

    /// Analyze one audio callback and merge the scored result into the
    /// assessment's voice slot.
    pub fn process_voice_frame(
        &self,
        id: Uuid,
        window: &[f32],
        spectrum: &[f32],
    ) -> Result<VoiceAnalysis, EngineError> {
        let analysis = analyze_voice(window, spectrum, &self.audio)?;
        self.store.with_mut(id, |aggregate| {
            aggregate.merge_modality(Modality::Voice, analysis.scored.clone())
        })?;
        Ok(analysis)
    }

    /// Analyze a completed tracking run and merge the scored result into the
    /// assessment's attention slot.
    pub fn process_tracking_run(
        &self,
        id: Uuid,
        samples: &[TrackingSample],
    ) -> Result<AttentionAnalysis, EngineError> {
        let analysis = analyze_attention(samples, &self.tracking)?;
        self.store.with_mut(id, |aggregate| {
            aggregate.merge_modality(Modality::Attention, analysis.scored.clone())
        })?;
        Ok(analysis)
    }

    /// Score externally inferred metrics and merge them into the named slot.
    pub fn record_external(
        &self,
        id: Uuid,
        modality: Modality,
        metrics: &MetricSet,
    ) -> Result<ScoredResult, EngineError> {
        let scored = score_modality(modality, metrics)?;
        self.store.with_mut(id, |aggregate| {
            aggregate.merge_modality(modality, scored.clone())
        })?;
        Ok(scored)
    }

    /// Record questionnaire answers on an open assessment.
    pub fn set_questionnaire(
        &self,
        id: Uuid,
        data: QuestionnaireData,
    ) -> Result<(), EngineError> {
        self.store
            .with_mut(id, |aggregate| aggregate.set_questionnaire(data))
    }

    /// Close the assessment. Further writes fail with `AssessmentClosed`.
    pub fn finalize(&self, id: Uuid) -> Result<AssessmentAggregate, EngineError> {
        self.store.with_mut(id, |aggregate| {
            aggregate.finalize()?;
            Ok(aggregate.clone())
        })
    }

    /// Clone of the assessment's current state.
    pub fn snapshot(&self, id: Uuid) -> Result<AssessmentAggregate, EngineError> {
        self.store.snapshot(id)
    }

    /// Serialize the full aggregate for the diagnostic-synthesis
    /// collaborator, stamped with the producing engine's name and version.
    pub fn export_json(&self, id: Uuid) -> Result<String, EngineError> {
        let payload = ExportPayload {
            producer: ProducerInfo::current(),
            exported_at: Utc::now(),
            assessment: self.store.snapshot(id)?,
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn alternating_window() -> Vec<f32> {
        (0..4096)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect()
    }

    fn single_bin_spectrum() -> Vec<f32> {
        let mut spectrum = vec![0.0f32; 1024];
        spectrum[100] = 255.0;
        spectrum
    }

    fn tracking_run() -> Vec<TrackingSample> {
        (0..20)
            .map(|i| TrackingSample {
                pointer_x: 100.0,
                pointer_y: 100.0,
                target_x: 100.0,
                target_y: 100.0,
                timestamp_ms: i as f64 * 100.0,
            })
            .collect()
    }

    fn facial_metrics() -> MetricSet {
        [
            ("happiness", 0.8),
            ("sadness", 0.1),
            ("anger", 0.1),
            ("surprise", 0.2),
            ("neutral", 0.3),
            ("fear", 0.05),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
    }

    #[test]
    fn test_analyze_voice_end_to_end() {
        let analysis =
            analyze_voice(&alternating_window(), &single_bin_spectrum(), &AudioConfig::default())
                .unwrap();

        assert!((analysis.metrics.volume - 50.0).abs() < 1e-9);
        assert!((analysis.metrics.pitch_hz - 100.0 * 44_100.0 / 2048.0).abs() < 1e-9);
        assert_eq!(analysis.metrics.pause_count, 0);

        // Scored against the voice profile: every metric name resolves.
        assert!(analysis.scored.overall_score >= 0.0);
        assert!(analysis.scored.overall_score <= 1.0);
        assert!(analysis.scored.metrics.contains_key("pause_control"));
    }

    #[test]
    fn test_analyze_attention_static_target_uses_reduced_profile() {
        let analysis =
            analyze_attention(&tracking_run(), &TrackingConfig::default()).unwrap();

        // Perfect, never-relocating run: no response_time metric, weights
        // renormalized, perfect score.
        assert!(!analysis.scored.metrics.contains_key("response_time"));
        assert!((analysis.scored.overall_score - 1.0).abs() < 1e-9);
        assert!(analysis.scored.suggestions.is_empty());
    }

    #[test]
    fn test_score_modality_facial_weights() {
        let scored = score_modality(Modality::Facial, &facial_metrics()).unwrap();

        let expected = 0.30 * 0.8 + 0.15 * 0.1 + 0.15 * 0.1 + 0.15 * 0.2 + 0.15 * 0.3 + 0.10 * 0.05;
        assert!((scored.overall_score - expected).abs() < 1e-9);
        assert_eq!(
            scored.suggestions,
            vec!["Strong positive emotional engagement detected"]
        );
    }

    #[test]
    fn test_engine_session_flow() {
        let engine = AssessmentEngine::new();
        let id = engine.create_assessment(Some(6));

        engine
            .process_voice_frame(id, &alternating_window(), &single_bin_spectrum())
            .unwrap();
        engine.process_tracking_run(id, &tracking_run()).unwrap();
        engine
            .record_external(id, Modality::Facial, &facial_metrics())
            .unwrap();
        engine
            .set_questionnaire(
                id,
                QuestionnaireData {
                    eye_contact: Some("steady".to_string()),
                    name_response: None,
                },
            )
            .unwrap();

        let aggregate = engine.finalize(id).unwrap();
        assert!(aggregate.is_completed());
        assert_eq!(
            aggregate.populated_slots(),
            vec![Modality::Voice, Modality::Facial, Modality::Attention]
        );

        // The session is closed to further writes.
        let err = engine
            .record_external(id, Modality::Writing, &facial_metrics())
            .unwrap_err();
        assert!(matches!(err, EngineError::AssessmentClosed(_)));
    }

    #[test]
    fn test_engine_rejects_short_run() {
        let engine = AssessmentEngine::new();
        let id = engine.create_assessment(None);

        let err = engine
            .process_tracking_run(id, &tracking_run()[..1])
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData(_)));

        // A failed run leaves the slot untouched.
        assert!(engine.snapshot(id).unwrap().slot(Modality::Attention).is_none());
    }

    #[test]
    fn test_export_payload_round_trip() {
        let engine = AssessmentEngine::new();
        let id = engine.create_assessment(Some(7));
        engine
            .record_external(id, Modality::Writing, &{
                [
                    ("legibility", 0.8),
                    ("consistency", 0.7),
                    ("spacing", 0.9),
                    ("alignment", 0.85),
                    ("pressure", 0.75),
                ]
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect()
            })
            .unwrap();

        let json = engine.export_json(id).unwrap();
        let payload: ExportPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, ENGINE_VERSION);
        assert_eq!(payload.assessment.id, id);
        assert!(payload.assessment.slot(Modality::Writing).is_some());
    }

    #[test]
    fn test_voice_request_json() {
        let request = VoiceFrameRequest {
            window: alternating_window(),
            spectrum: single_bin_spectrum(),
            config: AudioConfig::default(),
        };
        let json = serde_json::to_string(&request).unwrap();

        let out = analyze_voice_json(&json).unwrap();
        let analysis: VoiceAnalysis = serde_json::from_str(&out).unwrap();
        assert!((analysis.metrics.volume - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_tracking_request_defaults_config() {
        let json = r#"{
            "samples": [
                {"pointer_x": 0.0, "pointer_y": 0.0, "target_x": 0.0, "target_y": 0.0, "timestamp_ms": 0.0},
                {"pointer_x": 0.0, "pointer_y": 0.0, "target_x": 0.0, "target_y": 0.0, "timestamp_ms": 100.0}
            ]
        }"#;

        let out = analyze_attention_json(json).unwrap();
        let analysis: AttentionAnalysis = serde_json::from_str(&out).unwrap();
        assert_eq!(analysis.metrics.tracking_accuracy, 1.0);
    }

    #[test]
    fn test_score_request_invalid_json() {
        let err = score_metrics_json("not valid json").unwrap_err();
        assert!(matches!(err, EngineError::JsonError(_)));
    }
}
