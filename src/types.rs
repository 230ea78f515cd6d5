//! Core types for the assessment signal pipeline
//!
//! This module defines the data that flows through each stage of the
//! pipeline: capture configuration, raw tracking samples, per-modality metric
//! records, the normalized metric/weight maps consumed by the scorer, and the
//! scored results that land in the assessment aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named metrics normalized to 0-1, the common currency every modality hands
/// to the weighted scorer.
///
/// A `BTreeMap` keeps iteration and serialization order deterministic, so the
/// weighted sum accumulates in a reproducible order.
pub type MetricSet = BTreeMap<String, f64>;

/// Per-metric weights, 0-1 each. A modality's table is expected to sum to
/// 1.0; the scorer does not renormalize.
pub type WeightTable = BTreeMap<String, f64>;

/// Audio capture configuration, fixed for the duration of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Capture sample rate in Hz
    pub sample_rate: f64,
    /// Analyser FFT size (spectrum length is half of this)
    pub fft_size: usize,
    /// Time-domain window length in samples
    pub window_len: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            fft_size: 2048,
            window_len: 4096,
        }
    }
}

impl AudioConfig {
    /// Expected magnitude-bin count for a spectrum captured under this config
    pub fn spectrum_len(&self) -> usize {
        self.fft_size / 2
    }
}

/// Voice metrics derived from one audio callback's window and spectrum.
///
/// Derived fresh per callback and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceMetrics {
    /// Dominant frequency in Hz
    pub pitch_hz: f64,
    /// RMS energy scaled to 0-100
    pub volume: f64,
    /// Spectral-centroid clarity scaled to 0-100
    pub clarity: f64,
    /// Estimated word count for the window
    pub word_count: u32,
    /// Estimated speaking rate in words per minute
    pub speaking_rate_wpm: u32,
    /// Number of sub-threshold silence runs in the window
    pub pause_count: u32,
}

/// One pointer-tracking observation captured while an attention exercise is
/// active: where the child's pointer was, where the moving target was, and
/// when.
///
/// Timestamps are milliseconds on the capture collaborator's monotonic clock;
/// only differences between them are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSample {
    pub pointer_x: f64,
    pub pointer_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub timestamp_ms: f64,
}

impl TrackingSample {
    /// Euclidean distance from pointer to target at this instant
    pub fn distance_to_target(&self) -> f64 {
        let dx = self.pointer_x - self.target_x;
        let dy = self.pointer_y - self.target_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether the target moved between the previous sample and this one
    pub fn target_moved_since(&self, prior: &TrackingSample) -> bool {
        self.target_x != prior.target_x || self.target_y != prior.target_y
    }
}

/// Tracking-exercise configuration, fixed per exercise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Worst-case pointer-to-target distance in canvas units, used to
    /// normalize per-sample accuracy (typically the canvas diagonal)
    pub normalization_radius: f64,
    /// Distance under which the pointer counts as engaged with the target
    pub engaged_radius: f64,
    /// Per-sample accuracy under this value at a target relocation counts as
    /// a distraction dip
    pub accuracy_dip_threshold: f64,
    /// Recovery time mapping to a response score of 0; instant recovery
    /// maps to 1
    pub response_window_ms: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        // Defaults sized for the 800x600 exercise canvas (diagonal = 1000).
        Self {
            normalization_radius: 1000.0,
            engaged_radius: 100.0,
            accuracy_dip_threshold: 0.5,
            response_window_ms: 2000.0,
        }
    }
}

/// Quality flag attached to attention metrics when a run carries no usable
/// response-time signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionQualityFlag {
    /// The target never relocated during the run
    NoTargetRelocations,
    /// The target relocated but the pointer never reacquired it
    NoRecoveryObserved,
}

/// Attention metrics computed once per completed exercise run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionMetrics {
    /// Fraction of elapsed time spent engaged with the target (0-1)
    pub focus_duration: f64,
    /// Mean distance-based accuracy across samples (0-1)
    pub tracking_accuracy: f64,
    /// 1 minus the fraction of target relocations that produced an accuracy
    /// dip (0-1)
    pub distractibility: f64,
    /// Response-speed score (0-1, 1.0 = immediate reacquisition). `None`
    /// when no relocation event produced a recovery; see `quality_flags`.
    pub response_time: Option<f64>,
    /// Flags explaining an absent response-time score
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_flags: Vec<AttentionQualityFlag>,
}

/// Comparator used by a suggestion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    LessThan,
    GreaterThan,
}

/// One threshold rule: when the named metric compares true against the
/// threshold, the rule contributes its suggestion string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRule {
    /// Metric name the rule reads
    pub metric: String,
    /// Direction of the comparison
    pub comparator: Comparator,
    /// Threshold compared against
    pub threshold: f64,
    /// Suggestion emitted when the rule fires
    pub suggestion: String,
}

impl SuggestionRule {
    /// Convenience constructor used by the modality profiles
    pub fn new(
        metric: impl Into<String>,
        comparator: Comparator,
        threshold: f64,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            metric: metric.into(),
            comparator,
            threshold,
            suggestion: suggestion.into(),
        }
    }
}

/// Output of one scoring pass: the metrics that were scored, the weighted
/// overall score, and the suggestions that fired, in rule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub metrics: MetricSet,
    /// Weighted overall score, clamped to 0-1
    pub overall_score: f64,
    /// Suggestion strings in the order their rules were given
    pub suggestions: Vec<String>,
    /// When the scoring pass ran
    pub timestamp: DateTime<Utc>,
}

/// One assessment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Voice,
    Facial,
    Writing,
    Attention,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Voice => "voice",
            Modality::Facial => "facial",
            Modality::Writing => "writing",
            Modality::Attention => "attention",
        }
    }

    /// All modality slots, in the order they appear on an aggregate
    pub const ALL: [Modality; 4] = [
        Modality::Voice,
        Modality::Facial,
        Modality::Writing,
        Modality::Attention,
    ];
}

/// Assessment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

/// Free-form questionnaire answers recorded alongside the signal modalities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireData {
    /// Observed eye contact during the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_contact: Option<String>,
    /// Response to hearing their own name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_response: Option<String>,
}
