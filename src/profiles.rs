//! Modality scoring profiles
//!
//! The weighted scorer is one function; what varies per modality is
//! configuration. This module carries each modality's weight table and
//! ordered suggestion rules, plus the normalization that turns raw
//! `VoiceMetrics` / `AttentionMetrics` records into the 0-1 `MetricSet` the
//! scorer consumes. External-inference modalities (facial, writing) arrive
//! as a ready metric set and only need their profile.

use crate::types::{
    AttentionMetrics, Comparator, MetricSet, Modality, SuggestionRule, VoiceMetrics, WeightTable,
};

/// Speaking rate treated as fully fluent for a child, in words per minute
const FLUENT_WPM: f64 = 150.0;

/// Pause count at which pause control bottoms out at 0
const PAUSE_SATURATION: f64 = 20.0;

/// Weight table and ordered rule list for one modality.
#[derive(Debug, Clone)]
pub struct ModalityProfile {
    pub weights: WeightTable,
    pub rules: Vec<SuggestionRule>,
}

fn weights(pairs: &[(&str, f64)]) -> WeightTable {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Profile for the named modality.
///
/// The attention profile adapts to the metric set at hand: when a run carried
/// no response-time signal the remaining weights are renormalized (callers
/// own their tables; the scorer itself never renormalizes).
pub fn profile_for(modality: Modality, metrics: &MetricSet) -> ModalityProfile {
    match modality {
        Modality::Voice => voice_profile(),
        Modality::Facial => facial_profile(),
        Modality::Writing => writing_profile(),
        Modality::Attention => attention_profile(metrics.contains_key("response_time")),
    }
}

pub fn voice_profile() -> ModalityProfile {
    ModalityProfile {
        weights: weights(&[
            ("volume", 0.25),
            ("clarity", 0.35),
            ("speaking_rate", 0.20),
            ("pause_control", 0.20),
        ]),
        rules: vec![
            SuggestionRule::new(
                "volume",
                Comparator::LessThan,
                0.5,
                "Encourage speaking at a comfortable, audible volume",
            ),
            SuggestionRule::new(
                "clarity",
                Comparator::LessThan,
                0.7,
                "Practice articulation exercises to improve speech clarity",
            ),
            SuggestionRule::new(
                "speaking_rate",
                Comparator::LessThan,
                0.4,
                "Encourage longer spoken responses to build fluency",
            ),
            SuggestionRule::new(
                "pause_control",
                Comparator::LessThan,
                0.7,
                "Frequent pauses detected; practice breathing and pacing exercises",
            ),
        ],
    }
}

pub fn facial_profile() -> ModalityProfile {
    ModalityProfile {
        weights: weights(&[
            ("happiness", 0.30),
            ("sadness", 0.15),
            ("anger", 0.15),
            ("surprise", 0.15),
            ("neutral", 0.15),
            ("fear", 0.10),
        ]),
        rules: vec![
            SuggestionRule::new(
                "happiness",
                Comparator::GreaterThan,
                0.7,
                "Strong positive emotional engagement detected",
            ),
            SuggestionRule::new(
                "sadness",
                Comparator::GreaterThan,
                0.7,
                "Consider activities to improve emotional state",
            ),
            SuggestionRule::new(
                "anger",
                Comparator::GreaterThan,
                0.6,
                "Recommend calming exercises or breaks",
            ),
            SuggestionRule::new(
                "fear",
                Comparator::GreaterThan,
                0.6,
                "Consider reducing environmental stressors",
            ),
            SuggestionRule::new(
                "neutral",
                Comparator::GreaterThan,
                0.8,
                "Encourage more emotional expression and engagement",
            ),
        ],
    }
}

pub fn writing_profile() -> ModalityProfile {
    ModalityProfile {
        weights: weights(&[
            ("legibility", 0.30),
            ("consistency", 0.20),
            ("spacing", 0.20),
            ("alignment", 0.15),
            ("pressure", 0.15),
        ]),
        rules: vec![
            SuggestionRule::new(
                "legibility",
                Comparator::LessThan,
                0.7,
                "Focus on forming letters more clearly",
            ),
            SuggestionRule::new(
                "consistency",
                Comparator::LessThan,
                0.7,
                "Practice maintaining consistent letter size",
            ),
            SuggestionRule::new(
                "spacing",
                Comparator::LessThan,
                0.7,
                "Work on spacing between words",
            ),
            SuggestionRule::new(
                "alignment",
                Comparator::LessThan,
                0.7,
                "Try using lined paper to improve alignment",
            ),
            SuggestionRule::new(
                "pressure",
                Comparator::LessThan,
                0.7,
                "Adjust grip pressure for more comfortable writing",
            ),
        ],
    }
}

pub fn attention_profile(response_time_available: bool) -> ModalityProfile {
    let weights = if response_time_available {
        weights(&[
            ("focus_duration", 0.30),
            ("tracking_accuracy", 0.30),
            ("distractibility", 0.20),
            ("response_time", 0.20),
        ])
    } else {
        // Renormalized over the remaining 0.8 of weight.
        weights(&[
            ("focus_duration", 0.375),
            ("tracking_accuracy", 0.375),
            ("distractibility", 0.25),
        ])
    };

    let mut rules = vec![
        SuggestionRule::new(
            "focus_duration",
            Comparator::LessThan,
            0.7,
            "Consider shorter work periods with regular breaks",
        ),
        SuggestionRule::new(
            "tracking_accuracy",
            Comparator::LessThan,
            0.7,
            "Visual tracking exercises may be beneficial",
        ),
        SuggestionRule::new(
            "distractibility",
            Comparator::LessThan,
            0.7,
            "Recommend minimizing environmental distractions during tasks",
        ),
    ];
    if response_time_available {
        rules.push(SuggestionRule::new(
            "response_time",
            Comparator::LessThan,
            0.7,
            "Practice activities that improve processing speed",
        ));
    }

    ModalityProfile { weights, rules }
}

/// Normalize a raw voice record into the scorer's 0-1 metric set.
///
/// Volume and clarity arrive on the reducers' 0-100 scale; speaking rate is
/// taken as a fraction of a fluent child rate; pause control degrades
/// linearly with pause count. Pitch is reported raw in `VoiceMetrics` but not
/// scored (interpreting a child's pitch needs age norms this engine does not
/// own).
pub fn voice_metric_set(metrics: &VoiceMetrics) -> MetricSet {
    let mut set = MetricSet::new();
    set.insert("volume".to_string(), (metrics.volume / 100.0).clamp(0.0, 1.0));
    set.insert(
        "clarity".to_string(),
        (metrics.clarity / 100.0).clamp(0.0, 1.0),
    );
    set.insert(
        "speaking_rate".to_string(),
        (f64::from(metrics.speaking_rate_wpm) / FLUENT_WPM).clamp(0.0, 1.0),
    );
    set.insert(
        "pause_control".to_string(),
        (1.0 - f64::from(metrics.pause_count) / PAUSE_SATURATION).clamp(0.0, 1.0),
    );
    set
}

/// Metric set for a completed tracking run. `response_time` appears only
/// when the run produced one; its absence is what switches the attention
/// profile to the renormalized table.
pub fn attention_metric_set(metrics: &AttentionMetrics) -> MetricSet {
    let mut set = MetricSet::new();
    set.insert("focus_duration".to_string(), metrics.focus_duration);
    set.insert("tracking_accuracy".to_string(), metrics.tracking_accuracy);
    set.insert("distractibility".to_string(), metrics.distractibility);
    if let Some(response) = metrics.response_time {
        set.insert("response_time".to_string(), response);
    }
    set
}
