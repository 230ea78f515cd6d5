//! Tracking metric synthesis
//!
//! Computes `AttentionMetrics` from the full ordered tracking-sample sequence
//! of one completed exercise run. This is a batch operation off any
//! latency-sensitive path; it allocates freely.
//!
//! Sampling is irregular, so time-based metrics sum elapsed-time deltas
//! between samples instead of counting samples.

use crate::error::EngineError;
use crate::types::{AttentionMetrics, AttentionQualityFlag, TrackingConfig, TrackingSample};

/// Distance-based accuracy of one sample: `1 - min(1, distance / radius)`,
/// clamped at 0.
fn sample_accuracy(sample: &TrackingSample, config: &TrackingConfig) -> f64 {
    let normalized = (sample.distance_to_target() / config.normalization_radius).min(1.0);
    (1.0 - normalized).max(0.0)
}

/// Synthesize attention metrics from a completed exercise run.
///
/// Requires at least 2 samples; fewer fail with
/// [`EngineError::InsufficientData`] (surfaced to the caller as "exercise too
/// short").
pub fn synthesize_attention_metrics(
    samples: &[TrackingSample],
    config: &TrackingConfig,
) -> Result<AttentionMetrics, EngineError> {
    if samples.len() < 2 {
        return Err(EngineError::InsufficientData(format!(
            "tracking run has {} samples, need at least 2",
            samples.len()
        )));
    }

    let accuracies: Vec<f64> = samples.iter().map(|s| sample_accuracy(s, config)).collect();
    let engaged: Vec<bool> = samples
        .iter()
        .map(|s| s.distance_to_target() < config.engaged_radius)
        .collect();

    let tracking_accuracy = accuracies.iter().sum::<f64>() / accuracies.len() as f64;

    // Engaged time is the contiguous-run sum of deltas whose endpoints are
    // both inside the engaged radius.
    let total_elapsed_ms = samples[samples.len() - 1].timestamp_ms - samples[0].timestamp_ms;
    let mut engaged_ms = 0.0;
    for i in 1..samples.len() {
        if engaged[i - 1] && engaged[i] {
            engaged_ms += samples[i].timestamp_ms - samples[i - 1].timestamp_ms;
        }
    }
    let focus_duration = if total_elapsed_ms > 0.0 {
        (engaged_ms / total_elapsed_ms).clamp(0.0, 1.0)
    } else {
        0.0
    };

    // A relocation event is the first sample carrying a new target position.
    // The dip test reads the accuracy at that sample; recovery is the first
    // sample at or after it back inside the engaged radius.
    let mut relocations = 0u32;
    let mut dips = 0u32;
    let mut recovery_times_ms: Vec<f64> = Vec::new();
    for i in 1..samples.len() {
        if !samples[i].target_moved_since(&samples[i - 1]) {
            continue;
        }
        relocations += 1;
        if accuracies[i] < config.accuracy_dip_threshold {
            dips += 1;
        }
        if let Some(j) = (i..samples.len()).find(|&j| engaged[j]) {
            recovery_times_ms.push(samples[j].timestamp_ms - samples[i].timestamp_ms);
        }
    }

    // No relocations means no observed distraction.
    let distractibility = if relocations == 0 {
        1.0
    } else {
        (1.0 - f64::from(dips) / f64::from(relocations)).clamp(0.0, 1.0)
    };

    let mut quality_flags = Vec::new();
    let response_time = if relocations == 0 {
        quality_flags.push(AttentionQualityFlag::NoTargetRelocations);
        None
    } else if recovery_times_ms.is_empty() {
        quality_flags.push(AttentionQualityFlag::NoRecoveryObserved);
        None
    } else {
        let mean_ms = recovery_times_ms.iter().sum::<f64>() / recovery_times_ms.len() as f64;
        Some((1.0 - (mean_ms / config.response_window_ms).min(1.0)).clamp(0.0, 1.0))
    };

    Ok(AttentionMetrics {
        focus_duration,
        tracking_accuracy,
        distractibility,
        response_time,
        quality_flags,
    })
}
