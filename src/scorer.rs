//! Generic weighted scorer
//!
//! One scoring function shared by every modality. A modality differs only in
//! the weight table and rule list it passes in; there is no per-modality
//! branching here.

use chrono::Utc;
use crate::error::EngineError;
use crate::types::{Comparator, MetricSet, ScoredResult, SuggestionRule, WeightTable};

/// Score a metric set against a weight table and an ordered rule list.
///
/// Every metric referenced by `weights` or `rules` must be present in
/// `metrics` and every weight must lie in [0, 1]; violations are static
/// configuration bugs and fail with [`EngineError::UnknownMetric`] or
/// [`EngineError::WeightOutOfRange`].
///
/// The overall score is the plain weighted sum `sum(w_i * m_i)`, clamped to
/// [0, 1] against floating rounding. The scorer never renormalizes: a table
/// summing far from 1.0 is the caller's bug, not a runtime failure.
///
/// Rules are evaluated in the order given; each contributes zero or one
/// suggestion, and the output preserves rule order regardless of metric map
/// iteration order.
pub fn score(
    metrics: &MetricSet,
    weights: &WeightTable,
    rules: &[SuggestionRule],
) -> Result<ScoredResult, EngineError> {
    for (name, &weight) in weights {
        if !(0.0..=1.0).contains(&weight) {
            return Err(EngineError::WeightOutOfRange(format!("{name}: {weight}")));
        }
        if !metrics.contains_key(name) {
            return Err(EngineError::UnknownMetric(name.clone()));
        }
    }

    let overall: f64 = weights
        .iter()
        .map(|(name, weight)| weight * metrics[name])
        .sum();
    let overall_score = overall.clamp(0.0, 1.0);

    let mut suggestions = Vec::new();
    for rule in rules {
        let value = *metrics
            .get(&rule.metric)
            .ok_or_else(|| EngineError::UnknownMetric(rule.metric.clone()))?;
        let fired = match rule.comparator {
            Comparator::LessThan => value < rule.threshold,
            Comparator::GreaterThan => value > rule.threshold,
        };
        if fired {
            suggestions.push(rule.suggestion.clone());
        }
    }

    Ok(ScoredResult {
        metrics: metrics.clone(),
        overall_score,
        suggestions,
        timestamp: Utc::now(),
    })
}
