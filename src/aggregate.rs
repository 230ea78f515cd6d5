//! Assessment aggregate and modality result merger
//!
//! The aggregate is the per-assessment record holding at most one scored
//! result per modality slot plus questionnaire answers. Its lifecycle is a
//! two-state machine: `InProgress -> Completed`, terminal. Merges overwrite a
//! slot whole — never field-by-field — so a slot always reflects a single
//! weight/threshold configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::{AssessmentStatus, Modality, QuestionnaireData, ScoredResult};

/// Per-assessment aggregate, keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentAggregate {
    pub id: Uuid,
    /// Child age in years, passed through to the diagnostic collaborator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_age: Option<u32>,
    pub status: AssessmentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<ScoredResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facial: Option<ScoredResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing: Option<ScoredResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention: Option<ScoredResult>,
    #[serde(default)]
    pub questionnaire: QuestionnaireData,
}

impl AssessmentAggregate {
    /// Create an empty in-progress aggregate with a fresh id.
    pub fn new(child_age: Option<u32>) -> Self {
        Self::with_id(Uuid::new_v4(), child_age)
    }

    /// Create an empty in-progress aggregate under a caller-chosen id.
    pub fn with_id(id: Uuid, child_age: Option<u32>) -> Self {
        Self {
            id,
            child_age,
            status: AssessmentStatus::InProgress,
            created_at: Utc::now(),
            voice: None,
            facial: None,
            writing: None,
            attention: None,
            questionnaire: QuestionnaireData::default(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AssessmentStatus::Completed
    }

    /// The scored result currently in a slot, if any.
    pub fn slot(&self, modality: Modality) -> Option<&ScoredResult> {
        match modality {
            Modality::Voice => self.voice.as_ref(),
            Modality::Facial => self.facial.as_ref(),
            Modality::Writing => self.writing.as_ref(),
            Modality::Attention => self.attention.as_ref(),
        }
    }

    /// Modalities whose slots are populated, in slot order.
    pub fn populated_slots(&self) -> Vec<Modality> {
        Modality::ALL
            .into_iter()
            .filter(|m| self.slot(*m).is_some())
            .collect()
    }

    fn reject_if_closed(&self) -> Result<(), EngineError> {
        if self.is_completed() {
            return Err(EngineError::AssessmentClosed(self.id.to_string()));
        }
        Ok(())
    }

    /// Overwrite the named slot with `result`.
    ///
    /// The write replaces the whole slot: last write wins by call order, and
    /// applying the same result twice leaves the aggregate unchanged. Writes
    /// to a completed assessment fail with [`EngineError::AssessmentClosed`].
    pub fn merge_modality(
        &mut self,
        modality: Modality,
        result: ScoredResult,
    ) -> Result<(), EngineError> {
        self.reject_if_closed()?;
        let slot = match modality {
            Modality::Voice => &mut self.voice,
            Modality::Facial => &mut self.facial,
            Modality::Writing => &mut self.writing,
            Modality::Attention => &mut self.attention,
        };
        *slot = Some(result);
        Ok(())
    }

    /// Record questionnaire answers. Subject to the same closed-state check
    /// as modality writes.
    pub fn set_questionnaire(&mut self, data: QuestionnaireData) -> Result<(), EngineError> {
        self.reject_if_closed()?;
        self.questionnaire = data;
        Ok(())
    }

    /// Transition to `Completed`. Valid exactly once; no slot is required to
    /// be populated (a questionnaire-only assessment may complete).
    pub fn finalize(&mut self) -> Result<(), EngineError> {
        self.reject_if_closed()?;
        self.status = AssessmentStatus::Completed;
        Ok(())
    }
}
