//! In-memory assessment store
//!
//! The aggregate is the only shared mutable state in the engine. The store
//! keys each aggregate by id behind its own lock, so writers for one
//! assessment serialize while writers for different assessments never
//! contend. There is no cross-assessment shared state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use crate::aggregate::AssessmentAggregate;
use crate::error::EngineError;

/// Store of live assessments, one lock per assessment id.
#[derive(Debug, Default)]
pub struct AssessmentStore {
    inner: RwLock<HashMap<Uuid, Arc<Mutex<AssessmentAggregate>>>>,
}

impl AssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty in-progress assessment and return its id.
    pub fn create(&self, child_age: Option<u32>) -> Uuid {
        let aggregate = AssessmentAggregate::new(child_age);
        let id = aggregate.id;
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(id, Arc::new(Mutex::new(aggregate)));
        id
    }

    fn entry(&self, id: Uuid) -> Result<Arc<Mutex<AssessmentAggregate>>, EngineError> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAssessment(id.to_string()))
    }

    /// Run `f` with exclusive access to one assessment's aggregate.
    ///
    /// The outer map lock is dropped before `f` runs, so a slow caller only
    /// blocks writers of the same assessment id.
    pub fn with_mut<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut AssessmentAggregate) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let entry = self.entry(id)?;
        let mut aggregate = entry.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut aggregate)
    }

    /// Clone of the aggregate's current state.
    pub fn snapshot(&self, id: Uuid) -> Result<AssessmentAggregate, EngineError> {
        let entry = self.entry(id)?;
        let aggregate = entry.lock().unwrap_or_else(|e| e.into_inner());
        Ok(aggregate.clone())
    }

    /// Drop an assessment from the store, returning its final state.
    pub fn remove(&self, id: Uuid) -> Result<AssessmentAggregate, EngineError> {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let entry = map
            .remove(&id)
            .ok_or_else(|| EngineError::UnknownAssessment(id.to_string()))?;
        drop(map);
        let aggregate = entry.lock().unwrap_or_else(|e| e.into_inner());
        Ok(aggregate.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MetricSet, Modality, ScoredResult};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Arc as StdArc;
    use std::thread;

    fn scored(overall: f64) -> ScoredResult {
        ScoredResult {
            metrics: MetricSet::new(),
            overall_score: overall,
            suggestions: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_snapshot() {
        let store = AssessmentStore::new();
        let id = store.create(Some(6));

        let snapshot = store.snapshot(id).unwrap();
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.child_age, Some(6));
        assert!(!snapshot.is_completed());
    }

    #[test]
    fn test_unknown_id() {
        let store = AssessmentStore::new();
        let err = store.snapshot(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownAssessment(_)));
    }

    #[test]
    fn test_with_mut_merges() {
        let store = AssessmentStore::new();
        let id = store.create(None);

        store
            .with_mut(id, |aggregate| {
                aggregate.merge_modality(Modality::Voice, scored(0.5))
            })
            .unwrap();

        let snapshot = store.snapshot(id).unwrap();
        assert!(snapshot.slot(Modality::Voice).is_some());
    }

    #[test]
    fn test_remove() {
        let store = AssessmentStore::new();
        let id = store.create(None);
        assert_eq!(store.len(), 1);

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.is_empty());
        assert!(store.snapshot(id).is_err());
    }

    #[test]
    fn test_same_id_writers_serialize() {
        let store = StdArc::new(AssessmentStore::new());
        let id = store.create(None);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = StdArc::clone(&store);
                thread::spawn(move || {
                    store
                        .with_mut(id, |aggregate| {
                            aggregate.merge_modality(Modality::Attention, scored(i as f64 / 10.0))
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Whichever write landed last, the slot holds exactly one intact
        // result.
        let snapshot = store.snapshot(id).unwrap();
        assert!(snapshot.slot(Modality::Attention).is_some());
    }

    #[test]
    fn test_different_ids_do_not_interfere() {
        let store = StdArc::new(AssessmentStore::new());
        let ids: Vec<Uuid> = (0..4).map(|_| store.create(None)).collect();

        let handles: Vec<_> = ids
            .iter()
            .copied()
            .map(|id| {
                let store = StdArc::clone(&store);
                thread::spawn(move || {
                    store
                        .with_mut(id, |aggregate| {
                            aggregate.merge_modality(Modality::Writing, scored(0.7))
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for id in ids {
            assert!(store.snapshot(id).unwrap().slot(Modality::Writing).is_some());
        }
    }
}
