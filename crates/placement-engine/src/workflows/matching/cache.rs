use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{CandidateId, OfferingId};
use super::scoring::MatchResult;

/// Identifies the inputs a cached [`MatchResult`] was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub candidate_id: CandidateId,
    pub offering_id: OfferingId,
    pub record_version: u64,
    pub offering_revision: u64,
}

#[derive(Debug, Clone)]
struct CachedMatch {
    record_version: u64,
    offering_revision: u64,
    result: MatchResult,
}

/// Memoized match results, one slot per (candidate, offering) pair.
///
/// A slot only answers for the exact record version and requirement revision it was computed
/// from. Inserting a result for newer inputs replaces the slot; results for inputs older than the
/// stored ones are dropped.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: Mutex<HashMap<(CandidateId, OfferingId), CachedMatch>>,
}

impl MatchCache {
    pub fn get(&self, key: &MatchKey) -> Option<MatchResult> {
        let guard = self.entries.lock().ok()?;
        let cached = guard.get(&(key.candidate_id.clone(), key.offering_id.clone()))?;
        (cached.record_version == key.record_version
            && cached.offering_revision == key.offering_revision)
            .then(|| cached.result.clone())
    }

    pub fn insert(&self, key: MatchKey, result: MatchResult) {
        let Ok(mut guard) = self.entries.lock() else {
            return;
        };
        let slot = (key.candidate_id, key.offering_id);
        if let Some(existing) = guard.get(&slot) {
            let stale = key.record_version < existing.record_version
                || key.offering_revision < existing.offering_revision;
            if stale {
                return;
            }
        }
        guard.insert(
            slot,
            CachedMatch {
                record_version: key.record_version,
                offering_revision: key.offering_revision,
                result,
            },
        );
    }

    pub fn invalidate_candidate(&self, candidate_id: &CandidateId) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.retain(|(candidate, _), _| candidate != candidate_id);
        }
    }

    pub fn invalidate_offering(&self, offering_id: &OfferingId) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.retain(|(_, offering), _| offering != offering_id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
