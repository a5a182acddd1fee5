use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, warn};

use super::cache::{MatchCache, MatchKey};
use super::domain::{AcademicRecord, CandidateId, CandidateProfile, Offering, OfferingId};
use super::extraction::AttributeExtractor;
use super::scoring::{MatchResult, ScoringEngine};
use super::MatchingError;
use crate::workflows::repository::{CandidateStore, OfferingStore};

/// Qualified matches in both directions: offerings for a candidate and candidates for an
/// offering.
pub struct RankedMatcher<C, O> {
    candidates: Arc<C>,
    offerings: Arc<O>,
    extractor: AttributeExtractor,
    engine: ScoringEngine,
    cache: MatchCache,
}

impl<C, O> RankedMatcher<C, O>
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
{
    pub fn new(
        candidates: Arc<C>,
        offerings: Arc<O>,
        extractor: AttributeExtractor,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            candidates,
            offerings,
            extractor,
            engine,
            cache: MatchCache::default(),
        }
    }

    pub fn extractor(&self) -> &AttributeExtractor {
        &self.extractor
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }

    /// Open offerings the candidate qualifies for, best score first.
    ///
    /// Offerings whose institution can no longer be found are skipped.
    pub fn evaluate(&self, candidate_id: &CandidateId) -> Result<Vec<MatchResult>, MatchingError> {
        let profile = self
            .candidates
            .profile(candidate_id)?
            .ok_or_else(|| MatchingError::CandidateNotFound(candidate_id.clone()))?;
        let record = self.extractor.extract(&profile);

        let mut offerings = Vec::new();
        for offering in self.offerings.open_offerings()? {
            if self.institution_exists(&offering)? {
                offerings.push(offering);
            }
        }

        let mut ranked: Vec<(MatchResult, DateTime<Utc>)> = offerings
            .par_iter()
            .map(|offering| (self.score_pair(&record, offering), offering.created_at))
            .filter(|(result, _)| result.qualified)
            .collect();

        ranked.sort_by(|(left, left_created), (right, right_created)| {
            by_score(left, right)
                .then_with(|| left_created.cmp(right_created))
                .then_with(|| left.offering_id.cmp(&right.offering_id))
        });

        debug!(
            candidate = %candidate_id,
            considered = offerings.len(),
            qualified = ranked.len(),
            "ranked offerings for candidate"
        );
        Ok(ranked.into_iter().map(|(result, _)| result).collect())
    }

    /// Verified candidates qualified for `offering_id`, best score first.
    pub fn rank_candidates(
        &self,
        offering_id: &OfferingId,
    ) -> Result<Vec<MatchResult>, MatchingError> {
        let offering = self
            .offerings
            .offering(offering_id)?
            .ok_or_else(|| MatchingError::OfferingNotFound(offering_id.clone()))?;
        if !self.institution_exists(&offering)? {
            return Ok(Vec::new());
        }

        let profiles = self.candidates.verified_candidates()?;
        let mut ranked: Vec<(MatchResult, DateTime<Utc>)> = profiles
            .par_iter()
            .map(|profile| {
                let record = self.extractor.extract(profile);
                (self.score_pair(&record, &offering), profile.registered_at)
            })
            .filter(|(result, _)| result.qualified)
            .collect();

        ranked.sort_by(|(left, left_registered), (right, right_registered)| {
            by_score(left, right)
                .then_with(|| left_registered.cmp(right_registered))
                .then_with(|| left.candidate_id.cmp(&right.candidate_id))
        });

        debug!(
            offering = %offering_id,
            considered = profiles.len(),
            qualified = ranked.len(),
            "ranked candidates for offering"
        );
        Ok(ranked.into_iter().map(|(result, _)| result).collect())
    }

    /// Match result for one pair regardless of qualification.
    pub fn explain(&self, profile: &CandidateProfile, offering: &Offering) -> MatchResult {
        let record = self.extractor.extract(profile);
        self.score_pair(&record, offering)
    }

    fn institution_exists(&self, offering: &Offering) -> Result<bool, MatchingError> {
        if self.offerings.institution(&offering.institution_id)?.is_some() {
            return Ok(true);
        }
        warn!(
            offering = %offering.offering_id,
            institution = %offering.institution_id,
            "skipping offering with missing institution"
        );
        Ok(false)
    }

    fn score_pair(&self, record: &AcademicRecord, offering: &Offering) -> MatchResult {
        let key = MatchKey {
            candidate_id: record.candidate_id.clone(),
            offering_id: offering.offering_id.clone(),
            record_version: record.record_version,
            offering_revision: offering.revision,
        };
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let result = self.engine.evaluate(record, offering);
        self.cache.insert(key, result.clone());
        result
    }
}

fn by_score(left: &MatchResult, right: &MatchResult) -> Ordering {
    right.score.cmp(&left.score)
}
