//! Candidate/offering matching: attribute extraction, requirement normalization, weighted
//! scoring, eligibility decisions, and ranked result sets.

pub mod cache;
pub mod domain;
pub mod export;
pub mod extraction;
pub mod ranking;
pub mod requirements;
pub mod scoring;
pub mod vocabulary;

#[cfg(test)]
mod tests;

pub use cache::{MatchCache, MatchKey};
pub use domain::{
    AcademicRecord, CandidateId, CandidateProfile, EducationLevel, ExperienceLevel,
    ExtractionGap, ExtractionMode, Grade, Institution, InstitutionId, Offering, OfferingId,
    OfferingKind, OfferingStatus, PerformanceTier, RequirementDraft, RequirementSet, Subject,
};
pub use export::write_matches;
pub use extraction::AttributeExtractor;
pub use ranking::RankedMatcher;
pub use requirements::RequirementModel;
pub use scoring::{
    weighted_total, EligibilityDecision, GateFailure, MatchResult, Rubric, ScoreBreakdown,
    ScoreCategory, ScoreComponent, ScoringConfig, ScoringEngine, COURSE_RUBRIC, JOB_RUBRIC,
};
pub use vocabulary::Vocabulary;

use crate::workflows::repository::RepositoryError;

/// Error raised while ranking matches.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("offering {0} not found")]
    OfferingNotFound(OfferingId),
    #[error("invalid vocabulary pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
