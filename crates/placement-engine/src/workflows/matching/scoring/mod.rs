mod policy;
mod rules;
mod weights;

pub use policy::{EligibilityDecision, GateFailure, REASON_THRESHOLD};
pub use rules::{
    academic_performance, education_match, experience_match, skill_fraction, subject_grade_score,
};
pub use weights::{Rubric, ScoringConfig, COURSE_RUBRIC, JOB_RUBRIC};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    AcademicRecord, CandidateId, ExtractionMode, Offering, OfferingId, OfferingKind,
    RequirementSet,
};
use policy::decide_outcome;
use rules::{score_record, total_from_components, ScoreSignals};

/// Rubric categories in the order reasons are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    AcademicPerformance,
    SubjectMatch,
    EducationLevel,
    AdditionalQualifications,
    Skills,
    Experience,
    Certificates,
}

impl ScoreCategory {
    pub const fn reason(self) -> &'static str {
        match self {
            ScoreCategory::AcademicPerformance => "Meets academic requirements",
            ScoreCategory::SubjectMatch => "Meets subject-specific requirements",
            ScoreCategory::EducationLevel => "Education level matches requirements",
            ScoreCategory::AdditionalQualifications => "Has additional relevant qualifications",
            ScoreCategory::Skills => "Meets required skills",
            ScoreCategory::Experience => "Meets experience requirements",
            ScoreCategory::Certificates => "Holds relevant certificates",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreCategory::AcademicPerformance => "academic_performance",
            ScoreCategory::SubjectMatch => "subject_match",
            ScoreCategory::EducationLevel => "education_level",
            ScoreCategory::AdditionalQualifications => "additional_qualifications",
            ScoreCategory::Skills => "skills",
            ScoreCategory::Experience => "experience",
            ScoreCategory::Certificates => "certificates",
        }
    }
}

/// Weighted contribution of one rubric category, kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub category: ScoreCategory,
    pub weight: u8,
    /// Category score clamped to `[0, 1]`.
    pub sub_score: f32,
    pub points: f32,
    pub notes: String,
}

/// Scored, explainable outcome of comparing a candidate to an offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: CandidateId,
    pub offering_id: OfferingId,
    pub kind: OfferingKind,
    pub score: u8,
    pub qualified: bool,
    pub reasons: Vec<String>,
    pub components: Vec<ScoreComponent>,
    /// Set when strict extraction left gaps that a reviewer should confirm.
    pub needs_review: bool,
}

/// Weighted score before the eligibility decision is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub kind: OfferingKind,
    pub total_score: u8,
    pub components: Vec<ScoreComponent>,
    signals: ScoreSignals,
}

impl ScoreBreakdown {
    pub fn sub_score(&self, category: ScoreCategory) -> Option<f32> {
        self.components
            .iter()
            .find(|component| component.category == category)
            .map(|component| component.sub_score)
    }
}

/// Stateless scorer applying the course or job rubric to an academic record.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(
        &self,
        record: &AcademicRecord,
        kind: OfferingKind,
        requirements: &RequirementSet,
    ) -> ScoreBreakdown {
        let (components, total_score, signals) =
            score_record(record, requirements, kind, &self.config);

        ScoreBreakdown {
            kind,
            total_score,
            components,
            signals,
        }
    }

    pub fn decide(
        &self,
        record: &AcademicRecord,
        breakdown: &ScoreBreakdown,
    ) -> EligibilityDecision {
        decide_outcome(
            breakdown.kind,
            &breakdown.components,
            breakdown.total_score,
            &breakdown.signals,
            &self.config,
            record.mode == ExtractionMode::Strict,
        )
    }

    /// Score and decide in one step.
    pub fn evaluate(&self, record: &AcademicRecord, offering: &Offering) -> MatchResult {
        let breakdown = self.score(record, offering.kind, &offering.requirements);
        let decision = self.decide(record, &breakdown);

        debug!(
            candidate = %record.candidate_id,
            offering = %offering.offering_id,
            kind = offering.kind.label(),
            score = breakdown.total_score,
            qualified = decision.qualified,
            "scored candidate against offering"
        );

        MatchResult {
            candidate_id: record.candidate_id.clone(),
            offering_id: offering.offering_id.clone(),
            kind: offering.kind,
            score: breakdown.total_score,
            qualified: decision.qualified,
            reasons: decision.reasons,
            components: breakdown.components,
            needs_review: record.needs_review(),
        }
    }
}

/// Weighted total for arbitrary sub-scores under a rubric.
///
/// Categories missing from `sub_scores` contribute nothing; values are clamped to `[0, 1]`.
pub fn weighted_total(rubric: &Rubric, sub_scores: &[(ScoreCategory, f32)]) -> u8 {
    let components: Vec<ScoreComponent> = rubric
        .weights
        .iter()
        .map(|(category, weight)| {
            let sub_score = sub_scores
                .iter()
                .find(|(candidate, _)| candidate == category)
                .map(|(_, score)| score.clamp(0.0, 1.0))
                .unwrap_or(0.0);
            ScoreComponent {
                category: *category,
                weight: *weight,
                sub_score,
                points: sub_score * f32::from(*weight),
                notes: String::new(),
            }
        })
        .collect();
    total_from_components(&components)
}
