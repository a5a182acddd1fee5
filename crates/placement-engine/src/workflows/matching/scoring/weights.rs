use serde::{Deserialize, Serialize};

use super::super::domain::OfferingKind;
use super::ScoreCategory;

/// Category weights for a rubric. Weights are percentages and sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rubric {
    pub kind: OfferingKind,
    pub weights: &'static [(ScoreCategory, u8)],
}

impl Rubric {
    pub fn for_kind(kind: OfferingKind) -> &'static Rubric {
        match kind {
            OfferingKind::Course => &COURSE_RUBRIC,
            OfferingKind::Job => &JOB_RUBRIC,
        }
    }

    pub fn total_weight(&self) -> u32 {
        self.weights.iter().map(|(_, weight)| u32::from(*weight)).sum()
    }

    pub fn weight_of(&self, category: ScoreCategory) -> Option<u8> {
        self.weights
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, weight)| *weight)
    }
}

pub const COURSE_RUBRIC: Rubric = Rubric {
    kind: OfferingKind::Course,
    weights: &[
        (ScoreCategory::AcademicPerformance, 40),
        (ScoreCategory::SubjectMatch, 30),
        (ScoreCategory::EducationLevel, 15),
        (ScoreCategory::AdditionalQualifications, 15),
    ],
};

pub const JOB_RUBRIC: Rubric = Rubric {
    kind: OfferingKind::Job,
    weights: &[
        (ScoreCategory::AcademicPerformance, 30),
        (ScoreCategory::EducationLevel, 20),
        (ScoreCategory::Skills, 25),
        (ScoreCategory::Experience, 15),
        (ScoreCategory::Certificates, 10),
    ],
};

/// Tunable thresholds and lenient defaults applied while scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum weighted score for a course match to qualify.
    pub course_threshold: u8,
    /// Minimum share of required skills a job applicant must hold.
    pub minimum_skill_overlap: f32,
    /// Academic sub-score when the offering states no performance tier.
    pub untiered_academic_score: f32,
    /// Subject sub-score when the offering references no subjects.
    pub unreferenced_subject_score: f32,
    /// Starting value for the course additional-qualifications category.
    pub additional_baseline: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            course_threshold: 40,
            minimum_skill_overlap: 0.3,
            untiered_academic_score: 0.8,
            unreferenced_subject_score: 0.7,
            additional_baseline: 0.5,
        }
    }
}
