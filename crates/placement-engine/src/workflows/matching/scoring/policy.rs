use serde::{Deserialize, Serialize};

use super::super::domain::OfferingKind;
use super::rules::ScoreSignals;
use super::weights::ScoringConfig;
use super::ScoreComponent;

/// Sub-scores above this value earn a qualification reason.
pub const REASON_THRESHOLD: f32 = 0.7;

/// Qualification verdict and the reasons shown to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub qualified: bool,
    pub reasons: Vec<String>,
    /// Why a job applicant failed the employer gate, if they did.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gate_failures: Vec<GateFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateFailure {
    EducationBelowMinimum,
    ExperienceBelowMinimum,
    InsufficientSkillOverlap,
}

impl GateFailure {
    pub const fn summary(self) -> &'static str {
        match self {
            GateFailure::EducationBelowMinimum => "education level below minimum",
            GateFailure::ExperienceBelowMinimum => "experience level below minimum",
            GateFailure::InsufficientSkillOverlap => "too few required skills",
        }
    }
}

pub(crate) fn decide_outcome(
    kind: OfferingKind,
    components: &[ScoreComponent],
    total_score: u8,
    signals: &ScoreSignals,
    config: &ScoringConfig,
    strict: bool,
) -> EligibilityDecision {
    let reasons = components
        .iter()
        .filter(|component| component.sub_score > REASON_THRESHOLD)
        .map(|component| component.category.reason().to_string())
        .collect();

    let (qualified, gate_failures) = match kind {
        OfferingKind::Course => (total_score >= config.course_threshold, Vec::new()),
        OfferingKind::Job => {
            let failures = job_gate(signals, config, strict);
            (failures.is_empty(), failures)
        }
    };

    EligibilityDecision {
        qualified,
        reasons,
        gate_failures,
    }
}

fn job_gate(signals: &ScoreSignals, config: &ScoringConfig, strict: bool) -> Vec<GateFailure> {
    let mut failures = Vec::new();

    if !signals.education_met {
        failures.push(GateFailure::EducationBelowMinimum);
    }
    if !signals.experience_met {
        failures.push(GateFailure::ExperienceBelowMinimum);
    }
    if signals.skills_required {
        let passes = match signals.skill_overlap {
            Some(overlap) => overlap >= config.minimum_skill_overlap,
            // Candidates who list no skills are only waved through when extraction is lenient.
            None => !strict,
        };
        if !passes {
            failures.push(GateFailure::InsufficientSkillOverlap);
        }
    }

    failures
}
