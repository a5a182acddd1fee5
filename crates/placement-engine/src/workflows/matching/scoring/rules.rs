use std::collections::BTreeSet;

use super::super::domain::{
    AcademicRecord, EducationLevel, ExperienceLevel, ExtractionMode, Grade, OfferingKind,
    PerformanceTier, RequirementSet,
};
use super::weights::{Rubric, ScoringConfig};
use super::{ScoreCategory, ScoreComponent};

const SKILL_BONUS: f32 = 0.3;
const CERTIFICATE_BONUS: f32 = 0.3;
const WORK_EXPERIENCE_BONUS: f32 = 0.4;

/// Facts the job gate needs beyond the weighted total.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreSignals {
    pub education_met: bool,
    pub experience_met: bool,
    /// `None` when the offering lists no skills or the candidate lists none.
    pub skill_overlap: Option<f32>,
    pub skills_required: bool,
}

pub(crate) fn score_record(
    record: &AcademicRecord,
    requirements: &RequirementSet,
    kind: OfferingKind,
    config: &ScoringConfig,
) -> (Vec<ScoreComponent>, u8, ScoreSignals) {
    let rubric = Rubric::for_kind(kind);
    let mut components = Vec::with_capacity(rubric.weights.len());

    let skill_overlap = skill_fraction(&record.skills, &requirements.skills);

    for (category, weight) in rubric.weights {
        let (sub_score, notes) = match category {
            ScoreCategory::AcademicPerformance => academic_component(record, requirements, config),
            ScoreCategory::SubjectMatch => subject_component(record, requirements, config),
            ScoreCategory::EducationLevel => education_component(record, requirements, kind),
            ScoreCategory::AdditionalQualifications => {
                additional_component(record, skill_overlap, config)
            }
            ScoreCategory::Skills => skills_component(record, requirements, skill_overlap),
            ScoreCategory::Experience => experience_component(record, requirements),
            ScoreCategory::Certificates => certificates_component(record),
        };

        let sub_score = sub_score.clamp(0.0, 1.0);
        components.push(ScoreComponent {
            category: *category,
            weight: *weight,
            sub_score,
            points: sub_score * f32::from(*weight),
            notes,
        });
    }

    let total_score = total_from_components(&components);

    let signals = ScoreSignals {
        education_met: education_met(record.education_level, requirements.min_education),
        experience_met: experience_met(record, requirements.min_experience),
        skill_overlap: if record.skills.is_empty() {
            None
        } else {
            skill_overlap
        },
        skills_required: !requirements.skills.is_empty(),
    };

    (components, total_score, signals)
}

pub(crate) fn total_from_components(components: &[ScoreComponent]) -> u8 {
    let raw: f32 = components.iter().map(|component| component.points).sum();
    raw.round().clamp(0.0, 100.0) as u8
}

/// Academic performance of an overall grade against the offering's tier.
pub fn academic_performance(
    overall: Option<Grade>,
    tier: Option<PerformanceTier>,
    untiered_score: f32,
) -> f32 {
    let Some(tier) = tier else {
        return untiered_score;
    };
    let Some(grade) = overall else {
        return 0.0;
    };

    match tier {
        PerformanceTier::Distinction => match grade {
            Grade::A => 1.0,
            Grade::B => 0.7,
            _ => 0.3,
        },
        PerformanceTier::Merit => match grade {
            Grade::A | Grade::B => 1.0,
            Grade::C => 0.7,
            _ => 0.3,
        },
        PerformanceTier::Credit => match grade {
            Grade::A | Grade::B | Grade::C => 1.0,
            _ => 0.5,
        },
        PerformanceTier::Pass => match grade {
            Grade::F => 0.3,
            _ => 1.0,
        },
    }
}

pub fn subject_grade_score(grade: Option<Grade>) -> f32 {
    match grade {
        Some(Grade::A) => 1.0,
        Some(Grade::B) => 0.9,
        Some(Grade::C) => 0.8,
        _ => 0.5,
    }
}

/// Meets-or-exceeds is full credit; a single level short earns partial credit.
pub fn education_match(
    candidate: Option<EducationLevel>,
    required: Option<EducationLevel>,
    kind: OfferingKind,
) -> f32 {
    let Some(required) = required else {
        return 1.0;
    };
    let candidate_rank = candidate.map(EducationLevel::rank).unwrap_or(0);
    let required_rank = required.rank();

    if candidate_rank >= required_rank {
        1.0
    } else if candidate_rank + 1 == required_rank {
        match kind {
            OfferingKind::Course => 0.5,
            OfferingKind::Job => 0.7,
        }
    } else {
        0.0
    }
}

pub fn experience_match(
    candidate: Option<ExperienceLevel>,
    required: Option<ExperienceLevel>,
) -> f32 {
    let Some(required) = required else {
        return 1.0;
    };
    let candidate_rank = candidate.map(ExperienceLevel::rank).unwrap_or(0);
    let shortfall = required.rank().saturating_sub(candidate_rank);

    match shortfall {
        0 => 1.0,
        1 => 0.7,
        2 => 0.4,
        _ => 0.0,
    }
}

/// Share of required skill keywords found among the candidate's skills.
///
/// A keyword matches when either string contains the other. Returns `None` when the offering
/// requires no skills.
pub fn skill_fraction(candidate: &BTreeSet<String>, required: &BTreeSet<String>) -> Option<f32> {
    if required.is_empty() {
        return None;
    }

    let matched = required
        .iter()
        .filter(|skill| {
            candidate.iter().any(|held| {
                !held.is_empty() && (held.contains(skill.as_str()) || skill.contains(held.as_str()))
            })
        })
        .count();

    Some(matched as f32 / required.len() as f32)
}

fn education_met(candidate: Option<EducationLevel>, required: Option<EducationLevel>) -> bool {
    match required {
        Some(required) => candidate.map(|level| level >= required).unwrap_or(false),
        None => true,
    }
}

fn experience_met(record: &AcademicRecord, required: Option<ExperienceLevel>) -> bool {
    match (required, record.experience_level) {
        (None, _) => true,
        (Some(required), Some(level)) => level >= required,
        (Some(_), None) => record.mode == ExtractionMode::Lenient,
    }
}

fn academic_component(
    record: &AcademicRecord,
    requirements: &RequirementSet,
    config: &ScoringConfig,
) -> (f32, String) {
    let score = academic_performance(
        record.overall_grade,
        requirements.performance_tier,
        config.untiered_academic_score,
    );
    let grade = record.overall_grade.map(Grade::label).unwrap_or("unknown");
    let notes = match requirements.performance_tier {
        Some(tier) => format!("overall grade {grade} against {tier:?} tier"),
        None => format!("overall grade {grade}; offering states no performance tier"),
    };
    (score, notes)
}

fn subject_component(
    record: &AcademicRecord,
    requirements: &RequirementSet,
    config: &ScoringConfig,
) -> (f32, String) {
    if requirements.subjects.is_empty() {
        return (
            config.unreferenced_subject_score,
            "no subjects referenced".to_string(),
        );
    }

    let mut total = 0.0;
    let mut below_minimum = Vec::new();
    for (subject, minimum) in &requirements.subjects {
        let grade = record.subject_grades.get(subject).copied();
        total += subject_grade_score(grade);
        if let Some(minimum) = minimum {
            if !grade.map(|grade| grade.meets(*minimum)).unwrap_or(false) {
                below_minimum.push(format!("{} (needs {})", subject.label(), minimum.label()));
            }
        }
    }

    let score = total / requirements.subjects.len() as f32;
    let notes = if below_minimum.is_empty() {
        format!("{} subject(s) assessed", requirements.subjects.len())
    } else {
        format!("below stated minimum: {}", below_minimum.join(", "))
    };
    (score, notes)
}

fn education_component(
    record: &AcademicRecord,
    requirements: &RequirementSet,
    kind: OfferingKind,
) -> (f32, String) {
    let score = education_match(record.education_level, requirements.min_education, kind);
    let held = record
        .education_level
        .map(EducationLevel::label)
        .unwrap_or("unknown");
    let notes = match requirements.min_education {
        Some(required) => format!("{held} against minimum {}", required.label()),
        None => format!("{held}; no minimum education level"),
    };
    (score, notes)
}

fn additional_component(
    record: &AcademicRecord,
    skill_overlap: Option<f32>,
    config: &ScoringConfig,
) -> (f32, String) {
    let mut score = config.additional_baseline;
    let mut sources = Vec::new();

    if let Some(fraction) = skill_overlap.filter(|fraction| *fraction > 0.0) {
        score += SKILL_BONUS * fraction;
        sources.push(format!("{:.0}% of listed skills", fraction * 100.0));
    }
    if !record.certificates.is_empty() {
        score += CERTIFICATE_BONUS;
        sources.push(format!("{} certificate(s)", record.certificates.len()));
    }
    if record.has_work_experience {
        score += WORK_EXPERIENCE_BONUS;
        sources.push("work experience".to_string());
    }

    let notes = if sources.is_empty() {
        "baseline only".to_string()
    } else {
        sources.join(", ")
    };
    (score.min(1.0), notes)
}

fn skills_component(
    record: &AcademicRecord,
    requirements: &RequirementSet,
    skill_overlap: Option<f32>,
) -> (f32, String) {
    match skill_overlap {
        Some(fraction) => (
            fraction,
            format!(
                "{} of {} required skill(s) held",
                (fraction * requirements.skills.len() as f32).round() as usize,
                requirements.skills.len()
            ),
        ),
        None => (
            1.0,
            format!(
                "no required skills listed; candidate lists {}",
                record.skills.len()
            ),
        ),
    }
}

fn experience_component(record: &AcademicRecord, requirements: &RequirementSet) -> (f32, String) {
    let score = experience_match(record.experience_level, requirements.min_experience);
    let held = record
        .experience_level
        .map(ExperienceLevel::label)
        .unwrap_or("none");
    let notes = match requirements.min_experience {
        Some(required) => format!("{held} against minimum {}", required.label()),
        None => format!("{held}; no minimum experience level"),
    };
    (score, notes)
}

fn certificates_component(record: &AcademicRecord) -> (f32, String) {
    if record.certificates.is_empty() {
        (0.0, "no certificates".to_string())
    } else {
        (1.0, format!("{} certificate(s)", record.certificates.len()))
    }
}
