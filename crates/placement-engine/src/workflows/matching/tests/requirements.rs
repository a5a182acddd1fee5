use std::collections::BTreeMap;

use super::common::*;
use crate::workflows::matching::domain::{
    EducationLevel, Grade, OfferingId, PerformanceTier, RequirementDraft, Subject,
};

fn offering_id() -> OfferingId {
    OfferingId("course-1".to_string())
}

#[test]
fn reads_subject_minimums_from_text() {
    let set = requirement_model().normalize(
        offering_id(),
        &course_draft("Mathematics A, English: B, Physical Science - A"),
    );

    assert_eq!(set.subjects.get(&Subject::Mathematics), Some(&Some(Grade::A)));
    assert_eq!(set.subjects.get(&Subject::English), Some(&Some(Grade::B)));
    assert_eq!(set.subjects.get(&Subject::Science), Some(&Some(Grade::A)));
    assert_eq!(set.performance_tier, Some(PerformanceTier::Distinction));
    assert_eq!(set.display_text, "Mathematics A, English: B, Physical Science - A");
}

#[test]
fn subjects_without_grades_are_referenced_without_minimum() {
    let set = requirement_model().normalize(
        offering_id(),
        &course_draft("Strong Mathematics and English required; Mathematics Advanced Programme"),
    );

    assert_eq!(set.subjects.len(), 2);
    assert_eq!(set.subjects.get(&Subject::Mathematics), Some(&None));
    assert_eq!(set.subjects.get(&Subject::English), Some(&None));
    assert_eq!(set.performance_tier, None);
}

#[test]
fn tier_words_take_precedence_over_subject_minimums() {
    let set = requirement_model().normalize(
        offering_id(),
        &course_draft("Merit pass overall with Mathematics A"),
    );

    assert_eq!(set.performance_tier, Some(PerformanceTier::Merit));
}

#[test]
fn structured_fields_override_text_detection() {
    let mut minimums = BTreeMap::new();
    minimums.insert(Subject::Mathematics, Grade::C);
    let draft = RequirementDraft {
        text: "Mathematics A. Python and SQL experience preferred.".to_string(),
        min_education: Some(EducationLevel::Bachelors),
        subject_minimums: minimums,
        skills: vec!["  Docker ".to_string(), String::new()],
        ..RequirementDraft::default()
    };

    let set = requirement_model().normalize(offering_id(), &draft);

    assert_eq!(set.subjects.get(&Subject::Mathematics), Some(&Some(Grade::C)));
    assert_eq!(set.performance_tier, Some(PerformanceTier::Credit));
    assert_eq!(set.min_education, Some(EducationLevel::Bachelors));
    assert_eq!(set.min_experience, None);
    let skills: Vec<&str> = set.skills.iter().map(String::as_str).collect();
    assert_eq!(skills, vec!["docker", "python", "sql"]);
}

#[test]
fn explicit_tier_wins() {
    let draft = RequirementDraft {
        text: "Distinction in Mathematics".to_string(),
        performance_tier: Some(PerformanceTier::Pass),
        ..RequirementDraft::default()
    };

    let set = requirement_model().normalize(offering_id(), &draft);

    assert_eq!(set.performance_tier, Some(PerformanceTier::Pass));
    assert_eq!(set.subjects.get(&Subject::Mathematics), Some(&None));
}

#[test]
fn free_text_never_sets_education_or_experience() {
    let set = requirement_model().normalize(
        offering_id(),
        &course_draft("Masters degree and senior experience required"),
    );

    assert_eq!(set.min_education, None);
    assert_eq!(set.min_experience, None);
    assert!(set.subjects.is_empty());
}
