use super::common::*;
use crate::workflows::matching::domain::{
    EducationLevel, ExperienceLevel, ExtractionGap, ExtractionMode, Grade, Subject,
};

#[test]
fn reads_annotated_grades_below_subject_anchor() {
    let candidate = profile("cand-1", STRONG_TRANSCRIPT);
    let record = extractor(ExtractionMode::Lenient).extract(&candidate);

    assert_eq!(record.subject_grades.get(&Subject::Mathematics), Some(&Grade::A));
    assert_eq!(record.subject_grades.get(&Subject::English), Some(&Grade::B));
    assert_eq!(record.subject_grades.get(&Subject::Science), Some(&Grade::A));
    assert_eq!(record.overall_grade, Some(Grade::A));
    assert_eq!(record.education_level, Some(EducationLevel::HighSchool));
    assert_eq!(record.gaps, vec![ExtractionGap::ExperienceLevel(None)]);
    assert!(!record.needs_review());
}

#[test]
fn standalone_grade_on_anchor_line_is_read_and_modifiers_dropped() {
    let transcript = "Mathematics B+\nEnglish A*\nBiology C\nAverage Marks: 74.5%";
    let record = extractor(ExtractionMode::Strict).extract(&profile("cand-2", transcript));

    assert_eq!(record.subject_grades.get(&Subject::Mathematics), Some(&Grade::B));
    assert_eq!(record.subject_grades.get(&Subject::English), Some(&Grade::A));
    assert_eq!(record.subject_grades.get(&Subject::Science), Some(&Grade::C));
    assert_eq!(record.overall_grade, Some(Grade::C));
}

#[test]
fn ignores_grade_letters_on_average_lines() {
    let transcript = "Mathematics\nAverage Marks: 65% A\nEnglish\nB (Merit)";
    let record = extractor(ExtractionMode::Strict).extract(&profile("cand-3", transcript));

    // The only letter inside the mathematics window sits on an average line, and the first
    // clean grade in the window belongs to English.
    assert_eq!(record.subject_grades.get(&Subject::Mathematics), Some(&Grade::B));
    assert_eq!(record.overall_grade, Some(Grade::D));
}

#[test]
fn grade_window_is_bounded() {
    let transcript = "Mathematics\nline two\nline three\nline four\nline five\nA (Distinction)";
    let record = extractor(ExtractionMode::Strict).extract(&profile("cand-4", transcript));

    assert_eq!(record.subject_grades.get(&Subject::Mathematics), None);
    assert!(record
        .gaps
        .contains(&ExtractionGap::SubjectGrade(Subject::Mathematics)));
}

#[test]
fn lenient_mode_defaults_missing_grades_to_a() {
    let candidate = profile("cand-5", "Mathematics\nC (Moderate)");
    let record = extractor(ExtractionMode::Lenient).extract(&candidate);

    assert_eq!(record.subject_grades.get(&Subject::Mathematics), Some(&Grade::C));
    assert_eq!(record.subject_grades.get(&Subject::English), Some(&Grade::A));
    assert_eq!(record.subject_grades.get(&Subject::Science), Some(&Grade::A));
    assert_eq!(record.overall_grade, Some(Grade::A));
    assert!(record.gaps.contains(&ExtractionGap::OverallGrade));
    assert!(!record.needs_review(), "lenient records are never flagged");
}

#[test]
fn strict_mode_leaves_missing_values_absent_and_flags_review() {
    let candidate = profile("cand-6", "Mathematics\nC (Moderate)");
    let record = extractor(ExtractionMode::Strict).extract(&candidate);

    assert_eq!(record.subject_grades.len(), 1);
    assert_eq!(record.overall_grade, None);
    assert!(record.gaps.contains(&ExtractionGap::SubjectGrade(Subject::English)));
    assert!(record.gaps.contains(&ExtractionGap::SubjectGrade(Subject::Science)));
    assert!(record.needs_review());
}

#[test]
fn skills_are_limited_to_vocabulary_keywords() {
    let mut candidate = graduate("cand-7", "Python, SQL, basket weaving, Team Leadership", "mid");
    candidate.certificates.push("   ".to_string());
    let record = extractor(ExtractionMode::Lenient).extract(&candidate);

    let skills: Vec<&str> = record.skills.iter().map(String::as_str).collect();
    assert_eq!(skills, vec!["leadership", "python", "sql"]);
    assert_eq!(record.experience_level, Some(ExperienceLevel::Mid));
    assert_eq!(record.certificates, vec!["AWS Cloud Practitioner".to_string()]);
    assert!(record.has_work_experience);
}

#[test]
fn unrecognized_levels_are_recorded_as_gaps() {
    let mut candidate = profile("cand-8", STRONG_TRANSCRIPT);
    candidate.education_level = Some("bootcamp".to_string());
    candidate.experience_level = Some("wizard".to_string());

    let record = extractor(ExtractionMode::Strict).extract(&candidate);

    assert_eq!(record.education_level, None);
    assert_eq!(record.experience_level, None);
    assert!(record
        .gaps
        .contains(&ExtractionGap::EducationLevel(Some("bootcamp".to_string()))));
    assert!(record
        .gaps
        .contains(&ExtractionGap::ExperienceLevel(Some("wizard".to_string()))));
    assert!(!record.has_work_experience);
}

#[test]
fn strict_mode_flags_missing_experience_for_review() {
    let mut candidate = graduate("cand-9", "Python", "");
    candidate.experience_level = None;

    let strict = extractor(ExtractionMode::Strict).extract(&candidate);
    let lenient = extractor(ExtractionMode::Lenient).extract(&candidate);

    assert_eq!(strict.experience_level, None);
    assert_eq!(strict.gaps, vec![ExtractionGap::ExperienceLevel(None)]);
    assert!(strict.needs_review());
    assert!(lenient.gaps.contains(&ExtractionGap::ExperienceLevel(None)));
    assert!(!lenient.needs_review());

    let mut described = graduate("cand-10", "Python", "  ");
    described.work_experience = Some("Tutor".to_string());
    let record = extractor(ExtractionMode::Strict).extract(&described);
    assert!(record.gaps.contains(&ExtractionGap::ExperienceLevel(None)));
    assert!(record.has_work_experience);
}
