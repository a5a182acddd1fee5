use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::matching::domain::{
    AcademicRecord, CandidateId, CandidateProfile, EducationLevel, ExperienceLevel,
    ExtractionMode, Grade, Institution, InstitutionId, Offering, OfferingId, OfferingKind,
    OfferingStatus, RequirementDraft, Subject,
};
use crate::workflows::matching::{
    AttributeExtractor, RankedMatcher, RequirementModel, ScoringEngine, Vocabulary,
};
use crate::workflows::memory::InMemoryCatalog;

pub(super) const STRONG_TRANSCRIPT: &str = "\
NATIONAL SENIOR CERTIFICATE
Mathematics
A (Distinction)
English Home Language
B (Merit)
Physical Sciences
A (Distinction)
Average Marks: 91%
";

pub(super) const WEAK_TRANSCRIPT: &str = "\
Mathematics
D (Adequate)
English Home Language
C (Moderate)
Physical Sciences
D (Adequate)
Average Marks: 58%
";

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn profile(id: &str, transcript: &str) -> CandidateProfile {
    CandidateProfile {
        candidate_id: CandidateId(id.to_string()),
        verified: true,
        transcript: transcript.to_string(),
        education_level: Some("high school".to_string()),
        experience_level: None,
        skills: String::new(),
        certificates: Vec::new(),
        work_experience: None,
        registered_at: epoch(),
        record_version: 1,
    }
}

pub(super) fn graduate(id: &str, skills: &str, experience: &str) -> CandidateProfile {
    CandidateProfile {
        education_level: Some("bachelors".to_string()),
        experience_level: Some(experience.to_string()),
        skills: skills.to_string(),
        certificates: vec!["AWS Cloud Practitioner".to_string()],
        ..profile(id, STRONG_TRANSCRIPT)
    }
}

pub(super) fn record(
    subjects: &[(Subject, Grade)],
    overall: Option<Grade>,
    mode: ExtractionMode,
) -> AcademicRecord {
    AcademicRecord {
        candidate_id: CandidateId("cand-record".to_string()),
        record_version: 1,
        mode,
        subject_grades: subjects.iter().copied().collect::<BTreeMap<_, _>>(),
        overall_grade: overall,
        education_level: Some(EducationLevel::HighSchool),
        experience_level: None,
        skills: BTreeSet::new(),
        certificates: Vec::new(),
        has_work_experience: false,
        gaps: Vec::new(),
    }
}

pub(super) fn extractor(mode: ExtractionMode) -> AttributeExtractor {
    AttributeExtractor::new(Vocabulary::default(), mode).expect("extractor patterns compile")
}

pub(super) fn requirement_model() -> RequirementModel {
    RequirementModel::new(Vocabulary::default()).expect("requirement patterns compile")
}

pub(super) fn course_draft(text: &str) -> RequirementDraft {
    RequirementDraft {
        text: text.to_string(),
        ..RequirementDraft::default()
    }
}

pub(super) fn job_draft(
    text: &str,
    education: EducationLevel,
    experience: ExperienceLevel,
) -> RequirementDraft {
    RequirementDraft {
        text: text.to_string(),
        min_education: Some(education),
        min_experience: Some(experience),
        ..RequirementDraft::default()
    }
}

pub(super) fn offering(
    id: &str,
    institution: &str,
    kind: OfferingKind,
    draft: &RequirementDraft,
    created_offset_hours: i64,
) -> Offering {
    let offering_id = OfferingId(id.to_string());
    Offering {
        requirements: requirement_model().normalize(offering_id.clone(), draft),
        offering_id,
        institution_id: InstitutionId(institution.to_string()),
        kind,
        title: format!("{} offering", id),
        capacity: 1,
        status: OfferingStatus::Open,
        created_at: epoch() + Duration::hours(created_offset_hours),
        revision: 1,
    }
}

pub(super) fn institution(id: &str) -> Institution {
    Institution {
        institution_id: InstitutionId(id.to_string()),
        name: format!("{id} campus"),
    }
}

pub(super) fn catalog() -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::default();
    for id in ["uni-north", "uni-south", "acme"] {
        catalog
            .upsert_institution(institution(id))
            .expect("institution stored");
    }
    Arc::new(catalog)
}

pub(super) fn matcher(
    catalog: Arc<InMemoryCatalog>,
    mode: ExtractionMode,
) -> RankedMatcher<InMemoryCatalog, InMemoryCatalog> {
    RankedMatcher::new(
        catalog.clone(),
        catalog,
        extractor(mode),
        ScoringEngine::default(),
    )
}
