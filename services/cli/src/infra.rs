use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use placement_engine::config::EngineConfig;
use placement_engine::error::AppError;
use placement_engine::workflows::matching::{
    AttributeExtractor, CandidateProfile, Institution, InstitutionId, MatchingError, Offering,
    OfferingId, OfferingKind, OfferingStatus, RankedMatcher, RequirementDraft, RequirementModel,
    ScoringEngine, Vocabulary,
};
use placement_engine::workflows::memory::InMemoryCatalog;
use serde::Deserialize;
use tracing::debug;

pub(crate) type CatalogMatcher = RankedMatcher<InMemoryCatalog, InMemoryCatalog>;

/// Catalog snapshot read from a JSON fixture file.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Fixture {
    #[serde(default)]
    pub(crate) institutions: Vec<Institution>,
    #[serde(default)]
    pub(crate) candidates: Vec<CandidateProfile>,
    #[serde(default)]
    pub(crate) offerings: Vec<OfferingFixture>,
}

/// Offering as captured at creation time, before requirement normalization.
#[derive(Debug, Deserialize)]
pub(crate) struct OfferingFixture {
    pub(crate) offering_id: OfferingId,
    pub(crate) institution_id: InstitutionId,
    pub(crate) kind: OfferingKind,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) requirements: RequirementDraft,
    #[serde(default = "default_capacity")]
    pub(crate) capacity: u32,
    #[serde(default)]
    pub(crate) status: OfferingStatus,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default = "first_revision")]
    pub(crate) revision: u64,
}

fn default_capacity() -> u32 {
    1
}

fn first_revision() -> u64 {
    1
}

impl OfferingFixture {
    pub(crate) fn normalize(self, model: &RequirementModel) -> Offering {
        Offering {
            requirements: model.normalize(self.offering_id.clone(), &self.requirements),
            offering_id: self.offering_id,
            institution_id: self.institution_id,
            kind: self.kind,
            title: self.title,
            capacity: self.capacity,
            status: self.status,
            created_at: self.created_at,
            revision: self.revision,
        }
    }
}

pub(crate) fn load_fixture(path: &Path) -> Result<Fixture, AppError> {
    let raw = fs::read_to_string(path)?;
    let fixture: Fixture = serde_json::from_str(&raw)?;
    debug!(
        path = %path.display(),
        institutions = fixture.institutions.len(),
        candidates = fixture.candidates.len(),
        offerings = fixture.offerings.len(),
        "loaded catalog fixture"
    );
    Ok(fixture)
}

/// Populate an in-memory catalog, normalizing every offering's requirements once.
pub(crate) fn build_catalog(fixture: Fixture) -> Result<Arc<InMemoryCatalog>, AppError> {
    let model = RequirementModel::new(Vocabulary::default()).map_err(MatchingError::from)?;
    let catalog = InMemoryCatalog::default();

    for institution in fixture.institutions {
        catalog
            .upsert_institution(institution)
            .map_err(MatchingError::from)?;
    }
    for profile in fixture.candidates {
        catalog
            .upsert_candidate(profile)
            .map_err(MatchingError::from)?;
    }
    for offering in fixture.offerings {
        catalog
            .upsert_offering(offering.normalize(&model))
            .map_err(MatchingError::from)?;
    }

    Ok(Arc::new(catalog))
}

pub(crate) fn build_matcher(
    catalog: Arc<InMemoryCatalog>,
    engine: &EngineConfig,
) -> Result<CatalogMatcher, AppError> {
    let extractor = AttributeExtractor::new(Vocabulary::default(), engine.extraction_mode)
        .map_err(MatchingError::from)?;
    Ok(RankedMatcher::new(
        catalog.clone(),
        catalog,
        extractor,
        ScoringEngine::new(engine.scoring.clone()),
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    use placement_engine::workflows::matching::{CandidateId, Grade, Subject};
    use placement_engine::workflows::repository::{CandidateStore, OfferingStore};
    use tempfile::NamedTempFile;

    pub(crate) const FIXTURE: &str = r#"{
  "institutions": [
    { "institution_id": "northgate", "name": "Northgate University" },
    { "institution_id": "acme", "name": "Acme Analytics" }
  ],
  "candidates": [
    {
      "candidate_id": "zanele",
      "verified": true,
      "transcript": "Mathematics A (Distinction)\nEnglish B (Merit)\nPhysical Sciences A (Distinction)\nAverage Marks: 90%",
      "education_level": "diploma",
      "experience_level": "entry",
      "skills": "Python, SQL",
      "registered_at": "2025-01-10T08:00:00Z",
      "record_version": 1
    },
    {
      "candidate_id": "thabo",
      "verified": true,
      "transcript": "Mathematics D (Adequate)\nEnglish C (Moderate)\nPhysical Sciences D (Adequate)\nAverage Marks: 55%",
      "education_level": "diploma",
      "experience_level": "entry",
      "skills": "Communication",
      "registered_at": "2025-01-09T08:00:00Z",
      "record_version": 1
    }
  ],
  "offerings": [
    {
      "offering_id": "ng-cs",
      "institution_id": "northgate",
      "kind": "course",
      "title": "Computer Science",
      "requirements": { "text": "Mathematics A, Physical Science B" },
      "capacity": 1,
      "created_at": "2025-01-01T00:00:00Z"
    },
    {
      "offering_id": "acme-analyst",
      "institution_id": "acme",
      "kind": "job",
      "title": "Junior Analyst",
      "requirements": {
        "text": "Python, SQL",
        "min_education": "diploma",
        "min_experience": "entry"
      },
      "created_at": "2025-01-02T00:00:00Z"
    }
  ]
}"#;

    pub(crate) fn fixture_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file created");
        file.write_all(contents.as_bytes())
            .expect("fixture written");
        file
    }

    #[test]
    fn loads_fixture_and_normalizes_requirements() {
        let file = fixture_file(FIXTURE);
        let fixture = load_fixture(file.path()).expect("fixture parses");
        assert_eq!(fixture.candidates.len(), 2);

        let catalog = build_catalog(fixture).expect("catalog built");
        let course = catalog
            .offering(&OfferingId("ng-cs".to_string()))
            .expect("store readable")
            .expect("course stored");
        assert_eq!(
            course.requirements.subjects.get(&Subject::Mathematics),
            Some(&Some(Grade::A))
        );
        assert_eq!(course.revision, 1);

        let job = catalog
            .offering(&OfferingId("acme-analyst".to_string()))
            .expect("store readable")
            .expect("job stored");
        assert_eq!(job.capacity, 1);
        assert!(job.requirements.skills.contains("python"));
        assert!(catalog
            .profile(&CandidateId("thabo".to_string()))
            .expect("store readable")
            .is_some());
    }

    #[test]
    fn malformed_fixture_is_a_json_error() {
        let file = fixture_file("{ \"candidates\": [ { \"candidate_id\": 7 } ] }");
        match load_fixture(file.path()) {
            Err(AppError::Json(_)) => {}
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn missing_fixture_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        match load_fixture(&dir.path().join("absent.json")) {
            Err(AppError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
