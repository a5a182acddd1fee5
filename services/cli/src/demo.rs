use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;
use placement_engine::config::EngineConfig;
use placement_engine::error::AppError;
use placement_engine::workflows::admissions::{
    AdmissionError, AdmissionRuleEnforcer, ApplicationRecord, ReviewDecision,
};
use placement_engine::workflows::matching::{
    CandidateId, CandidateProfile, EducationLevel, ExperienceLevel, Institution, InstitutionId,
    OfferingId, OfferingKind, OfferingStatus, RequirementDraft,
};
use placement_engine::workflows::memory::{InMemoryAdmissionStore, InMemoryCatalog};

use crate::infra::{build_catalog, build_matcher, Fixture, OfferingFixture};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the matching portion of the demo.
    #[arg(long)]
    pub(crate) skip_matching: bool,
}

const STRONG_TRANSCRIPT: &str = "\
Mathematics        A (Distinction)
English            B (Merit)
Physical Sciences  A (Distinction)
Average Marks: 89%
";

const STEADY_TRANSCRIPT: &str = "\
Mathematics        B (Merit)
English            B (Merit)
Physical Sciences  C (Moderate)
Average Marks: 74%
";

fn demo_catalog() -> Fixture {
    let now = Utc::now();
    let institution = |id: &str, name: &str| Institution {
        institution_id: InstitutionId(id.to_string()),
        name: name.to_string(),
    };
    let candidate = |id: &str, transcript: &str, skills: &str, days_ago: i64| CandidateProfile {
        candidate_id: CandidateId(id.to_string()),
        verified: true,
        transcript: transcript.to_string(),
        education_level: Some("high school".to_string()),
        experience_level: None,
        skills: skills.to_string(),
        certificates: Vec::new(),
        work_experience: None,
        registered_at: now - Duration::days(days_ago),
        record_version: 1,
    };
    let offering = |id: &str, institution: &str, kind: OfferingKind, capacity: u32, draft| {
        OfferingFixture {
            offering_id: OfferingId(id.to_string()),
            institution_id: InstitutionId(institution.to_string()),
            kind,
            title: id.to_string(),
            requirements: draft,
            capacity,
            status: OfferingStatus::Open,
            created_at: now - Duration::days(30),
            revision: 1,
        }
    };
    let course = |text: &str| RequirementDraft {
        text: text.to_string(),
        ..RequirementDraft::default()
    };

    Fixture {
        institutions: vec![
            institution("northgate", "Northgate University"),
            institution("southbay", "Southbay Institute of Technology"),
            institution("acme", "Acme Analytics"),
        ],
        candidates: vec![
            candidate("zanele", STRONG_TRANSCRIPT, "Python, SQL, teamwork", 10),
            candidate("thabo", STEADY_TRANSCRIPT, "Communication", 8),
        ],
        offerings: vec![
            offering(
                "ng-cs",
                "northgate",
                OfferingKind::Course,
                1,
                course("Mathematics A, Physical Science B, English C"),
            ),
            offering(
                "ng-arts",
                "northgate",
                OfferingKind::Course,
                20,
                course("English C with a pass overall"),
            ),
            offering(
                "ng-econ",
                "northgate",
                OfferingKind::Course,
                20,
                course("Mathematics C"),
            ),
            offering(
                "sb-eng",
                "southbay",
                OfferingKind::Course,
                1,
                course("Mathematics A and Physical Science A"),
            ),
            offering(
                "acme-intern",
                "acme",
                OfferingKind::Job,
                2,
                RequirementDraft {
                    text: "Python and SQL, teamwork".to_string(),
                    min_education: Some(EducationLevel::HighSchool),
                    min_experience: Some(ExperienceLevel::Internship),
                    ..RequirementDraft::default()
                },
            ),
        ],
    }
}

pub(crate) fn run_demo<W: Write>(
    out: &mut W,
    args: DemoArgs,
    engine: &EngineConfig,
) -> Result<(), AppError> {
    let catalog = build_catalog(demo_catalog())?;

    writeln!(out, "Placement engine demo")?;
    if !args.skip_matching {
        render_matching(out, catalog.clone(), engine)?;
    }
    render_admissions(out, catalog, engine)
}

fn render_matching<W: Write>(
    out: &mut W,
    catalog: Arc<InMemoryCatalog>,
    engine: &EngineConfig,
) -> Result<(), AppError> {
    let matcher = build_matcher(catalog, engine)?;

    writeln!(out, "\nMatching ({:?} extraction)", engine.extraction_mode)?;
    for candidate in ["zanele", "thabo"] {
        let results = matcher.evaluate(&CandidateId(candidate.to_string()))?;
        writeln!(out, "- {candidate}: {} qualified offering(s)", results.len())?;
        for result in &results {
            writeln!(
                out,
                "    {:<12} {:<6} score {:>3}  {}",
                result.offering_id.0,
                result.kind.label(),
                result.score,
                result.reasons.join("; ")
            )?;
        }
    }

    let applicants = matcher.rank_candidates(&OfferingId("acme-intern".to_string()))?;
    let names: Vec<&str> = applicants
        .iter()
        .map(|result| result.candidate_id.0.as_str())
        .collect();
    writeln!(out, "- acme-intern qualified applicants: {}", names.join(", "))?;
    Ok(())
}

fn render_admissions<W: Write>(
    out: &mut W,
    catalog: Arc<InMemoryCatalog>,
    engine: &EngineConfig,
) -> Result<(), AppError> {
    let store = Arc::new(InMemoryAdmissionStore::default());
    let enforcer = AdmissionRuleEnforcer::new(store, catalog, engine.admission);
    let zanele = CandidateId("zanele".to_string());
    let thabo = CandidateId("thabo".to_string());
    let offering = |id: &str| OfferingId(id.to_string());

    writeln!(
        out,
        "\nAdmissions (cap {} active per institution)",
        enforcer.policy().max_active_per_institution
    )?;

    let zanele_cs = enforcer.create_application(&zanele, &offering("ng-cs"))?;
    let zanele_cs = enforcer.review(&zanele_cs.application_id, ReviewDecision::Approve)?;
    describe(out, "zanele -> ng-cs", &zanele_cs)?;

    let thabo_cs = enforcer.create_application(&thabo, &offering("ng-cs"))?;
    let thabo_cs = enforcer.review(&thabo_cs.application_id, ReviewDecision::Approve)?;
    describe(out, "thabo -> ng-cs", &thabo_cs)?;

    let zanele_eng = enforcer.create_application(&zanele, &offering("sb-eng"))?;
    let zanele_eng = enforcer.review(&zanele_eng.application_id, ReviewDecision::Approve)?;
    describe(out, "zanele -> sb-eng", &zanele_eng)?;

    let zanele_arts = enforcer.create_application(&zanele, &offering("ng-arts"))?;
    describe(out, "zanele -> ng-arts", &zanele_arts)?;
    match enforcer.create_application(&zanele, &offering("ng-econ")) {
        Err(error @ AdmissionError::CapExceeded { .. }) => {
            writeln!(out, "- zanele -> ng-econ: refused ({error})")?;
        }
        Ok(record) => describe(out, "zanele -> ng-econ", &record)?,
        Err(error) => return Err(error.into()),
    }

    let outcome = enforcer.accept_offer(&zanele_eng.application_id)?;
    writeln!(out, "- zanele accepts sb-eng")?;
    for rejected in &outcome.rejected {
        let record = enforcer.get(rejected)?;
        describe(out, "  released", &record)?;
    }
    for promotion in &outcome.promoted {
        writeln!(
            out,
            "  promoted {} into {} from the waitlist",
            promotion.candidate_id, promotion.offering_id
        )?;
    }

    writeln!(out, "\nFinal application status")?;
    for candidate in [&zanele, &thabo] {
        for record in enforcer.applications_for_candidate(candidate)? {
            let view = record.status_view();
            match view.reason {
                Some(reason) => writeln!(
                    out,
                    "- {candidate} {}: {} ({reason})",
                    view.offering_id, view.status
                )?,
                None => writeln!(out, "- {candidate} {}: {}", view.offering_id, view.status)?,
            }
        }
    }
    Ok(())
}

fn describe<W: Write>(out: &mut W, label: &str, record: &ApplicationRecord) -> std::io::Result<()> {
    let view = record.status_view();
    match view.reason {
        Some(reason) => writeln!(out, "- {label}: {} ({reason})", view.status),
        None => writeln!(out, "- {label}: {}", view.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_output(args: DemoArgs) -> String {
        let mut buffer = Vec::new();
        run_demo(&mut buffer, args, &EngineConfig::default()).expect("demo runs");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[test]
    fn demo_walks_through_acceptance_and_promotion() {
        let output = demo_output(DemoArgs::default());

        assert!(output.contains("- thabo -> ng-cs: waitlisted (offering full)"));
        assert!(output.contains("- zanele -> ng-econ: refused"));
        assert!(output.contains("  released: rejected (accepted elsewhere)"));
        assert!(output.contains("  promoted thabo into ng-cs from the waitlist"));
        assert!(output.contains("- zanele sb-eng: accepted"));
        assert!(output.contains("- thabo ng-cs: approved"));
    }

    #[test]
    fn matching_section_lists_qualified_offerings() {
        let output = demo_output(DemoArgs::default());
        assert!(output.contains("Matching (Lenient extraction)"));
        assert!(output.contains("- acme-intern qualified applicants: zanele"));

        let skipped = demo_output(DemoArgs {
            skip_matching: true,
        });
        assert!(!skipped.contains("Matching"));
        assert!(skipped.contains("Admissions (cap 2 active per institution)"));
    }
}
