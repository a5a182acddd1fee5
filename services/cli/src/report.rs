use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use placement_engine::config::EngineConfig;
use placement_engine::error::AppError;
use placement_engine::workflows::matching::{
    write_matches, CandidateId, ExtractionMode, MatchResult, OfferingId,
};
use tracing::info;

use crate::infra::{build_catalog, build_matcher, load_fixture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// JSON fixture holding institutions, candidates and offerings
    #[arg(long)]
    pub(crate) fixture: PathBuf,
    /// Candidate to match against every open offering
    #[arg(long)]
    pub(crate) candidate: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Leave unreadable transcript values blank and flag matches for review
    #[arg(long)]
    pub(crate) strict: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ApplicantsArgs {
    /// JSON fixture holding institutions, candidates and offerings
    #[arg(long)]
    pub(crate) fixture: PathBuf,
    /// Offering whose qualified candidates should be ranked
    #[arg(long)]
    pub(crate) offering: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Leave unreadable transcript values blank and flag matches for review
    #[arg(long)]
    pub(crate) strict: bool,
}

/// Which side of the match a listing is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Perspective {
    Candidate,
    Employer,
}

pub(crate) fn run_match<W: Write>(
    out: &mut W,
    args: MatchArgs,
    engine: &EngineConfig,
) -> Result<(), AppError> {
    let engine = with_strictness(engine, args.strict);
    let catalog = build_catalog(load_fixture(&args.fixture)?)?;
    let matcher = build_matcher(catalog, &engine)?;

    let results = matcher.evaluate(&CandidateId(args.candidate.clone()))?;
    info!(
        candidate = %args.candidate,
        qualified = results.len(),
        "matched candidate against open offerings"
    );
    render(out, args.format, Perspective::Candidate, &results)
}

pub(crate) fn run_applicants<W: Write>(
    out: &mut W,
    args: ApplicantsArgs,
    engine: &EngineConfig,
) -> Result<(), AppError> {
    let engine = with_strictness(engine, args.strict);
    let catalog = build_catalog(load_fixture(&args.fixture)?)?;
    let matcher = build_matcher(catalog, &engine)?;

    let results = matcher.rank_candidates(&OfferingId(args.offering.clone()))?;
    info!(
        offering = %args.offering,
        qualified = results.len(),
        "ranked applicants for offering"
    );
    render(out, args.format, Perspective::Employer, &results)
}

fn with_strictness(engine: &EngineConfig, strict: bool) -> EngineConfig {
    let mut engine = engine.clone();
    if strict {
        engine.extraction_mode = ExtractionMode::Strict;
    }
    engine
}

fn render<W: Write>(
    out: &mut W,
    format: OutputFormat,
    perspective: Perspective,
    results: &[MatchResult],
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_matches(&mut *out, results)?,
        OutputFormat::Table => render_table(out, perspective, results)?,
    }
    Ok(())
}

fn render_table<W: Write>(
    out: &mut W,
    perspective: Perspective,
    results: &[MatchResult],
) -> std::io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "No qualified matches.");
    }

    let heading = match perspective {
        Perspective::Candidate => "offering",
        Perspective::Employer => "candidate",
    };
    writeln!(
        out,
        "{:<4} {:<24} {:<6} {:>5}  reasons",
        "#", heading, "kind", "score"
    )?;
    for (index, result) in results.iter().enumerate() {
        let subject = match perspective {
            Perspective::Candidate => &result.offering_id.0,
            Perspective::Employer => &result.candidate_id.0,
        };
        let review = if result.needs_review { " *" } else { "" };
        writeln!(
            out,
            "{:<4} {:<24} {:<6} {:>5}{}  {}",
            index + 1,
            subject,
            result.kind.label(),
            result.score,
            review,
            result.reasons.join("; ")
        )?;
    }
    if results.iter().any(|result| result.needs_review) {
        writeln!(out, "* extraction gaps; confirm the transcript before deciding")?;
    }
    Ok(())
}
