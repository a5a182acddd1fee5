use std::io::Write;

use serde::Serialize;

use super::scoring::MatchResult;

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    rank: usize,
    candidate_id: &'a str,
    offering_id: &'a str,
    kind: &'static str,
    score: u8,
    qualified: bool,
    needs_review: bool,
    reasons: String,
}

/// Write ranked results as CSV, one row per match in the order given.
pub fn write_matches<W: Write>(writer: W, results: &[MatchResult]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for (index, result) in results.iter().enumerate() {
        csv_writer.serialize(MatchRow {
            rank: index + 1,
            candidate_id: &result.candidate_id.0,
            offering_id: &result.offering_id.0,
            kind: result.kind.label(),
            score: result.score,
            qualified: result.qualified,
            needs_review: result.needs_review,
            reasons: result.reasons.join("; "),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
