//! Joins the model's ratings back onto the candidates.
//!
//! Deterministic and synchronous. Duplicate ids in the model output resolve
//! first-match-wins. Ties keep row-store order because the sort is stable, but
//! callers should treat tie order as unspecified.

use std::collections::HashMap;

use crate::matching::scoring::ScoreTriple;
use crate::models::lab::{Lab, ScoredLab};

/// Lowest score that is ever returned to a client.
pub const MIN_DISPLAY_SCORE: i64 = 4;
pub const DEFAULT_MATCH_REASON: &str = "No match details provided.";

/// Attaches a score to every candidate. The output has exactly one entry per
/// candidate, in candidate order; labs the model skipped get score 0.
pub fn merge_scores(labs: Vec<Lab>, triples: &[ScoreTriple]) -> Vec<ScoredLab> {
    let mut by_id: HashMap<i64, &ScoreTriple> = HashMap::with_capacity(triples.len());
    for triple in triples {
        by_id.entry(triple.id).or_insert(triple);
    }

    labs.into_iter()
        .map(|lab| match by_id.get(&lab.id) {
            Some(triple) => ScoredLab {
                similarity_score: triple.score,
                match_reason: triple.reason.clone(),
                lab,
            },
            None => ScoredLab {
                similarity_score: 0,
                match_reason: DEFAULT_MATCH_REASON.to_string(),
                lab,
            },
        })
        .collect()
}

/// Sorts by score, highest first.
pub fn rank(scored: &mut [ScoredLab]) {
    scored.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
}

/// Keeps only the labs scored at or above `MIN_DISPLAY_SCORE`.
pub fn displayable(ranked: Vec<ScoredLab>) -> Vec<ScoredLab> {
    ranked
        .into_iter()
        .filter(|lab| lab.similarity_score >= MIN_DISPLAY_SCORE)
        .collect()
}

/// merge → rank → filter.
pub fn rank_matches(labs: Vec<Lab>, triples: &[ScoreTriple]) -> Vec<ScoredLab> {
    let mut scored = merge_scores(labs, triples);
    rank(&mut scored);
    displayable(scored)
}
