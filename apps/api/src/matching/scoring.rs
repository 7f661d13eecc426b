//! Scoring step. Asks the model to rate every candidate lab against the student profile.
//!
//! Labeled responses are parsed block by block. A block missing any of its three
//! fields is dropped and only counted; it never fails the run. Reported ids are not
//! checked against the candidates and scores are not range-checked.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ResponseFormat;
use crate::errors::AppError;
use crate::llm_client::{complete_json, Attachment, Completion, CompletionRequest, ImageDetail, LlmError};
use crate::matching::extraction::ResumeProfile;
use crate::matching::prompts::{scoring_system, scoring_user, SCORING_MAX_TOKENS};
use crate::models::lab::Lab;

const BLOCK_DELIMITER: &str = "---";

static LAB_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Lab\s*ID:\s*(\d+)").unwrap());
static SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Similarity\s*Score:\s*(\d+)").unwrap());
static REASON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Match\s*Reason:\s*([\s\S]+)").unwrap());

/// One lab's rating as reported by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTriple {
    #[serde(rename = "lab_id")]
    pub id: i64,
    #[serde(rename = "similarity_score")]
    pub score: i64,
    #[serde(rename = "match_reason")]
    pub reason: String,
}

/// Result of parsing a scoring response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScores {
    /// In response order; duplicates are kept.
    pub triples: Vec<ScoreTriple>,
    /// Non-blank blocks that were missing a field.
    pub dropped_blocks: usize,
}

/// Splits a labeled response on `---` and parses each block independently.
pub fn parse_scores(text: &str) -> ParsedScores {
    let mut parsed = ParsedScores::default();

    for block in text.split(BLOCK_DELIMITER) {
        match parse_block(block) {
            Some(triple) => parsed.triples.push(triple),
            None if block.trim().is_empty() => {}
            None => {
                debug!("Dropping unparseable score block: {:?}", block.trim());
                parsed.dropped_blocks += 1;
            }
        }
    }

    parsed
}

fn parse_block(block: &str) -> Option<ScoreTriple> {
    let id = LAB_ID_RE.captures(block)?[1].parse().ok()?;
    let score = parse_score(&SCORE_RE.captures(block)?[1]);
    let reason = REASON_RE.captures(block)?[1].trim().to_string();
    Some(ScoreTriple { id, score, reason })
}

/// The capture is all digits, so the only failure is overflow.
fn parse_score(digits: &str) -> i64 {
    digits.parse().unwrap_or(i64::MAX)
}

/// Sends the profile, every candidate and the original document to the model.
pub async fn score_labs(
    llm: &dyn Completion,
    profile: &ResumeProfile,
    labs: &[Lab],
    attachment: &Attachment,
    format: ResponseFormat,
) -> Result<ParsedScores, AppError> {
    let labs_json = serde_json::to_string_pretty(labs)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize labs: {e}")))?;
    let system = scoring_system(&profile.major, &profile.keywords, format);
    let user_text = scoring_user(&profile.major, &profile.keywords, &labs_json);

    let request = CompletionRequest {
        system: &system,
        user_text: &user_text,
        attachment: Some(attachment),
        detail: ImageDetail::High,
        max_tokens: SCORING_MAX_TOKENS,
    };

    let parsed = match format {
        ResponseFormat::Labeled => {
            let text = llm.complete(request).await.map_err(scoring_error)?;
            parse_scores(&text)
        }
        ResponseFormat::Json => {
            let triples: Vec<ScoreTriple> =
                complete_json(llm, request).await.map_err(scoring_error)?;
            ParsedScores {
                triples,
                dropped_blocks: 0,
            }
        }
    };

    if parsed.dropped_blocks > 0 {
        warn!(
            dropped = parsed.dropped_blocks,
            parsed = parsed.triples.len(),
            "Scoring response had blocks missing Lab ID, Similarity Score or Match Reason"
        );
    }

    Ok(parsed)
}

fn scoring_error(err: LlmError) -> AppError {
    match err {
        LlmError::EmptyContent => AppError::Llm("Failed to get lab analysis from LLM".to_string()),
        LlmError::Parse(e) => AppError::Llm(format!("Malformed scoring response: {e}")),
        other => AppError::Llm(format!("Scoring call failed: {other}")),
    }
}
