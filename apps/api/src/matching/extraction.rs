//! Extraction step. Derives the student's major and keywords from the uploaded document.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ResponseFormat;
use crate::errors::AppError;
use crate::llm_client::{complete_json, Attachment, Completion, CompletionRequest, ImageDetail, LlmError};
use crate::matching::prompts::{extraction_system, EXTRACTION_MAX_TOKENS, EXTRACTION_USER};

static MAJOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Major:\s*(.+)").unwrap());
static KEYWORDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Keywords:\s*(.+)").unwrap());

/// What the model understood about the student. Lives for one match run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub major: String,
    /// Comma-separated skills and research interests.
    pub keywords: String,
}

/// Parses the two-line `Major:` / `Keywords:` response.
/// Both lines are required; a major without keywords is a failed extraction.
pub fn parse_profile(text: &str) -> Result<ResumeProfile, AppError> {
    let major = MAJOR_RE.captures(text).map(|c| c[1].trim().to_string());
    let keywords = KEYWORDS_RE.captures(text).map(|c| c[1].trim().to_string());

    match (major, keywords) {
        (Some(major), Some(keywords)) => Ok(ResumeProfile { major, keywords }),
        _ => Err(AppError::Extraction(
            "Failed to parse document details".to_string(),
        )),
    }
}

/// Sends the document to the model and parses its answer into a `ResumeProfile`.
pub async fn extract_profile(
    llm: &dyn Completion,
    attachment: &Attachment,
    format: ResponseFormat,
) -> Result<ResumeProfile, AppError> {
    let system = extraction_system(format);
    let request = CompletionRequest {
        system: &system,
        user_text: EXTRACTION_USER,
        attachment: Some(attachment),
        detail: ImageDetail::Auto,
        max_tokens: EXTRACTION_MAX_TOKENS,
    };

    let profile = match format {
        ResponseFormat::Labeled => {
            let text = llm.complete(request).await.map_err(extraction_error)?;
            parse_profile(&text)?
        }
        ResponseFormat::Json => {
            let profile: ResumeProfile = complete_json(llm, request)
                .await
                .map_err(extraction_error)?;
            if profile.major.trim().is_empty() || profile.keywords.trim().is_empty() {
                return Err(AppError::Extraction(
                    "Failed to parse document details".to_string(),
                ));
            }
            profile
        }
    };

    debug!(major = %profile.major, keywords = %profile.keywords, "Profile extracted");
    Ok(profile)
}

fn extraction_error(err: LlmError) -> AppError {
    match err {
        LlmError::EmptyContent => {
            AppError::Extraction("Failed to extract resume details".to_string())
        }
        LlmError::Parse(e) => AppError::Llm(format!("Malformed extraction response: {e}")),
        other => AppError::Llm(format!("Extraction call failed: {other}")),
    }
}
