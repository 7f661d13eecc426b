// All LLM prompt constants for the match pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::config::ResponseFormat;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, STUDENT_CONTEXT};

pub const EXTRACTION_MAX_TOKENS: u32 = 150;
pub const SCORING_MAX_TOKENS: u32 = 1000;

const EXTRACTION_LABELED_FORMAT: &str =
    "Respond in the format: Major: <major>\nKeywords: <comma-separated keywords>.";

const EXTRACTION_JSON_FORMAT: &str = "Respond with a JSON object of the form \
    {\"major\": \"<major>\", \"keywords\": \"<comma-separated keywords>\"}.";

pub const EXTRACTION_USER: &str = "Analyze this document and extract the most relevant academic \
    major along with additional keywords that represent skills or interests for the given \
    student's resume or transcript.";

const SCORING_LABELED_FORMAT: &str = "Respond in the following exact format for each lab: 
Lab ID: <id>
Similarity Score: <score>
Match Reason: <reason>
---";

const SCORING_JSON_FORMAT: &str = r#"Respond with a JSON array holding one object per lab:
[{"lab_id": <id>, "similarity_score": <score>, "match_reason": "<reason>"}]"#;

// Builders below use `format!` so each value is inserted exactly once. Major and
// keywords come from the model and may themselves contain braces.

pub fn extraction_system(format: ResponseFormat) -> String {
    let format_instruction = match format {
        ResponseFormat::Labeled => EXTRACTION_LABELED_FORMAT.to_string(),
        ResponseFormat::Json => format!("{EXTRACTION_JSON_FORMAT} {JSON_ONLY_INSTRUCTION}"),
    };
    format!(
        "Extract the academic major and key skills or research interests from this document. \
         {STUDENT_CONTEXT} Parse through the document to understand the student's skills, \
         interests, background, and experience to find the best labs for them. \
         {format_instruction}"
    )
}

pub fn scoring_system(major: &str, keywords: &str, format: ResponseFormat) -> String {
    let format_instruction = match format {
        ResponseFormat::Labeled => SCORING_LABELED_FORMAT.to_string(),
        ResponseFormat::Json => format!("{SCORING_JSON_FORMAT}\n{JSON_ONLY_INSTRUCTION}"),
    };
    format!(
        "Analyze the following details about a UC Santa Cruz student and compare them with these lab descriptions. For each lab in the list, provide:
- A similarity score (an integer between 1 and 5).
- A concise match reason (no more than about 20 words) explaining why the lab is a good match for the student.
Strongly consider the applicant's major (\"{major}\") and keywords (\"{keywords}\") when performing your analysis.
{format_instruction}"
    )
}

pub fn scoring_user(major: &str, keywords: &str, labs_json: &str) -> String {
    format!(
        "Details:
Major: {major}
Keywords: {keywords}

Lab Descriptions:
{labs_json}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_system_labeled_asks_for_two_lines() {
        let prompt = extraction_system(ResponseFormat::Labeled);
        assert!(prompt.contains("UC Santa Cruz"));
        assert!(prompt.contains("Major: <major>\nKeywords: <comma-separated keywords>"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_extraction_system_json_demands_json_only() {
        let prompt = extraction_system(ResponseFormat::Json);
        assert!(prompt.contains(r#""major""#));
        assert!(prompt.contains("valid JSON only"));
    }

    #[test]
    fn test_scoring_system_interpolates_profile() {
        let prompt = scoring_system("Biology", "genomics, CRISPR", ResponseFormat::Labeled);
        assert!(prompt.contains(r#"major ("Biology")"#));
        assert!(prompt.contains(r#"keywords ("genomics, CRISPR")"#));
        assert!(prompt.contains("Lab ID: <id>\nSimilarity Score: <score>\nMatch Reason: <reason>\n---"));
    }

    #[test]
    fn test_scoring_user_carries_labs_block() {
        let prompt = scoring_user("Physics", "optics", "[{\"id\": 1}]");
        assert!(prompt.starts_with("Details:\nMajor: Physics\nKeywords: optics\n\nLab Descriptions:\n"));
        assert!(prompt.ends_with("[{\"id\": 1}]"));
    }

    #[test]
    fn test_placeholder_text_in_profile_is_inserted_verbatim() {
        let prompt = scoring_user("CS {keywords}", "rust, {labs_json}", "[LABS]");
        assert_eq!(
            prompt,
            "Details:\nMajor: CS {keywords}\nKeywords: rust, {labs_json}\n\nLab Descriptions:\n[LABS]"
        );
        assert_eq!(prompt.matches("[LABS]").count(), 1);

        let system = scoring_system("{keywords}", "{format_instruction}", ResponseFormat::Labeled);
        assert!(system.contains(r#"major ("{keywords}") and keywords ("{format_instruction}")"#));
        assert_eq!(system.matches("Lab ID: <id>").count(), 1);
    }
}
