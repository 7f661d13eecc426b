// Shared prompt fragments. Each step that calls the model keeps its own
// prompts.rs alongside it and reuses these.

/// Who the student is. Both steps open with this so the model keeps the campus context.
pub const STUDENT_CONTEXT: &str = "The document will either be a resume or a transcript \
    for a student at UC Santa Cruz who is interested in lab opportunities.";

/// Appended to system prompts when the strict JSON contract is in effect.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
