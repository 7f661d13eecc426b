//! Axum route handlers for the Match API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::{accept_document, IntakeError};
use crate::matching::extraction::ResumeProfile;
use crate::presentation::{cards, LabCard};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MatchRunResponse {
    pub session_id: Uuid,
    pub profile: ResumeProfile,
    pub matches: Vec<LabCard>,
    pub candidates_scored: usize,
    pub dropped_blocks: usize,
    pub computed_at: DateTime<Utc>,
    /// Whether `GET /api/v1/matches/:session_id` will return this list.
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct SavedMatchesResponse {
    pub session_id: Uuid,
    pub matches: Vec<LabCard>,
    pub computed_at: DateTime<Utc>,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches
///
/// Multipart form: `file` (the resume or transcript) and optional `session_id`.
/// Results are saved only for a client-supplied `session_id`.
/// Runs intake → extraction → fetch → scoring → rank and returns the labs scored ≥ 4.
pub async fn handle_create_match(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchRunResponse>, AppError> {
    let mut upload: Option<Upload> = None;
    let mut session_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "session_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed session_id: {e}")))?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("session_id must be a UUID".to_string()))?;
                session_id = Some(parsed);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(IntakeError::MissingFile)?;
    let document = accept_document(
        &state.upload_policy,
        &upload.file_name,
        upload.content_type.as_deref(),
        upload.bytes,
    )?;

    let run = state.pipeline.run(session_id, document).await?;

    Ok(Json(MatchRunResponse {
        session_id: run.session_id,
        matches: cards(&run.matches),
        profile: run.profile,
        candidates_scored: run.candidates_scored,
        dropped_blocks: run.dropped_blocks,
        computed_at: run.computed_at,
        saved: run.saved,
    }))
}

/// GET /api/v1/matches/:session_id
///
/// The last list a session's successful run produced.
pub async fn handle_get_saved_matches(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SavedMatchesResponse>, AppError> {
    let saved = state
        .results
        .load(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No saved matches for session {session_id}")))?;

    Ok(Json(SavedMatchesResponse {
        session_id: saved.session_id,
        matches: cards(&saved.labs),
        computed_at: saved.computed_at,
    }))
}
