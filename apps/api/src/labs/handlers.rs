//! Axum route handlers for the lab directory.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::lab::Lab;
use crate::presentation::LabDetail;
use crate::state::AppState;

/// GET /api/v1/labs
///
/// The whole directory, in row-store order.
pub async fn handle_list_labs(State(state): State<AppState>) -> Result<Json<Vec<Lab>>, AppError> {
    let labs = state.labs.fetch_all().await?;
    Ok(Json(labs))
}

/// GET /api/v1/labs/:id
///
/// One lab's long-form description. Read-only; no run or saved result is touched.
pub async fn handle_get_lab(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LabDetail>, AppError> {
    let lab = state
        .labs
        .fetch_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lab {id} not found")))?;
    Ok(Json(LabDetail::from(&lab)))
}
