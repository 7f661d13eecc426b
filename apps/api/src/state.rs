use std::sync::Arc;

use crate::intake::UploadPolicy;
use crate::labs::LabStore;
use crate::matching::MatchPipeline;
use crate::results::ResultStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MatchPipeline>,
    /// Same store the pipeline reads; the directory endpoints use it directly.
    pub labs: Arc<dyn LabStore>,
    pub results: Arc<dyn ResultStore>,
    pub upload_policy: UploadPolicy,
}
