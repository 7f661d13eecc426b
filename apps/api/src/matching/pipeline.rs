//! Match run orchestration.
//!
//! `idle → uploading → extracting → fetching → scoring → ready | failed`
//!
//! Strictly linear: the scoring call needs both the extracted profile and the
//! candidate list, so nothing runs concurrently within a run. One run per session
//! may be in flight at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ResponseFormat;
use crate::errors::AppError;
use crate::intake::{prepare_attachment, Document};
use crate::labs::LabStore;
use crate::llm_client::Completion;
use crate::matching::extraction::{extract_profile, ResumeProfile};
use crate::matching::ranking::rank_matches;
use crate::matching::scoring::score_labs;
use crate::models::lab::ScoredLab;
use crate::results::{ResultStore, SavedMatches};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Uploading,
    Extracting,
    Fetching,
    Scoring,
    Ready,
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct MatchRun {
    pub session_id: Uuid,
    pub profile: ResumeProfile,
    /// Ranked, filtered to the displayable scores.
    pub matches: Vec<ScoredLab>,
    /// How many candidates were scored before filtering.
    pub candidates_scored: usize,
    pub dropped_blocks: usize,
    pub computed_at: DateTime<Utc>,
    /// False for anonymous runs, which nobody can read back.
    pub saved: bool,
}

/// Sessions with a run in progress.
#[derive(Clone, Default)]
pub struct InFlightRuns {
    sessions: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlightRuns {
    /// Marks the session busy until the returned guard is dropped.
    pub fn begin(&self, session_id: Uuid) -> Result<RunGuard, AppError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|p| p.into_inner());
        if !sessions.insert(session_id) {
            return Err(AppError::Conflict(
                "A match run is already in progress".to_string(),
            ));
        }
        Ok(RunGuard {
            sessions: Arc::clone(&self.sessions),
            session_id,
        })
    }

    #[cfg(test)]
    pub fn is_running(&self, session_id: Uuid) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(&session_id)
    }
}

pub struct RunGuard {
    sessions: Arc<Mutex<HashSet<Uuid>>>,
    session_id: Uuid,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.sessions
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&self.session_id);
    }
}

/// Everything a run talks to. Built once at startup and shared through `AppState`.
pub struct MatchPipeline {
    llm: Arc<dyn Completion>,
    labs: Arc<dyn LabStore>,
    results: Arc<dyn ResultStore>,
    format: ResponseFormat,
    in_flight: InFlightRuns,
}

impl MatchPipeline {
    pub fn new(
        llm: Arc<dyn Completion>,
        labs: Arc<dyn LabStore>,
        results: Arc<dyn ResultStore>,
        format: ResponseFormat,
    ) -> Self {
        Self {
            llm,
            labs,
            results,
            format,
            in_flight: InFlightRuns::default(),
        }
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> &InFlightRuns {
        &self.in_flight
    }

    /// Runs one match. Any failure ends only this run.
    ///
    /// With a client session the result is saved under it. Without one the run gets a
    /// fresh id and nothing is persisted.
    pub async fn run(
        &self,
        session: Option<Uuid>,
        document: Document,
    ) -> Result<MatchRun, AppError> {
        let persist = session.is_some();
        let session_id = session.unwrap_or_else(Uuid::new_v4);
        let _guard = self.in_flight.begin(session_id)?;
        let mut stage = RunStage::Idle;

        let result = self
            .execute(session_id, persist, &document, &mut stage)
            .await;

        match &result {
            Ok(run) => {
                enter(session_id, &mut stage, RunStage::Ready);
                info!(
                    session_id = %session_id,
                    candidates = run.candidates_scored,
                    matches = run.matches.len(),
                    "Match run complete"
                );
            }
            Err(e) => {
                warn!(session_id = %session_id, stage = ?stage, "Match run failed: {e}");
                enter(session_id, &mut stage, RunStage::Failed);
            }
        }

        result
    }

    async fn execute(
        &self,
        session_id: Uuid,
        persist: bool,
        document: &Document,
        stage: &mut RunStage,
    ) -> Result<MatchRun, AppError> {
        enter(session_id, stage, RunStage::Uploading);
        let attachment = prepare_attachment(document).await;

        enter(session_id, stage, RunStage::Extracting);
        let profile = extract_profile(self.llm.as_ref(), &attachment, self.format).await?;

        enter(session_id, stage, RunStage::Fetching);
        let labs = self.labs.fetch_all().await?;
        if labs.is_empty() {
            return Err(AppError::NoLabs);
        }

        enter(session_id, stage, RunStage::Scoring);
        let scores = score_labs(self.llm.as_ref(), &profile, &labs, &attachment, self.format).await?;

        let candidates_scored = labs.len();
        let matches = rank_matches(labs, &scores.triples);
        let computed_at = Utc::now();

        let mut saved = false;
        if persist {
            let entry = SavedMatches {
                session_id,
                computed_at,
                labs: matches.clone(),
            };
            match self.results.save(&entry).await {
                Ok(()) => saved = true,
                Err(e) => warn!(session_id = %session_id, "Could not save matches: {e}"),
            }
        }

        Ok(MatchRun {
            session_id,
            profile,
            matches,
            candidates_scored,
            dropped_blocks: scores.dropped_blocks,
            computed_at,
            saved,
        })
    }
}

fn enter(session_id: Uuid, stage: &mut RunStage, next: RunStage) {
    tracing::debug!(session_id = %session_id, from = ?stage, to = ?next, "Match run stage");
    *stage = next;
}
