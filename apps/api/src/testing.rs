//! In-process fakes for the pipeline seams, shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::labs::LabStore;
use crate::llm_client::{Attachment, Completion, CompletionRequest, ImageDetail, LlmError};
use crate::models::lab::Lab;
use crate::results::{ResultStore, SavedMatches};

pub fn pdf_attachment() -> Attachment {
    Attachment {
        file_name: "resume.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        data_url: "data:application/pdf;base64,JVBERi0xLjQ=".to_string(),
        text: None,
    }
}

/// Owned copy of a `CompletionRequest`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub user_text: String,
    pub attachment: Option<Attachment>,
    pub detail: ImageDetail,
    pub max_tokens: u32,
}

/// Replies with canned completions in order; runs out with `EmptyContent`.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedCompletion {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self::with_results(replies.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn with_results(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.to_string(),
            user_text: request.user_text.to_string(),
            attachment: request.attachment.cloned(),
            detail: request.detail,
            max_tokens: request.max_tokens,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// Fixed lab table that counts reads.
pub struct StaticLabStore {
    labs: Vec<Lab>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticLabStore {
    pub fn new(labs: Vec<Lab>) -> Self {
        Self {
            labs,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LabStore for StaticLabStore {
    async fn fetch_all(&self) -> Result<Vec<Lab>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::LabStore("connection refused".to_string()));
        }
        Ok(self.labs.clone())
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Lab>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::LabStore("connection refused".to_string()));
        }
        Ok(self.labs.iter().find(|lab| lab.id == id).cloned())
    }
}

pub struct FailingResultStore;

#[async_trait]
impl ResultStore for FailingResultStore {
    async fn load(&self, _session_id: Uuid) -> Result<Option<SavedMatches>, AppError> {
        Err(AppError::ResultStore("redis unavailable".to_string()))
    }

    async fn save(&self, _saved: &SavedMatches) -> Result<(), AppError> {
        Err(AppError::ResultStore("redis unavailable".to_string()))
    }
}
