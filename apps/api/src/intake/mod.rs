//! Document intake: validates the uploaded resume/transcript and prepares it for the model.
//!
//! Only the declared MIME type is checked. A renamed file whose type matches passes
//! through; the content itself is never inspected.

use base64::Engine;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm_client::Attachment;

/// Upper bound on the PDF text forwarded alongside the attachment.
const MAX_EXTRACTED_CHARS: usize = 20_000;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Please upload a valid {accepted} file.")]
    UnsupportedType { mime_type: String, accepted: String },

    #[error("Please upload a file")]
    MissingFile,

    #[error("The uploaded file is empty")]
    EmptyFile,

    #[error("The uploaded file is larger than {limit} bytes")]
    TooLarge { limit: usize },
}

/// Which uploads are accepted.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    accepted_mime_types: Vec<String>,
    max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(accepted_mime_types: Vec<String>, max_bytes: usize) -> Self {
        Self {
            accepted_mime_types,
            max_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.accepted_mime_types.clone(), config.max_upload_bytes)
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mime_type))
    }

    /// "PDF, PNG, or JPEG"
    pub fn describe_accepted(&self) -> String {
        let labels: Vec<&str> = self
            .accepted_mime_types
            .iter()
            .map(|m| short_label(m))
            .collect();
        match labels.as_slice() {
            [] => "supported".to_string(),
            [only] => only.to_string(),
            [first, second] => format!("{first} or {second}"),
            [init @ .., last] => format!("{}, or {last}", init.join(", ")),
        }
    }
}

fn short_label(mime_type: &str) -> &str {
    match mime_type {
        "application/pdf" => "PDF",
        "image/png" => "PNG",
        "image/jpeg" => "JPEG",
        "application/msword" => "DOC",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "DOCX",
        other => other,
    }
}

/// An accepted upload.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl Document {
    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.mime_type)
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }
}

/// The MIME type a client declared for a part, falling back to the file extension
/// when the client sent none (or only the generic octet-stream type).
pub fn declared_mime_type(content_type: Option<&str>, file_name: &str) -> String {
    match content_type.map(|c| c.trim().to_ascii_lowercase()) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => {
            // Drop parameters such as "; charset=binary"
            ct.split(';').next().unwrap_or_default().trim().to_string()
        }
        _ => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

/// Validates one upload against the policy.
pub fn accept_document(
    policy: &UploadPolicy,
    file_name: &str,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<Document, IntakeError> {
    let mime_type = declared_mime_type(content_type, file_name);

    if !policy.accepts(&mime_type) {
        return Err(IntakeError::UnsupportedType {
            mime_type,
            accepted: policy.describe_accepted(),
        });
    }
    if bytes.is_empty() {
        return Err(IntakeError::EmptyFile);
    }
    if bytes.len() > policy.max_bytes {
        return Err(IntakeError::TooLarge {
            limit: policy.max_bytes,
        });
    }

    debug!(file_name, mime_type = %mime_type, size = bytes.len(), "Document accepted");

    Ok(Document {
        file_name: file_name.to_string(),
        mime_type,
        bytes,
    })
}

/// Encodes the document for the completion service. PDFs also carry their plain
/// text when it can be extracted; extraction failures only cost that extra text.
pub async fn prepare_attachment(document: &Document) -> Attachment {
    let text = if document.is_pdf() {
        extract_pdf_text(document.bytes.clone()).await
    } else {
        None
    };

    Attachment {
        file_name: document.file_name.clone(),
        mime_type: document.mime_type.clone(),
        data_url: document.data_url(),
        text,
    }
}

async fn extract_pdf_text(bytes: Bytes) -> Option<String> {
    // PDF parsing is CPU-bound and can panic on malformed input.
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

    match result {
        Ok(Ok(text)) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.chars().take(MAX_EXTRACTED_CHARS).collect())
            }
        }
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e}");
            None
        }
        Err(e) => {
            warn!("PDF text extraction aborted: {e}");
            None
        }
    }
}
