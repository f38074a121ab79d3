//! Backend client: the single HTTP boundary to the resume backend.
//!
//! Four collaborator calls: fetch a raw resume payload, relay a chat edit,
//! relay an edit of a single chunk, and convert final HTML into PDF or DOCX bytes. Everything the backend
//! returns is treated as untyped JSON and goes through `normalize` before use.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::SectionKind;

#[cfg(test)]
pub mod stub;

const RESUME_PREVIEW_PATH: &str = "/api/resume/resume_preview";
const CHAT_PATH: &str = "/api/ai/chat/";
const CONVERT_PATH: &str = "/api/resume_preview/";
const CHUNK_EDIT_PATH: &str = "/api/resume/chunk_edit/";
const FORMAT_HEADER: &str = "X-Format-Type";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend returned an empty document")]
    EmptyBody,

    /// A 2xx response whose body reports failure.
    #[error("Backend rejected the request: {0}")]
    Rejected(String),
}

/// Target format of the backend's HTML converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            _ => None,
        }
    }
}

/// Reply of the chat assistant. `updated_json` is a raw payload (object or
/// JSON-encoded string) of the same loose shape as a fetched resume.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub updated_json: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    resume_html: &'a str,
}

/// A rewritten chunk description. `updated_description` is as loose as any
/// other description: a list, a JSON-encoded list, or prose.
#[derive(Debug, Clone, Default)]
pub struct ChunkEdit {
    pub message: String,
    pub updated_description: Value,
}

#[derive(Debug, Serialize)]
struct ChunkEditRequest<'a> {
    chunk_type: &'static str,
    chunk_id: usize,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChunkEditBody {
    status: Option<String>,
    message: Option<String>,
    error: Option<String>,
    #[serde(default)]
    updated_description: Value,
}

#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// The backend collaborator. Carried in `AppState` as `Arc<dyn ResumeBackend>`
/// so handlers can be exercised against a stub.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    async fn fetch_resume(&self, resume_id: &str) -> Result<Value, BackendError>;

    async fn chat(&self, message: &str, resume_html: &str) -> Result<ChatReply, BackendError>;

    /// Asks the assistant to rewrite one entry's description. `index` is the
    /// chunk id from the chunk listing.
    async fn edit_chunk(
        &self,
        kind: SectionKind,
        index: usize,
        message: &str,
    ) -> Result<ChunkEdit, BackendError>;

    async fn convert(&self, html: &str, format: ExportFormat) -> Result<Bytes, BackendError>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request, retrying transport failures and 429/5xx responses with
    /// exponential backoff. Other non-success statuses fail immediately.
    async fn send(&self, request: RequestBuilder, retries: u32) -> Result<Response, BackendError> {
        let mut last_error: Option<BackendError> = None;

        for attempt in 0..retries.max(1) {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Backend call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let Some(builder) = request.try_clone() else {
                return Ok(request.send().await?);
            };

            let response = match builder.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(BackendError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "Backend returned a retryable status");
                last_error = Some(BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(BackendError::Api {
            status: 503,
            message: format!("Backend unavailable after {retries} attempts"),
        }))
    }
}

#[async_trait]
impl ResumeBackend for BackendClient {
    async fn fetch_resume(&self, resume_id: &str) -> Result<Value, BackendError> {
        let request = self
            .client
            .get(self.url(RESUME_PREVIEW_PATH))
            .query(&[("resume_id", resume_id)]);
        let payload: Value = self.send(request, MAX_RETRIES).await?.json().await?;
        if payload.is_null() {
            return Err(BackendError::EmptyBody);
        }
        debug!(resume_id, "Fetched resume payload");
        Ok(payload)
    }

    async fn chat(&self, message: &str, resume_html: &str) -> Result<ChatReply, BackendError> {
        let request = self.client.post(self.url(CHAT_PATH)).json(&ChatRequest {
            message,
            resume_html,
        });
        // Chat turns are not idempotent; single attempt.
        let reply: ChatReply = self.send(request, 1).await?.json().await?;
        debug!(has_update = reply.updated_json.is_some(), "Chat reply received");
        Ok(reply)
    }

    async fn edit_chunk(
        &self,
        kind: SectionKind,
        index: usize,
        message: &str,
    ) -> Result<ChunkEdit, BackendError> {
        let request = self.client.post(self.url(CHUNK_EDIT_PATH)).json(&ChunkEditRequest {
            chunk_type: kind.chunk_key(),
            chunk_id: index,
            message,
        });
        let body: ChunkEditBody = self.send(request, 1).await?.json().await?;
        let edit = chunk_edit_from_body(body)?;
        debug!(section = kind.chunk_key(), index, "Chunk edit received");
        Ok(edit)
    }

    async fn convert(&self, html: &str, format: ExportFormat) -> Result<Bytes, BackendError> {
        let request = self
            .client
            .post(self.url(CONVERT_PATH))
            .header(FORMAT_HEADER, format.as_str())
            .json(&ConvertRequest { html });
        let bytes = self.send(request, MAX_RETRIES).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(BackendError::EmptyBody);
        }
        debug!(format = format.as_str(), size = bytes.len(), "Converted document");
        Ok(bytes)
    }
}

/// Success needs `status == "success"` and a non-null description.
fn chunk_edit_from_body(body: ChunkEditBody) -> Result<ChunkEdit, BackendError> {
    if body.status.as_deref() != Some("success") || body.updated_description.is_null() {
        return Err(BackendError::Rejected(
            body.error
                .or(body.message)
                .unwrap_or_else(|| "Failed to update chunk".to_string()),
        ));
    }
    Ok(ChunkEdit {
        message: body
            .message
            .unwrap_or_else(|| "Chunk updated successfully".to_string()),
        updated_description: body.updated_description,
    })
}

/// Pulls a human-readable message out of a backend error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<BackendErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.trim().to_string())
}
