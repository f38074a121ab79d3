// In-process backend for handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use super::{BackendError, ChatReply, ChunkEdit, ExportFormat, ResumeBackend};
use crate::models::SectionKind;

#[derive(Default)]
pub struct StubBackend {
    pub resume: Value,
    pub reply: ChatReply,
    /// A null `updated_description` makes `edit_chunk` fail.
    pub chunk_edit: ChunkEdit,
    pub edits: Mutex<Vec<(SectionKind, usize, String)>>,
    pub fail_convert: bool,
    pub converted: Mutex<Vec<(ExportFormat, String)>>,
    pub chat_calls: AtomicUsize,
}

impl StubBackend {
    pub fn with_resume(resume: Value) -> Self {
        Self {
            resume,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ResumeBackend for StubBackend {
    async fn fetch_resume(&self, resume_id: &str) -> Result<Value, BackendError> {
        if self.resume.is_null() {
            return Err(BackendError::Api {
                status: 404,
                message: format!("No resume {resume_id}"),
            });
        }
        Ok(self.resume.clone())
    }

    async fn chat(&self, _message: &str, _resume_html: &str) -> Result<ChatReply, BackendError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    async fn edit_chunk(
        &self,
        kind: SectionKind,
        index: usize,
        message: &str,
    ) -> Result<ChunkEdit, BackendError> {
        self.edits
            .lock()
            .unwrap()
            .push((kind, index, message.to_string()));
        if self.chunk_edit.updated_description.is_null() {
            return Err(BackendError::Rejected("Failed to update chunk".to_string()));
        }
        Ok(self.chunk_edit.clone())
    }

    async fn convert(&self, html: &str, format: ExportFormat) -> Result<Bytes, BackendError> {
        if self.fail_convert {
            return Err(BackendError::Api {
                status: 500,
                message: "converter crashed".to_string(),
            });
        }
        self.converted
            .lock()
            .unwrap()
            .push((format, html.to_string()));
        Ok(Bytes::from_static(b"%PDF-1.4 stub"))
    }
}
