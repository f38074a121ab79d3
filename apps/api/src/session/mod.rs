//! Resume session: the single owner of the current raw payload and the
//! document derived from it.
//!
//! Every new payload is normalized into a fresh [`ResumeDocument`] that
//! replaces the previous one wholesale. Fetches are tracked with
//! [`RequestTicket`]s: only the most recently issued ticket may install its
//! result, so a slow response to a superseded request is dropped. That holds
//! for every backend round trip: fetches, chat turns and chunk edits.

pub mod chat;
pub mod chunks;
pub mod draft;
pub mod handlers;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend_client::ChatReply;
use crate::models::{ResumeDocument, SectionKind};
use crate::normalize::{assemble_resume, resolve_payload};

pub use chunks::{ChunkRef, ChunksByType};
pub use draft::{DraftError, DraftRecord, DraftStore, FileDraftStore, MemoryDraftStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No {section} chunk at index {index}")]
    ChunkNotFound { section: &'static str, index: usize },

    #[error("The {section} chunk at index {index} has no editable fields")]
    ChunkNotEditable { section: &'static str, index: usize },
}

/// Identifies one backend fetch for last-write-wins resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

#[derive(Debug, Default)]
pub struct ResumeSession {
    raw: Value,
    document: Arc<ResumeDocument>,
    latest_ticket: u64,
}

impl ResumeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_request(&mut self) -> RequestTicket {
        self.latest_ticket += 1;
        RequestTicket(self.latest_ticket)
    }

    /// Installs the result of a fetch, unless a newer request or a direct
    /// replacement has happened since `ticket` was issued.
    pub fn complete(&mut self, ticket: RequestTicket, raw: Value) -> Option<Arc<ResumeDocument>> {
        if !self.is_latest(ticket) {
            return None;
        }
        Some(self.install(raw))
    }

    fn is_latest(&self, ticket: RequestTicket) -> bool {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding stale backend response"
            );
            return false;
        }
        true
    }

    /// Installs a payload that is available right now (form submit, draft
    /// restore). Supersedes any fetch still in flight.
    pub fn replace(&mut self, raw: Value) -> Arc<ResumeDocument> {
        self.latest_ticket += 1;
        self.install(raw)
    }

    pub fn current(&self) -> Arc<ResumeDocument> {
        Arc::clone(&self.document)
    }

    /// The transport-unwrapped payload behind [`Self::current`].
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn chunks(&self) -> ChunksByType {
        ChunksByType::from_document(&self.document)
    }

    /// Fails unless the current document has an entry at `index` in `kind`.
    pub fn ensure_chunk(&self, kind: SectionKind, index: usize) -> Result<(), SessionError> {
        if index < self.document.section(kind).len() {
            Ok(())
        } else {
            Err(SessionError::ChunkNotFound {
                section: kind.chunk_key(),
                index,
            })
        }
    }

    /// Rewrites one entry's description in the raw payload and re-derives the document.
    pub fn apply_chunk_update(
        &mut self,
        kind: SectionKind,
        index: usize,
        updated_description: Value,
    ) -> Result<Arc<ResumeDocument>, SessionError> {
        let raw = self.rewritten(kind, index, updated_description)?;
        Ok(self.replace(raw))
    }

    /// [`Self::apply_chunk_update`] for a description produced by a backend
    /// chunk edit. `Ok(None)` when `ticket` has been superseded.
    pub fn complete_chunk_edit(
        &mut self,
        ticket: RequestTicket,
        kind: SectionKind,
        index: usize,
        updated_description: Value,
    ) -> Result<Option<Arc<ResumeDocument>>, SessionError> {
        if !self.is_latest(ticket) {
            return Ok(None);
        }
        let raw = self.rewritten(kind, index, updated_description)?;
        Ok(Some(self.install(raw)))
    }

    fn rewritten(
        &self,
        kind: SectionKind,
        index: usize,
        updated_description: Value,
    ) -> Result<Value, SessionError> {
        let mut raw = self.raw.clone();
        chunks::rewrite_description(&mut raw, kind, index, updated_description)?;
        info!(section = kind.chunk_key(), index, "Chunk description updated");
        Ok(raw)
    }

    /// Applies the payload carried by a chat reply. Returns `None` when the
    /// reply has no usable update or `ticket` has been superseded; the current
    /// document is then left alone.
    pub fn apply_chat_reply(
        &mut self,
        ticket: RequestTicket,
        reply: &ChatReply,
    ) -> Option<Arc<ResumeDocument>> {
        if !self.is_latest(ticket) {
            return None;
        }
        let payload = chat::extract_updated_payload(reply)?;
        let raw = resolve_payload(&payload).into_owned();
        let document = assemble_resume(&raw);
        if !chat::is_complete_identity(&document.identity) {
            warn!("Chat update lacks name or email; keeping current document");
            return None;
        }
        Some(self.store(raw, document))
    }

    fn install(&mut self, raw: Value) -> Arc<ResumeDocument> {
        let raw = resolve_payload(&raw).into_owned();
        let document = assemble_resume(&raw);
        self.store(raw, document)
    }

    fn store(&mut self, raw: Value, document: ResumeDocument) -> Arc<ResumeDocument> {
        debug!(entities = document.entity_count(), "Installed resume document");
        self.raw = raw;
        self.document = Arc::new(document);
        Arc::clone(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DescriptionValue;
    use serde_json::json;

    fn payload(name: &str) -> Value {
        json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "projects": {"project1": {"name": "Folio", "description": "Old text"}}
        })
    }

    #[test]
    fn test_empty_session() {
        let session = ResumeSession::new();
        assert_eq!(*session.current(), ResumeDocument::default());
        assert!(session.raw().is_null());
    }

    #[test]
    fn test_latest_request_wins() {
        let mut session = ResumeSession::new();
        let first = session.begin_request();
        let second = session.begin_request();

        assert!(session.complete(second, payload("Second")).is_some());
        assert!(session.complete(first, payload("First")).is_none());
        assert_eq!(session.current().identity.name, "Second");
    }

    #[test]
    fn test_stale_fetch_discarded_after_replace() {
        let mut session = ResumeSession::new();
        let ticket = session.begin_request();
        session.replace(payload("Typed"));

        assert!(session.complete(ticket, payload("Fetched")).is_none());
        assert_eq!(session.current().identity.name, "Typed");
    }

    #[test]
    fn test_replace_swaps_document_wholesale() {
        let mut session = ResumeSession::new();
        let before = session.replace(payload("Jo"));
        let after = session.replace(json!({"name": "Sam"}));

        assert_eq!(before.projects.len(), 1);
        assert!(after.projects.is_empty());
        assert!(!Arc::ptr_eq(&before, &session.current()));
    }

    #[test]
    fn test_envelope_is_unwrapped_before_storing() {
        let mut session = ResumeSession::new();
        session.replace(json!({"data": payload("Jo")}));
        assert_eq!(session.raw()["name"], json!("Jo"));
    }

    #[test]
    fn test_chunk_update_replaces_document() {
        let mut session = ResumeSession::new();
        let before = session.replace(payload("Jo"));

        let after = session
            .apply_chunk_update(SectionKind::Projects, 0, json!("['Rewrote parser', 'Added tests']"))
            .unwrap();

        assert_eq!(before.projects[0].description, DescriptionValue::Paragraph("Old text".to_string()));
        assert_eq!(
            after.projects[0].description,
            DescriptionValue::Bullets(vec!["Rewrote parser".to_string(), "Added tests".to_string()])
        );
        assert_eq!(*session.current(), *after);
    }

    #[test]
    fn test_chunk_update_out_of_range_keeps_document() {
        let mut session = ResumeSession::new();
        let before = session.replace(payload("Jo"));
        let err = session
            .apply_chunk_update(SectionKind::Jobs, 0, json!("x"))
            .unwrap_err();
        assert!(matches!(err, SessionError::ChunkNotFound { .. }));
        assert!(Arc::ptr_eq(&before, &session.current()));
    }

    #[test]
    fn test_chat_reply_without_identity_is_ignored() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));

        let ticket = session.begin_request();

        let reply = ChatReply {
            message: "Done".to_string(),
            updated_json: Some(json!({"name": "Jo", "projects": []})),
        };
        assert!(session.apply_chat_reply(ticket, &reply).is_none());
        assert_eq!(session.current().projects.len(), 1);
    }

    #[test]
    fn test_chat_reply_with_identity_replaces_document() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));
        let pending = session.begin_request();
        let chat = session.begin_request();

        let updated = json!({"name": "Jo", "email": "jo@example.com", "jobs": [{"company": "Acme"}]});
        let reply = ChatReply {
            message: "Added a job".to_string(),
            updated_json: Some(Value::String(updated.to_string())),
        };
        let doc = session.apply_chat_reply(chat, &reply).unwrap();
        assert_eq!(doc.jobs[0].display_name, "Acme");
        assert!(doc.projects.is_empty());
        assert!(session.complete(pending, payload("Late")).is_none());
    }

    #[test]
    fn test_chat_reply_superseded_by_submit_is_dropped() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));
        let chat = session.begin_request();
        session.replace(json!({
            "name": "Newer",
            "email": "newer@example.com",
            "jobs": [{"company": "Acme"}]
        }));

        let reply = ChatReply {
            message: "Rewrote it".to_string(),
            updated_json: Some(payload("Jo")),
        };
        assert!(session.apply_chat_reply(chat, &reply).is_none());
        assert_eq!(session.current().identity.name, "Newer");
        assert_eq!(session.current().jobs.len(), 1);
    }

    #[test]
    fn test_chunk_edit_applies_for_latest_ticket() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));
        session.ensure_chunk(SectionKind::Projects, 0).unwrap();
        let ticket = session.begin_request();

        let doc = session
            .complete_chunk_edit(ticket, SectionKind::Projects, 0, json!(["Cut build time"]))
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.projects[0].description,
            DescriptionValue::Bullets(vec!["Cut build time".to_string()])
        );
    }

    #[test]
    fn test_chunk_edit_superseded_by_load_is_dropped() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));
        let edit = session.begin_request();
        let load = session.begin_request();
        session.complete(load, payload("Sam"));

        let outcome = session
            .complete_chunk_edit(edit, SectionKind::Projects, 0, json!("Rewritten"))
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(session.current().identity.name, "Sam");
        assert_eq!(
            session.current().projects[0].description,
            DescriptionValue::Paragraph("Old text".to_string())
        );
    }

    #[test]
    fn test_ensure_chunk_rejects_missing_index() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));
        let err = session.ensure_chunk(SectionKind::Jobs, 0).unwrap_err();
        assert!(matches!(err, SessionError::ChunkNotFound { section: "jobs", index: 0 }));
    }

    #[test]
    fn test_chunk_listing() {
        let mut session = ResumeSession::new();
        session.replace(payload("Jo"));
        let chunks = session.chunks();
        assert_eq!(chunks.projects, vec![ChunkRef { id: 0, name: "Folio".to_string() }]);
    }
}
