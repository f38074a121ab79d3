use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::backend_client::ExportFormat;
use crate::errors::AppError;
use crate::models::{ResumeDocument, SectionKind};
use crate::render::handlers::RenderQuery;
use crate::render::{render_document, RenderTarget};
use crate::session::{ChunksByType, DraftRecord, DraftStore};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    /// `false` when a newer load or submit superseded this one.
    pub applied: bool,
    pub document: ResumeDocument,
}

/// A document installed by this request. `draft_saved` is `false` when the
/// document is live but could not be persisted.
#[derive(Debug, Serialize)]
pub struct SessionUpdate {
    pub draft_saved: bool,
    pub document: ResumeDocument,
}

#[derive(Debug, Deserialize)]
pub struct ChunkUpdateRequest {
    /// Raw description: list, JSON-encoded list, or prose.
    pub description: Value,
}

/// Body of both the chat and the chunk edit relays.
#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub message: String,
    /// `false` when the reply carried no usable update or arrived after a
    /// newer request.
    pub applied: bool,
    pub draft_saved: bool,
    pub document: ResumeDocument,
}

/// POST /api/v1/session/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Json<SessionUpdate> {
    let (document, raw) = {
        let mut session = state.session.write().await;
        let document = session.replace(raw);
        (document, session.raw().clone())
    };
    let draft_saved = save_draft(Arc::clone(&state.drafts), raw).await;
    info!(entities = document.entity_count(), "Resume submitted");
    Json(SessionUpdate {
        draft_saved,
        document: document.as_ref().clone(),
    })
}

/// POST /api/v1/session/load/:resume_id
pub async fn handle_load(
    State(state): State<AppState>,
    Path(resume_id): Path<String>,
) -> Result<Json<LoadResponse>, AppError> {
    let ticket = state.session.write().await.begin_request();
    let raw = state.backend.fetch_resume(&resume_id).await?;

    let mut session = state.session.write().await;
    let response = match session.complete(ticket, raw) {
        Some(document) => {
            info!(resume_id = %resume_id, "Resume loaded from backend");
            LoadResponse {
                applied: true,
                document: document.as_ref().clone(),
            }
        }
        None => LoadResponse {
            applied: false,
            document: session.current().as_ref().clone(),
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/session/restore
pub async fn handle_restore(
    State(state): State<AppState>,
) -> Result<Json<ResumeDocument>, AppError> {
    let drafts = Arc::clone(&state.drafts);
    let record = tokio::task::spawn_blocking(move || drafts.load())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in draft load: {e}")))??
        .ok_or_else(|| AppError::NotFound("No saved draft".to_string()))?;

    let document = state.session.write().await.replace(record.payload);
    info!(saved_at = %record.saved_at, "Draft restored");
    Ok(Json(document.as_ref().clone()))
}

/// GET /api/v1/session/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<ResumeDocument> {
    let document = state.session.read().await.current();
    Json(document.as_ref().clone())
}

/// GET /api/v1/session/render?target=preview|print|pdf-source|docx-source
pub async fn handle_render_current(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Html<String> {
    let document = state.session.read().await.current();
    Html(render_document(&document, query.target))
}

/// GET /api/v1/session/chunks
pub async fn handle_list_chunks(State(state): State<AppState>) -> Json<ChunksByType> {
    Json(state.session.read().await.chunks())
}

/// PATCH /api/v1/session/chunks/:section/:index
pub async fn handle_update_chunk(
    State(state): State<AppState>,
    Path((section, index)): Path<(String, usize)>,
    Json(req): Json<ChunkUpdateRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    let kind = parse_section(&section)?;

    let (document, raw) = {
        let mut session = state.session.write().await;
        let document = session.apply_chunk_update(kind, index, req.description)?;
        (document, session.raw().clone())
    };
    let draft_saved = save_draft(Arc::clone(&state.drafts), raw).await;
    Ok(Json(SessionUpdate {
        draft_saved,
        document: document.as_ref().clone(),
    }))
}

/// POST /api/v1/session/chunks/:section/:index/edit
/// Relays an edit instruction for one chunk and applies the rewritten description.
pub async fn handle_edit_chunk(
    State(state): State<AppState>,
    Path((section, index)): Path<(String, usize)>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    let kind = parse_section(&section)?;
    require_message(&req)?;

    let ticket = {
        let mut session = state.session.write().await;
        session.ensure_chunk(kind, index)?;
        session.begin_request()
    };
    let edit = state.backend.edit_chunk(kind, index, &req.message).await?;

    let installed = {
        let mut session = state.session.write().await;
        session
            .complete_chunk_edit(ticket, kind, index, edit.updated_description)?
            .map(|_| session.raw().clone())
    };
    Ok(finish_assistant_turn(&state, edit.message, installed).await)
}

/// POST /api/v1/session/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    require_message(&req)?;

    let (ticket, resume_html) = {
        let mut session = state.session.write().await;
        let document = session.current();
        (session.begin_request(), render_document(&document, RenderTarget::DocxSource))
    };
    let reply = state.backend.chat(&req.message, &resume_html).await?;

    let installed = {
        let mut session = state.session.write().await;
        session
            .apply_chat_reply(ticket, &reply)
            .map(|_| session.raw().clone())
    };
    Ok(finish_assistant_turn(&state, reply.message, installed).await)
}

/// Saves the draft when a reply was installed and reports the current document.
async fn finish_assistant_turn(
    state: &AppState,
    message: String,
    installed: Option<Value>,
) -> Json<AssistantResponse> {
    let applied = installed.is_some();
    let draft_saved = match installed {
        Some(raw) => save_draft(Arc::clone(&state.drafts), raw).await,
        None => false,
    };

    let document = state.session.read().await.current();
    Json(AssistantResponse {
        message,
        applied,
        draft_saved,
        document: document.as_ref().clone(),
    })
}

fn parse_section(section: &str) -> Result<SectionKind, AppError> {
    SectionKind::from_key(section)
        .ok_or_else(|| AppError::Validation(format!("Unknown section '{section}'")))
}

fn require_message(req: &AssistantRequest) -> Result<(), AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }
    Ok(())
}

/// POST /api/v1/session/export/:format
/// Failures leave the session untouched; the client can simply retry.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, AppError> {
    let format = ExportFormat::from_name(&format)
        .ok_or_else(|| AppError::Validation(format!("Unsupported export format '{format}'")))?;

    let html = {
        let document = state.session.read().await.current();
        render_document(&document, RenderTarget::DocxSource)
    };
    let bytes = state
        .backend
        .convert(&html, format)
        .await
        .map_err(AppError::Export)?;

    info!(format = format.as_str(), size = bytes.len(), "Resume exported");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"resume.{}\"", format.as_str()),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Failures are logged and reported as `false`.
async fn save_draft(drafts: Arc<dyn DraftStore>, payload: Value) -> bool {
    let record = DraftRecord::new(payload);
    match tokio::task::spawn_blocking(move || drafts.save(&record)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Draft not saved: {e}");
            false
        }
        Err(e) => {
            error!("spawn_blocking failed in draft save: {e}");
            false
        }
    }
}
