pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::render::handlers as resume;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless normalization
        .route("/api/v1/resume/normalize", post(resume::handle_normalize))
        .route("/api/v1/resume/render", post(resume::handle_render))
        // Session
        .route("/api/v1/session/submit", post(session::handle_submit))
        .route("/api/v1/session/load/:resume_id", post(session::handle_load))
        .route("/api/v1/session/restore", post(session::handle_restore))
        .route("/api/v1/session/document", get(session::handle_get_document))
        .route("/api/v1/session/render", get(session::handle_render_current))
        .route("/api/v1/session/chunks", get(session::handle_list_chunks))
        .route(
            "/api/v1/session/chunks/:section/:index",
            patch(session::handle_update_chunk),
        )
        .route(
            "/api/v1/session/chunks/:section/:index/edit",
            post(session::handle_edit_chunk),
        )
        .route("/api/v1/session/chat", post(session::handle_chat))
        .route(
            "/api/v1/session/export/:format",
            post(session::handle_export),
        )
        .with_state(state)
}
