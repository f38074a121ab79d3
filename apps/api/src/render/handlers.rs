use axum::{extract::Query, response::Html, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::models::ResumeDocument;
use crate::normalize::assemble_resume;
use crate::render::{render_document, RenderTarget};

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub target: RenderTarget,
}

/// POST /api/v1/resume/normalize
/// Stateless: raw payload in, canonical document out.
pub async fn handle_normalize(Json(raw): Json<Value>) -> Json<ResumeDocument> {
    Json(assemble_resume(&raw))
}

/// POST /api/v1/resume/render?target=preview|print|pdf-source|docx-source
pub async fn handle_render(
    Query(query): Query<RenderQuery>,
    Json(raw): Json<Value>,
) -> Html<String> {
    Html(render_document(&assemble_resume(&raw), query.target))
}
