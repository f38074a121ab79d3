use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend_client::ResumeBackend;
use crate::session::{DraftStore, ResumeSession};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume backend. Default: BackendClient over reqwest; tests swap in a stub.
    pub backend: Arc<dyn ResumeBackend>,
    /// Never held across a backend `.await`.
    pub session: Arc<RwLock<ResumeSession>>,
    pub drafts: Arc<dyn DraftStore>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ResumeBackend>, drafts: Arc<dyn DraftStore>) -> Self {
        Self {
            backend,
            session: Arc::new(RwLock::new(ResumeSession::new())),
            drafts,
        }
    }
}
