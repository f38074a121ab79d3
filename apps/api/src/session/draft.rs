//! Draft persistence. Saves happen only at explicit lifecycle points
//! (form submit, chat update, chunk edit); nothing here writes on its own.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Draft I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A saved raw payload. The document is re-derived on restore, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub saved_at: DateTime<Utc>,
    pub payload: Value,
}

impl DraftRecord {
    pub fn new(payload: Value) -> Self {
        Self {
            saved_at: Utc::now(),
            payload,
        }
    }
}

pub trait DraftStore: Send + Sync {
    fn save(&self, record: &DraftRecord) -> Result<(), DraftError>;

    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<DraftRecord>, DraftError>;
}

/// Single JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, record: &DraftRecord) -> Result<(), DraftError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, record)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| DraftError::Io(e.error))?;

        debug!(path = %self.path.display(), "Draft saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<DraftRecord>, DraftError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<DraftRecord>>,
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, record: &DraftRecord) -> Result<(), DraftError> {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<DraftRecord>, DraftError> {
        let slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slot.clone())
    }
}
