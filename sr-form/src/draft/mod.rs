//! Draft persistence
//!
//! A draft is the form values plus the time they were saved, stored as one
//! JSON record under a fixed key. Every operation here is infallible from
//! the caller's point of view: storage failures are logged and swallowed so
//! they never interrupt editing or submission.

mod autosave;
mod backend;

pub use autosave::DraftAutosaver;
pub use backend::{DraftBackend, MemoryDraftBackend, RedbDraftBackend, StorageError, StorageResult};

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::FormFields;
use std::sync::Arc;

/// Key the draft is stored under
pub const DRAFT_KEY: &str = "sr-draft";

/// Persisted snapshot of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(flatten)]
    pub fields: FormFields,
    #[serde(rename = "savedAt", default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Saves, restores and clears the form draft
#[derive(Clone)]
pub struct DraftStore {
    backend: Arc<dyn DraftBackend>,
    clock: Arc<dyn Clock>,
}

impl DraftStore {
    pub fn new(backend: Arc<dyn DraftBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Overwrite the draft with `fields`, stamped with the current time
    pub fn save(&self, fields: &FormFields) {
        if let Err(e) = self.try_save(fields) {
            tracing::warn!(key = DRAFT_KEY, "Failed to save draft: {e}");
        }
    }

    /// The stored draft, or `None` when absent, corrupt or unreadable
    pub fn load(&self) -> Option<Draft> {
        match self.try_load() {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!(key = DRAFT_KEY, "Failed to load draft: {e}");
                None
            }
        }
    }

    /// Delete the draft; deleting a missing draft is a no-op
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove(DRAFT_KEY) {
            tracing::warn!(key = DRAFT_KEY, "Failed to clear draft: {e}");
        }
    }

    fn try_save(&self, fields: &FormFields) -> StorageResult<()> {
        let draft = Draft {
            fields: fields.clone(),
            saved_at: Some(self.clock.now()),
        };
        let bytes = serde_json::to_vec(&draft)?;
        self.backend.write(DRAFT_KEY, &bytes)
    }

    fn try_load(&self) -> StorageResult<Option<Draft>> {
        let Some(bytes) = self.backend.read(DRAFT_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
