//! Local copies of unsaved wizard data.
//!
//! One draft per form slug plus at most one pending save, the payload that
//! was stashed because no session was available. Both are plain JSON files,
//! last write wins.

use crate::cli::credentials::{config_dir, write_private};
use crate::cli::error::CliError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPayload {
    pub form_slug: String,
    pub title: String,
    pub data: Map<String, Value>,
    /// Set once the server has stored the document
    #[serde(default)]
    pub document_id: Option<Uuid>,
    pub saved_at: DateTime<Utc>,
}

impl DraftPayload {
    pub fn new(form_slug: &str, title: &str, data: Map<String, Value>) -> Self {
        Self {
            form_slug: form_slug.to_string(),
            title: title.to_string(),
            data,
            document_id: None,
            saved_at: Utc::now(),
        }
    }
}

pub trait DraftStore: Send + Sync {
    fn load_draft(&self, form_slug: &str) -> Result<Option<DraftPayload>, CliError>;
    fn save_draft(&self, draft: &DraftPayload) -> Result<(), CliError>;
    fn clear_draft(&self, form_slug: &str) -> Result<(), CliError>;

    fn load_pending(&self) -> Result<Option<DraftPayload>, CliError>;
    fn set_pending(&self, pending: Option<&DraftPayload>) -> Result<(), CliError>;
}

pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn with_default_path() -> Self {
        Self::new(config_dir())
    }

    fn draft_path(&self, form_slug: &str) -> PathBuf {
        let name: String = form_slug
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join("drafts").join(format!("{name}.json"))
    }

    fn pending_path(&self) -> PathBuf {
        self.dir.join("pending_save.json")
    }

    fn read(path: &PathBuf) -> Result<Option<DraftPayload>, CliError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| CliError::Storage(format!("Corrupt draft {}: {e}", path.display())))
    }

    fn write(path: &PathBuf, draft: &DraftPayload) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(draft)
            .map_err(|e| CliError::Storage(format!("Failed to serialize draft: {e}")))?;
        write_private(path, &json)
    }

    fn remove(path: &PathBuf) -> Result<(), CliError> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl DraftStore for FileDraftStore {
    fn load_draft(&self, form_slug: &str) -> Result<Option<DraftPayload>, CliError> {
        Self::read(&self.draft_path(form_slug))
    }

    fn save_draft(&self, draft: &DraftPayload) -> Result<(), CliError> {
        Self::write(&self.draft_path(&draft.form_slug), draft)
    }

    fn clear_draft(&self, form_slug: &str) -> Result<(), CliError> {
        Self::remove(&self.draft_path(form_slug))
    }

    fn load_pending(&self) -> Result<Option<DraftPayload>, CliError> {
        Self::read(&self.pending_path())
    }

    fn set_pending(&self, pending: Option<&DraftPayload>) -> Result<(), CliError> {
        match pending {
            Some(draft) => Self::write(&self.pending_path(), draft),
            None => Self::remove(&self.pending_path()),
        }
    }
}

#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<String, DraftPayload>>,
    pending: Mutex<Option<DraftPayload>>,
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> CliError {
    CliError::Storage(err.to_string())
}

impl DraftStore for MemoryDraftStore {
    fn load_draft(&self, form_slug: &str) -> Result<Option<DraftPayload>, CliError> {
        Ok(self.drafts.lock().map_err(poisoned)?.get(form_slug).cloned())
    }

    fn save_draft(&self, draft: &DraftPayload) -> Result<(), CliError> {
        self.drafts
            .lock()
            .map_err(poisoned)?
            .insert(draft.form_slug.clone(), draft.clone());
        Ok(())
    }

    fn clear_draft(&self, form_slug: &str) -> Result<(), CliError> {
        self.drafts.lock().map_err(poisoned)?.remove(form_slug);
        Ok(())
    }

    fn load_pending(&self) -> Result<Option<DraftPayload>, CliError> {
        Ok(self.pending.lock().map_err(poisoned)?.clone())
    }

    fn set_pending(&self, pending: Option<&DraftPayload>) -> Result<(), CliError> {
        *self.pending.lock().map_err(poisoned)? = pending.cloned();
        Ok(())
    }
}
