//! Cross-sell dismissals kept in `<config_dir>/dismissals.json`.

use std::path::PathBuf;

use crate::cli::credentials::{config_dir, write_private};
use crate::models::Dismissal;
use crate::services::DismissalStore;

pub struct FileDismissalStore {
    path: PathBuf,
}

impl FileDismissalStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_path() -> Self {
        Self::new(config_dir().join("dismissals.json"))
    }
}

impl DismissalStore for FileDismissalStore {
    fn load(&self) -> Result<Vec<Dismissal>, String> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|err| err.to_string())?;
        serde_json::from_str(&content).or_else(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable dismissals");
            Ok(vec![])
        })
    }

    fn store(&self, dismissals: &[Dismissal]) -> Result<(), String> {
        let json = serde_json::to_string_pretty(dismissals).map_err(|err| err.to_string())?;
        write_private(&self.path, &json).map_err(|err| err.to_string())
    }
}
