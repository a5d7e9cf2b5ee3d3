//! Durable draft persistence.
//!
//! Saves the full draft snapshot as JSON under a per-wizard-kind key so a
//! reload resumes where the user left off. All operations are best-effort:
//! failures are logged, never surfaced, and the wizard keeps working
//! in-memory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

use super::draft::Draft;

/// Key distinguishing this wizard's drafts from other wizard kinds that may
/// run concurrently against the same state directory.
pub const STAFF_ONBOARDING_KEY: &str = "staff-onboarding";

/// Save/restore/clear of the in-progress draft.
#[derive(Debug, Clone)]
pub struct DraftStore {
    /// None when draft persistence is disabled by config.
    path: Option<PathBuf>,
}

impl DraftStore {
    /// Store for the staff-onboarding wizard under the configured state
    /// directory. Honors `wizard.persist_drafts`.
    pub fn from_config(config: &Config) -> Self {
        if !config.wizard.persist_drafts {
            return Self::disabled();
        }
        Self {
            path: Some(
                config
                    .drafts_path()
                    .join(format!("{STAFF_ONBOARDING_KEY}.json")),
            ),
        }
    }

    /// Store writing to an explicit file path (tests, alternate layouts).
    pub fn at_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Store that persists nothing; the wizard runs purely in-memory.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Persist the full draft snapshot, overwriting any prior value.
    ///
    /// Each call writes the complete draft via a temp file and rename, so
    /// out-of-order completions converge on a whole snapshot rather than a
    /// corrupted partial one. Failures are logged and swallowed.
    pub fn save(&self, draft: &Draft) {
        let Some(path) = &self.path else {
            return;
        };

        let contents = match serde_json::to_string_pretty(draft) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize draft");
                return;
            }
        };

        if let Err(e) = write_atomic(path, &contents) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to persist draft");
        }
    }

    /// Restore the persisted draft if present and well-formed.
    ///
    /// Missing or corrupt snapshots return `None`; corruption never raises.
    pub fn restore(&self) -> Option<Draft> {
        let path = self.path.as_ref()?;
        if !path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read persisted draft");
                return None;
            }
        };

        match serde_json::from_str::<Draft>(&contents) {
            Ok(draft) => {
                tracing::info!(path = %path.display(), "Restored persisted draft");
                Some(draft)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Persisted draft is corrupt, starting fresh");
                None
            }
        }
    }

    /// Erase the persisted snapshot.
    pub fn clear(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to clear persisted draft");
            }
        }
    }

    /// Whether a persisted snapshot currently exists on disk.
    pub fn has_snapshot(&self) -> bool {
        self.path.as_ref().is_some_and(|p| p.exists())
    }
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
