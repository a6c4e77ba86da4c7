//! Session snapshots: the whole composition as one JSON document.

use crate::model::{Slide, SyncState};
use crate::store::SlideStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Storage key of the locally kept session.
pub const SESSION_KEY: &str = "slide-composer-session";

/// Name used in export filenames when the presentation has none.
const FALLBACK_NAME: &str = "presentation";

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Session file has an unexpected structure: {reason}")]
    Invalid { reason: String },
    #[error("IO error: {0}")]
    Io(String),
}

impl SessionError {
    fn invalid(reason: impl Into<String>) -> Self {
        SessionError::Invalid { reason: reason.into() }
    }
}

/// Full serializable state of a composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub presentation_name: String,
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Snapshot `store` now.
    pub fn capture(presentation_name: impl Into<String>, store: &SlideStore) -> Self {
        Self {
            presentation_name: presentation_name.into(),
            slides: store.slides().to_vec(),
            current_index: store.current_index(),
            timestamp: Utc::now(),
        }
    }

    /// Replace the contents of `store` with this snapshot.
    pub fn apply_to(&self, store: &mut SlideStore) {
        store.restore(self.slides.clone(), self.current_index);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a session document.
    ///
    /// The whole document is rejected if any slide or line is malformed.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let value: Value = serde_json::from_str(json)?;
        validate(&value)?;

        let mut snapshot: SessionSnapshot = serde_json::from_value(value.clone())?;
        let raw_slides = value.get("slides").and_then(Value::as_array);
        for (i, slide) in snapshot.slides.iter_mut().enumerate() {
            slide.normalize();
            let legacy_saved = raw_slides
                .and_then(|slides| slides.get(i))
                .and_then(|raw| raw.get("savedToBackend"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if legacy_saved && slide.sync.last_synced.is_none() {
                slide.sync.last_synced = Some(slide.lines.clone());
                slide.sync.state = SyncState::Synced;
            }
            // Whatever was in flight when the session was written is lost
            if slide.sync.state == SyncState::Syncing {
                slide.sync.state = SyncState::Draft;
            }
        }
        Ok(snapshot)
    }

    /// Suggested download name: `<name>-session-<YYYY-MM-DDTHH:MM:SS>.json`.
    pub fn export_filename(&self) -> String {
        let name = if self.presentation_name.trim().is_empty() {
            FALLBACK_NAME
        } else {
            self.presentation_name.as_str()
        };
        format!("{}-session-{}.json", name, self.timestamp.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// Check the structure of a session document before deserializing it.
///
/// Every slide needs a string `id` and a `lines` array; every line needs a
/// string `text` and numeric `x`, `y` and `fontSize`.
pub fn validate(value: &Value) -> Result<(), SessionError> {
    let Some(root) = value.as_object() else {
        return Err(SessionError::invalid("session must be an object"));
    };
    let Some(slides) = root.get("slides").and_then(Value::as_array) else {
        return Err(SessionError::invalid("`slides` must be an array"));
    };

    for (i, slide) in slides.iter().enumerate() {
        let Some(slide) = slide.as_object() else {
            return Err(SessionError::invalid(format!("slide {} is not an object", i)));
        };
        if !slide.get("id").is_some_and(Value::is_string) {
            return Err(SessionError::invalid(format!("slide {}: `id` must be a string", i)));
        }
        let Some(lines) = slide.get("lines").and_then(Value::as_array) else {
            return Err(SessionError::invalid(format!("slide {}: `lines` must be an array", i)));
        };

        for (j, line) in lines.iter().enumerate() {
            let Some(line) = line.as_object() else {
                return Err(SessionError::invalid(format!("slide {}, line {} is not an object", i, j)));
            };
            if !line.get("text").is_some_and(Value::is_string) {
                return Err(SessionError::invalid(format!(
                    "slide {}, line {}: `text` must be a string",
                    i, j
                )));
            }
            for field in ["x", "y", "fontSize"] {
                if !line.get(field).is_some_and(Value::is_number) {
                    return Err(SessionError::invalid(format!(
                        "slide {}, line {}: `{}` must be a number",
                        i, j, field
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Write `snapshot` to `path` as JSON.
pub fn export_session(path: &Path, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
    let json = snapshot.to_json()?;
    fs::write(path, json).map_err(|e| SessionError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("Exported session to {}", path.display());
    Ok(())
}

/// Read and validate a session file.
pub fn import_session(path: &Path) -> Result<SessionSnapshot, SessionError> {
    let json = fs::read_to_string(path)
        .map_err(|e| SessionError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let snapshot = SessionSnapshot::from_json(&json).inspect_err(|e| {
        log::error!("Rejected session {}: {}", path.display(), e);
    })?;
    log::info!(
        "Imported session {} with {} slides",
        path.display(),
        snapshot.slides.len()
    );
    Ok(snapshot)
}
