//! The locally kept draft session.
//!
//! One snapshot lives under [`SESSION_KEY`]. It is written on every explicit
//! "save & download", offered for resume on the next start and removed when
//! the user discards the draft.

use super::{FileStorage, Storage, StorageError, StorageResult};
use crate::session::{SESSION_KEY, SessionSnapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What the resume prompt shows about a stored draft.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeMeta {
    pub timestamp: DateTime<Utc>,
    pub presentation_name: String,
    pub slide_count: usize,
}

/// A saved snapshot ready to hand to the user as a download.
#[derive(Debug, Clone)]
pub struct SessionExport {
    pub snapshot: SessionSnapshot,
    /// Suggested file name.
    pub filename: String,
    pub json: String,
}

/// Manages the draft session in a storage backend.
pub struct LocalSession<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    key: String,
    /// Timestamp of the last snapshot written by this manager.
    last_saved: Option<DateTime<Utc>>,
}

impl<S: Storage> LocalSession<S> {
    /// Create a manager using the default session key.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_key(storage, SESSION_KEY)
    }

    pub fn with_key(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            last_saved: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Store `snapshot` as the draft.
    pub async fn save(&mut self, snapshot: &SessionSnapshot) -> StorageResult<()> {
        self.storage.save(&self.key, snapshot).await?;
        self.last_saved = Some(snapshot.timestamp);
        log::info!(
            "Saved session '{}' ({} slides)",
            snapshot.presentation_name,
            snapshot.slides.len()
        );
        Ok(())
    }

    /// Store `snapshot` and prepare it for download.
    pub async fn save_and_download(&mut self, snapshot: SessionSnapshot) -> StorageResult<SessionExport> {
        let json = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.save(&snapshot).await?;
        Ok(SessionExport {
            filename: snapshot.export_filename(),
            snapshot,
            json,
        })
    }

    /// Describe the stored draft, if there is a usable one.
    pub async fn resume_meta(&self) -> Option<ResumeMeta> {
        match self.storage.load(&self.key).await {
            Ok(snapshot) => Some(ResumeMeta {
                timestamp: snapshot.timestamp,
                presentation_name: snapshot.presentation_name,
                slide_count: snapshot.slides.len(),
            }),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Invalid saved session: {}", e);
                None
            }
        }
    }

    /// Load the stored draft.
    pub async fn resume(&mut self) -> StorageResult<SessionSnapshot> {
        let snapshot = self.storage.load(&self.key).await?;
        self.last_saved = Some(snapshot.timestamp);
        log::info!("Resumed session '{}'", snapshot.presentation_name);
        Ok(snapshot)
    }

    /// Remove the stored draft.
    pub async fn discard(&mut self) -> StorageResult<()> {
        self.storage.delete(&self.key).await?;
        self.last_saved = None;
        log::info!("Discarded draft session");
        Ok(())
    }
}

/// Draft session manager on the platform data directory.
pub fn create_default_session() -> StorageResult<LocalSession<FileStorage>> {
    let storage = FileStorage::default_location()?;
    Ok(LocalSession::new(Arc::new(storage)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Line;
    use crate::storage::MemoryStorage;
    use crate::store::SlideStore;
    use kurbo::Point;
    use pollster::block_on;

    fn snapshot() -> SessionSnapshot {
        let mut store = SlideStore::new();
        store.set_slide_lines(0, vec![Line::new("Amazing Grace", Point::new(480.0, 270.0), 40.0)]);
        store.add_slide(Vec::new());
        SessionSnapshot::capture("Sunday", &store)
    }

    #[test]
    fn test_no_draft_means_no_resume() {
        let session = LocalSession::new(Arc::new(MemoryStorage::new()));
        assert_eq!(block_on(session.resume_meta()), None);
    }

    #[test]
    fn test_save_and_download() {
        let mut session = LocalSession::new(Arc::new(MemoryStorage::new()));
        let snapshot = snapshot();

        let export = block_on(session.save_and_download(snapshot.clone())).unwrap();
        assert!(export.filename.starts_with("Sunday-session-"));
        assert!(export.filename.ends_with(".json"));
        assert_eq!(SessionSnapshot::from_json(&export.json).unwrap().slides, snapshot.slides);
        assert_eq!(session.last_saved(), Some(snapshot.timestamp));

        let meta = block_on(session.resume_meta()).unwrap();
        assert_eq!(meta.slide_count, 2);
        assert_eq!(meta.presentation_name, "Sunday");
        assert_eq!(meta.timestamp, snapshot.timestamp);
    }

    #[test]
    fn test_resume_then_discard() {
        let storage = Arc::new(MemoryStorage::new());
        let mut writer = LocalSession::new(storage.clone());
        block_on(writer.save(&snapshot())).unwrap();

        let mut reader = LocalSession::new(storage);
        let resumed = block_on(reader.resume()).unwrap();
        let mut store = SlideStore::new();
        resumed.apply_to(&mut store);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().lines[0].text, "Amazing Grace");

        block_on(reader.discard()).unwrap();
        assert!(block_on(reader.resume_meta()).is_none());
        assert!(matches!(block_on(reader.resume()), Err(StorageError::NotFound(_))));
    }
}
