//! Local-first synchronization of slides with the remote backend.
//!
//! Each operation is split in three steps so no store borrow is held while
//! a request is in flight:
//!
//! 1. `begin_*` inspects and flags the store and returns a job,
//! 2. the job's `run` performs the backend call,
//! 3. `apply_*` folds the outcome back into the store.
//!
//! Completions locate their slide by id, so navigating, reordering or
//! deleting in the meantime is safe. Failures never roll back local state
//! and nothing is retried automatically.

use crate::backend::{
    BackendError, BackendResult, CreatePresentationRequest, CreateSlideRequest, SlideBackend, UpdateOrderRequest,
    UpdateSlideRequest, encode_slide_image,
};
use crate::model::{EditMode, Line, Slide, SlideId, SyncState};
use crate::store::SlideStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Whether a save creates or updates the remote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Create,
    Update,
}

#[derive(Debug, Clone)]
enum SlideRequest {
    Create(CreateSlideRequest),
    Update(UpdateSlideRequest),
}

/// A slide save ready to send.
#[derive(Debug, Clone)]
pub struct SyncJob {
    slide_id: SlideId,
    request: SlideRequest,
    lines_sent: Vec<Line>,
}

/// Result of running a [`SyncJob`].
#[derive(Debug)]
pub struct SyncOutcome {
    pub slide_id: SlideId,
    pub kind: SyncKind,
    /// Lines as they were when the save began.
    pub lines_sent: Vec<Line>,
    pub result: BackendResult<()>,
}

impl SyncJob {
    pub fn slide_id(&self) -> &str {
        &self.slide_id
    }

    pub fn kind(&self) -> SyncKind {
        match self.request {
            SlideRequest::Create(_) => SyncKind::Create,
            SlideRequest::Update(_) => SyncKind::Update,
        }
    }

    /// Send the save.
    pub async fn run<B: SlideBackend + ?Sized>(self, backend: &B) -> SyncOutcome {
        let kind = self.kind();
        let result = match self.request {
            SlideRequest::Create(request) => backend.create_slide(request).await,
            SlideRequest::Update(request) => backend.update_slide(request).await,
        };
        SyncOutcome {
            slide_id: self.slide_id,
            kind,
            lines_sent: self.lines_sent,
            result,
        }
    }
}

/// How a save outcome was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveApplied {
    Saved,
    Failed(String),
    /// The slide no longer exists locally.
    Stale,
}

/// First step of a delete.
#[derive(Debug)]
pub enum DeleteStep {
    /// The backend never saw the slide; it was removed locally.
    Removed(Slide),
    /// The remote record must go first.
    Remote(DeleteJob),
}

/// A remote delete ready to send.
#[derive(Debug, Clone)]
pub struct DeleteJob {
    slide_id: SlideId,
    presentation_name: String,
}

/// Result of running a [`DeleteJob`].
#[derive(Debug)]
pub struct DeleteOutcome {
    pub slide_id: SlideId,
    pub result: BackendResult<()>,
}

impl DeleteJob {
    pub fn slide_id(&self) -> &str {
        &self.slide_id
    }

    pub async fn run<B: SlideBackend + ?Sized>(self, backend: &B) -> DeleteOutcome {
        let result = backend.delete_slide(&self.presentation_name, &self.slide_id).await;
        DeleteOutcome {
            slide_id: self.slide_id,
            result,
        }
    }
}

/// How a delete outcome was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteApplied {
    Removed(Slide),
    /// The slide was kept.
    Failed(String),
    Stale,
}

/// Order updates for every slide after a reorder.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    requests: Vec<UpdateOrderRequest>,
}

/// Which order updates failed. Local order is never reverted.
#[derive(Debug, Default)]
pub struct ReorderReport {
    pub updated: usize,
    pub failed: Vec<(SlideId, BackendError)>,
}

impl ReorderReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl OrderUpdate {
    pub fn requests(&self) -> &[UpdateOrderRequest] {
        &self.requests
    }

    /// Send one order update per slide. Calls are independent; a failure
    /// does not stop the rest.
    pub async fn run<B: SlideBackend + ?Sized>(self, backend: &B) -> ReorderReport {
        let mut report = ReorderReport::default();
        for request in self.requests {
            let slide_id = request.random_id.clone();
            match backend.update_order(request).await {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    log::error!("Failed to update order of slide {}: {}", slide_id, e);
                    report.failed.push((slide_id, e));
                }
            }
        }
        report
    }
}

/// Synchronizes one presentation's slides with a backend.
pub struct BackendSync<B: SlideBackend> {
    backend: Arc<B>,
    presentation_name: String,
}

impl<B: SlideBackend> BackendSync<B> {
    pub fn new(backend: Arc<B>, presentation_name: impl Into<String>) -> Self {
        Self {
            backend,
            presentation_name: presentation_name.into(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn presentation_name(&self) -> &str {
        &self.presentation_name
    }

    /// Register the presentation with the backend.
    pub async fn create_presentation(&self, created: DateTime<Utc>) -> BackendResult<()> {
        let request = CreatePresentationRequest {
            presentation_name: self.presentation_name.clone(),
            created_date_time: created,
        };
        self.backend.create_presentation(request).await
    }

    /// Flag slide `index` as syncing and build its save.
    ///
    /// A slide the backend has never seen is created at its 1-based
    /// position; otherwise it is updated in place. Returns `None` for an
    /// unknown index or while a save of the slide is already in flight.
    pub fn begin_save(&self, store: &mut SlideStore, index: usize, png: &[u8]) -> Option<SyncJob> {
        let slide = store.slide_mut(index)?;
        if slide.sync.state == SyncState::Syncing {
            log::warn!("Slide {} is already syncing", slide.id);
            return None;
        }

        let slide_data = encode_slide_image(png);
        let request = if slide.is_saved_to_backend() {
            SlideRequest::Update(UpdateSlideRequest {
                random_id: slide.id.clone(),
                presentation_name: self.presentation_name.clone(),
                slide_data,
            })
        } else {
            SlideRequest::Create(CreateSlideRequest {
                random_id: slide.id.clone(),
                presentation_name: self.presentation_name.clone(),
                slide_order: index + 1,
                slide_data,
            })
        };
        slide.sync.state = SyncState::Syncing;

        Some(SyncJob {
            slide_id: slide.id.clone(),
            request,
            lines_sent: slide.lines.clone(),
        })
    }

    /// Run a save job against this backend.
    pub async fn execute(&self, job: SyncJob) -> SyncOutcome {
        job.run(self.backend.as_ref()).await
    }

    /// Fold a finished save back into the store.
    ///
    /// On success the sent lines become the last-known-good snapshot. The
    /// slide is only marked saved (and returned to view mode) when it was
    /// not edited while the request was in flight.
    pub fn apply_save(&self, store: &mut SlideStore, outcome: SyncOutcome) -> SaveApplied {
        let Some(slide) = store.slide_by_id_mut(&outcome.slide_id) else {
            log::warn!("Dropping save result for deleted slide {}", outcome.slide_id);
            return SaveApplied::Stale;
        };

        match outcome.result {
            Ok(()) => {
                let unchanged = slide.lines == outcome.lines_sent;
                slide.sync.last_synced = Some(outcome.lines_sent);
                if unchanged {
                    slide.sync.state = SyncState::Synced;
                    slide.unsaved = false;
                    slide.edit_mode = EditMode::View;
                } else {
                    slide.sync.state = SyncState::Draft;
                }
                log::info!("Saved slide {} to backend ({:?})", slide.id, outcome.kind);
                SaveApplied::Saved
            }
            Err(e) => {
                log::error!("Failed to save slide {}: {}", slide.id, e);
                slide.sync.state = SyncState::Error;
                SaveApplied::Failed(e.to_string())
            }
        }
    }

    /// Start deleting slide `index`.
    pub fn begin_delete(&self, store: &mut SlideStore, index: usize) -> Option<DeleteStep> {
        let slide = store.get(index)?;
        if !slide.is_saved_to_backend() {
            let removed = store.delete_slide(index)?;
            log::info!("Deleted local-only slide {}", removed.id);
            return Some(DeleteStep::Removed(removed));
        }
        Some(DeleteStep::Remote(DeleteJob {
            slide_id: slide.id.clone(),
            presentation_name: self.presentation_name.clone(),
        }))
    }

    /// Fold a finished remote delete back into the store.
    pub fn apply_delete(&self, store: &mut SlideStore, outcome: DeleteOutcome) -> DeleteApplied {
        let Some(index) = store.index_of(&outcome.slide_id) else {
            log::warn!("Slide {} already gone locally", outcome.slide_id);
            return DeleteApplied::Stale;
        };
        match outcome.result {
            Ok(()) => match store.delete_slide(index) {
                Some(removed) => {
                    log::info!("Deleted slide {}", removed.id);
                    DeleteApplied::Removed(removed)
                }
                None => DeleteApplied::Stale,
            },
            Err(e) => {
                log::error!("Failed to delete slide {}: {}", outcome.slide_id, e);
                DeleteApplied::Failed(e.to_string())
            }
        }
    }

    /// Move slide `from` to `to` locally and build the order updates.
    ///
    /// Every slide gets an update carrying its new 1-based position.
    pub fn reorder(&self, store: &mut SlideStore, from: usize, to: usize) -> Option<OrderUpdate> {
        if !store.reorder_slides(from, to) {
            return None;
        }
        let requests = store
            .slides()
            .iter()
            .enumerate()
            .map(|(i, slide)| UpdateOrderRequest {
                presentation_name: self.presentation_name.clone(),
                random_id: slide.id.clone(),
                slide_order: i + 1,
            })
            .collect();
        Some(OrderUpdate { requests })
    }
}
