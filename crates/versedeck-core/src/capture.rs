//! Slide image capture requests.
//!
//! Every committed change asks the host to re-rasterize the affected slide.
//! Requests are queued here and drained by the host's (asynchronous)
//! capture loop, so interaction never waits on rendering.

use crate::model::SlideId;

/// Ask the host to capture a slide as of store revision `revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub slide_id: SlideId,
    pub revision: u64,
}

/// Pending capture requests, at most one per slide.
#[derive(Debug, Clone, Default)]
pub struct CaptureQueue {
    pending: Vec<CaptureRequest>,
}

impl CaptureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a capture. Replaces an older request for the same slide.
    pub fn request(&mut self, slide_id: impl Into<SlideId>, revision: u64) {
        let slide_id = slide_id.into();
        self.pending.retain(|req| req.slide_id != slide_id);
        self.pending.push(CaptureRequest { slide_id, revision });
    }

    /// Take all pending requests in the order they were last queued.
    pub fn drain(&mut self) -> Vec<CaptureRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[CaptureRequest] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
