//! Canvas interaction controller.
//!
//! [`Canvas`] owns the slide store and turns host events (drops, pointer
//! presses and moves, keys, toolbar actions) into line mutations on the
//! current slide. Every mutation is committed to the store before a capture
//! request for the slide is queued.

use crate::backend::SlideBackend;
use crate::capture::{CaptureQueue, CaptureRequest};
use crate::config::{Bounds, ComposerConfig};
use crate::drop::{DropPayload, PlacementArea, place_payload};
use crate::fit::{TextMeasure, global_measure};
use crate::group::GroupIndex;
use crate::history::LinesHistory;
use crate::input::{ClickTracker, Key, KeyOutcome, Modifiers};
use crate::model::{EditMode, Line, LineId, Slide, SlideId};
use crate::selection::{DragState, selection_for_click};
use crate::store::SlideStore;
use crate::sync::{
    BackendSync, DeleteApplied, DeleteOutcome, DeleteStep, OrderUpdate, SaveApplied, SyncJob, SyncOutcome,
};
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Navigation that waits on the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    GoTo(usize),
    AddSlide,
    Duplicate(usize),
}

/// A modal question the host must show before continuing.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// The current slide is in view mode; confirming enters stanza mode
    /// and replays any parked drop.
    EditModeRequired,
    /// The current slide has unsaved changes; confirming saves it and then
    /// performs `pending`.
    UnsavedChanges { pending: Navigation },
}

/// Which adjustable setting a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    FontSize,
    LineSpacing,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::FontSize => write!(f, "Font size"),
            Setting::LineSpacing => write!(f, "Line spacing"),
        }
    }
}

/// Non-blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A requested value was outside its bounds and the nearest bound was
    /// applied instead.
    Clamped {
        setting: Setting,
        bounds: Bounds,
        requested: f64,
        applied: f64,
    },
    /// A backend call failed; local state was kept.
    SyncFailed { slide_id: SlideId, message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Clamped {
                setting,
                bounds,
                applied,
                ..
            } => write!(
                f,
                "{} must be between {}px and {}px. It has been set to {}px.",
                setting, bounds.min, bounds.max, applied
            ),
            Notice::SyncFailed { slide_id, message } => {
                write!(f, "Failed to sync slide {}: {}", slide_id, message)
            }
        }
    }
}

/// What became of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Not our payload, or nothing to place.
    Ignored,
    /// This many lines were added to the current slide.
    Applied(usize),
    /// Parked until the edit-mode prompt is answered.
    Pending,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Performed; the current slide index after navigating.
    Done(usize),
    /// Blocked by [`Prompt::UnsavedChanges`].
    NeedsSave,
    /// Target index out of range.
    Invalid,
}

/// What confirming a prompt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmed {
    /// Edit mode entered; carries the replayed drop, if one was parked.
    EditMode(Option<DropOutcome>),
    /// The previous slide was saved locally and navigation happened. The
    /// host should push `saved` to the backend.
    Navigated { saved: usize, current: usize },
}

#[derive(Debug, Clone)]
struct PendingDrop {
    payload: DropPayload,
    position: Point,
}

/// Interactive editing state over a [`SlideStore`].
pub struct Canvas {
    pub(crate) store: SlideStore,
    pub(crate) config: ComposerConfig,
    /// Canvas top-left in host (client) coordinates.
    origin: Point,
    /// Canvas size as displayed by the host.
    client_size: Size,
    pub(crate) selection: Vec<LineId>,
    pub(crate) groups: GroupIndex,
    drag: Option<DragState>,
    clicks: ClickTracker,
    editing: Option<LineId>,
    pending_drop: Option<PendingDrop>,
    prompt: Option<Prompt>,
    pub(crate) notices: Vec<Notice>,
    histories: HashMap<SlideId, LinesHistory>,
    capture: CaptureQueue,
    measure: Option<Arc<dyn TextMeasure>>,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("current", &self.store.current_index())
            .field("slides", &self.store.len())
            .field("selection", &self.selection)
            .field("editing", &self.editing)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl Canvas {
    /// Create a canvas over a fresh store.
    pub fn new(config: ComposerConfig) -> Self {
        Self::with_store(SlideStore::new(), config)
    }

    /// Create a canvas over an existing store.
    pub fn with_store(store: SlideStore, config: ComposerConfig) -> Self {
        let groups = GroupIndex::build(&store.current().lines);
        let client_size = config.canvas_size;
        Self {
            store,
            config,
            origin: Point::ZERO,
            client_size,
            selection: Vec::new(),
            groups,
            drag: None,
            clicks: ClickTracker::new(),
            editing: None,
            pending_drop: None,
            prompt: None,
            notices: Vec::new(),
            histories: HashMap::new(),
            capture: CaptureQueue::new(),
            measure: None,
        }
    }

    /// Use `measure` instead of the process-wide measurement backend.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = Some(measure);
        self
    }

    fn measure(&self) -> &dyn TextMeasure {
        match &self.measure {
            Some(measure) => measure.as_ref(),
            None => global_measure(),
        }
    }

    pub fn store(&self) -> &SlideStore {
        &self.store
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn current_slide(&self) -> &Slide {
        self.store.current()
    }

    pub fn edit_mode(&self) -> EditMode {
        self.store.current().edit_mode
    }

    pub fn selection(&self) -> &[LineId] {
        &self.selection
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    /// Line currently in inline text editing.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Take queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Hand pending capture requests to the host rasterizer.
    pub fn drain_captures(&mut self) -> Vec<CaptureRequest> {
        self.capture.drain()
    }

    /// Update where the host shows the canvas.
    pub fn set_canvas_rect(&mut self, origin: Point, client_size: Size) {
        self.origin = origin;
        self.client_size = client_size;
    }

    fn to_canvas(&self, client: Point) -> Point {
        Point::new(client.x - self.origin.x, client.y - self.origin.y)
    }

    /// Replace the current slide's lines, refresh derived state and ask for
    /// a new capture.
    pub(crate) fn commit_lines(&mut self, lines: Vec<Line>) {
        let index = self.store.current_index();
        self.store.set_slide_lines(index, lines);
        self.groups = GroupIndex::build(&self.store.current().lines);
        let slide_id = self.store.current().id.clone();
        self.capture.request(slide_id, self.store.revision());
    }

    /// Like [`Self::commit_lines`], recording the previous document for undo.
    pub(crate) fn commit_lines_with_undo(&mut self, lines: Vec<Line>) {
        let slide = self.store.current();
        let previous = Arc::new(slide.lines.clone());
        self.histories.entry(slide.id.clone()).or_default().push(previous);
        self.commit_lines(lines);
    }

    /// Drop per-slide interaction state after the current slide changed.
    fn reset_interaction(&mut self) {
        self.selection.clear();
        self.drag = None;
        self.editing = None;
        self.clicks.reset();
        self.groups = GroupIndex::build(&self.store.current().lines);
    }

    /// Put the current slide into `mode`. View mode is only reached by
    /// saving.
    pub fn enter_edit_mode(&mut self, mode: EditMode) -> bool {
        if !mode.allows_editing() {
            return false;
        }
        let index = self.store.current_index();
        self.store.set_edit_mode(index, mode);
        true
    }

    /// Handle a drop of `raw` transfer data at client position `pointer`.
    pub fn handle_drop(&mut self, raw: &str, pointer: Point) -> DropOutcome {
        let Some(payload) = DropPayload::parse(raw) else {
            return DropOutcome::Ignored;
        };
        let position = self.to_canvas(pointer);

        if !self.edit_mode().allows_editing() {
            log::debug!("Drop in view mode parked until edit mode is confirmed");
            self.pending_drop = Some(PendingDrop { payload, position });
            self.prompt = Some(Prompt::EditModeRequired);
            return DropOutcome::Pending;
        }

        self.apply_drop(&payload, position)
    }

    fn apply_drop(&mut self, payload: &DropPayload, position: Point) -> DropOutcome {
        let area = PlacementArea::from_client_size(self.client_size, self.config.padding_factor);
        let placed = place_payload(payload, position, area, self.measure(), &self.config);
        if placed.is_empty() {
            return DropOutcome::Ignored;
        }

        let count = placed.len();
        self.selection = placed.iter().map(|line| line.id.clone()).collect();
        let mut lines = self.store.current().lines.clone();
        lines.extend(placed);
        self.commit_lines(lines);
        DropOutcome::Applied(count)
    }

    /// Accept the open prompt.
    pub fn confirm_prompt(&mut self) -> Option<Confirmed> {
        match self.prompt.take()? {
            Prompt::EditModeRequired => {
                self.enter_edit_mode(EditMode::Stanza);
                let replayed = self
                    .pending_drop
                    .take()
                    .map(|pending| self.apply_drop(&pending.payload, pending.position));
                Some(Confirmed::EditMode(replayed))
            }
            Prompt::UnsavedChanges { pending } => {
                let saved = self.store.current_index();
                self.save_current();
                let current = match self.navigate(pending) {
                    NavOutcome::Done(index) => index,
                    _ => self.store.current_index(),
                };
                Some(Confirmed::Navigated { saved, current })
            }
        }
    }

    /// Dismiss the open prompt, discarding any parked drop.
    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.pending_drop = None;
    }

    /// Select from a click on `line_id`.
    pub fn click_line(&mut self, line_id: &str) {
        let mode = self.edit_mode();
        self.selection = selection_for_click(&self.store.current().lines, &self.groups, line_id, mode);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Pointer press at client position `pointer` over line `hit`, if any.
    pub fn pointer_down(&mut self, pointer: Point, hit: Option<&str>) {
        self.pointer_down_at(pointer, hit, Instant::now());
    }

    /// [`Self::pointer_down`] with an explicit timestamp for double-click
    /// detection.
    pub fn pointer_down_at(&mut self, pointer: Point, hit: Option<&str>, now: Instant) {
        let position = self.to_canvas(pointer);
        let double = self.clicks.register(position, now);

        let Some(line_id) = hit else {
            self.selection.clear();
            self.drag = None;
            return;
        };
        if double {
            self.double_click_line(line_id);
            return;
        }
        if !self.edit_mode().allows_editing() {
            return;
        }
        self.click_line(line_id);
        if !self.selection.is_empty() {
            self.drag = Some(DragState::begin(position, &self.store.current().lines, &self.selection));
        }
    }

    /// Pointer moved to client position `pointer`.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        let position = self.to_canvas(pointer);
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.current_point = position;
        drag.moved = true;

        let mut lines = self.store.current().lines.clone();
        drag.apply(&mut lines);
        self.commit_lines(lines);
        true
    }

    /// End the drag. Returns whether anything moved.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.take().is_some_and(|drag| drag.moved)
    }

    /// Keyboard handling: arrow keys nudge the selection.
    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers) -> KeyOutcome {
        let Some(direction) = key.arrow_direction() else {
            return KeyOutcome::Ignored;
        };
        if !self.edit_mode().allows_editing() || self.selection.is_empty() || self.editing.is_some() {
            return KeyOutcome::Ignored;
        }

        let step = if modifiers.shift {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        self.translate_selection(direction * step);
        KeyOutcome::Handled
    }

    fn translate_selection(&mut self, delta: Vec2) {
        let mut lines = self.store.current().lines.clone();
        for line in lines.iter_mut().filter(|line| self.selection.contains(&line.id)) {
            line.translate(delta);
        }
        self.commit_lines(lines);
    }

    /// Enter inline text editing for one line.
    ///
    /// In view mode this raises [`Prompt::EditModeRequired`] instead.
    pub fn double_click_line(&mut self, line_id: &str) -> bool {
        if !self.edit_mode().allows_editing() {
            self.prompt = Some(Prompt::EditModeRequired);
            return false;
        }
        if self.store.current().line(line_id).is_none() {
            return false;
        }
        self.drag = None;
        self.editing = Some(line_id.to_string());
        self.selection = vec![line_id.to_string()];
        true
    }

    /// Finish inline editing with `text`. Only the text changes.
    pub fn commit_text(&mut self, text: &str) -> bool {
        let Some(line_id) = self.editing.take() else {
            return false;
        };
        let mut lines = self.store.current().lines.clone();
        let Some(line) = lines.iter_mut().find(|line| line.id == line_id) else {
            return false;
        };
        if line.text == text {
            return false;
        }
        line.text = text.to_string();
        self.commit_lines_with_undo(lines);
        true
    }

    pub fn cancel_text_edit(&mut self) {
        self.editing = None;
    }

    pub fn can_undo(&self) -> bool {
        self.histories
            .get(&self.store.current().id)
            .is_some_and(LinesHistory::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.histories
            .get(&self.store.current().id)
            .is_some_and(LinesHistory::can_redo)
    }

    /// Undo the last recorded edit on the current slide.
    pub fn undo(&mut self) -> bool {
        self.step_history(true)
    }

    /// Redo the last undone edit on the current slide.
    pub fn redo(&mut self) -> bool {
        self.step_history(false)
    }

    fn step_history(&mut self, backwards: bool) -> bool {
        let slide = self.store.current();
        let current = Arc::new(slide.lines.clone());
        let Some(history) = self.histories.get_mut(&slide.id) else {
            return false;
        };
        let restored = if backwards {
            history.undo(current)
        } else {
            history.redo(current)
        };
        let Some(restored) = restored else {
            return false;
        };

        self.editing = None;
        self.commit_lines(Arc::unwrap_or_clone(restored));
        let lines = &self.store.current().lines;
        self.selection.retain(|id| lines.iter().any(|line| &line.id == id));
        true
    }

    /// Save the current slide locally: clears the unsaved flag and returns
    /// to view mode.
    pub fn save_current(&mut self) {
        let index = self.store.current_index();
        self.store.mark_slide_saved(index);
        self.reset_interaction();
        log::info!("Saved slide {}", self.store.current().id);
    }

    fn guard(&mut self, pending: Navigation) -> Option<NavOutcome> {
        if self.store.current().unsaved {
            self.prompt = Some(Prompt::UnsavedChanges { pending });
            return Some(NavOutcome::NeedsSave);
        }
        None
    }

    fn navigate(&mut self, navigation: Navigation) -> NavOutcome {
        let index = match navigation {
            Navigation::GoTo(index) => {
                if !self.store.go_to_slide(index) {
                    return NavOutcome::Invalid;
                }
                index
            }
            Navigation::AddSlide => self.store.add_slide(Vec::new()),
            Navigation::Duplicate(index) => match self.store.duplicate_slide(index) {
                Some(copy) => copy,
                None => return NavOutcome::Invalid,
            },
        };
        self.pending_drop = None;
        self.reset_interaction();
        NavOutcome::Done(index)
    }

    /// Switch to slide `index`, unless the current slide is unsaved.
    pub fn request_slide_switch(&mut self, index: usize) -> NavOutcome {
        if index >= self.store.len() {
            return NavOutcome::Invalid;
        }
        if index == self.store.current_index() {
            return NavOutcome::Done(index);
        }
        self.guard(Navigation::GoTo(index))
            .unwrap_or_else(|| self.navigate(Navigation::GoTo(index)))
    }

    /// Append a blank slide, unless the current slide is unsaved.
    pub fn request_add_slide(&mut self) -> NavOutcome {
        self.guard(Navigation::AddSlide)
            .unwrap_or_else(|| self.navigate(Navigation::AddSlide))
    }

    /// Duplicate slide `index`, unless the current slide is unsaved.
    pub fn request_duplicate(&mut self, index: usize) -> NavOutcome {
        if index >= self.store.len() {
            return NavOutcome::Invalid;
        }
        self.guard(Navigation::Duplicate(index))
            .unwrap_or_else(|| self.navigate(Navigation::Duplicate(index)))
    }

    /// Append one slide per batch and show the first of them.
    pub fn add_slides(&mut self, batches: Vec<Vec<Line>>) -> std::ops::Range<usize> {
        let range = self.store.add_multiple_slides(batches);
        if !range.is_empty() {
            self.reset_interaction();
            for index in range.clone() {
                if let Some(slide) = self.store.get(index) {
                    self.capture.request(slide.id.clone(), self.store.revision());
                }
            }
        }
        range
    }

    /// Replace every slide, e.g. after resuming or importing a session.
    pub fn load_slides(&mut self, slides: Vec<Slide>, current: usize) {
        self.store.restore(slides, current);
        self.histories.clear();
        self.capture = CaptureQueue::new();
        self.pending_drop = None;
        self.prompt = None;
        self.reset_interaction();
    }

    /// Start a backend save of slide `index` with its rendered `png`.
    pub fn begin_backend_save<B: SlideBackend>(
        &mut self,
        sync: &BackendSync<B>,
        index: usize,
        png: &[u8],
    ) -> Option<SyncJob> {
        sync.begin_save(&mut self.store, index, png)
    }

    /// Apply a finished backend save. Failures queue a notice.
    pub fn finish_backend_save<B: SlideBackend>(&mut self, sync: &BackendSync<B>, outcome: SyncOutcome) -> SaveApplied {
        let slide_id = outcome.slide_id.clone();
        let applied = sync.apply_save(&mut self.store, outcome);
        match &applied {
            SaveApplied::Failed(message) => self.notices.push(Notice::SyncFailed {
                slide_id,
                message: message.clone(),
            }),
            SaveApplied::Saved if self.store.current().id == slide_id && !self.edit_mode().allows_editing() => {
                self.reset_interaction();
            }
            _ => {}
        }
        applied
    }

    /// Start deleting slide `index`. Slides the backend never saw are
    /// removed immediately.
    pub fn begin_delete_slide<B: SlideBackend>(&mut self, sync: &BackendSync<B>, index: usize) -> Option<DeleteStep> {
        let step = sync.begin_delete(&mut self.store, index)?;
        if let DeleteStep::Removed(slide) = &step {
            self.histories.remove(&slide.id);
            self.reset_interaction();
        }
        Some(step)
    }

    /// Apply a finished backend delete.
    pub fn finish_delete_slide<B: SlideBackend>(
        &mut self,
        sync: &BackendSync<B>,
        outcome: DeleteOutcome,
    ) -> DeleteApplied {
        let slide_id = outcome.slide_id.clone();
        let applied = sync.apply_delete(&mut self.store, outcome);
        match &applied {
            DeleteApplied::Removed(_) => {
                self.histories.remove(&slide_id);
                self.reset_interaction();
            }
            DeleteApplied::Failed(message) => self.notices.push(Notice::SyncFailed {
                slide_id,
                message: message.clone(),
            }),
            DeleteApplied::Stale => {}
        }
        applied
    }

    /// Move slide `from` to `to` and prepare the backend order update.
    pub fn reorder_slides<B: SlideBackend>(
        &mut self,
        sync: &BackendSync<B>,
        from: usize,
        to: usize,
    ) -> Option<OrderUpdate> {
        let update = sync.reorder(&mut self.store, from, to)?;
        self.reset_interaction();
        Some(update)
    }
}
