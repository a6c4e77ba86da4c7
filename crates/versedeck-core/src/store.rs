//! Ordered slide collection.

use crate::model::{EditMode, Line, Slide, SlideId, SyncState};

/// The authoritative in-memory slide sequence.
///
/// Order is presentation order. The store never becomes empty: removing the
/// last slide replaces it with a blank one.
#[derive(Debug, Clone)]
pub struct SlideStore {
    slides: Vec<Slide>,
    current: usize,
    /// Bumped on every committed mutation.
    revision: u64,
}

impl Default for SlideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideStore {
    /// Create a store holding one blank slide.
    pub fn new() -> Self {
        Self {
            slides: vec![Slide::blank()],
            current: 0,
            revision: 0,
        }
    }

    /// Create a store from existing slides. An empty list yields one blank
    /// slide; `current` is clamped into range.
    pub fn from_slides(slides: Vec<Slide>, current: usize) -> Self {
        let mut store = Self::new();
        store.restore(slides, current);
        store
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Slide {
        &self.slides[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Position of the slide with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|slide| slide.id == id)
    }

    pub fn slide_by_id(&self, id: &str) -> Option<&Slide> {
        self.slides.iter().find(|slide| slide.id == id)
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Append a slide holding `initial_lines` and make it current.
    /// Returns its index.
    pub fn add_slide(&mut self, initial_lines: Vec<Line>) -> usize {
        self.slides.push(Slide::new(initial_lines));
        self.current = self.slides.len() - 1;
        self.bump();
        self.current
    }

    /// Append one slide per batch in a single update.
    ///
    /// The first new slide becomes current. Returns the index range of the
    /// added slides.
    pub fn add_multiple_slides(&mut self, batches: Vec<Vec<Line>>) -> std::ops::Range<usize> {
        let start = self.slides.len();
        if batches.is_empty() {
            return start..start;
        }
        self.slides.extend(batches.into_iter().map(Slide::new));
        self.current = start;
        self.bump();
        start..self.slides.len()
    }

    /// Append a deep copy of slide `index` with fresh slide and line ids,
    /// and make it current. Returns the copy's index.
    pub fn duplicate_slide(&mut self, index: usize) -> Option<usize> {
        let copy = self.slides.get(index)?.duplicate();
        self.slides.push(copy);
        self.current = self.slides.len() - 1;
        self.bump();
        Some(self.current)
    }

    /// Remove slide `index`. An emptied store gets a blank slide.
    pub fn delete_slide(&mut self, index: usize) -> Option<Slide> {
        if index >= self.slides.len() {
            return None;
        }
        let removed = self.slides.remove(index);

        if self.slides.is_empty() {
            self.slides.push(Slide::blank());
            self.current = 0;
        } else if self.current >= self.slides.len() {
            self.current = self.slides.len() - 1;
        }

        self.bump();
        Some(removed)
    }

    /// Move slide `from` to position `to`. The moved slide becomes current.
    pub fn reorder_slides(&mut self, from: usize, to: usize) -> bool {
        if from >= self.slides.len() || to >= self.slides.len() {
            return false;
        }
        let moved = self.slides.remove(from);
        self.slides.insert(to, moved);
        self.current = to;
        self.bump();
        true
    }

    /// Replace the lines of slide `index` and mark it unsaved.
    ///
    /// The slide drops back to [`SyncState::Draft`] unless a sync is in
    /// flight; the in-flight completion decides the final state.
    pub fn set_slide_lines(&mut self, index: usize, lines: Vec<Line>) -> bool {
        let Some(slide) = self.slides.get_mut(index) else {
            return false;
        };
        slide.lines = lines;
        slide.unsaved = true;
        if slide.sync.state != SyncState::Syncing {
            slide.sync.state = SyncState::Draft;
        }
        self.bump();
        true
    }

    pub fn set_edit_mode(&mut self, index: usize, mode: EditMode) -> bool {
        let Some(slide) = self.slides.get_mut(index) else {
            return false;
        };
        slide.edit_mode = mode;
        true
    }

    /// Clear the unsaved flag and return the slide to view mode.
    pub fn mark_slide_saved(&mut self, index: usize) -> bool {
        let Some(slide) = self.slides.get_mut(index) else {
            return false;
        };
        slide.unsaved = false;
        slide.edit_mode = EditMode::View;
        true
    }

    /// Record that the backend holds the slide's current lines.
    ///
    /// Once set, the slide stays backend-saved for the rest of its life.
    pub fn mark_slide_backend_saved(&mut self, index: usize) -> bool {
        let Some(slide) = self.slides.get_mut(index) else {
            return false;
        };
        slide.sync.last_synced = Some(slide.lines.clone());
        slide.sync.state = SyncState::Synced;
        true
    }

    pub(crate) fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub(crate) fn slide_by_id_mut(&mut self, id: &str) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|slide| slide.id == id)
    }

    /// Make slide `index` current.
    pub fn go_to_slide(&mut self, index: usize) -> bool {
        if index < self.slides.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Reset to a single blank slide.
    pub fn clear(&mut self) {
        self.slides = vec![Slide::blank()];
        self.current = 0;
        self.bump();
    }

    /// Replace all slides, e.g. after loading a session.
    pub fn restore(&mut self, slides: Vec<Slide>, current: usize) {
        if slides.is_empty() {
            self.slides = vec![Slide::blank()];
            self.current = 0;
        } else {
            self.current = current.min(slides.len() - 1);
            self.slides = slides;
        }
        self.bump();
    }

    /// Ids in presentation order.
    pub fn slide_ids(&self) -> Vec<SlideId> {
        self.slides.iter().map(|slide| slide.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn line(text: &str) -> Line {
        Line::new(text, Point::new(480.0, 270.0), 40.0)
    }

    #[test]
    fn test_new_store_has_one_blank_slide() {
        let store = SlideStore::new();
        assert_eq!(store.len(), 1);
        assert!(store.current().lines.is_empty());
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn test_add_slide_becomes_current() {
        let mut store = SlideStore::new();
        let index = store.add_slide(vec![line("a")]);
        assert_eq!(index, 1);
        assert_eq!(store.current_index(), 1);
        let slide = store.current();
        assert!(!slide.unsaved);
        assert!(!slide.is_saved_to_backend());
    }

    #[test]
    fn test_add_multiple_slides_is_one_update() {
        let mut store = SlideStore::new();
        let revision = store.revision();
        let range = store.add_multiple_slides(vec![vec![line("a")], vec![line("b")], vec![line("c")]]);

        assert_eq!(range, 1..4);
        assert_eq!(store.len(), 4);
        assert_eq!(store.revision(), revision + 1);
        assert_eq!(store.current_index(), 1);
        assert_eq!(store.get(3).unwrap().lines[0].text, "c");
    }

    #[test]
    fn test_add_multiple_slides_empty_is_noop() {
        let mut store = SlideStore::new();
        let revision = store.revision();
        assert!(store.add_multiple_slides(Vec::new()).is_empty());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_duplicate_slide() {
        let mut store = SlideStore::new();
        let grouped = vec![line("a").with_stanza("s1"), line("b").with_stanza("s1")];
        store.set_slide_lines(0, grouped);
        store.mark_slide_backend_saved(0);

        let index = store.duplicate_slide(0).unwrap();
        let source = store.get(0).unwrap().clone();
        let copy = store.get(index).unwrap();

        assert_ne!(copy.id, source.id);
        assert!(!copy.unsaved);
        assert!(!copy.is_saved_to_backend());
        assert_eq!(store.current_index(), index);
        for (a, b) in source.lines.iter().zip(&copy.lines) {
            assert_ne!(a.id, b.id);
            assert_eq!((a.x, a.y, a.font_size, &a.text), (b.x, b.y, b.font_size, &b.text));
            assert_eq!(a.stanza_id, b.stanza_id);
        }
    }

    #[test]
    fn test_delete_only_slide_creates_blank() {
        let mut store = SlideStore::new();
        let old_id = store.current().id.clone();
        store.delete_slide(0).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.current_index(), 0);
        assert_ne!(store.current().id, old_id);
        assert!(store.current().lines.is_empty());
    }

    #[test]
    fn test_delete_clamps_current() {
        let mut store = SlideStore::new();
        store.add_slide(vec![]);
        store.add_slide(vec![]);
        assert_eq!(store.current_index(), 2);

        store.delete_slide(2);
        assert_eq!(store.current_index(), 1);
        assert!(store.delete_slide(5).is_none());
    }

    #[test]
    fn test_reorder_follows_moved_slide() {
        let mut store = SlideStore::new();
        store.add_slide(vec![line("b")]);
        store.add_slide(vec![line("c")]);
        let moved = store.get(0).unwrap().id.clone();

        assert!(store.reorder_slides(0, 2));
        assert_eq!(store.get(2).unwrap().id, moved);
        assert_eq!(store.current_index(), 2);
        assert!(!store.reorder_slides(0, 3));
    }

    #[test]
    fn test_set_lines_marks_unsaved_and_save_clears() {
        let mut store = SlideStore::new();
        store.set_edit_mode(0, EditMode::Stanza);
        store.set_slide_lines(0, vec![line("a")]);
        assert!(store.current().unsaved);

        store.mark_slide_saved(0);
        assert!(!store.current().unsaved);
        assert_eq!(store.current().edit_mode, EditMode::View);
    }

    #[test]
    fn test_backend_saved_is_one_way() {
        let mut store = SlideStore::new();
        store.mark_slide_backend_saved(0);
        store.mark_slide_backend_saved(0);
        assert_eq!(store.current().sync.state, SyncState::Synced);

        store.set_slide_lines(0, vec![line("a")]);
        assert!(store.current().is_saved_to_backend());
        assert_eq!(store.current().sync.state, SyncState::Draft);
    }

    #[test]
    fn test_restore_clamps_index() {
        let mut store = SlideStore::new();
        store.restore(vec![Slide::blank(), Slide::blank()], 7);
        assert_eq!(store.current_index(), 1);

        store.restore(Vec::new(), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_index(), 0);
    }
}
