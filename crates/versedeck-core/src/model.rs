//! Slide and line data model.
//!
//! A [`Slide`] is one 960×540 composition holding positioned text [`Line`]s.
//! Lines that share a `stanza_id` form a group that is moved, resized and
//! spaced together. Membership is derived from the shared id, never stored
//! as an ownership edge.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Logical canvas width in pixels (16:9 export target).
pub const CANVAS_WIDTH: f64 = 960.0;
/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 540.0;
/// Default ratio between line spacing and font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Identifier of a line.
pub type LineId = String;
/// Identifier of a slide. Also used as the backend `randomId`.
pub type SlideId = String;
/// Identifier shared by every line of a stanza group.
pub type StanzaId = String;

/// Generate a fresh line id.
pub fn new_line_id() -> LineId {
    format!("line-{}", Uuid::new_v4().simple())
}

/// Generate a fresh slide id.
pub fn new_slide_id() -> SlideId {
    format!("slide-{}", Uuid::new_v4().simple())
}

/// Generate a fresh stanza group id.
pub fn new_stanza_id() -> StanzaId {
    format!("stanza-{}", Uuid::new_v4().simple())
}

/// Horizontal text alignment of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// One piece of positioned, styled text on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(default = "new_line_id")]
    pub id: LineId,
    pub text: String,
    /// Horizontal center anchor.
    pub x: f64,
    /// Vertical center anchor.
    pub y: f64,
    pub font_size: f64,
    /// Distance between consecutive lines of the same group.
    #[serde(default)]
    pub line_spacing: f64,
    #[serde(default)]
    pub stanza_id: Option<StanzaId>,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl Line {
    /// Create an ungrouped, centered line anchored at `center`.
    pub fn new(text: impl Into<String>, center: Point, font_size: f64) -> Self {
        Self {
            id: new_line_id(),
            text: text.into(),
            x: center.x,
            y: center.y,
            font_size,
            line_spacing: font_size * LINE_HEIGHT_FACTOR,
            stanza_id: None,
            text_align: TextAlign::default(),
        }
    }

    /// Attach the line to a stanza group.
    pub fn with_stanza(mut self, stanza_id: impl Into<StanzaId>) -> Self {
        self.stanza_id = Some(stanza_id.into());
        self
    }

    /// Override the line spacing.
    pub fn with_line_spacing(mut self, spacing: f64) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Center anchor as a point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the center anchor to `position`.
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Move the line by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Whether the line belongs to a stanza group.
    pub fn is_grouped(&self) -> bool {
        self.stanza_id.is_some()
    }

    /// Whether the line belongs to the group `stanza_id`.
    pub fn in_group(&self, stanza_id: &str) -> bool {
        self.stanza_id.as_deref() == Some(stanza_id)
    }

    /// Copy of this line under a new id. Group membership is kept verbatim.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_line_id(),
            ..self.clone()
        }
    }

    /// Fill in values that older session files leave out.
    pub(crate) fn normalize(&mut self) {
        if self.line_spacing <= 0.0 {
            self.line_spacing = self.font_size * LINE_HEIGHT_FACTOR;
        }
    }
}

/// Per-slide edit mode.
///
/// Geometry may only change in [`EditMode::Line`] or [`EditMode::Stanza`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    View,
    /// Clicks select single lines.
    Line,
    /// Clicks select whole stanza groups.
    Stanza,
}

impl EditMode {
    /// Whether lines may be added, moved or edited in this mode.
    pub fn allows_editing(self) -> bool {
        matches!(self, EditMode::Line | EditMode::Stanza)
    }
}

/// Older sessions store `editMode: null` for view mode.
fn deserialize_edit_mode<'de, D>(deserializer: D) -> Result<EditMode, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EditMode>::deserialize(deserializer)?.unwrap_or_default())
}

/// Backend synchronization state of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Local changes not yet accepted by the backend.
    #[default]
    Draft,
    /// A create or update is in flight.
    Syncing,
    /// The backend holds the slide's last saved state.
    Synced,
    /// The last sync attempt failed.
    Error,
}

/// Sync bookkeeping for one slide.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSync {
    #[serde(default)]
    pub state: SyncState,
    /// Lines as last accepted by the backend. `Some` once the slide has
    /// been created remotely and never cleared afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<Vec<Line>>,
}

impl SlideSync {
    /// Whether the backend has a record of this slide.
    pub fn is_on_backend(&self) -> bool {
        self.last_synced.is_some()
    }
}

/// One canvas-sized composition unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    pub lines: Vec<Line>,
    #[serde(default, deserialize_with = "deserialize_edit_mode")]
    pub edit_mode: EditMode,
    /// Set by any geometry or text change, cleared by an explicit save.
    #[serde(default)]
    pub unsaved: bool,
    #[serde(default)]
    pub sync: SlideSync,
}

impl Default for Slide {
    fn default() -> Self {
        Self::blank()
    }
}

impl Slide {
    /// Create a slide holding `lines`.
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            id: new_slide_id(),
            lines,
            edit_mode: EditMode::View,
            unsaved: false,
            sync: SlideSync::default(),
        }
    }

    /// Create an empty slide.
    pub fn blank() -> Self {
        Self::new(Vec::new())
    }

    /// Whether the slide has been created on the backend.
    pub fn is_saved_to_backend(&self) -> bool {
        self.sync.is_on_backend()
    }

    /// Get a line by id.
    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Get a mutable line by id.
    pub fn line_mut(&mut self, id: &str) -> Option<&mut Line> {
        self.lines.iter_mut().find(|line| line.id == id)
    }

    /// Deep copy with a new slide id and new line ids.
    ///
    /// Stanza ids are preserved, so the copied lines group with each other
    /// and never with the source slide's lines.
    pub fn duplicate(&self) -> Self {
        Self::new(self.lines.iter().map(Line::duplicate).collect())
    }

    pub(crate) fn normalize(&mut self) {
        for line in &mut self.lines {
            line.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_defaults() {
        let line = Line::new("Amazing Grace", Point::new(480.0, 270.0), 40.0);
        assert!(!line.is_grouped());
        assert_eq!(line.text_align, TextAlign::Center);
        assert!((line.line_spacing - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_duplicate_keeps_group() {
        let line = Line::new("a", Point::ZERO, 30.0).with_stanza("stanza-1");
        let copy = line.duplicate();
        assert_ne!(copy.id, line.id);
        assert_eq!(copy.stanza_id, line.stanza_id);
        assert_eq!(copy.position(), line.position());
    }

    #[test]
    fn test_slide_json_field_names() {
        let mut slide = Slide::new(vec![Line::new("x", Point::new(1.0, 2.0), 30.0)]);
        slide.edit_mode = EditMode::Stanza;
        let json = serde_json::to_value(&slide).unwrap();
        assert_eq!(json["editMode"], "stanza");
        assert_eq!(json["lines"][0]["fontSize"], 30.0);
        assert_eq!(json["lines"][0]["textAlign"], "center");
        assert!(json["lines"][0]["stanzaId"].is_null());
    }

    #[test]
    fn test_null_edit_mode_is_view() {
        let json = r#"{"id":"s1","lines":[],"editMode":null}"#;
        let slide: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(slide.edit_mode, EditMode::View);
        assert_eq!(slide.sync.state, SyncState::Draft);
        assert!(!slide.is_saved_to_backend());
    }

    #[test]
    fn test_normalize_fills_spacing() {
        let json = r#"{"id":"s1","lines":[{"text":"a","x":1,"y":2,"fontSize":50}]}"#;
        let mut slide: Slide = serde_json::from_str(json).unwrap();
        slide.normalize();
        assert!((slide.lines[0].line_spacing - 60.0).abs() < 1e-9);
        assert!(!slide.lines[0].id.is_empty());
    }

    #[test]
    fn test_edit_mode_gate() {
        assert!(!EditMode::View.allows_editing());
        assert!(EditMode::Line.allows_editing());
        assert!(EditMode::Stanza.allows_editing());
    }
}
