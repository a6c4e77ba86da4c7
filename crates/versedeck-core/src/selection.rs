//! Selection rules and drag state.

use crate::group::GroupIndex;
use crate::model::{EditMode, Line, LineId};
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Lines selected by clicking `line_id` in `mode`.
///
/// In stanza mode a grouped line brings its whole group along. View mode
/// selects nothing.
pub fn selection_for_click(lines: &[Line], groups: &GroupIndex, line_id: &str, mode: EditMode) -> Vec<LineId> {
    let Some(line) = lines.iter().find(|line| line.id == line_id) else {
        return Vec::new();
    };
    match mode {
        EditMode::View => Vec::new(),
        EditMode::Line => vec![line.id.clone()],
        EditMode::Stanza => match groups.group_of(line) {
            Some(members) => members.to_vec(),
            None => vec![line.id.clone()],
        },
    }
}

/// State for moving the selection with the pointer.
///
/// Positions are always computed from the baseline captured at drag start,
/// never accumulated from move events.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Starting point of the drag.
    pub start_point: Point,
    /// Current point of the drag.
    pub current_point: Point,
    /// Line positions at drag start (line id -> position).
    pub initial_positions: HashMap<LineId, Point>,
    /// Whether any move happened since the drag started.
    pub moved: bool,
}

impl DragState {
    /// Snapshot the selected lines of `lines` at `start_point`.
    pub fn begin(start_point: Point, lines: &[Line], selection: &[LineId]) -> Self {
        let initial_positions = lines
            .iter()
            .filter(|line| selection.contains(&line.id))
            .map(|line| (line.id.clone(), line.position()))
            .collect();
        Self {
            start_point,
            current_point: start_point,
            initial_positions,
            moved: false,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Where line `id` sits for the current pointer position.
    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.initial_positions.get(id).map(|initial| *initial + self.delta())
    }

    /// Move every dragged line of `lines` to baseline + delta.
    pub fn apply(&self, lines: &mut [Line]) {
        for line in lines.iter_mut() {
            if let Some(position) = self.position_of(&line.id) {
                line.set_position(position);
            }
        }
    }

    /// Get the line IDs being moved.
    pub fn line_ids(&self) -> Vec<LineId> {
        self.initial_positions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Line> {
        vec![
            Line::new("a", Point::new(100.0, 100.0), 30.0).with_stanza("s1"),
            Line::new("b", Point::new(100.0, 136.0), 30.0).with_stanza("s1"),
            Line::new("c", Point::new(300.0, 300.0), 30.0),
        ]
    }

    #[test]
    fn test_click_selection_by_mode() {
        let lines = sample();
        let groups = GroupIndex::build(&lines);
        let (a, b, c) = (&lines[0].id, &lines[1].id, &lines[2].id);

        assert_eq!(selection_for_click(&lines, &groups, a, EditMode::Line), vec![a.clone()]);
        assert_eq!(
            selection_for_click(&lines, &groups, b, EditMode::Stanza),
            vec![a.clone(), b.clone()]
        );
        assert_eq!(selection_for_click(&lines, &groups, c, EditMode::Stanza), vec![c.clone()]);
        assert!(selection_for_click(&lines, &groups, a, EditMode::View).is_empty());
        assert!(selection_for_click(&lines, &groups, "missing", EditMode::Line).is_empty());
    }

    #[test]
    fn test_drag_uses_fixed_baseline() {
        let mut lines = sample();
        let selection = vec![lines[0].id.clone(), lines[1].id.clone()];
        let mut drag = DragState::begin(Point::new(10.0, 10.0), &lines, &selection);

        // Many small moves end where a single move would
        for step in 1..=7 {
            drag.current_point = Point::new(10.0 + step as f64 * 1.3, 10.0 - step as f64 * 0.7);
            drag.apply(&mut lines);
        }

        let delta = drag.delta();
        assert!((lines[0].x - (100.0 + delta.x)).abs() < 1e-9);
        assert!((lines[1].y - (136.0 + delta.y)).abs() < 1e-9);
        assert_eq!(lines[2].position(), Point::new(300.0, 300.0));
    }
}
