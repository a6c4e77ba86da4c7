//! Toolbar adjustments of the selected lines.

use crate::canvas::{Canvas, Notice, Setting};
use crate::config::Clamped;
use crate::model::{Line, TextAlign};

/// Result of a toolbar adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Nothing selected, not in an edit mode, or nothing to change.
    Skipped,
    /// Applied as requested.
    Applied(f64),
    /// Applied after clamping; a [`Notice::Clamped`] was queued.
    Clamped(Clamped),
}

impl Canvas {
    fn can_adjust(&self) -> bool {
        self.edit_mode().allows_editing() && !self.selection.is_empty()
    }

    fn first_selected(&self) -> Option<&Line> {
        let lines = &self.store.current().lines;
        lines.iter().find(|line| self.selection.contains(&line.id))
    }

    /// Font size shown for the selection (first selected line).
    pub fn selected_font_size(&self) -> Option<f64> {
        self.first_selected().map(|line| line.font_size)
    }

    /// Spacing shown for the selection's stanza: the rounded average of
    /// the group's line spacings.
    pub fn selected_line_spacing(&self) -> Option<f64> {
        let stanza_id = self.first_selected()?.stanza_id.as_deref()?;
        let lines = &self.store.current().lines;
        let spacings: Vec<f64> = lines
            .iter()
            .filter(|line| line.in_group(stanza_id))
            .map(|line| line.line_spacing)
            .collect();
        if spacings.is_empty() {
            return None;
        }
        Some((spacings.iter().sum::<f64>() / spacings.len() as f64).round())
    }

    fn notify_clamped(&mut self, setting: Setting, clamped: Clamped) -> Adjustment {
        if !clamped.was_clamped() {
            return Adjustment::Applied(clamped.applied);
        }
        let bounds = match setting {
            Setting::FontSize => self.config.font_size_bounds,
            Setting::LineSpacing => self.config.line_spacing_bounds,
        };
        self.notices.push(Notice::Clamped {
            setting,
            bounds,
            requested: clamped.requested,
            applied: clamped.applied,
        });
        Adjustment::Clamped(clamped)
    }

    /// Grow or shrink every selected line by the configured step.
    ///
    /// Each line is clamped on its own; a notice is queued if any was.
    pub fn step_font_size(&mut self, increase: bool) -> Adjustment {
        if !self.can_adjust() {
            return Adjustment::Skipped;
        }
        let step = if increase {
            self.config.font_size_step
        } else {
            -self.config.font_size_step
        };
        let bounds = self.config.font_size_bounds;

        let mut lines = self.store.current().lines.clone();
        let mut first_clamp = None;
        let mut last_applied = None;
        for line in lines.iter_mut().filter(|line| self.selection.contains(&line.id)) {
            let clamped = bounds.clamp(line.font_size + step);
            if clamped.was_clamped() && first_clamp.is_none() {
                first_clamp = Some(clamped);
            }
            line.font_size = clamped.applied;
            last_applied = Some(clamped);
        }
        self.commit_lines(lines);

        match (first_clamp, last_applied) {
            (Some(clamped), _) => self.notify_clamped(Setting::FontSize, clamped),
            (None, Some(applied)) => Adjustment::Applied(applied.applied),
            (None, None) => Adjustment::Skipped,
        }
    }

    /// Set every selected line to `requested`, clamped to the bounds.
    pub fn set_font_size(&mut self, requested: f64) -> Adjustment {
        if !self.can_adjust() || !requested.is_finite() {
            return Adjustment::Skipped;
        }
        let clamped = self.config.font_size_bounds.clamp(requested);

        let mut lines = self.store.current().lines.clone();
        for line in lines.iter_mut().filter(|line| self.selection.contains(&line.id)) {
            line.font_size = clamped.applied;
        }
        self.commit_lines(lines);
        self.notify_clamped(Setting::FontSize, clamped)
    }

    /// Change the selected stanza's spacing by one configured step.
    pub fn step_line_spacing(&mut self, increase: bool) -> Adjustment {
        let Some(current) = self.selected_line_spacing() else {
            return Adjustment::Skipped;
        };
        let step = self.config.line_spacing_step;
        self.set_line_spacing(if increase { current + step } else { current - step })
    }

    /// Set the selected stanza's spacing, clamped to the bounds.
    ///
    /// The group is restacked downward from its topmost line, keeping the
    /// vertical order of its lines.
    pub fn set_line_spacing(&mut self, requested: f64) -> Adjustment {
        if !self.can_adjust() || !requested.is_finite() {
            return Adjustment::Skipped;
        }
        let Some(stanza_id) = self.first_selected().and_then(|line| line.stanza_id.clone()) else {
            return Adjustment::Skipped;
        };
        let clamped = self.config.line_spacing_bounds.clamp(requested);
        let spacing = clamped.applied;

        let mut lines = self.store.current().lines.clone();
        let mut order: Vec<(String, f64)> = lines
            .iter()
            .filter(|line| line.in_group(&stanza_id))
            .map(|line| (line.id.clone(), line.y))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));
        let Some(top) = order.first().map(|(_, y)| *y) else {
            return Adjustment::Skipped;
        };

        for line in lines.iter_mut().filter(|line| line.in_group(&stanza_id)) {
            if let Some(rank) = order.iter().position(|(id, _)| *id == line.id) {
                line.y = top + rank as f64 * spacing;
                line.line_spacing = spacing;
            }
        }
        self.commit_lines(lines);
        self.notify_clamped(Setting::LineSpacing, clamped)
    }

    /// Align every selected line.
    pub fn align_selected(&mut self, align: TextAlign) -> bool {
        if !self.can_adjust() {
            return false;
        }
        let mut lines = self.store.current().lines.clone();
        for line in lines.iter_mut().filter(|line| self.selection.contains(&line.id)) {
            line.text_align = align;
        }
        self.commit_lines(lines);
        true
    }

    /// Delete the selected lines. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        if !self.can_adjust() {
            return 0;
        }
        let before = self.store.current().lines.len();
        let lines: Vec<Line> = self
            .store
            .current()
            .lines
            .iter()
            .filter(|line| !self.selection.contains(&line.id))
            .cloned()
            .collect();
        let removed = before - lines.len();
        self.selection.clear();
        if removed > 0 {
            self.commit_lines_with_undo(lines);
        }
        removed
    }

    /// Delete every line of the group `line_id` belongs to (or just the
    /// line when it is ungrouped).
    pub fn delete_group_of(&mut self, line_id: &str) -> usize {
        if !self.edit_mode().allows_editing() {
            return 0;
        }
        let slide = self.store.current();
        let Some(target) = slide.line(line_id) else {
            return 0;
        };
        let doomed: Vec<String> = match self.groups.group_of(target) {
            Some(members) => members.to_vec(),
            None => vec![target.id.clone()],
        };
        let lines: Vec<Line> = slide
            .lines
            .iter()
            .filter(|line| !doomed.contains(&line.id))
            .cloned()
            .collect();

        self.selection.retain(|id| !doomed.contains(id));
        self.commit_lines_with_undo(lines);
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::ApproximateMeasure;
    use crate::model::EditMode;
    use kurbo::Point;
    use std::sync::Arc;

    fn stanza_canvas(spacing: f64) -> Canvas {
        let mut canvas = Canvas::default().with_measure(Arc::new(ApproximateMeasure));
        canvas.enter_edit_mode(EditMode::Stanza);
        let payload = r#"{"type":"stanza","lines":["one","two","three"]}"#;
        canvas.handle_drop(payload, Point::new(480.0, 100.0));
        assert_eq!(canvas.set_font_size(40.0), Adjustment::Applied(40.0));
        assert_eq!(canvas.set_line_spacing(spacing), Adjustment::Applied(spacing));
        canvas.drain_captures();
        canvas.take_notices();
        canvas
    }

    #[test]
    fn test_step_font_size() {
        let mut canvas = stanza_canvas(48.0);
        assert_eq!(canvas.step_font_size(true), Adjustment::Applied(42.0));
        assert!(canvas.current_slide().lines.iter().all(|line| line.font_size == 42.0));
        assert_eq!(canvas.drain_captures().len(), 1);
        assert!(canvas.take_notices().is_empty());
    }

    #[test]
    fn test_manual_font_size_is_clamped_with_notice() {
        let mut canvas = stanza_canvas(48.0);
        let adjustment = canvas.set_font_size(90.0);
        assert!(matches!(adjustment, Adjustment::Clamped(c) if c.applied == 70.0));
        assert_eq!(canvas.selected_font_size(), Some(70.0));

        let notices = canvas.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices[0].to_string(),
            "Font size must be between 25px and 70px. It has been set to 70px."
        );
    }

    #[test]
    fn test_spacing_restacks_from_top_line() {
        let mut canvas = stanza_canvas(48.0);
        assert_eq!(canvas.selected_line_spacing(), Some(48.0));
        assert_eq!(canvas.step_line_spacing(true), Adjustment::Applied(53.0));

        let ys: Vec<f64> = canvas.current_slide().lines.iter().map(|line| line.y).collect();
        assert_eq!(ys, vec![100.0, 153.0, 206.0]);
        assert_eq!(canvas.selected_line_spacing(), Some(53.0));
    }

    #[test]
    fn test_spacing_clamped_low() {
        let mut canvas = stanza_canvas(3.0);
        let adjustment = canvas.step_line_spacing(false);
        assert!(matches!(adjustment, Adjustment::Clamped(c) if c.applied == 1.0 && c.requested == -2.0));
        let ys: Vec<f64> = canvas.current_slide().lines.iter().map(|line| line.y).collect();
        assert_eq!(ys, vec![100.0, 101.0, 102.0]);
        assert_eq!(canvas.take_notices().len(), 1);
    }

    #[test]
    fn test_spacing_needs_stanza() {
        let mut canvas = Canvas::default().with_measure(Arc::new(ApproximateMeasure));
        canvas.enter_edit_mode(EditMode::Line);
        canvas.handle_drop(r#"{"type":"line","text":"solo"}"#, Point::new(10.0, 10.0));
        assert_eq!(canvas.set_line_spacing(40.0), Adjustment::Skipped);
    }

    #[test]
    fn test_adjustments_need_edit_mode() {
        let mut canvas = stanza_canvas(48.0);
        canvas.save_current();
        assert_eq!(canvas.step_font_size(true), Adjustment::Skipped);
        assert!(!canvas.align_selected(TextAlign::Left));
        assert_eq!(canvas.delete_selected(), 0);
    }

    #[test]
    fn test_align_and_delete_selected() {
        let mut canvas = stanza_canvas(48.0);
        assert!(canvas.align_selected(TextAlign::Right));
        assert!(canvas.current_slide().lines.iter().all(|line| line.text_align == TextAlign::Right));

        assert_eq!(canvas.delete_selected(), 3);
        assert!(canvas.current_slide().lines.is_empty());
        assert!(canvas.selection().is_empty());
        assert!(canvas.undo());
        assert_eq!(canvas.current_slide().lines.len(), 3);
    }

    #[test]
    fn test_delete_group_of() {
        let mut canvas = stanza_canvas(48.0);
        canvas.enter_edit_mode(EditMode::Line);
        canvas.handle_drop(r#"{"type":"line","text":"solo"}"#, Point::new(10.0, 10.0));
        let grouped = canvas.current_slide().lines[0].id.clone();

        assert_eq!(canvas.delete_group_of(&grouped), 3);
        assert_eq!(canvas.current_slide().lines.len(), 1);
        assert!(canvas.groups().is_empty());
    }
}
