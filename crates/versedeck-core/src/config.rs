//! Composer configuration.

use crate::fit::{DEFAULT_FONT_FAMILY, FitBounds};
use crate::model::{CANVAS_HEIGHT, CANVAS_WIDTH, LINE_HEIGHT_FACTOR};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range used for manual adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Result of clamping a requested value into [`Bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    pub requested: f64,
    pub applied: f64,
}

impl Clamped {
    /// Whether the requested value had to be changed.
    pub fn was_clamped(&self) -> bool {
        self.requested != self.applied
    }
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` to the nearest bound.
    pub fn clamp(&self, value: f64) -> Clamped {
        Clamped {
            requested: value,
            applied: value.max(self.min).min(self.max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Tunable parameters of the composition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Logical canvas size.
    pub canvas_size: Size,
    /// Share of the canvas usable for placement (5% padding each side).
    pub padding_factor: f64,
    /// Size range searched when auto-fitting dropped text.
    pub fit_bounds: FitBounds,
    /// Range allowed for manual font size changes.
    pub font_size_bounds: Bounds,
    /// Range allowed for manual stanza spacing changes.
    pub line_spacing_bounds: Bounds,
    pub font_size_step: f64,
    pub line_spacing_step: f64,
    pub nudge_step: f64,
    /// Nudge distance with Shift held.
    pub nudge_step_large: f64,
    pub line_height_factor: f64,
    pub font_family: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas_size: Size::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            padding_factor: 0.9,
            fit_bounds: FitBounds::default(),
            font_size_bounds: Bounds::new(25.0, 70.0),
            line_spacing_bounds: Bounds::new(1.0, 150.0),
            font_size_step: 2.0,
            line_spacing_step: 5.0,
            nudge_step: 5.0,
            nudge_step_large: 20.0,
            line_height_factor: LINE_HEIGHT_FACTOR,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl ComposerConfig {
    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
