//! Parley-backed text measurement.

use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::Blob;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use versedeck_core::TextMeasure;

/// Errors while loading fonts.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("Failed to read font {path}: {message}")]
    Io { path: String, message: String },
    #[error("No font faces found in {0}")]
    NoFaces(String),
}

struct Contexts {
    font_cx: FontContext,
    layout_cx: LayoutContext<()>,
}

/// Measures single-line text widths with real shaping.
///
/// Fonts registered here are used in addition to whatever the system
/// provides. Layout contexts are reused across calls behind a mutex so the
/// measure can be installed as the process-wide backend.
pub struct ParleyMeasure {
    inner: Mutex<Contexts>,
}

impl ParleyMeasure {
    /// Create a measure with only system fonts.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Contexts {
                font_cx: FontContext::new(),
                layout_cx: LayoutContext::new(),
            }),
        }
    }

    /// Register an in-memory font. Returns the number of families added.
    pub fn register_font_data(&self, data: Vec<u8>) -> usize {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let families = inner.font_cx.collection.register_fonts(Blob::new(Arc::new(data)), None);
        families.len()
    }

    /// Register a font file from disk.
    pub fn register_font_file(&self, path: &Path) -> Result<usize, MeasureError> {
        let data = std::fs::read(path).map_err(|e| MeasureError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let families = self.register_font_data(data);
        if families == 0 {
            return Err(MeasureError::NoFaces(path.display().to_string()));
        }
        log::info!("Registered {} font families from {}", families, path.display());
        Ok(families)
    }
}

impl Default for ParleyMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for ParleyMeasure {
    fn measure_width(&self, text: &str, font_size: f64, font_family: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Contexts { font_cx, layout_cx } = &mut *inner;

        let mut builder = layout_cx.ranged_builder(font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Single(
            parley::FontFamily::Named(font_family.into()),
        )));
        let mut layout = builder.build(text);

        // No max width: the whole text stays on one line
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout.width() as f64
    }
}
