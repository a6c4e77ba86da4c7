//! Text fitting.
//!
//! Finds the largest integer font size at which text fits a pixel budget.
//! The search is a binary search over sizes, so every [`TextMeasure`]
//! backend must report widths that never decrease as the size grows.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Font family used when none is configured.
pub const DEFAULT_FONT_FAMILY: &str = "Anek Telugu";
/// Smallest size tried by auto-fit.
pub const DEFAULT_MIN_FONT_SIZE: u32 = 12;
/// Largest size tried by auto-fit.
pub const DEFAULT_MAX_FONT_SIZE: u32 = 200;
/// Share of the height budget a stanza block may occupy.
const STANZA_HEIGHT_SHARE: f64 = 0.9;

/// Measures rendered text width.
pub trait TextMeasure: Send + Sync {
    /// Width in pixels of `text` rendered on one line at `font_size`.
    fn measure_width(&self, text: &str, font_size: f64, font_family: &str) -> f64;
}

/// Character-class width estimate.
///
/// Always available, including in headless contexts with no fonts. Width is
/// linear in the font size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMeasure;

impl ApproximateMeasure {
    /// Average advance of `c` as a fraction of the font size.
    fn char_factor(c: char) -> f64 {
        match c {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'I' => 0.28,
            'f' | 't' | 'r' | '(' | ')' | '-' => 0.36,
            'm' | 'w' => 0.8,
            'M' | 'W' => 0.9,
            '0'..='9' => 0.55,
            c if c.is_ascii_uppercase() => 0.66,
            c if c.is_ascii() => 0.52,
            // Indic and other scripts run wider than Latin lowercase
            _ => 0.7,
        }
    }

    fn family_factor(font_family: &str) -> f64 {
        let family = font_family.to_ascii_lowercase();
        if family.contains("mono") {
            1.15
        } else if family.contains("serif") && !family.contains("sans") {
            1.05
        } else {
            1.0
        }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn measure_width(&self, text: &str, font_size: f64, font_family: &str) -> f64 {
        let em: f64 = text.chars().map(Self::char_factor).sum();
        em * font_size * Self::family_factor(font_family)
    }
}

static GLOBAL_MEASURE: OnceLock<Box<dyn TextMeasure>> = OnceLock::new();

/// Install the process-wide measurement backend.
///
/// Must run before the first call to [`global_measure`]; afterwards the
/// backend is fixed and the rejected one is handed back.
pub fn install_measure(measure: Box<dyn TextMeasure>) -> Result<(), Box<dyn TextMeasure>> {
    GLOBAL_MEASURE.set(measure)
}

/// The process-wide measurement backend, built on first use.
pub fn global_measure() -> &'static dyn TextMeasure {
    GLOBAL_MEASURE
        .get_or_init(|| {
            log::debug!("No text measure installed, using approximate widths");
            Box::new(ApproximateMeasure)
        })
        .as_ref()
}

/// Integer font size range searched by the fitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for FitBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_FONT_SIZE,
            max: DEFAULT_MAX_FONT_SIZE,
        }
    }
}

/// Largest size in `bounds` at which `text` is at most `max_width` wide.
///
/// Returns `bounds.min` when even the smallest size overflows.
pub fn fit_line_to_width(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: f64,
    font_family: &str,
    bounds: FitBounds,
) -> u32 {
    let mut lo = i64::from(bounds.min);
    let mut hi = i64::from(bounds.max);
    let mut best = bounds.min;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if measure.measure_width(text, mid as f64, font_family) <= max_width {
            best = mid as u32;
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }

    best
}

/// One font size that fits every line of a stanza.
///
/// The horizontal cap is the smallest per-line fit; the vertical cap keeps
/// `lines × size × line_height_factor` within 90% of `max_height`. Returns
/// `None` for an empty stanza.
pub fn fit_stanza_font_size<S: AsRef<str>>(
    measure: &dyn TextMeasure,
    lines: &[S],
    max_width: f64,
    max_height: f64,
    font_family: &str,
    bounds: FitBounds,
    line_height_factor: f64,
) -> Option<u32> {
    let horizontal = lines
        .iter()
        .map(|line| fit_line_to_width(measure, line.as_ref(), max_width, font_family, bounds))
        .min()?;

    let vertical = (max_height * STANZA_HEIGHT_SHARE) / (lines.len() as f64 * line_height_factor);
    let vertical = vertical.floor().max(0.0) as u32;

    Some(horizontal.min(vertical))
}

/// Check that `measure` never reports a smaller width for a larger size.
///
/// Returns the first size whose width dropped below the previous size's.
pub fn verify_monotonic(
    measure: &dyn TextMeasure,
    text: &str,
    font_family: &str,
    bounds: FitBounds,
) -> Result<(), u32> {
    let mut previous = f64::NEG_INFINITY;
    for size in bounds.min..=bounds.max {
        let width = measure.measure_width(text, f64::from(size), font_family);
        if width < previous {
            return Err(size);
        }
        previous = width;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is exactly half the font size wide.
    struct HalfEm;

    impl TextMeasure for HalfEm {
        fn measure_width(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
            text.chars().count() as f64 * font_size * 0.5
        }
    }

    fn fit(text: &str, width: f64) -> u32 {
        fit_line_to_width(&HalfEm, text, width, DEFAULT_FONT_FAMILY, FitBounds::default())
    }

    #[test]
    fn test_fit_is_largest_fitting_size() {
        // 10 chars at size s are 5s wide; 5s <= 300 gives s = 60
        assert_eq!(fit("0123456789", 300.0), 60);
        assert_eq!(fit("0123456789", 304.0), 60);
        assert_eq!(fit("0123456789", 305.0), 61);
    }

    #[test]
    fn test_fit_caps_at_max() {
        assert_eq!(fit("a", 10_000.0), DEFAULT_MAX_FONT_SIZE);
    }

    #[test]
    fn test_fit_degrades_to_min() {
        assert_eq!(fit("a very long line of text", 1.0), DEFAULT_MIN_FONT_SIZE);
    }

    #[test]
    fn test_fit_property_with_approximate_measure() {
        let measure = ApproximateMeasure;
        let bounds = FitBounds::default();
        for text in ["Amazing Grace", "How sweet the sound", "W", "స్తుతి ఆరాధన"] {
            for width in [200.0, 500.0, 864.0] {
                let size = fit_line_to_width(&measure, text, width, DEFAULT_FONT_FAMILY, bounds);
                let at = measure.measure_width(text, f64::from(size), DEFAULT_FONT_FAMILY);
                assert!(at <= width, "{text} at {size} is {at} > {width}");
                if size < bounds.max {
                    let next = measure.measure_width(text, f64::from(size + 1), DEFAULT_FONT_FAMILY);
                    assert!(next > width);
                }
            }
        }
    }

    #[test]
    fn test_stanza_respects_both_caps() {
        let lines = ["Amazing grace", "how sweet the sound", "that saved a wretch like me"];
        let size = fit_stanza_font_size(
            &HalfEm,
            &lines,
            864.0,
            486.0,
            DEFAULT_FONT_FAMILY,
            FitBounds::default(),
            1.2,
        )
        .unwrap();

        for line in lines {
            assert!(size <= fit(line, 864.0));
        }
        assert!(size <= ((486.0 * 0.9) / (3.0 * 1.2)) as u32);
    }

    #[test]
    fn test_stanza_vertical_cap_wins_for_tall_blocks() {
        let lines = vec!["a"; 20];
        let size = fit_stanza_font_size(
            &HalfEm,
            &lines,
            864.0,
            486.0,
            DEFAULT_FONT_FAMILY,
            FitBounds::default(),
            1.2,
        );
        // floor(437.4 / 24) = 18
        assert_eq!(size, Some(18));
    }

    #[test]
    fn test_stanza_empty_is_none() {
        let lines: [&str; 0] = [];
        let size = fit_stanza_font_size(
            &HalfEm,
            &lines,
            864.0,
            486.0,
            DEFAULT_FONT_FAMILY,
            FitBounds::default(),
            1.2,
        );
        assert_eq!(size, None);
    }

    #[test]
    fn test_approximate_measure_is_monotonic() {
        let bounds = FitBounds::default();
        assert!(verify_monotonic(&ApproximateMeasure, "Amazing Grace", "Anek Telugu", bounds).is_ok());
    }

    #[test]
    fn test_verify_monotonic_reports_drop() {
        struct Shrinks;
        impl TextMeasure for Shrinks {
            fn measure_width(&self, _text: &str, font_size: f64, _font_family: &str) -> f64 {
                if font_size > 20.0 { 1.0 } else { font_size }
            }
        }
        assert_eq!(
            verify_monotonic(&Shrinks, "x", DEFAULT_FONT_FAMILY, FitBounds { min: 12, max: 40 }),
            Err(21)
        );
    }

    #[test]
    fn test_global_measure_defaults_to_approximate() {
        let width = global_measure().measure_width("abc", 10.0, DEFAULT_FONT_FAMILY);
        assert!(width > 0.0);
    }
}
