//! VerseDeck Render Library
//!
//! Text measurement backed by Parley, for use as the core fitter's
//! [`TextMeasure`](versedeck_core::TextMeasure).

mod measure;

pub use measure::{MeasureError, ParleyMeasure};
