//! Drop payloads and placement of dropped text.

use crate::config::ComposerConfig;
use crate::fit::{TextMeasure, fit_line_to_width, fit_stanza_font_size};
use crate::model::{Line, new_stanza_id};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Content carried by a drag-and-drop operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DropPayload {
    /// A single line of text.
    Line { text: String },
    /// A block of lines placed as one group.
    Stanza {
        lines: Vec<String>,
        #[serde(default, rename = "fontSize", skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        #[serde(default, rename = "lineSpacing", skip_serializing_if = "Option::is_none")]
        line_spacing: Option<f64>,
    },
}

impl DropPayload {
    /// Parse a drag-transfer string. Anything that is not one of our
    /// payloads yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::debug!("Ignoring drop payload: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn line(text: impl Into<String>) -> Self {
        DropPayload::Line { text: text.into() }
    }

    pub fn stanza<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        DropPayload::Stanza {
            lines: lines.into_iter().map(Into::into).collect(),
            font_size: None,
            line_spacing: None,
        }
    }
}

/// Space available to dropped text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementArea {
    pub max_width: f64,
    pub max_height: f64,
}

impl PlacementArea {
    /// Usable area of a canvas shown at `client_size`.
    pub fn from_client_size(client_size: Size, padding_factor: f64) -> Self {
        Self {
            max_width: client_size.width * padding_factor,
            max_height: client_size.height * padding_factor,
        }
    }
}

/// Build the lines a drop at `at` produces.
///
/// A line drop is fitted to the width on its own. A stanza is fitted once
/// as a block and stacked downward from `at`, all lines sharing a fresh
/// stanza id. Sizes carried by the payload are ignored. An empty stanza
/// produces nothing.
pub fn place_payload(
    payload: &DropPayload,
    at: Point,
    area: PlacementArea,
    measure: &dyn TextMeasure,
    config: &ComposerConfig,
) -> Vec<Line> {
    match payload {
        DropPayload::Line { text } => {
            let size = fit_line_to_width(
                measure,
                text,
                area.max_width,
                &config.font_family,
                config.fit_bounds,
            );
            let font_size = f64::from(size);
            vec![Line::new(text.clone(), at, font_size)
                .with_line_spacing(font_size * config.line_height_factor)]
        }
        DropPayload::Stanza { lines, .. } => {
            let Some(size) = fit_stanza_font_size(
                measure,
                lines,
                area.max_width,
                area.max_height,
                &config.font_family,
                config.fit_bounds,
                config.line_height_factor,
            ) else {
                return Vec::new();
            };
            let font_size = f64::from(size);
            let spacing = font_size * config.line_height_factor;
            let stanza_id = new_stanza_id();

            lines
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let position = Point::new(at.x, at.y + i as f64 * spacing);
                    Line::new(text.clone(), position, font_size)
                        .with_line_spacing(spacing)
                        .with_stanza(stanza_id.clone())
                })
                .collect()
        }
    }
}
