//! Bilingual verse layout.
//!
//! Lays out numbered verse pairs (a primary-language line and its
//! secondary-language counterpart), one slide per verse, as a vertically
//! centered stanza.

use crate::model::{CANVAS_HEIGHT, CANVAS_WIDTH, Line, new_stanza_id};
use kurbo::Point;
use serde::{Deserialize, Serialize};

const PRIMARY_WRAP: usize = 38;
const SECONDARY_WRAP: usize = 45;
const START_FONT_SIZE: f64 = 42.0;
const MIN_FONT_SIZE: f64 = 24.0;
const FONT_STEP: f64 = 2.0;
/// Gap added to the font size to get the distance between lines.
const LINE_GAP: f64 = 20.0;
/// Vertical space the block may use.
const MAX_CONTENT_HEIGHT: f64 = 440.0;

/// One numbered verse in two languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub verse: u32,
    #[serde(alias = "telugu")]
    pub primary: String,
    #[serde(alias = "english")]
    pub secondary: String,
}

/// Greedy word wrap by character count.
///
/// A single word longer than `max_chars` gets a line of its own. Never
/// produces empty lines.
pub fn wrap_text_into_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn block_height(line_count: usize, font_size: f64) -> f64 {
    line_count as f64 * (font_size + LINE_GAP)
}

/// Largest size, stepping down from 42 to 24, at which `line_count` lines
/// fit the content height.
fn verse_font_size(line_count: usize) -> f64 {
    let mut size = START_FONT_SIZE;
    while size > MIN_FONT_SIZE && block_height(line_count, size) > MAX_CONTENT_HEIGHT {
        size -= FONT_STEP;
    }
    size
}

/// Lines for one verse slide.
pub fn layout_verse(verse: &Verse) -> Vec<Line> {
    let mut texts = wrap_text_into_lines(&format!("{}. {}", verse.verse, verse.primary), PRIMARY_WRAP);
    texts.extend(wrap_text_into_lines(
        &format!("{}. {}", verse.verse, verse.secondary),
        SECONDARY_WRAP,
    ));

    let font_size = verse_font_size(texts.len());
    let step = font_size + LINE_GAP;
    let start_y = (CANVAS_HEIGHT - block_height(texts.len(), font_size)) / 2.0;
    let stanza_id = new_stanza_id();

    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let position = Point::new(CANVAS_WIDTH / 2.0, start_y + i as f64 * step);
            Line::new(text, position, font_size)
                .with_line_spacing(step)
                .with_stanza(stanza_id.clone())
        })
        .collect()
}

/// One batch of lines per verse, ready for a batch slide add.
pub fn layout_verses(verses: &[Verse]) -> Vec<Vec<Line>> {
    verses.iter().map(layout_verse).collect()
}
