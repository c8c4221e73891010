//! Line grouping and block assembly.
//!
//! Turns the interpreter's show operations into the structured text of a
//! page.  Every function here is a pure transformation; the content stream
//! itself is read through the [`PdfBackend`] trait.
//!
//! # Pipeline
//!
//! ```text
//! ShowText[]  ->  TextRun[]  ->  lines  ->  Block[]  ->  StructuredPage
//!              run_from_show  group_runs   group_lines
//! ```

use std::collections::HashMap;

use pdfedit_core::{Block, Rect, Span, StructuredPage, TextLine};

use super::backend::{PageFrame, PageId, PdfBackend};
use super::interpreter::{interpret_page, PageContent, ShowItem, ShowText};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two runs whose baselines differ by less than this are treated as
/// belonging to the same line.
const Y_TOLERANCE: f32 = 1.0;

/// Minimum gap (in points) between adjacent runs before we insert a space.
const MIN_WORD_GAP: f32 = 1.5;

/// When grouping lines into blocks, a vertical gap larger than this multiple
/// of the line's font size starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Runs whose sizes differ by less than this share a style.
const FONT_SIZE_BUCKET: f32 = 0.5;

/// Height of the glyph box above the baseline, as a fraction of the size.
const ASCENT_RATIO: f32 = 0.8;

/// Depth of the glyph box below the baseline, as a fraction of the size.
const DESCENT_RATIO: f32 = 0.2;

/// A `TJ` shift wider than this (thousandths of text space, about 30% of
/// an average glyph) reads as a word break.
const GAP_SPACE_THRESHOLD: f32 = 150.0;

// ---------------------------------------------------------------------------
// CJK / spaceless-script helper
// ---------------------------------------------------------------------------

/// Returns `true` if `c` belongs to a script that does not use inter-word
/// spaces (CJK Unified Ideographs, Hiragana, Katakana, Hangul, Thai, etc.).
pub fn is_spaceless_script_char(c: char) -> bool {
    let cp = c as u32;
    matches!(
        cp,
        // CJK Unified Ideographs
        0x4E00..=0x9FFF
        // CJK Unified Ideographs Extension A
        | 0x3400..=0x4DBF
        // CJK Unified Ideographs Extension B
        | 0x20000..=0x2A6DF
        // CJK Compatibility Ideographs
        | 0xF900..=0xFAFF
        // Hiragana and Katakana
        | 0x3040..=0x30FF
        // Katakana Phonetic Extensions
        | 0x31F0..=0x31FF
        // Hangul Syllables
        | 0xAC00..=0xD7AF
        // Hangul Jamo
        | 0x1100..=0x11FF
        // Hangul Compatibility Jamo
        | 0x3130..=0x318F
        // CJK Symbols and Punctuation
        | 0x3000..=0x303F
        // Fullwidth Forms
        | 0xFF00..=0xFFEF
        // Thai and Lao
        | 0x0E00..=0x0EFF
    )
}

// ---------------------------------------------------------------------------
// Text runs
// ---------------------------------------------------------------------------

/// The glyphs of one show operation, positioned in page space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x0: f32,
    pub x1: f32,
    pub baseline: f32,
    pub size: f32,
    pub font_name: String,
    pub color: u32,
}

impl TextRun {
    fn same_style(&self, other: &TextRun) -> bool {
        self.font_name == other.font_name
            && (self.size - other.size).abs() < FONT_SIZE_BUCKET
            && self.color == other.color
    }

    fn into_span(self) -> Span {
        Span {
            bbox: Rect::new(
                self.x0,
                self.baseline - ASCENT_RATIO * self.size,
                self.x1,
                self.baseline + DESCENT_RATIO * self.size,
            ),
            text: self.text,
            font: (!self.font_name.is_empty()).then_some(self.font_name),
            size: Some(self.size),
            color: Some(self.color),
        }
    }
}

/// Collapse a show operation into a [`TextRun`].
///
/// Large `TJ` shifts between glyphs become a single space.  Operations that
/// paint only whitespace (or nothing) yield `None`.
pub fn run_from_show(show: &ShowText) -> Option<TextRun> {
    let mut text = String::new();
    let mut x0 = f32::INFINITY;
    let mut x1 = f32::NEG_INFINITY;
    let mut baseline = None;
    let mut pending_space = false;

    for item in &show.items {
        match item {
            ShowItem::Glyph(glyph) => {
                if pending_space && !text.is_empty() && !text.ends_with(' ') && glyph.text != " "
                {
                    text.push(' ');
                }
                pending_space = false;
                text.push_str(&glyph.text);
                x0 = x0.min(glyph.x0.min(glyph.x1));
                x1 = x1.max(glyph.x0.max(glyph.x1));
                baseline.get_or_insert(glyph.baseline);
            }
            ShowItem::Adjust(adj) => {
                // Adjustments are in thousandths of text space; negative
                // values move the pen right.
                if -adj > GAP_SPACE_THRESHOLD {
                    pending_space = true;
                }
            }
        }
    }

    if text.trim().is_empty() {
        return None;
    }

    Some(TextRun {
        text,
        x0,
        x1,
        baseline: baseline?,
        size: show.size,
        font_name: show.font_name.clone(),
        color: show.color,
    })
}

// ---------------------------------------------------------------------------
// Run -> line grouping
// ---------------------------------------------------------------------------

/// Runs sharing a baseline, merged left to right.
#[derive(Debug, Clone)]
struct LineRuns {
    runs: Vec<TextRun>,
    baseline: f32,
    size: f32,
}

/// Group runs into lines, top of the page first.
///
/// Runs whose baselines are within [`Y_TOLERANCE`] points of each other are
/// placed on the same line.
fn group_runs_into_lines(mut runs: Vec<TextRun>) -> Vec<LineRuns> {
    if runs.is_empty() {
        return Vec::new();
    }

    // Page space grows downward, so ascending Y is top-to-bottom.
    runs.sort_by(|a, b| {
        a.baseline
            .partial_cmp(&b.baseline)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<LineRuns> = Vec::new();
    let mut current: Vec<TextRun> = vec![runs.remove(0)];
    let mut current_y = current[0].baseline;

    for run in runs {
        if (run.baseline - current_y).abs() <= Y_TOLERANCE {
            current.push(run);
        } else {
            lines.push(assemble_line(std::mem::take(&mut current)));
            current_y = run.baseline;
            current.push(run);
        }
    }

    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Build a line from runs known to share the same baseline.
///
/// Adjacent runs of the same style are merged into one; a space is added
/// across a word-sized gap unless both boundary characters are from a
/// spaceless script.
fn assemble_line(mut runs: Vec<TextRun>) -> LineRuns {
    runs.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal));

    let mut merged: Vec<TextRun> = Vec::with_capacity(runs.len());

    for run in runs {
        if let Some(prev) = merged.last_mut() {
            let gap = run.x0 - prev.x1;

            if prev.same_style(&run) && gap < MIN_WORD_GAP && gap > -prev.size {
                prev.text.push_str(&run.text);
                prev.x1 = prev.x1.max(run.x1);
                continue;
            }

            if prev.same_style(&run) && gap >= MIN_WORD_GAP && gap < prev.size * 2.0 {
                if !boundary_is_spaceless(prev, &run) && !prev.text.ends_with(' ') {
                    prev.text.push(' ');
                }
                prev.text.push_str(&run.text);
                prev.x1 = prev.x1.max(run.x1);
                continue;
            }
        }

        merged.push(run);
    }

    LineRuns {
        baseline: merged.first().map(|r| r.baseline).unwrap_or(0.0),
        size: dominant_size(&merged),
        runs: merged,
    }
}

/// Returns the size that covers the most characters in the runs.
fn dominant_size(runs: &[TextRun]) -> f32 {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for r in runs {
        let key = (r.size * 100.0).round() as i32;
        *counts.entry(key).or_insert(0) += r.text.chars().count();
    }
    counts
        .into_iter()
        .max_by_key(|(k, c)| (*c, *k))
        .map(|(k, _)| k as f32 / 100.0)
        .unwrap_or(0.0)
}

/// Check whether the boundary between two adjacent runs is between
/// spaceless-script characters (no space needed).
fn boundary_is_spaceless(prev: &TextRun, next: &TextRun) -> bool {
    let last_char = prev.text.chars().next_back();
    let first_char = next.text.chars().next();
    match (last_char, first_char) {
        (Some(l), Some(f)) => is_spaceless_script_char(l) && is_spaceless_script_char(f),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Line -> block grouping
// ---------------------------------------------------------------------------

/// Group consecutive lines into text blocks.
///
/// A new block starts when the baseline gap between consecutive lines
/// exceeds [`BLOCK_GAP_FACTOR`] times the previous line's size.
fn group_lines_into_blocks(lines: Vec<LineRuns>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();
    let mut prev: Option<(f32, f32)> = None;

    for line in lines {
        if let Some((prev_baseline, prev_size)) = prev {
            let gap = (line.baseline - prev_baseline).abs();
            if gap > prev_size * BLOCK_GAP_FACTOR && !current.is_empty() {
                blocks.push(Block::text(std::mem::take(&mut current)));
            }
        }
        prev = Some((line.baseline, line.size));

        let spans = line.runs.into_iter().map(TextRun::into_span).collect();
        current.push(TextLine::from_spans(spans));
    }

    if !current.is_empty() {
        blocks.push(Block::text(current));
    }

    blocks
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Assemble the structured text of one page from interpreted content.
///
/// Text blocks and image blocks are ordered top to bottom.
pub fn build_page(number: u32, frame: &PageFrame, content: &PageContent) -> StructuredPage {
    let runs: Vec<TextRun> = content.shows.iter().filter_map(run_from_show).collect();
    let mut blocks = group_lines_into_blocks(group_runs_into_lines(runs));

    blocks.extend(
        content
            .images
            .iter()
            .map(|image| Block::Image { bbox: image.bbox }),
    );
    blocks.sort_by(|a, b| {
        a.bbox()
            .y0
            .partial_cmp(&b.bbox().y0)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    StructuredPage {
        number,
        width: frame.width(),
        height: frame.height(),
        blocks,
    }
}

/// Interpret a page and return its structured text.
pub fn extract_structured_page(
    backend: &dyn PdfBackend,
    number: u32,
    page_id: PageId,
) -> Result<StructuredPage, PdfError> {
    let frame = backend.page_frame(page_id)?;
    let content = interpret_page(backend, page_id)?;
    Ok(build_page(number, &frame, &content))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
