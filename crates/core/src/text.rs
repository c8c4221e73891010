//! Structured text of a single page: blocks, lines, spans.
//!
//! This is the shape produced by the document model's text extraction and
//! consumed by the hit locator. Only [`Block::Text`] blocks carry spans;
//! [`Block::Image`] blocks are kept so that consumers see the same block
//! sequence the extractor produced.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A contiguous run of text sharing one font, size and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub bbox: Rect,
    pub font: Option<String>,
    pub size: Option<f32>,
    /// Packed `0xRRGGBB` fill color.
    pub color: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub bbox: Rect,
    pub spans: Vec<Span>,
}

impl TextLine {
    /// Build a line whose bbox covers all of its spans.
    pub fn from_spans(spans: Vec<Span>) -> Self {
        let bbox = covering_rect(spans.iter().map(|s| s.bbox));
        TextLine { bbox, spans }
    }

    /// Concatenate the span texts without separators.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text { bbox: Rect, lines: Vec<TextLine> },
    Image { bbox: Rect },
}

impl Block {
    /// Build a text block whose bbox covers all of its lines.
    pub fn text(lines: Vec<TextLine>) -> Self {
        let bbox = covering_rect(lines.iter().map(|l| l.bbox));
        Block::Text { bbox, lines }
    }

    pub fn bbox(&self) -> Rect {
        match self {
            Block::Text { bbox, .. } | Block::Image { bbox } => *bbox,
        }
    }
}

/// Structured text of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPage {
    /// 1-based page number.
    pub number: u32,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<Block>,
}

impl StructuredPage {
    /// Iterate over every span of every text block in traversal order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { lines, .. } => Some(lines),
                Block::Image { .. } => None,
            })
            .flatten()
            .flat_map(|line| line.spans.iter())
    }
}

fn covering_rect(mut rects: impl Iterator<Item = Rect>) -> Rect {
    let first = rects.next().unwrap_or_default();
    rects.fold(first, |acc, r| acc.union(&r))
}
