//! Hit geometry: where a query string sits inside a page's spans.
//!
//! The locator is a pure function over a [`StructuredPage`]. Its output is
//! order-stable for a given page and query, which is what lets callers
//! address a hit by its position in the list.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::text::{Span, StructuredPage};

/// One occurrence of a query inside one span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// 1-based page number.
    pub page: u32,
    /// Full text of the span containing the match.
    pub span_text: String,
    /// The matched text, exactly as queried.
    pub found_text: String,
    pub bbox: Rect,
    pub font: Option<String>,
    pub size: Option<f32>,
    pub color: Option<u32>,
}

/// Find every occurrence of `query` on the page.
///
/// Text blocks are visited in block, line, span order; within a span,
/// matches are reported left to right and never overlap. An empty query
/// yields no hits.
pub fn locate_in_page(page: &StructuredPage, query: &str) -> Vec<Hit> {
    if query.is_empty() {
        return Vec::new();
    }

    page.spans()
        .flat_map(|span| span_hits(span, query, page.number))
        .collect()
}

/// Compute the hits of `query` inside a single span.
///
/// The bbox of each hit is the span bbox cut proportionally along X by
/// character offset; Y keeps the full span extent.
pub fn span_hits(span: &Span, query: &str, page: u32) -> Vec<Hit> {
    if query.is_empty() || span.text.is_empty() || !span.text.contains(query) {
        return Vec::new();
    }

    let total_chars = span.text.chars().count();
    if total_chars == 0 {
        return Vec::new();
    }

    let query_chars = query.chars().count();
    let width = span.bbox.x1 - span.bbox.x0;

    // `match_indices` resumes after the end of each match, so repeated
    // characters like "aa" in "aaaa" are counted twice, not three times.
    span.text
        .match_indices(query)
        .map(|(byte_idx, _)| {
            let idx = span.text[..byte_idx].chars().count();
            let proportion_start = idx as f32 / total_chars as f32;
            let proportion_end = (idx + query_chars) as f32 / total_chars as f32;

            Hit {
                page,
                span_text: span.text.clone(),
                found_text: query.to_string(),
                bbox: Rect {
                    x0: span.bbox.x0 + width * proportion_start,
                    y0: span.bbox.y0,
                    x1: span.bbox.x0 + width * proportion_end,
                    y1: span.bbox.y1,
                },
                font: span.font.clone(),
                size: span.size,
                color: span.color,
            }
        })
        .collect()
}
