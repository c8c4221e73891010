//! The document-model capability the editing operations run against.
//!
//! The trait keeps the locator and the replacement engine ignorant of how a
//! document is parsed or written, so both can be exercised with fixture
//! pages instead of real PDF bytes.

use thiserror::Error;

use crate::geometry::{Point, Rect};
use crate::style::Rgb;
use crate::text::StructuredPage;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("Document error: {0}")]
    Failed(String),
}

/// Options for drawing a string on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    /// A font name already accepted by [`DocumentModel::resolve_font`], or
    /// `None` for the model's default font.
    pub font_name: Option<String>,
    pub font_size: f32,
    pub color: Rgb,
}

/// Serialization options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Drop unreferenced objects and renumber the rest.
    pub garbage: bool,
    /// Compress streams.
    pub deflate: bool,
}

impl SaveOptions {
    /// Compact and compress: the options used after an edit.
    pub const COMPACT: SaveOptions = SaveOptions {
        garbage: true,
        deflate: true,
    };
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions::COMPACT
    }
}

/// An open, mutable document.
///
/// Page numbers are 1-based throughout.
pub trait DocumentModel {
    fn page_count(&self) -> u32;

    /// Extract the page's blocks, lines and spans in page space.
    fn structured_text(&self, page: u32) -> Result<StructuredPage, ModelError>;

    /// Remove text drawn inside `rect` and paint the region with `fill`.
    /// Image content is left in place.
    fn apply_redaction(&mut self, page: u32, rect: Rect, fill: Rgb) -> Result<(), ModelError>;

    /// Map a font name to one the model can draw with, if any.
    fn resolve_font(&self, name: &str) -> Option<String>;

    /// Draw `text` with its baseline origin at `at`.
    fn insert_text(
        &mut self,
        page: u32,
        at: Point,
        text: &str,
        options: &TextOptions,
    ) -> Result<(), ModelError>;

    fn write(&mut self, options: SaveOptions) -> Result<Vec<u8>, ModelError>;
}
