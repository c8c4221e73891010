//! `lopdf`-backed document model.
//!
//! [`PdfDocument`] implements [`DocumentModel`] for real PDF bytes: it
//! extracts structured text with a content-stream interpreter, redacts text
//! by rewriting show operators, draws text with the standard fonts and
//! serializes the result.

use lopdf::Document;
use pdfedit_core::{
    locate, replace, DocumentModel, EditError, Hit, ModelError, Point, Rect, Rgb, SaveOptions,
    StructuredPage, TextOptions,
};
use thiserror::Error;

use parser::backend::{LopdfBackend, PageId, PdfBackend};

pub mod draw;
pub mod encoding;
pub mod parser;
pub mod redact;
pub mod resources;

#[cfg(test)]
pub(crate) mod test_pdf;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("PDF object error: {0}")]
    Object(#[from] lopdf::Error),
    #[error("PDF write error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PdfError> for ModelError {
    fn from(e: PdfError) -> Self {
        ModelError::Failed(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// An open PDF document.
///
/// Constructed via [`PdfDocument::from_bytes`]. Edits are applied in memory
/// and become bytes again through [`DocumentModel::write`].
pub struct PdfDocument {
    backend: LopdfBackend,
}

impl PdfDocument {
    /// Parse PDF bytes.  Encrypted documents are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(PdfDocument {
            backend: LopdfBackend::load_bytes(bytes)?,
        })
    }

    fn page_id(&self, page: u32) -> Result<PageId, ModelError> {
        self.backend
            .pages()
            .get(&page)
            .copied()
            .ok_or(ModelError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })
    }
}

impl DocumentModel for PdfDocument {
    fn page_count(&self) -> u32 {
        self.backend.page_count() as u32
    }

    fn structured_text(&self, page: u32) -> Result<StructuredPage, ModelError> {
        let page_id = self.page_id(page)?;
        Ok(parser::layout::extract_structured_page(
            &self.backend,
            page,
            page_id,
        )?)
    }

    fn apply_redaction(&mut self, page: u32, rect: Rect, fill: Rgb) -> Result<(), ModelError> {
        let page_id = self.page_id(page)?;
        redact::redact_page(&mut self.backend, page_id, rect, fill)?;
        Ok(())
    }

    fn resolve_font(&self, name: &str) -> Option<String> {
        draw::resolve_standard_font(name).map(str::to_string)
    }

    fn insert_text(
        &mut self,
        page: u32,
        at: Point,
        text: &str,
        options: &TextOptions,
    ) -> Result<(), ModelError> {
        let page_id = self.page_id(page)?;
        draw::insert_text(
            &mut self.backend,
            page_id,
            at,
            text,
            options.font_name.as_deref(),
            options.font_size,
            options.color,
        )?;
        Ok(())
    }

    fn write(&mut self, options: SaveOptions) -> Result<Vec<u8>, ModelError> {
        Ok(save(self.backend.raw_doc_mut(), options)?)
    }
}

// ---------------------------------------------------------------------------
// Convenience free functions (stateless, re-parse each call)
// ---------------------------------------------------------------------------

fn open(bytes: &[u8]) -> Result<PdfDocument, EditError> {
    PdfDocument::from_bytes(bytes).map_err(|e| EditError::Document(e.into()))
}

/// Find every occurrence of `query` on a 1-based page.
pub fn find_text(bytes: &[u8], page: u32, query: &str) -> Result<Vec<Hit>, EditError> {
    locate(&open(bytes)?, page, query)
}

/// Replace the `hit_index`-th occurrence of `old_text` on a page and return
/// the new document bytes.
pub fn replace_text(
    bytes: &[u8],
    page: u32,
    hit_index: usize,
    old_text: &str,
    new_text: &str,
) -> Result<Vec<u8>, EditError> {
    replace(&mut open(bytes)?, page, hit_index, old_text, new_text)
}

/// Number of pages in a document.
pub fn page_count(bytes: &[u8]) -> Result<u32, PdfError> {
    Ok(PdfDocument::from_bytes(bytes)?.page_count())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn save(doc: &mut Document, options: SaveOptions) -> Result<Vec<u8>, PdfError> {
    if options.garbage {
        let pruned = doc.prune_objects();
        log::debug!("pruned {} unreferenced objects", pruned.len());
        doc.renumber_objects();
    }
    if options.deflate {
        doc.compress();
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}
