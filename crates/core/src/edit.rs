//! The two editing operations: locate hits on a page and replace one of them.

use thiserror::Error;

use crate::hits::{locate_in_page, Hit};
use crate::model::{DocumentModel, ModelError, SaveOptions, TextOptions};
use crate::style::{plan_replacement, Rgb};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    #[error("Invalid page number {page} (document has {page_count} pages)")]
    InvalidPage { page: u32, page_count: u32 },
    #[error("old_text cannot be empty")]
    EmptyQuery,
    #[error("Invalid hit_index {index} ({hits} hits on page)")]
    InvalidHitIndex { index: usize, hits: usize },
    #[error(transparent)]
    Document(ModelError),
}

impl From<ModelError> for EditError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::PageOutOfRange { page, page_count } => {
                EditError::InvalidPage { page, page_count }
            }
            other => EditError::Document(other),
        }
    }
}

impl EditError {
    /// Whether the error was caused by the caller's input rather than by the
    /// document itself.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, EditError::Document(_))
    }
}

fn check_page(doc: &impl DocumentModel, page: u32) -> Result<(), EditError> {
    let page_count = doc.page_count();
    if page == 0 || page > page_count {
        return Err(EditError::InvalidPage { page, page_count });
    }
    Ok(())
}

/// Find every occurrence of `query` on `page`.
///
/// An empty query is valid and yields no hits; an out-of-range page fails
/// with [`EditError::InvalidPage`].
pub fn locate(doc: &impl DocumentModel, page: u32, query: &str) -> Result<Vec<Hit>, EditError> {
    check_page(doc, page)?;
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let structured = doc.structured_text(page)?;
    let hits = locate_in_page(&structured, query);
    log::debug!("page {page}: {} hits for {query:?}", hits.len());
    Ok(hits)
}

/// Replace the `hit_index`-th occurrence of `old_text` on `page` with
/// `new_text` and return the serialized document.
///
/// The hit list is recomputed from the document's current state, so the
/// index always refers to the geometry that is about to be edited.
pub fn replace(
    doc: &mut impl DocumentModel,
    page: u32,
    hit_index: usize,
    old_text: &str,
    new_text: &str,
) -> Result<Vec<u8>, EditError> {
    if old_text.is_empty() {
        return Err(EditError::EmptyQuery);
    }

    let hits = locate(doc, page, old_text)?;
    let hit = hits.get(hit_index).ok_or(EditError::InvalidHitIndex {
        index: hit_index,
        hits: hits.len(),
    })?;

    let plan = plan_replacement(hit);
    log::debug!(
        "page {page}: replacing hit {hit_index} at {:?}, erase {:?}",
        hit.bbox,
        plan.erase
    );

    doc.apply_redaction(page, plan.erase, Rgb::WHITE)?;

    let font_name = doc.resolve_font(&plan.style.font_name);
    if font_name.is_none() {
        log::warn!(
            "font {:?} cannot be drawn, using the default font",
            plan.style.font_name
        );
    }

    let options = TextOptions {
        font_name,
        font_size: plan.style.font_size,
        color: plan.style.color,
    };
    doc.insert_text(page, plan.insertion, new_text, &options)?;

    let bytes = doc.write(SaveOptions::COMPACT)?;
    log::info!(
        "page {page}: replaced {old_text:?} with {new_text:?} ({} bytes)",
        bytes.len()
    );
    Ok(bytes)
}
