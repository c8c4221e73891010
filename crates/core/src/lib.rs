//! Core library for pdfedit
//!
//! This crate implements the **Functional Core** of the pdfedit application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`pdfedit_core`** (this crate): hit geometry, replacement planning and
//!   the edit operations, written against the [`model::DocumentModel`] trait
//! - **`pdf`**: the `lopdf`-backed document model (parsing, structured text,
//!   redaction, text drawing, serialization)
//! - **`pdfedit`**: CLI, HTTP API and document storage (the Imperative Shell)
//!
//! # Module Organization
//!
//! - [`geometry`]: page-space rectangles and points
//! - [`text`]: structured text (blocks, lines, spans)
//! - [`hits`]: the hit locator
//! - [`style`]: replacement style, erase region and insertion point
//! - [`model`]: the document-model capability
//! - [`edit`]: `locate` and `replace`
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use pdfedit_core::{locate, replace};
//!
//! let hits = locate(&doc, 1, "World")?;
//! let bytes = replace(&mut doc, 1, 0, "World", "Earth")?;
//! ```

pub mod edit;
pub mod geometry;
pub mod hits;
pub mod model;
pub mod style;
pub mod text;

pub use edit::{locate, replace, EditError};
pub use geometry::{Point, Rect};
pub use hits::Hit;
pub use model::{DocumentModel, ModelError, SaveOptions, TextOptions};
pub use style::Rgb;
pub use text::{Block, Span, StructuredPage, TextLine};
