//! Drawing text with the standard PDF fonts.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use pdfedit_core::{Point, Rgb};

use crate::encoding::encode_win_ansi;
use crate::parser::backend::{LopdfBackend, PageId, PdfBackend};
use crate::resources::{add_standard_font, set_page_content};
use crate::PdfError;

/// Font used when the caller gives no usable font name.
pub const DEFAULT_DRAW_FONT: &str = "Helvetica";

/// The fourteen fonts every PDF viewer provides.
const STANDARD_FONTS: [&str; 14] = [
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

/// Short names for the standard fonts.
const FONT_ALIASES: [(&str, &str); 14] = [
    ("helv", "Helvetica"),
    ("heit", "Helvetica-Oblique"),
    ("hebo", "Helvetica-Bold"),
    ("hebi", "Helvetica-BoldOblique"),
    ("tiro", "Times-Roman"),
    ("tiit", "Times-Italic"),
    ("tibo", "Times-Bold"),
    ("tibi", "Times-BoldItalic"),
    ("cour", "Courier"),
    ("coit", "Courier-Oblique"),
    ("cobo", "Courier-Bold"),
    ("cobi", "Courier-BoldOblique"),
    ("symb", "Symbol"),
    ("zadb", "ZapfDingbats"),
];

/// Map a font name or alias to its standard font, ignoring case.
pub fn resolve_standard_font(name: &str) -> Option<&'static str> {
    STANDARD_FONTS
        .iter()
        .copied()
        .find(|font| font.eq_ignore_ascii_case(name))
        .or_else(|| {
            FONT_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, font)| *font)
        })
}

/// Operations drawing `text` with its baseline origin at `(x, y)` in user
/// space.
fn text_ops(font_key: Vec<u8>, size: f32, x: f32, y: f32, text: &str, color: Rgb) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "rg",
            vec![
                Object::Real(color.r),
                Object::Real(color.g),
                Object::Real(color.b),
            ],
        ),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font_key), Object::Real(size)]),
        Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Real(x),
                Object::Real(y),
            ],
        ),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Draw `text` on a page with its baseline origin at `at` (page space).
///
/// `font` is resolved against the standard fonts; unknown or missing names
/// draw with [`DEFAULT_DRAW_FONT`].
pub fn insert_text(
    backend: &mut LopdfBackend,
    page_id: PageId,
    at: Point,
    text: &str,
    font: Option<&str>,
    size: f32,
    color: Rgb,
) -> Result<(), PdfError> {
    let frame = backend.page_frame(page_id)?;
    let base_font = font
        .and_then(resolve_standard_font)
        .unwrap_or(DEFAULT_DRAW_FONT);
    let (x, y) = frame.to_user(at.x, at.y);

    let mut content = backend.page_content(page_id)?;
    let doc = backend.raw_doc_mut();
    let key = add_standard_font(doc, page_id, base_font)?;

    let ops = text_ops(key, size, x, y, text, color);
    content.push(b'\n');
    content.extend(Content { operations: ops }.encode()?);
    set_page_content(doc, page_id, content)?;

    log::debug!("drew {text:?} with {base_font} {size} at {at:?} on page {page_id:?}");
    Ok(())
}
