//! Text redaction: remove the glyphs painted inside a region and cover the
//! region with an opaque fill.
//!
//! Affected show operations are rewritten as `TJ` arrays in which every
//! removed glyph becomes a position adjustment of the same advance, so the
//! glyphs that stay keep their positions.  Image XObjects and the `Do`
//! operations that paint them are never altered.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use pdfedit_core::{Point, Rect, Rgb};

use crate::parser::backend::{convert_operations, LopdfBackend, PageFrame, PageId, PdfBackend};
use crate::parser::interpreter::{interpret, ShowItem, ShowText};
use crate::resources::set_page_content;
use crate::PdfError;

/// Build the elements of a `TJ` array for `show`, dropping the glyphs
/// flagged in `redacted` (one flag per glyph, in order).
fn tj_elements(show: &ShowText, redacted: &[bool]) -> Vec<Object> {
    fn flush(run: &mut Vec<u8>, elements: &mut Vec<Object>) {
        if !run.is_empty() {
            elements.push(Object::String(std::mem::take(run), StringFormat::Literal));
        }
    }

    let scale = show.font_size * show.horiz_scale;
    let mut elements = Vec::new();
    let mut run: Vec<u8> = Vec::new();
    let mut flags = redacted.iter();

    for item in &show.items {
        match item {
            ShowItem::Glyph(glyph) => {
                if flags.next().copied().unwrap_or(false) {
                    flush(&mut run, &mut elements);
                    if scale != 0.0 {
                        elements.push(Object::Real(-glyph.advance * 1000.0 / scale));
                    }
                } else {
                    run.extend_from_slice(&glyph.code);
                }
            }
            ShowItem::Adjust(adj) => {
                flush(&mut run, &mut elements);
                elements.push(Object::Real(*adj));
            }
        }
    }
    flush(&mut run, &mut elements);

    elements
}

/// Replacement operations for a show operation with redacted glyphs.
///
/// `'` and `"` keep their line movement and spacing effects as explicit
/// operators ahead of the `TJ`.
fn rewrite_show(original: &Operation, show: &ShowText, redacted: &[bool]) -> Vec<Operation> {
    let tj = Operation::new("TJ", vec![Object::Array(tj_elements(show, redacted))]);

    match original.operator.as_str() {
        "'" => vec![Operation::new("T*", vec![]), tj],
        "\"" => {
            let mut ops = Vec::with_capacity(4);
            if let [aw, ac, ..] = original.operands.as_slice() {
                ops.push(Operation::new("Tw", vec![aw.clone()]));
                ops.push(Operation::new("Tc", vec![ac.clone()]));
            }
            ops.push(Operation::new("T*", vec![]));
            ops.push(tj);
            ops
        }
        _ => vec![tj],
    }
}

/// Operations painting `rect` (page space) with `fill`.
fn fill_ops(frame: &PageFrame, rect: Rect, fill: Rgb) -> Vec<Operation> {
    let (x, y) = frame.to_user(rect.x0, rect.y1);
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "rg",
            vec![
                Object::Real(fill.r),
                Object::Real(fill.g),
                Object::Real(fill.b),
            ],
        ),
        Operation::new(
            "re",
            vec![
                Object::Real(x),
                Object::Real(y),
                Object::Real(rect.width()),
                Object::Real(rect.height()),
            ],
        ),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Remove every glyph whose center lies in `rect` and paint `rect` with
/// `fill`.  Returns the number of glyphs removed.
///
/// The existing content is wrapped in `q`/`Q` so the fill is drawn with a
/// clean graphics state.
pub fn redact_page(
    backend: &mut LopdfBackend,
    page_id: PageId,
    rect: Rect,
    fill: Rgb,
) -> Result<usize, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let content = Content::decode(&raw_content)
        .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;
    let ops = convert_operations(&content);
    let page = interpret(&*backend, page_id, &ops)?;
    let frame = backend.page_frame(page_id)?;

    let mut rewrites: HashMap<usize, Vec<Operation>> = HashMap::new();
    let mut removed = 0;

    for show in &page.shows {
        let redacted: Vec<bool> = show
            .glyphs()
            .map(|glyph| {
                let (x, y) = show.glyph_center(glyph);
                rect.contains(Point::new(x, y))
            })
            .collect();

        let count = redacted.iter().filter(|r| **r).count();
        if count == 0 {
            continue;
        }
        removed += count;

        let original = &content.operations[show.op_index];
        rewrites.insert(show.op_index, rewrite_show(original, show, &redacted));
    }

    let mut operations = Vec::with_capacity(content.operations.len() + 8);
    operations.push(Operation::new("q", vec![]));
    for (index, op) in content.operations.into_iter().enumerate() {
        match rewrites.remove(&index) {
            Some(replacement) => operations.extend(replacement),
            None => operations.push(op),
        }
    }
    operations.push(Operation::new("Q", vec![]));
    operations.extend(fill_ops(&frame, rect, fill));

    let bytes = Content { operations }.encode()?;
    set_page_content(backend.raw_doc_mut(), page_id, bytes)?;

    log::debug!("redacted {removed} glyphs in {rect:?} on page {page_id:?}");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::{single_page_pdf, HELLO_WORLD};

    fn operators(backend: &LopdfBackend, page_id: PageId) -> Vec<Operation> {
        let raw = backend.page_content(page_id).unwrap();
        Content::decode(&raw).unwrap().operations
    }

    fn page_one(backend: &LopdfBackend) -> PageId {
        backend.pages()[&1]
    }

    /// Region around "World" in `HELLO_WORLD`.
    fn world_rect() -> Rect {
        Rect::new(102.0, 79.0, 127.0, 99.0)
    }

    fn numbers(elements: &[Object]) -> Vec<f32> {
        elements
            .iter()
            .filter_map(|o| match o {
                Object::Real(f) => Some(*f),
                Object::Integer(i) => Some(*i as f32),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_redaction_rewrites_show_as_tj() {
        let mut backend = LopdfBackend::load_bytes(&single_page_pdf(HELLO_WORLD)).unwrap();
        let page_id = page_one(&backend);

        let removed = redact_page(&mut backend, page_id, world_rect(), Rgb::WHITE).unwrap();
        assert_eq!(removed, 5);

        let ops = operators(&backend, page_id);
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(
            names,
            vec!["q", "BT", "Tf", "Tm", "TJ", "ET", "Q", "q", "rg", "re", "f", "Q"]
        );

        let Object::Array(elements) = &ops[4].operands[0] else {
            panic!("TJ operand is not an array");
        };
        assert!(matches!(&elements[0], Object::String(s, _) if s == b"Hello "));
        assert_eq!(numbers(elements), vec![-500.0; 5]);
    }

    #[test]
    fn test_fill_rectangle_in_user_space() {
        let mut backend = LopdfBackend::load_bytes(&single_page_pdf(HELLO_WORLD)).unwrap();
        let page_id = page_one(&backend);
        redact_page(&mut backend, page_id, world_rect(), Rgb::WHITE).unwrap();

        let ops = operators(&backend, page_id);
        let re = ops.iter().find(|o| o.operator == "re").unwrap();
        assert_eq!(numbers(&re.operands), vec![102.0, 693.0, 25.0, 20.0]);
        let rg = ops.iter().rev().find(|o| o.operator == "rg").unwrap();
        assert_eq!(numbers(&rg.operands), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_region_without_text_only_fills() {
        let mut backend = LopdfBackend::load_bytes(&single_page_pdf(HELLO_WORLD)).unwrap();
        let page_id = page_one(&backend);
        let removed = redact_page(
            &mut backend,
            page_id,
            Rect::new(300.0, 300.0, 400.0, 400.0),
            Rgb::WHITE,
        )
        .unwrap();
        assert_eq!(removed, 0);

        let ops = operators(&backend, page_id);
        assert!(ops.iter().any(|o| o.operator == "Tj"));
        assert!(ops.iter().all(|o| o.operator != "TJ"));
    }

    #[test]
    fn test_kept_glyphs_keep_positions() {
        let mut backend = LopdfBackend::load_bytes(&single_page_pdf(
            b"BT /F1 10 Tf 1 0 0 1 72 700 Tm [(Hello) -300 (World) ( again)] TJ ET",
        ))
        .unwrap();
        let page_id = page_one(&backend);
        let before = crate::parser::interpreter::interpret_page(&backend, page_id).unwrap();

        redact_page(&mut backend, page_id, Rect::new(100.0, 79.0, 125.0, 99.0), Rgb::WHITE)
            .unwrap();
        let after = crate::parser::interpreter::interpret_page(&backend, page_id).unwrap();

        let texts: String = after.shows[0].glyphs().map(|g| g.text.as_str()).collect();
        assert_eq!(texts, "Hello again");

        let last_before = before.shows[0].glyphs().last().unwrap().clone();
        let last_after = after.shows[0].glyphs().last().unwrap().clone();
        assert!((last_before.x0 - last_after.x0).abs() < 0.01);
    }

    #[test]
    fn test_quote_operator_keeps_line_movement() {
        let mut backend = LopdfBackend::load_bytes(&single_page_pdf(
            b"BT /F1 10 Tf 12 TL 1 0 0 1 72 712 Tm (Hello World) ' ET",
        ))
        .unwrap();
        let page_id = page_one(&backend);
        redact_page(&mut backend, page_id, world_rect(), Rgb::WHITE).unwrap();

        let ops = operators(&backend, page_id);
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert!(names.windows(2).any(|w| w == ["T*", "TJ"]));

        let content = crate::parser::interpreter::interpret_page(&backend, page_id).unwrap();
        let first = content.shows[0].glyphs().next().unwrap().clone();
        assert!((first.baseline - 92.0).abs() < 0.01);
    }

    #[test]
    fn test_double_quote_operator_keeps_spacing() {
        let mut backend = LopdfBackend::load_bytes(&single_page_pdf(
            b"BT /F1 10 Tf 12 TL 1 0 0 1 72 712 Tm 0 0 (Hello World) \" ET",
        ))
        .unwrap();
        let page_id = page_one(&backend);
        redact_page(&mut backend, page_id, world_rect(), Rgb::WHITE).unwrap();

        let names: Vec<String> = operators(&backend, page_id)
            .into_iter()
            .map(|o| o.operator)
            .collect();
        assert!(names
            .windows(4)
            .any(|w| w == ["Tw", "Tc", "T*", "TJ"]));
    }

    #[test]
    fn test_images_are_not_touched() {
        let mut backend = LopdfBackend::load_bytes(&crate::test_pdf::pdf_with_image(
            b"q 100 0 0 100 90 650 cm /Im1 Do Q BT /F1 10 Tf 1 0 0 1 72 700 Tm (Hello World) Tj ET",
        ))
        .unwrap();
        let page_id = page_one(&backend);
        redact_page(&mut backend, page_id, world_rect(), Rgb::WHITE).unwrap();

        let ops = operators(&backend, page_id);
        let do_op = ops.iter().find(|o| o.operator == "Do").unwrap();
        assert_eq!(do_op.operands[0].as_name().unwrap(), b"Im1");
        assert_eq!(backend.page_image_names(page_id), vec![b"Im1".to_vec()]);
    }
}
