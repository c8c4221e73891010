//! Page resource lookup and mutation: image XObjects, font registration and
//! content-stream replacement.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::PdfError;

/// Prefix of the font resource keys registered for drawn text.
pub const FONT_KEY_PREFIX: &str = "PEF";

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Resolve a `lopdf::Object` that might be a `Reference` to the actual object.
fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Resolve an object to a `Dictionary`, following one level of reference
/// indirection if needed.
fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve_object(doc, obj) {
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

/// The resource dictionary that applies to a page, inherited through
/// `/Parent` when the page has none of its own.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(obj) = dict.get(b"Resources") {
            return resolve_dict(doc, obj);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
}

/// Names of the image XObjects in the page resources.
pub fn page_image_names(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
    let Some(xobjects) = page_resources(doc, page_id)
        .and_then(|res| res.get(b"XObject").ok())
        .and_then(|obj| resolve_dict(doc, obj))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter(|(_, obj)| {
            let Object::Stream(stream) = resolve_object(doc, obj) else {
                return false;
            };
            stream
                .dict
                .get(b"Subtype")
                .ok()
                .and_then(|o| o.as_name().ok())
                .is_some_and(|n| n == b"Image")
        })
        .map(|(name, _)| name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// Register a standard Type1 font in the page resources and return its key.
///
/// A font registered earlier under [`FONT_KEY_PREFIX`] with the same base
/// font is reused.  When the page inherits its resources they are copied
/// onto the page before the font is added.
pub fn add_standard_font(
    doc: &mut Document,
    page_id: ObjectId,
    base_font: &str,
) -> Result<Vec<u8>, PdfError> {
    let page = doc.get_dictionary(page_id)?;
    let (resources_id, mut resources) = match page.get(b"Resources") {
        Ok(Object::Reference(id)) => (Some(*id), doc.get_dictionary(*id)?.clone()),
        Ok(Object::Dictionary(d)) => (None, d.clone()),
        _ => (
            None,
            page_resources(doc, page_id)
                .cloned()
                .unwrap_or_else(Dictionary::new),
        ),
    };

    let (fonts_id, mut fonts) = match resources.get(b"Font") {
        Ok(Object::Reference(id)) => (Some(*id), doc.get_dictionary(*id)?.clone()),
        Ok(Object::Dictionary(d)) => (None, d.clone()),
        _ => (None, Dictionary::new()),
    };

    for (key, obj) in fonts.iter() {
        if !key.starts_with(FONT_KEY_PREFIX.as_bytes()) {
            continue;
        }
        let same_font = resolve_dict(doc, obj)
            .and_then(|d| d.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == base_font.as_bytes());
        if same_font {
            return Ok(key.clone());
        }
    }

    let mut n = 1;
    let key = loop {
        let candidate = format!("{FONT_KEY_PREFIX}{n}");
        if !fonts.has(candidate.as_bytes()) {
            break candidate.into_bytes();
        }
        n += 1;
    };

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
    if !matches!(base_font, "Symbol" | "ZapfDingbats") {
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    }
    let font_id = doc.add_object(font);
    fonts.set(key.clone(), Object::Reference(font_id));

    match fonts_id {
        Some(id) => {
            doc.objects.insert(id, Object::Dictionary(fonts));
        }
        None => resources.set("Font", Object::Dictionary(fonts)),
    }
    match resources_id {
        Some(id) => {
            doc.objects.insert(id, Object::Dictionary(resources));
        }
        None => doc
            .get_dictionary_mut(page_id)?
            .set("Resources", Object::Dictionary(resources)),
    }

    log::debug!(
        "registered {base_font} as /{} on page {page_id:?}",
        String::from_utf8_lossy(&key)
    );
    Ok(key)
}

/// Replace the page's content streams with a single new stream.
///
/// The old streams are left in the document; they are dropped when the
/// document is saved with garbage collection.
pub fn set_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Vec<u8>,
) -> Result<(), PdfError> {
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Reference(stream_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use lopdf::dictionary;

    use super::*;

    /// One page whose resources live on the parent `Pages` node.
    fn inherited_doc() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! { "Type" => "XObject", "Subtype" => "Image", "Width" => 1i64, "Height" => 1i64 },
            vec![0],
        ));
        let form_id = doc.add_object(Stream::new(
            dictionary! { "Type" => "XObject", "Subtype" => "Form" },
            vec![],
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => dictionary! { "Im1" => image_id, "Fm1" => form_id },
                },
            }),
        );
        (doc, page_id)
    }

    #[test]
    fn test_image_names_skip_forms() {
        let (doc, page_id) = inherited_doc();
        assert_eq!(page_image_names(&doc, page_id), vec![b"Im1".to_vec()]);
    }

    #[test]
    fn test_add_font_copies_inherited_resources() {
        let (mut doc, page_id) = inherited_doc();
        let key = add_standard_font(&mut doc, page_id, "Helvetica").unwrap();
        assert_eq!(key, b"PEF1".to_vec());

        let fonts = doc.get_page_fonts(page_id).unwrap();
        assert!(fonts.contains_key(b"F1".as_slice()));
        let added = fonts.get(b"PEF1".as_slice()).unwrap();
        assert_eq!(added.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
        assert_eq!(
            added.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
        // The page now carries its own resources; XObjects survive the copy.
        assert!(doc.get_dictionary(page_id).unwrap().has(b"Resources"));
        assert_eq!(page_image_names(&doc, page_id), vec![b"Im1".to_vec()]);
    }

    #[test]
    fn test_add_font_reuses_key() {
        let (mut doc, page_id) = inherited_doc();
        let first = add_standard_font(&mut doc, page_id, "Helvetica").unwrap();
        let again = add_standard_font(&mut doc, page_id, "Helvetica").unwrap();
        let other = add_standard_font(&mut doc, page_id, "Symbol").unwrap();
        assert_eq!(first, again);
        assert_eq!(other, b"PEF2".to_vec());

        let fonts = doc.get_page_fonts(page_id).unwrap();
        assert!(fonts
            .get(b"PEF2".as_slice())
            .unwrap()
            .get(b"Encoding")
            .is_err());
    }

    #[test]
    fn test_set_page_content_replaces_streams() {
        let (mut doc, page_id) = inherited_doc();
        set_page_content(&mut doc, page_id, b"0 0 m".to_vec()).unwrap();
        assert_eq!(doc.get_page_content(page_id).unwrap(), b"0 0 m".to_vec());
    }
}
