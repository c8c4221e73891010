//! Small PDFs built with `lopdf` for tests.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// "Hello World" in 10pt Helvetica with its baseline at y = 700.
///
/// The font has no `/Widths`, so every glyph is 5pt wide and the span runs
/// from x = 72 to x = 127.
pub const HELLO_WORLD: &[u8] = b"BT /F1 10 Tf 1 0 0 1 72 700 Tm (Hello World) Tj ET";

fn finish(mut doc: Document, page: lopdf::Dictionary) -> Vec<u8> {
    let page_id = doc.add_object(page);
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1i64,
    });

    if let Ok(page_obj) = doc.get_object_mut(page_id) {
        if let Ok(dict) = page_obj.as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
    })
}

fn page_dict(content_id: ObjectId, resources: lopdf::Dictionary) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => Object::Reference(content_id),
        "Resources" => resources,
    }
}

/// A one-page PDF whose `/F1` is the font object `build_font` adds.
pub fn single_page_pdf_with(
    content: &[u8],
    build_font: impl FnOnce(&mut Document) -> ObjectId,
) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let font_id = build_font(&mut doc);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let resources = dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    };
    let page = page_dict(content_id, resources);
    finish(doc, page)
}

/// A one-page PDF whose `/F1` is the given base font.
pub fn single_page_pdf_with_font(content: &[u8], base_font: &str) -> Vec<u8> {
    single_page_pdf_with(content, |doc| add_font(doc, base_font))
}

/// Helvetica with `/Encoding /WinAnsiEncoding`.
pub fn win_ansi_font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

/// CMap mapping the two-byte codes 1, 2 and 3 to "H", "i" and U+2019.
const TO_UNICODE_CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
3 beginbfchar
<0001> <0048>
<0002> <0069>
<0003> <2019>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// A subset Type0 font with Identity-H codes and a `/ToUnicode` CMap.
pub fn to_unicode_font(doc: &mut Document) -> ObjectId {
    let cmap_id = doc.add_object(Stream::new(dictionary! {}, TO_UNICODE_CMAP.to_vec()));
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "ABCDEF+Demo",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0i64,
        },
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "ABCDEF+Demo",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
        "ToUnicode" => Object::Reference(cmap_id),
    })
}

/// A one-page PDF whose `/F1` is Helvetica.
pub fn single_page_pdf(content: &[u8]) -> Vec<u8> {
    single_page_pdf_with_font(content, "Helvetica")
}

/// A one-page PDF with Helvetica as `/F1` and a 2x2 RGB image as `/Im1`.
pub fn pdf_with_image(content: &[u8]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let font_id = add_font(&mut doc, "Helvetica");
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2i64,
            "Height" => 2i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        vec![255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0],
    ));
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let resources = dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        "XObject" => dictionary! { "Im1" => Object::Reference(image_id) },
    };
    let page = page_dict(content_id, resources);
    finish(doc, page)
}

/// A PDF with `count` pages, each showing "Page N".
pub fn multi_page_pdf(count: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let font_id = add_font(&mut doc, "Helvetica");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 1..=count {
        let text = format!("BT /F1 10 Tf 1 0 0 1 72 700 Tm (Page {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
        let mut page = page_dict(
            content_id,
            dictionary! { "Font" => dictionary! { "F1" => Object::Reference(font_id) } },
        );
        page.set("Parent", Object::Reference(pages_id));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
