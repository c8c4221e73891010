use std::collections::BTreeMap;
use std::sync::Arc;

use lopdf::{self, content::Content};

use crate::encoding::{glyph_name_to_char, FontEncoding};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Glyph width used when a font has no `/Widths` entry for a code, in
/// thousandths of text space (half an em, the usual proportional average).
pub const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Font information extracted from a page's resource dictionary.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Base font name from the font dictionary, if present.
    pub base_font: Option<String>,
    /// Font subtype (e.g. `Type1`, `TrueType`, `Type0`).
    pub subtype: Option<String>,
    /// Code-to-Unicode mapping resolved from `/ToUnicode` or `/Encoding`.
    pub encoding: FontEncoding,
    /// `/FirstChar` of the `/Widths` array.
    pub first_char: u32,
    /// Glyph widths in thousandths of text space, indexed from `first_char`.
    pub widths: Vec<f32>,
}

impl BackendFontInfo {
    /// Number of bytes per character code in strings shown with this font.
    pub fn code_len(&self) -> usize {
        if self.subtype.as_deref() == Some("Type0") {
            2
        } else {
            1
        }
    }

    /// Width of a character code, falling back to [`DEFAULT_GLYPH_WIDTH`].
    pub fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH)
    }
}

/// Page placement derived from the MediaBox `[llx, lly, urx, ury]`.
///
/// Converts between PDF user space (origin bottom-left, Y up) and page
/// space (origin top-left, Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageFrame {
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// User space to page space.
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.llx, self.ury - y)
    }

    /// Page space to user space.
    pub fn to_user(&self, x: f32, y: f32) -> (f32, f32) {
        (x + self.llx, self.ury - y)
    }
}

/// A simplified, lopdf-independent representation of a PDF value.
///
/// This enum decouples higher-level logic from the concrete `lopdf::Object`
/// type so that the content interpreter can work with pure data.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// References are preserved as `PdfValue::Reference`.  Stream dictionaries
/// are converted but the raw stream bytes are discarded.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(convert_dict(dict)),
        lopdf::Object::Stream(stream) => PdfValue::Dict(convert_dict(&stream.dict)),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

fn convert_dict(dict: &lopdf::Dictionary) -> Vec<(Vec<u8>, PdfValue)> {
    dict.iter()
        .map(|(k, v)| (k.clone(), convert_object(v)))
        .collect()
}

/// Convert every operation of a decoded content stream, preserving order so
/// that indices line up with `content.operations`.
pub fn convert_operations(content: &Content) -> Vec<ContentOp> {
    content
        .operations
        .iter()
        .map(|op| ContentOp {
            operator: op.operator.clone(),
            operands: op.operands.iter().map(convert_object).collect(),
        })
        .collect()
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// Handles three cases in order:
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix) -- strips BOM and decodes.
/// 2. Valid UTF-8 -- returned as-is.
/// 3. Fallback to Latin-1 (ISO 8859-1) -- each byte mapped to its Unicode
///    code point.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // PDFDocEncoding matches Latin-1 for the printable range.
    bytes.iter().map(|&b| b as char).collect()
}

/// Unicode table of a predefined single-byte encoding (`WinAnsiEncoding`,
/// `MacRomanEncoding`, `StandardEncoding`, ...), as `lopdf` knows them.
pub fn base_encoding(name: &[u8]) -> Option<Vec<Option<char>>> {
    let mut font = lopdf::Dictionary::new();
    font.set("Type", "Font");
    font.set("Encoding", lopdf::Object::Name(name.to_vec()));

    let encoding = font.get_font_encoding(&lopdf::Document::new()).ok()?;
    if !matches!(encoding, lopdf::Encoding::OneByteEncoding(_)) {
        return None;
    }

    let table = (0..=255u8)
        .map(|b| {
            encoding
                .bytes_to_string(&[b])
                .ok()
                .and_then(|s| s.chars().next())
        })
        .collect();
    Some(table)
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a PDF parsing backend (currently backed by `lopdf`).
///
/// The content interpreter and the layout builder only see this trait, so
/// they can be tested against pre-decoded operations.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font information for every font referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Return the concatenated, decompressed content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// MediaBox-derived placement of the page.
    fn page_frame(&self, page: PageId) -> Result<PageFrame, PdfError>;

    /// Resource names of the image XObjects available to the page.
    fn page_image_names(&self, page: PageId) -> Vec<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &lopdf::Document {
        &self.doc
    }

    /// Mutable access for the redaction and drawing passes.
    pub fn raw_doc_mut(&mut self) -> &mut lopdf::Document {
        &mut self.doc
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    // -- private helpers ----------------------------------------------------

    /// Walk up the page tree to find the MediaBox array.
    fn find_media_box(&self, dict: &lopdf::Dictionary) -> Option<Vec<lopdf::Object>> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            if let Some(arr) = self.resolve_array(obj) {
                return Some(arr);
            }
        }

        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent_dict = self.doc.get_object(parent_id).ok()?.as_dict().ok()?;
        self.find_media_box(parent_dict)
    }

    /// Resolve an object to an array, following a single level of indirection.
    fn resolve_array(&self, obj: &lopdf::Object) -> Option<Vec<lopdf::Object>> {
        match obj {
            lopdf::Object::Array(arr) => Some(arr.clone()),
            lopdf::Object::Reference(id) => self
                .doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_array().ok())
                .cloned(),
            _ => None,
        }
    }

    /// Resolve a reference to its target, leaving direct objects untouched.
    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> &'a lopdf::Object {
        match obj {
            lopdf::Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Convert a slice of lopdf objects to `f32` values.
    fn array_to_f32s(&self, objects: &[lopdf::Object]) -> Result<Vec<f32>, PdfError> {
        objects
            .iter()
            .map(|obj| match self.resolve(obj) {
                lopdf::Object::Integer(i) => Ok(*i as f32),
                lopdf::Object::Real(f) => Ok(*f),
                other => Err(PdfError::Parse(format!(
                    "expected number in array, got {:?}",
                    other
                ))),
            })
            .collect()
    }

    /// Resolve how a font's character codes map to Unicode.
    ///
    /// A `/ToUnicode` CMap wins over `/Encoding`; `/Differences` are applied
    /// on top of their base encoding.
    fn font_encoding(&self, dict: &lopdf::Dictionary) -> FontEncoding {
        if dict.has(b"ToUnicode") {
            // lopdf only reads the CMap for Identity encodings.
            let mut font = dict.clone();
            font.set("Type", "Font");
            font.set("Encoding", "Identity-H");
            match font.get_font_encoding(&self.doc) {
                Ok(lopdf::Encoding::UnicodeMapEncoding(cmap)) => {
                    return FontEncoding::ToUnicode(Arc::new(lopdf::Encoding::UnicodeMapEncoding(
                        cmap,
                    )));
                }
                Ok(_) => {}
                Err(e) => log::debug!("ignoring unreadable ToUnicode CMap: {e}"),
            }
        }

        let type0 = dict
            .get(b"Subtype")
            .and_then(lopdf::Object::as_name)
            .is_ok_and(|n| n == b"Type0");

        match dict.get(b"Encoding").map(|o| self.resolve(o)) {
            Ok(lopdf::Object::Name(name)) => match name.as_slice() {
                b"Identity-H" | b"Identity-V" | b"UniGB-UCS2-H" | b"UniGB-UTF16-H" => {
                    FontEncoding::Utf16
                }
                other => base_encoding(other)
                    .map(FontEncoding::Table)
                    .unwrap_or(if type0 { FontEncoding::Utf16 } else { FontEncoding::Unknown }),
            },
            Ok(lopdf::Object::Dictionary(enc)) => FontEncoding::Table(self.differences_encoding(enc)),
            _ if type0 => FontEncoding::Utf16,
            _ => FontEncoding::Unknown,
        }
    }

    /// Apply an encoding dictionary's `/Differences` to its `/BaseEncoding`
    /// (`StandardEncoding` when absent).
    fn differences_encoding(&self, enc: &lopdf::Dictionary) -> Vec<Option<char>> {
        let base = enc
            .get(b"BaseEncoding")
            .and_then(lopdf::Object::as_name)
            .unwrap_or(b"StandardEncoding".as_slice());
        let mut table = base_encoding(base).unwrap_or_else(|| vec![None; 256]);

        let differences = enc
            .get(b"Differences")
            .ok()
            .and_then(|o| self.resolve_array(o))
            .unwrap_or_default();

        let mut code = 0usize;
        for item in &differences {
            match self.resolve(item) {
                lopdf::Object::Integer(start) => code = (*start).max(0) as usize,
                lopdf::Object::Name(glyph) => {
                    if let Some(slot) = table.get_mut(code) {
                        *slot = glyph_name_to_char(glyph);
                    }
                    code += 1;
                }
                _ => {}
            }
        }

        table
    }

    /// Read `/FirstChar` and `/Widths` from a simple font dictionary.
    fn font_widths(&self, dict: &lopdf::Dictionary) -> (u32, Vec<f32>) {
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| self.resolve(o).as_i64().ok())
            .map(|v| v.max(0) as u32)
            .unwrap_or(0);

        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve_array(o))
            .and_then(|arr| self.array_to_f32s(&arr).ok())
            .unwrap_or_default();

        (first_char, widths)
    }
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let name_of = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        let mut result = Vec::with_capacity(fonts_map.len());
        for (name, dict) in &fonts_map {
            let (first_char, widths) = self.font_widths(dict);
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font: name_of(dict, b"BaseFont"),
                subtype: name_of(dict, b"Subtype"),
                encoding: self.font_encoding(dict),
                first_char,
                widths,
            });
        }

        Ok(result)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;
        Ok(convert_operations(&content))
    }

    fn page_frame(&self, page: PageId) -> Result<PageFrame, PdfError> {
        let page_dict = self
            .doc
            .get_object(page)
            .and_then(|o| o.as_dict())
            .map_err(|e| PdfError::Parse(format!("page object is not a dictionary: {}", e)))?;

        let media_box = self
            .find_media_box(page_dict)
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))?;

        let nums = self.array_to_f32s(&media_box)?;
        if nums.len() < 4 {
            return Err(PdfError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                nums.len()
            )));
        }

        // Normalise so that ll is the lower-left corner even for inverted boxes.
        Ok(PageFrame {
            llx: nums[0].min(nums[2]),
            lly: nums[1].min(nums[3]),
            urx: nums[0].max(nums[2]),
            ury: nums[1].max(nums[3]),
        })
    }

    fn page_image_names(&self, page: PageId) -> Vec<Vec<u8>> {
        crate::resources::page_image_names(&self.doc, page)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    // -- decode_text_simple -------------------------------------------------

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello, world!"), "Hello, world!");
    }

    #[test]
    fn decode_text_simple_latin1_single_byte() {
        // 0xE9 is U+00E9 in Latin-1 but not valid standalone UTF-8.
        assert_eq!(decode_text_simple(&[0xE9]), "\u{00E9}");
    }

    #[test]
    fn decode_text_simple_utf16be_basic() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_text_simple(input), "AB");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        // Trailing odd byte should be silently ignored.
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00];
        assert_eq!(decode_text_simple(input), "A");
    }

    #[test]
    fn decode_text_simple_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    // -- get_number_from_value ----------------------------------------------

    #[test]
    fn get_number_integer_and_real() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
    }

    #[test]
    fn get_number_from_non_numeric() {
        assert_eq!(get_number_from_value(&PdfValue::Null), None);
        assert_eq!(
            get_number_from_value(&PdfValue::Name(b"Foo".to_vec())),
            None
        );
        assert_eq!(get_number_from_value(&PdfValue::Reference((1, 0))), None);
    }

    // -- convert_object / convert_operations --------------------------------

    #[test]
    fn convert_string_drops_format() {
        assert_eq!(
            convert_object(&lopdf::Object::String(
                b"AABB".to_vec(),
                lopdf::StringFormat::Hexadecimal,
            )),
            PdfValue::Str(b"AABB".to_vec()),
        );
    }

    #[test]
    fn convert_nested_array() {
        let arr = lopdf::Object::Array(vec![
            lopdf::Object::Integer(1),
            lopdf::Object::Array(vec![lopdf::Object::Real(2.0)]),
        ]);
        assert_eq!(
            convert_object(&arr),
            PdfValue::Array(vec![
                PdfValue::Integer(1),
                PdfValue::Array(vec![PdfValue::Real(2.0)])
            ]),
        );
    }

    #[test]
    fn convert_operations_preserves_order() {
        let content = Content {
            operations: vec![
                lopdf::content::Operation::new("BT", vec![]),
                lopdf::content::Operation::new(
                    "Tj",
                    vec![lopdf::Object::string_literal("Hi")],
                ),
                lopdf::content::Operation::new("ET", vec![]),
            ],
        };
        let ops = convert_operations(&content);
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tj", "ET"]);
        assert_eq!(ops[1].operands, vec![PdfValue::Str(b"Hi".to_vec())]);
    }

    // -- BackendFontInfo ----------------------------------------------------

    #[test]
    fn glyph_width_from_widths_array() {
        let font = BackendFontInfo {
            first_char: 32,
            widths: vec![278.0, 0.0, 355.0],
            ..Default::default()
        };
        assert_eq!(font.glyph_width(32), 278.0);
        assert_eq!(font.glyph_width(34), 355.0);
        // Zero widths and out-of-range codes fall back to the default.
        assert_eq!(font.glyph_width(33), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.glyph_width(10), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.glyph_width(200), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn code_len_by_subtype() {
        let mut font = BackendFontInfo::default();
        assert_eq!(font.code_len(), 1);
        font.subtype = Some("Type0".to_string());
        assert_eq!(font.code_len(), 2);
    }

    // -- font encodings -----------------------------------------------------

    fn backend_with(doc: lopdf::Document) -> LopdfBackend {
        LopdfBackend { doc }
    }

    #[test]
    fn base_encoding_win_ansi_and_mac_roman() {
        let win = base_encoding(b"WinAnsiEncoding").unwrap();
        assert_eq!(win[0x41], Some('A'));
        assert_eq!(win[0x92], Some('\u{2019}'));
        assert_eq!(win[0x80], Some('\u{20AC}'));

        let mac = base_encoding(b"MacRomanEncoding").unwrap();
        assert_eq!(mac[0xD5], Some('\u{2019}'));

        assert!(base_encoding(b"NoSuchEncoding").is_none());
    }

    #[test]
    fn font_encoding_applies_differences() {
        let backend = backend_with(lopdf::Document::with_version("1.5"));
        let font = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "Encoding" => lopdf::dictionary! {
                "Type" => "Encoding",
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![
                    1.into(),
                    lopdf::Object::Name(b"quoteright".to_vec()),
                    lopdf::Object::Name(b"fi".to_vec()),
                    0x41.into(),
                    lopdf::Object::Name(b"uni03A9".to_vec()),
                ],
            },
        };

        let encoding = backend.font_encoding(&font);
        assert_eq!(encoding.decode(&[1]).as_deref(), Some("\u{2019}"));
        assert_eq!(encoding.decode(&[2]).as_deref(), Some("\u{FB01}"));
        assert_eq!(encoding.decode(b"A").as_deref(), Some("\u{03A9}"));
        assert_eq!(encoding.decode(b"B").as_deref(), Some("B"));
    }

    #[test]
    fn font_encoding_by_name() {
        let backend = backend_with(lopdf::Document::with_version("1.5"));
        let win_ansi = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "Encoding" => "WinAnsiEncoding",
        };
        assert_eq!(
            backend.font_encoding(&win_ansi).decode(&[0x92]).as_deref(),
            Some("\u{2019}")
        );

        let bare = lopdf::dictionary! { "Type" => "Font", "Subtype" => "Type1" };
        assert!(matches!(backend.font_encoding(&bare), FontEncoding::Unknown));

        let cid = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "Encoding" => "Identity-H",
        };
        assert!(matches!(backend.font_encoding(&cid), FontEncoding::Utf16));
    }

    // -- PageFrame ----------------------------------------------------------

    #[test]
    fn page_frame_round_trip() {
        let frame = PageFrame {
            llx: 10.0,
            lly: 20.0,
            urx: 622.0,
            ury: 812.0,
        };
        assert_eq!(frame.width(), 612.0);
        assert_eq!(frame.height(), 792.0);
        assert_eq!(frame.to_page(72.0, 700.0), (62.0, 112.0));
        assert_eq!(frame.to_user(62.0, 112.0), (72.0, 700.0));
    }

    #[test]
    fn load_bytes_rejects_garbage() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
