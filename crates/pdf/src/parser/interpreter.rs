//! Content-stream interpreter.
//!
//! Walks a page's operators with a simplified graphics-state and
//! text-state machine and reports, in page space, every glyph shown by a
//! text-showing operator and every image XObject painted with `Do`.  The
//! output keeps the index of the originating operation so that the
//! redaction pass can rewrite exactly the operators it needs to.

use pdfedit_core::Rect;

use super::backend::{
    decode_text_simple, get_number_from_value, BackendFontInfo, ContentOp, PageFrame, PageId,
    PdfBackend, PdfValue, DEFAULT_GLYPH_WIDTH,
};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Matrices
// ---------------------------------------------------------------------------

/// Elements [a, b, c, d, e, f] of a PDF transformation matrix.
pub type Matrix = [f32; 6];

pub const IDENTITY_MATRIX: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m1 x m2` in the PDF row-vector convention (apply `m1` first).
pub fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

pub fn transform_point(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

fn matrix_from_operands(operands: &[PdfValue]) -> Option<Matrix> {
    let vals: Vec<f32> = operands
        .iter()
        .take(6)
        .filter_map(get_number_from_value)
        .collect();
    if vals.len() == 6 {
        Some([vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]])
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One character code painted on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGlyph {
    /// Raw character code bytes (1 byte for simple fonts, 2 for Type0).
    pub code: Vec<u8>,
    /// Decoded text of the code.
    pub text: String,
    /// Page-space x of the glyph origin.
    pub x0: f32,
    /// Page-space x after the glyph's advance.
    pub x1: f32,
    /// Page-space y of the baseline.
    pub baseline: f32,
    /// Horizontal displacement in unscaled text space, including character
    /// and word spacing and horizontal scaling.
    pub advance: f32,
}

/// An element of a text-showing operation, in content-stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowItem {
    Glyph(PlacedGlyph),
    /// A `TJ` position adjustment, in thousandths of text space.
    Adjust(f32),
}

/// A single `Tj`, `TJ`, `'` or `"` operation and the glyphs it painted.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowText {
    /// Index of the operation in the decoded content stream.
    pub op_index: usize,
    pub operator: String,
    pub items: Vec<ShowItem>,
    /// Base-font name (or the resource key when the font is unknown).
    pub font_name: String,
    /// Font size operand of `Tf`.
    pub font_size: f32,
    /// Horizontal scaling (`Tz` / 100).
    pub horiz_scale: f32,
    /// Rendered size after the text matrix and CTM.
    pub size: f32,
    /// Fill color as `0xRRGGBB`.
    pub color: u32,
}

impl ShowText {
    pub fn glyphs(&self) -> impl Iterator<Item = &PlacedGlyph> {
        self.items.iter().filter_map(|item| match item {
            ShowItem::Glyph(g) => Some(g),
            ShowItem::Adjust(_) => None,
        })
    }

    /// Page-space center of a glyph's box.
    ///
    /// The box spans from `0.8 * size` above the baseline to `0.2 * size`
    /// below it.
    pub fn glyph_center(&self, glyph: &PlacedGlyph) -> (f32, f32) {
        (
            (glyph.x0 + glyph.x1) / 2.0,
            glyph.baseline - 0.3 * self.size,
        )
    }
}

/// An image XObject painted on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    pub name: Vec<u8>,
    pub bbox: Rect,
}

/// Everything the interpreter observed on a page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub shows: Vec<ShowText>,
    pub images: Vec<PlacedImage>,
}

// ---------------------------------------------------------------------------
// Internal: state machines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill_color: u32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY_MATRIX,
            fill_color: 0,
        }
    }
}

/// Mutable text state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key, not the full name).
    font_key: Vec<u8>,
    /// Resolved base-font name for the current font.
    font_name: String,
    /// Current font size in text-space units.
    font_size: f32,
    text_matrix: Matrix,
    /// Text line matrix -- set by BT and updated by Td/TD/T*/Tm.
    line_matrix: Matrix,
    /// Horizontal scaling factor (percent / 100).  Default 1.0.
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the text line matrix by a translation (used by Td / TD).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }
}

fn pack_rgb(r: f32, g: f32, b: f32) -> u32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Interpret numeric color operands as gray, RGB or CMYK by their count.
fn color_from_operands(operands: &[PdfValue]) -> Option<u32> {
    let vals: Vec<f32> = operands.iter().filter_map(get_number_from_value).collect();
    match vals.as_slice() {
        [g] => Some(pack_rgb(*g, *g, *g)),
        [r, g, b] => Some(pack_rgb(*r, *g, *b)),
        [c, m, y, k] => Some(pack_rgb(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

struct Interpreter {
    frame: PageFrame,
    fonts: Vec<BackendFontInfo>,
    image_names: Vec<Vec<u8>>,
    gs: GraphicsState,
    ts: TextState,
    stack: Vec<(GraphicsState, TextState)>,
    content: PageContent,
}

impl Interpreter {
    /// Handle one operator.
    ///
    /// | Operator            | Action |
    /// |---------------------|--------|
    /// | `q` / `Q`           | Save / restore graphics state |
    /// | `cm`                | Concatenate the CTM |
    /// | `g` `rg` `k` `sc` `scn` `cs` | Set the fill color |
    /// | `BT` / `ET`         | Begin / end text object |
    /// | `Tf` `Tm` `Td` `TD` `T*` `TL` `Tc` `Tw` `Tz` `Ts` | Text state |
    /// | `Tj` `TJ` `'` `"`   | Show text |
    /// | `Do`                | Paint an XObject |
    fn apply(&mut self, index: usize, op: &ContentOp) {
        let first_number = || op.operands.first().and_then(get_number_from_value);

        match op.operator.as_str() {
            // -- Graphics state -----------------------------------------
            "q" => self.stack.push((self.gs.clone(), self.ts.clone())),
            "Q" => {
                if let Some((gs, ts)) = self.stack.pop() {
                    self.gs = gs;
                    self.ts = ts;
                }
            }
            "cm" => {
                if let Some(m) = matrix_from_operands(&op.operands) {
                    self.gs.ctm = multiply(&m, &self.gs.ctm);
                }
            }
            "g" | "rg" | "k" | "sc" | "scn" => {
                if let Some(color) = color_from_operands(&op.operands) {
                    self.gs.fill_color = color;
                }
            }
            "cs" => self.gs.fill_color = 0,

            // -- Text object delimiters --------------------------------
            "BT" => {
                self.ts.text_matrix = IDENTITY_MATRIX;
                self.ts.line_matrix = IDENTITY_MATRIX;
            }
            "ET" => {}

            // -- Text state ----------------------------------------------
            "Tf" => self.set_font(&op.operands),
            "Tm" => {
                if let Some(m) = matrix_from_operands(&op.operands) {
                    self.ts.text_matrix = m;
                    self.ts.line_matrix = m;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        self.ts.leading = -ty;
                    }
                    self.ts.translate_line(tx, ty);
                }
            }
            "T*" => self.ts.next_line(),
            "TL" => {
                if let Some(v) = first_number() {
                    self.ts.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = first_number() {
                    self.ts.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = first_number() {
                    self.ts.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = first_number() {
                    self.ts.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = first_number() {
                    self.ts.text_rise = v;
                }
            }

            // -- Show text ----------------------------------------------
            "Tj" => {
                if let Some(first) = op.operands.first() {
                    self.show(index, &op.operator, std::slice::from_ref(first));
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = op.operands.first() {
                    self.show(index, &op.operator, arr);
                }
            }
            "'" => {
                self.ts.next_line();
                if let Some(first) = op.operands.first() {
                    self.show(index, &op.operator, std::slice::from_ref(first));
                }
            }
            "\"" => {
                // " aw ac string  =>  set Tw, Tc, T*, Tj
                if op.operands.len() >= 3 {
                    if let Some(aw) = get_number_from_value(&op.operands[0]) {
                        self.ts.word_spacing = aw;
                    }
                    if let Some(ac) = get_number_from_value(&op.operands[1]) {
                        self.ts.char_spacing = ac;
                    }
                    self.ts.next_line();
                    self.show(index, &op.operator, &op.operands[2..3]);
                }
            }

            // -- XObjects -------------------------------------------------
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.paint_xobject(name);
                }
            }

            _ => {}
        }
    }

    /// Handle the `Tf` (set font) operator.
    fn set_font(&mut self, operands: &[PdfValue]) {
        if operands.len() < 2 {
            return;
        }
        let key = match &operands[0] {
            PdfValue::Name(n) => n.clone(),
            PdfValue::Str(s) => s.clone(),
            _ => return,
        };
        let size = get_number_from_value(&operands[1]).unwrap_or(0.0);

        self.ts.font_name = match self.fonts.iter().find(|info| info.name == key) {
            Some(info) => info.base_font.clone().unwrap_or_default(),
            None => {
                log::debug!(
                    "font /{} not in page resources",
                    String::from_utf8_lossy(&key)
                );
                String::from_utf8_lossy(&key).into_owned()
            }
        };
        self.ts.font_key = key;
        self.ts.font_size = size;
    }

    /// Paint the string and numeric elements of a show operation, recording
    /// every glyph and advancing the text matrix.
    fn show(&mut self, index: usize, operator: &str, elements: &[PdfValue]) {
        let trm = multiply(&self.ts.text_matrix, &self.gs.ctm);
        let scale = (trm[1].powi(2) + trm[3].powi(2)).sqrt();

        let mut show = ShowText {
            op_index: index,
            operator: operator.to_string(),
            items: Vec::new(),
            font_name: self.ts.font_name.clone(),
            font_size: self.ts.font_size,
            horiz_scale: self.ts.horiz_scale,
            size: (self.ts.font_size * scale).abs(),
            color: self.gs.fill_color,
        };

        for elem in elements {
            match elem {
                PdfValue::Str(bytes) => self.show_string(bytes, &mut show.items),
                val => {
                    if let Some(adj) = get_number_from_value(val) {
                        let dx = -adj / 1000.0 * self.ts.font_size * self.ts.horiz_scale;
                        self.ts.advance_x(dx);
                        show.items.push(ShowItem::Adjust(adj));
                    }
                }
            }
        }

        self.content.shows.push(show);
    }

    fn show_string(&mut self, bytes: &[u8], items: &mut Vec<ShowItem>) {
        let font = self.fonts.iter().find(|info| info.name == self.ts.font_key);
        let code_len = font.map(|f| f.code_len()).unwrap_or(1);

        for code in bytes.chunks(code_len) {
            let code_value = code.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
            let width = font
                .map(|f| f.glyph_width(code_value))
                .unwrap_or(DEFAULT_GLYPH_WIDTH)
                / 1000.0;

            let mut spacing = self.ts.char_spacing;
            if code == b" " {
                spacing += self.ts.word_spacing;
            }
            let advance = (width * self.ts.font_size + spacing) * self.ts.horiz_scale;

            let trm = multiply(&self.ts.text_matrix, &self.gs.ctm);
            let (start_x, start_y) = transform_point(&trm, 0.0, self.ts.text_rise);
            let (end_x, end_y) = transform_point(&trm, advance, self.ts.text_rise);
            let (x0, baseline) = self.frame.to_page(start_x, start_y);
            let (x1, _) = self.frame.to_page(end_x, end_y);

            let text = font
                .and_then(|f| f.encoding.decode(code))
                .unwrap_or_else(|| decode_text_simple(code));

            items.push(ShowItem::Glyph(PlacedGlyph {
                code: code.to_vec(),
                text,
                x0,
                x1,
                baseline,
                advance,
            }));
            self.ts.advance_x(advance);
        }
    }

    /// Record an image XObject as the unit square mapped through the CTM.
    fn paint_xobject(&mut self, name: &[u8]) {
        if !self.image_names.iter().any(|n| n == name) {
            return;
        }

        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(x, y)| {
            let (ux, uy) = transform_point(&self.gs.ctm, x, y);
            self.frame.to_page(ux, uy)
        });
        let (mut x0, mut y0) = corners[0];
        let (mut x1, mut y1) = corners[0];
        for (x, y) in &corners[1..] {
            x0 = x0.min(*x);
            y0 = y0.min(*y);
            x1 = x1.max(*x);
            y1 = y1.max(*y);
        }

        self.content.images.push(PlacedImage {
            name: name.to_vec(),
            bbox: Rect::new(x0, y0, x1, y1),
        });
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Interpret pre-decoded operations of a page.
///
/// Operation indices in the result refer to positions in `ops`.
pub fn interpret(
    backend: &dyn PdfBackend,
    page_id: PageId,
    ops: &[ContentOp],
) -> Result<PageContent, PdfError> {
    let mut interpreter = Interpreter {
        frame: backend.page_frame(page_id)?,
        fonts: backend.page_fonts(page_id).unwrap_or_default(),
        image_names: backend.page_image_names(page_id),
        gs: GraphicsState::default(),
        ts: TextState::default(),
        stack: Vec::new(),
        content: PageContent::default(),
    };

    for (index, op) in ops.iter().enumerate() {
        interpreter.apply(index, op);
    }

    Ok(interpreter.content)
}

/// Decode and interpret a page's content stream.
pub fn interpret_page(backend: &dyn PdfBackend, page_id: PageId) -> Result<PageContent, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    interpret(backend, page_id, &ops)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
