//! Character encodings: font codes to Unicode when reading, Unicode to
//! WinAnsi codes when drawing.

use std::sync::Arc;

/// How the character codes of a font map to Unicode.
#[derive(Debug, Clone, Default)]
pub enum FontEncoding {
    /// Text of each single-byte code (WinAnsi, MacRoman, `/Differences`, ...).
    Table(Vec<Option<char>>),
    /// A `/ToUnicode` CMap, decoded by `lopdf`.
    ToUnicode(Arc<lopdf::Encoding<'static>>),
    /// Codes read as UTF-16BE.
    Utf16,
    /// Nothing usable; callers fall back to
    /// [`decode_text_simple`](crate::parser::backend::decode_text_simple).
    #[default]
    Unknown,
}

impl FontEncoding {
    /// Unicode text of one character code, or `None` when the encoding does
    /// not map it.
    pub fn decode(&self, code: &[u8]) -> Option<String> {
        let text = match self {
            FontEncoding::Table(table) => code
                .iter()
                .map(|b| table.get(*b as usize).copied().flatten())
                .collect::<Option<String>>()?,
            FontEncoding::ToUnicode(cmap) => cmap.bytes_to_string(code).ok()?,
            FontEncoding::Utf16 => {
                let units: Vec<u16> = code
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&units).ok()?
            }
            FontEncoding::Unknown => return None,
        };

        (!text.is_empty() && !text.contains('\u{FFFD}')).then_some(text)
    }
}

/// Unicode character of a glyph name as used in `/Differences` arrays.
///
/// Understands `uniXXXX` and `uXXXX` names, single-letter names, and the
/// Adobe Glyph List names of ASCII punctuation, digits and the usual
/// typographic characters.  A `.suffix` (`a.sc`, `one.oldstyle`) is ignored.
pub fn glyph_name_to_char(name: &[u8]) -> Option<char> {
    let name = std::str::from_utf8(name).ok()?;
    let base = name.split('.').next().unwrap_or(name);

    if let Some(hex) = base.strip_prefix("uni").filter(|h| h.len() == 4) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(hex) = base.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())) {
        if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
            return Some(c);
        }
    }

    let mut chars = base.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }

    let c = match base {
        "space" => ' ',
        "nbspace" => '\u{00A0}',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotesinglbase" => '\u{201A}',
        "quotedblbase" => '\u{201E}',
        "guilsinglleft" => '\u{2039}',
        "guilsinglright" => '\u{203A}',
        "guillemotleft" => '\u{00AB}',
        "guillemotright" => '\u{00BB}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "bullet" => '\u{2022}',
        "ellipsis" => '\u{2026}',
        "dagger" => '\u{2020}',
        "daggerdbl" => '\u{2021}',
        "perthousand" => '\u{2030}',
        "Euro" => '\u{20AC}',
        "trademark" => '\u{2122}',
        "copyright" => '\u{00A9}',
        "registered" => '\u{00AE}',
        "degree" => '\u{00B0}',
        "section" => '\u{00A7}',
        "paragraph" => '\u{00B6}',
        "sterling" => '\u{00A3}',
        "yen" => '\u{00A5}',
        "cent" => '\u{00A2}',
        "minus" => '\u{2212}',
        "multiply" => '\u{00D7}',
        "divide" => '\u{00F7}',
        "periodcentered" => '\u{00B7}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "ff" => '\u{FB00}',
        "ffi" => '\u{FB03}',
        "ffl" => '\u{FB04}',
        _ => return None,
    };
    Some(c)
}

/// WinAnsi code of a character in the 0x80-0x9F range, where
/// Windows-1252 differs from Latin-1.
fn win_ansi_special(c: char) -> Option<u8> {
    let code = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Encode text for a `WinAnsiEncoding` font.
///
/// ASCII and the Latin-1 upper half map to their code point, the
/// Windows-1252 punctuation (curly quotes, dashes, euro, ...) to 0x80-0x9F.
/// Characters WinAnsi cannot represent become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            cp @ (0x00..=0x7F | 0xA0..=0xFF) => cp as u8,
            _ => win_ansi_special(c).unwrap_or(b'?'),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_decode() {
        let mut table = vec![None; 256];
        table[0x41] = Some('A');
        table[0x92] = Some('\u{2019}');
        let encoding = FontEncoding::Table(table);

        assert_eq!(encoding.decode(&[0x92]).as_deref(), Some("\u{2019}"));
        assert_eq!(encoding.decode(b"A").as_deref(), Some("A"));
        assert_eq!(encoding.decode(&[0x05]), None);
    }

    #[test]
    fn test_utf16_decode() {
        assert_eq!(FontEncoding::Utf16.decode(&[0x00, 0x41]).as_deref(), Some("A"));
        assert_eq!(FontEncoding::Utf16.decode(&[0xD8, 0x00]), None);
        assert_eq!(FontEncoding::Unknown.decode(b"A"), None);
    }

    #[test]
    fn test_glyph_names() {
        assert_eq!(glyph_name_to_char(b"quoteright"), Some('\u{2019}'));
        assert_eq!(glyph_name_to_char(b"uni20AC"), Some('\u{20AC}'));
        assert_eq!(glyph_name_to_char(b"u1F600"), Some('\u{1F600}'));
        assert_eq!(glyph_name_to_char(b"g"), Some('g'));
        assert_eq!(glyph_name_to_char(b"a.sc"), Some('a'));
        assert_eq!(glyph_name_to_char(b"seven"), Some('7'));
        assert_eq!(glyph_name_to_char(b"space"), Some(' '));
        assert_eq!(glyph_name_to_char(b"nbspace"), Some('\u{00A0}'));
        assert_eq!(glyph_name_to_char(b"g123"), None);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Earth"), b"Earth".to_vec());
        assert_eq!(encode_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(
            encode_win_ansi("\u{201C}x\u{201D} \u{2013} 5\u{20AC}\u{2122}"),
            vec![0x93, b'x', 0x94, b' ', 0x96, b' ', b'5', 0x80, 0x99]
        );
        assert_eq!(encode_win_ansi("\u{4F60}\u{2192}"), b"??".to_vec());
    }
}
