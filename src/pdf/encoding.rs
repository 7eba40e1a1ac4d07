//! WinAnsiEncoding (PDF 32000-1, Annex D) for simple fonts.
//!
//! The built-in Helvetica faces are written with `/Encoding /WinAnsiEncoding`,
//! so text set in them is converted to single bytes here. Characters with no
//! WinAnsi code are dropped. Embedded fonts use glyph ids instead.

// Codes 0x80..=0x9F; `None` marks the five unassigned slots.
const HIGH_TABLE: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// The character a WinAnsi code stands for, if any.
pub fn decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        0x80..=0x9F => HIGH_TABLE[(code - 0x80) as usize],
        _ => None,
    }
}

/// The WinAnsi code for a character, if it has one.
pub fn encode_char(c: char) -> Option<u8> {
    match u32::from(c) {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u8),
        _ => HIGH_TABLE
            .iter()
            .position(|entry| *entry == Some(c))
            .map(|i| 0x80 + i as u8),
    }
}

/// Encode `text`, dropping characters WinAnsi cannot represent.
///
/// Returns the bytes and the number of characters dropped.
pub fn encode(text: &str) -> (Vec<u8>, usize) {
    let mut bytes = Vec::with_capacity(text.len());
    let mut dropped = 0;
    for c in text.chars() {
        match encode_char(c) {
            Some(code) => bytes.push(code),
            None => dropped += 1,
        }
    }
    (bytes, dropped)
}
