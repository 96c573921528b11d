use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

bitflags! {
    /// Character classes reported by [`classify`].
    ///
    /// Classes are not mutually exclusive: `'（'` is Japanese, full-width and
    /// an opening bracket at the same time.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CharClass: u8 {
        /// Hiragana, Katakana, CJK unified ideographs or full-width forms.
        const JAPANESE = 1 << 0;
        /// East Asian Width `F` or `W`.
        const FULL_WIDTH = 1 << 1;
        /// East Asian Width `H` or `Na`.
        const HALF_WIDTH = 1 << 2;
        /// JIS X 4051 punctuation (、。，．・：；？！).
        const PUNCTUATION = 1 << 3;
        /// Full-width opening bracket.
        const OPENING_BRACKET = 1 << 4;
        /// Full-width closing bracket.
        const CLOSING_BRACKET = 1 << 5;
    }
}

const JAPANESE_RANGES: &[(u32, u32)] = &[
    (0x3040, 0x309F), // hiragana
    (0x30A0, 0x30FF), // katakana
    (0x4E00, 0x9FFF), // CJK unified ideographs
    (0xFF00, 0xFFEF), // halfwidth and fullwidth forms
];

// East Asian Width `Na` and `H` ranges from EastAsianWidth.txt.
const HALF_WIDTH_RANGES: &[(u32, u32)] = &[
    (0x0020, 0x007E),
    (0x00A2, 0x00A3),
    (0x00A5, 0x00A6),
    (0x00AC, 0x00AC),
    (0x00AF, 0x00AF),
    (0x20A9, 0x20A9),
    (0x27E6, 0x27ED),
    (0x2985, 0x2986),
    (0xFF61, 0xFFBE),
    (0xFFC2, 0xFFC7),
    (0xFFCA, 0xFFCF),
    (0xFFD2, 0xFFD7),
    (0xFFDA, 0xFFDC),
    (0xFFE8, 0xFFEE),
];

const PUNCTUATION: &[char] = &[
    '\u{3001}', '\u{3002}', '\u{FF0C}', '\u{FF0E}', '\u{30FB}', '\u{FF1A}', '\u{FF1B}',
    '\u{FF1F}', '\u{FF01}',
];

const OPENING_BRACKETS: &[char] = &[
    '\u{FF08}', '\u{FF3B}', '\u{FF5B}', '\u{300C}', '\u{300E}', '\u{3010}', '\u{3014}',
    '\u{3008}', '\u{300A}',
];

const CLOSING_BRACKETS: &[char] = &[
    '\u{FF09}', '\u{FF3D}', '\u{FF5D}', '\u{300D}', '\u{300F}', '\u{3011}', '\u{3015}',
    '\u{3009}', '\u{300B}',
];

fn in_ranges(ch: char, ranges: &[(u32, u32)]) -> bool {
    let cp = ch as u32;
    ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Classify a character.
///
/// Never fails; characters outside every known range get an empty set.
pub fn classify(ch: char) -> CharClass {
    let mut class = CharClass::empty();
    if is_japanese(ch) {
        class |= CharClass::JAPANESE;
    }
    if is_full_width(ch) {
        class |= CharClass::FULL_WIDTH;
    }
    if is_half_width(ch) {
        class |= CharClass::HALF_WIDTH;
    }
    if PUNCTUATION.contains(&ch) {
        class |= CharClass::PUNCTUATION;
    }
    if OPENING_BRACKETS.contains(&ch) {
        class |= CharClass::OPENING_BRACKET;
    }
    if CLOSING_BRACKETS.contains(&ch) {
        class |= CharClass::CLOSING_BRACKET;
    }
    class
}

/// Whether `ch` falls in the Japanese script ranges used for break detection.
#[inline]
pub fn is_japanese(ch: char) -> bool {
    in_ranges(ch, JAPANESE_RANGES)
}

/// Whether `ch` is East Asian Wide or Fullwidth.
#[inline]
pub fn is_full_width(ch: char) -> bool {
    UnicodeWidthChar::width(ch).unwrap_or(0) > 1
}

/// Whether `ch` is East Asian Halfwidth or Narrow.
#[inline]
pub fn is_half_width(ch: char) -> bool {
    in_ranges(ch, HALF_WIDTH_RANGES)
}
