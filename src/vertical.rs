//! Glyph substitution and rotation hints for vertical writing.
//!
//! Line breaking is direction-agnostic; these helpers are applied by output
//! code after lines are chosen.

// (horizontal, vertical presentation form)
const VERTICAL_FORMS: &[(char, char)] = &[
    ('(', '\u{FE35}'),
    (')', '\u{FE36}'),
    ('[', '\u{FE47}'),
    (']', '\u{FE48}'),
    ('{', '\u{FE37}'),
    ('}', '\u{FE38}'),
    ('<', '\u{FE3F}'),
    ('>', '\u{FE40}'),
    ('\u{00AB}', '\u{FE3D}'),
    ('\u{00BB}', '\u{FE3E}'),
    ('\u{2014}', '\u{FE31}'),
    ('\u{FF0D}', '\u{FF5C}'),
    ('\u{2026}', '\u{FE19}'),
];

/// Vertical presentation form of `ch`, or `ch` itself.
pub fn to_vertical_form(ch: char) -> char {
    VERTICAL_FORMS
        .iter()
        .find(|&&(h, _)| h == ch)
        .map_or(ch, |&(_, v)| v)
}

/// Inverse of [`to_vertical_form`].
pub fn to_horizontal_form(ch: char) -> char {
    VERTICAL_FORMS
        .iter()
        .find(|&&(_, v)| v == ch)
        .map_or(ch, |&(h, _)| h)
}

pub fn to_vertical_string(text: &str) -> String {
    text.chars().map(to_vertical_form).collect()
}

pub fn to_horizontal_string(text: &str) -> String {
    text.chars().map(to_horizontal_form).collect()
}

/// Clockwise rotation in degrees for drawing `ch`.
///
/// Latin letters, digits and a few ASCII symbols lie on their side in
/// vertical text; everything else is upright.
pub fn rotation_degrees(ch: char, vertical: bool) -> u16 {
    if !vertical {
        return 0;
    }
    if ch.is_ascii_alphanumeric() || matches!(ch, '/' | '\\' | '|' | '-' | '_' | '=' | '+' | '*') {
        90
    } else {
        0
    }
}
