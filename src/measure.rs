use crate::classify::is_half_width;
use crate::style::Style;

/// Advance-width provider for layout.
///
/// Implementations must be deterministic for a given `(ch, style, vertical)`
/// triple; the solver and adjusters call it repeatedly for the same input.
pub trait CharacterWidth: Send + Sync {
    /// Advance of `ch` in the inline direction for `style`.
    fn char_width(&self, ch: char, style: &Style, vertical: bool) -> f64;
}

impl<F> CharacterWidth for F
where
    F: Fn(char, &Style, bool) -> f64 + Send + Sync,
{
    fn char_width(&self, ch: char, style: &Style, vertical: bool) -> f64 {
        self(ch, style, vertical)
    }
}

/// Font-size based width heuristic.
///
/// Half-width characters advance half an em, everything else a full em.
/// `Style::character_spacing` (in ems) is added to every character as
/// trailing advance, so a line of n characters carries n gaps, the last one
/// included. Break decisions therefore account for the spacing too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontSizeWidth;

impl CharacterWidth for FontSizeWidth {
    fn char_width(&self, ch: char, style: &Style, _vertical: bool) -> f64 {
        let base = if is_half_width(ch) {
            style.font_size * 0.5
        } else {
            style.font_size
        };
        base + style.character_spacing * style.font_size
    }
}
