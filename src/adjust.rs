use crate::engine::TextLine;
use crate::rules::RuleSet;

/// Post-break repair of kinsoku violations across soft line boundaries.
///
/// Runs a single pass over adjacent line pairs. A character moved onto a
/// new line is not re-checked against that line's other neighbour.
#[derive(Clone, Copy, Debug)]
pub struct ProhibitionAdjuster<'r> {
    rules: &'r RuleSet,
}

impl<'r> ProhibitionAdjuster<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Move line-end-prohibited characters down and line-start-prohibited
    /// characters up. Line count never changes; returns the number of moves.
    pub fn adjust<F>(&self, lines: &mut [TextLine<'_>], width_fn: F) -> usize
    where
        F: Fn(char) -> f64,
    {
        let mut moves = 0;
        for idx in 1..lines.len() {
            let (head, tail) = lines.split_at_mut(idx);
            let current = &mut head[idx - 1];
            let next = &mut tail[0];
            if current.has_line_break || next.is_empty() {
                continue;
            }
            debug_assert_eq!(current.end, next.start, "soft-broken lines are contiguous");

            if let Some(last) = current.last() {
                if self.rules.is_line_end_prohibited(last) {
                    let w = width_fn(last);
                    current.end -= 1;
                    current.width -= w;
                    next.start -= 1;
                    next.width += w;
                    moves += 1;
                }
            }
            if let Some(first) = next.first() {
                if self.rules.is_line_start_prohibited(first) {
                    let w = width_fn(first);
                    next.start += 1;
                    next.width -= w;
                    current.end += 1;
                    current.width += w;
                    moves += 1;
                }
            }
        }
        if moves > 0 {
            log::debug!("prohibition pass moved {} character(s)", moves);
        }
        moves
    }
}

/// Spreads the deficit of loose soft-broken lines over inter-character gaps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Justifier {
    min_fill_ratio: f64,
}

impl Default for Justifier {
    fn default() -> Self {
        Self::new(0.95)
    }
}

impl Justifier {
    pub fn new(min_fill_ratio: f64) -> Self {
        Self { min_fill_ratio }
    }

    /// Justify every line filled below `min_fill_ratio * max_width`.
    ///
    /// Lines ending on a mandatory break and lines with fewer than two
    /// characters are left alone. Justified lines report `max_width`.
    pub fn justify(&self, lines: &mut [TextLine<'_>], max_width: f64) -> usize {
        if !max_width.is_finite() || max_width <= 0.0 {
            return 0;
        }
        let threshold = max_width * self.min_fill_ratio;
        let mut justified = 0;
        for line in lines.iter_mut() {
            if line.has_line_break || line.len() < 2 || line.width >= threshold {
                continue;
            }
            let gaps = (line.len() - 1) as f64;
            line.justification_spacing = (max_width - line.width) / gaps;
            line.width = max_width;
            justified += 1;
        }
        log::trace!("justified {} of {} lines", justified, lines.len());
        justified
    }
}

/// Lets a trailing hanging character protrude past the line end.
#[derive(Clone, Copy, Debug)]
pub struct HangingAdjuster<'r> {
    rules: &'r RuleSet,
    hang_ratio: f64,
}

impl<'r> HangingAdjuster<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self::with_ratio(rules, 0.5)
    }

    pub fn with_ratio(rules: &'r RuleSet, hang_ratio: f64) -> Self {
        Self { rules, hang_ratio }
    }

    /// Reduce the reported width of lines ending in a hanging character.
    pub fn adjust<F>(&self, lines: &mut [TextLine<'_>], width_fn: F) -> usize
    where
        F: Fn(char) -> f64,
    {
        let mut hung = 0;
        for line in lines.iter_mut() {
            let Some(last) = line.last() else {
                continue;
            };
            if self.rules.is_hanging(last) {
                line.width -= width_fn(last) * self.hang_ratio;
                hung += 1;
            }
        }
        hung
    }
}
