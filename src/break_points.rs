use serde::{Deserialize, Serialize};

use crate::classify::is_japanese;
use crate::rules::RuleSet;

/// Penalty tuning for break point scanning and line filling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Penalty of the synthetic point at offset 0.
    pub start: f64,
    /// Penalty of a break after a space or tab.
    pub whitespace: f64,
    /// Penalty of a break between two Japanese characters.
    pub japanese: f64,
    /// Scale of the quadratic under-fill penalty.
    pub fill_coefficient: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            start: 1000.0,
            whitespace: 50.0,
            japanese: 100.0,
            fill_coefficient: 100.0,
        }
    }
}

/// A candidate line boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BreakPoint {
    /// Character offset the next line starts at, in `0..=len`.
    pub position: usize,
    /// Cost of breaking here.
    pub penalty: f64,
    /// Whether the break must be taken.
    pub mandatory: bool,
}

impl BreakPoint {
    fn optional(position: usize, penalty: f64) -> Self {
        Self {
            position,
            penalty,
            mandatory: false,
        }
    }

    fn mandatory(position: usize) -> Self {
        Self {
            position,
            penalty: 0.0,
            mandatory: true,
        }
    }
}

/// Collects legal and mandatory break positions for a text run.
#[derive(Clone, Copy, Debug)]
pub struct BreakPointScanner<'r> {
    rules: &'r RuleSet,
    penalties: PenaltyConfig,
}

impl<'r> BreakPointScanner<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self::with_penalties(rules, PenaltyConfig::default())
    }

    pub fn with_penalties(rules: &'r RuleSet, penalties: PenaltyConfig) -> Self {
        Self { rules, penalties }
    }

    /// Scan `text` for break opportunities.
    ///
    /// The result is ordered by strictly increasing position. It always
    /// starts with the synthetic point at 0; for non-empty text it ends with
    /// a mandatory point at `text.len()`.
    pub fn find_break_points(&self, text: &[char]) -> Vec<BreakPoint> {
        let mut points = Vec::with_capacity(text.len() / 2 + 2);
        points.push(BreakPoint::optional(0, self.penalties.start));
        if text.is_empty() {
            return points;
        }

        for (i, &ch) in text.iter().enumerate() {
            if ch == '\n' {
                push_point(&mut points, BreakPoint::mandatory(i + 1));
            } else if ch == ' ' || ch == '\t' {
                push_point(
                    &mut points,
                    BreakPoint::optional(i + 1, self.penalties.whitespace),
                );
            } else if i > 0 && is_japanese(text[i - 1]) && is_japanese(ch) {
                if self.breakable_between(text[i - 1], ch) {
                    push_point(&mut points, BreakPoint::optional(i, self.penalties.japanese));
                }
            }
        }

        push_point(&mut points, BreakPoint::mandatory(text.len()));
        log::trace!(
            "scanned {} chars: {} break points",
            text.len(),
            points.len()
        );
        points
    }

    fn breakable_between(&self, before: char, after: char) -> bool {
        !(self.rules.is_line_start_prohibited(after)
            || self.rules.is_line_end_prohibited(before)
            || self.rules.is_inseparable(before)
            || self.rules.is_inseparable(after))
    }

    /// Search space used when no legal break fits the width.
    ///
    /// Every character boundary becomes mandatory, except the one directly
    /// before a newline so the newline stays on the line it terminates.
    pub fn forced_break_points(text: &[char]) -> Vec<BreakPoint> {
        let mut points = Vec::with_capacity(text.len() + 1);
        points.push(BreakPoint::optional(0, 0.0));
        for pos in 1..text.len() {
            if text[pos] != '\n' || text[pos - 1] == '\n' {
                points.push(BreakPoint::mandatory(pos));
            }
        }
        if !text.is_empty() {
            points.push(BreakPoint::mandatory(text.len()));
        }
        points
    }
}

/// Append keeping positions strictly increasing. Same-position points merge
/// and the merged point is mandatory if either was.
fn push_point(points: &mut Vec<BreakPoint>, point: BreakPoint) {
    match points.last_mut() {
        Some(last) if last.position == point.position => {
            if point.mandatory && !last.mandatory {
                *last = point;
            }
        }
        Some(last) => {
            debug_assert!(last.position < point.position);
            points.push(point);
        }
        None => points.push(point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn positions(points: &[BreakPoint]) -> Vec<usize> {
        points.iter().map(|p| p.position).collect()
    }

    #[test]
    fn empty_text_yields_only_the_start_point() {
        let rules = RuleSet::jis_x4051();
        let points = BreakPointScanner::new(&rules).find_break_points(&[]);
        assert_eq!(points, vec![BreakPoint::optional(0, 1000.0)]);
    }

    #[test]
    fn japanese_run_breaks_between_every_pair() {
        let rules = RuleSet::jis_x4051();
        let text = chars("あいう");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 1, 2, 3]);
        assert_eq!(points[1].penalty, 100.0);
        assert!(!points[1].mandatory);
        assert!(points[3].mandatory);
        assert_eq!(points[3].penalty, 0.0);
    }

    #[test]
    fn latin_words_break_only_after_whitespace() {
        let rules = RuleSet::jis_x4051();
        let text = chars("ab cd\tef");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 3, 6, 8]);
        assert_eq!(points[1].penalty, 50.0);
        assert_eq!(points[2].penalty, 50.0);
    }

    #[test]
    fn newline_is_mandatory_and_merges_with_end() {
        let rules = RuleSet::jis_x4051();
        let text = chars("AB\nCD\n");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 3, 6]);
        assert!(points[1].mandatory && points[2].mandatory);
    }

    #[test]
    fn trailing_space_point_becomes_mandatory_at_end() {
        let rules = RuleSet::jis_x4051();
        let text = chars("ab ");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 3]);
        assert!(points[1].mandatory);
        assert_eq!(points[1].penalty, 0.0);
    }

    #[test]
    fn prohibited_pairs_get_no_point() {
        let rules = RuleSet::jis_x4051();
        // （テスト）: no break after （ nor before ）.
        let text = chars("（テスト）");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 2, 3, 5]);
        // ッ may not start a line.
        let text = chars("カップ");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 2, 3]);
    }

    #[test]
    fn inseparable_blocks_both_sides() {
        let mut rules = RuleSet::empty();
        rules.add_inseparable('円');
        let text = chars("百円玉");
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        assert_eq!(positions(&points), vec![0, 3]);
    }

    #[test]
    fn custom_penalties_are_applied() {
        let rules = RuleSet::empty();
        let penalties = PenaltyConfig {
            start: 1.0,
            whitespace: 2.0,
            japanese: 3.0,
            fill_coefficient: 4.0,
        };
        let text = chars("あい う");
        let points = BreakPointScanner::with_penalties(&rules, penalties).find_break_points(&text);
        assert_eq!(points[0].penalty, 1.0);
        assert_eq!(points[1], BreakPoint::optional(1, 3.0));
        assert_eq!(points[2], BreakPoint::optional(3, 2.0));
    }

    #[test]
    fn forced_points_keep_newline_with_its_line() {
        let text = chars("ab\n\ncd");
        let points = BreakPointScanner::forced_break_points(&text);
        assert_eq!(positions(&points), vec![0, 1, 3, 4, 5, 6]);
        assert!(points[1..].iter().all(|p| p.mandatory));
        assert_eq!(positions(&BreakPointScanner::forced_break_points(&[])), vec![0]);
    }
}
