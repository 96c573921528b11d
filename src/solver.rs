use std::borrow::Cow;
use std::cmp::Ordering;

use crate::break_points::{BreakPoint, BreakPointScanner, PenaltyConfig};

/// Accumulated cost of a partial break path.
///
/// Paths with fewer overflowing lines always win; penalty breaks ties.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Cost {
    overflows: usize,
    penalty: f64,
}

impl Cost {
    const ZERO: Cost = Cost {
        overflows: 0,
        penalty: 0.0,
    };

    fn extend(self, overflow: bool, penalty: f64) -> Self {
        Self {
            overflows: self.overflows + usize::from(overflow),
            penalty: self.penalty + penalty,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.overflows
            .cmp(&other.overflows)
            .then(self.penalty.total_cmp(&other.penalty))
    }
}

/// Minimum-penalty line breaking over scanned break points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptimalBreakSolver {
    fill_coefficient: f64,
}

impl Default for OptimalBreakSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimalBreakSolver {
    pub fn new() -> Self {
        Self::with_penalties(PenaltyConfig::default())
    }

    pub fn with_penalties(penalties: PenaltyConfig) -> Self {
        Self {
            fill_coefficient: penalties.fill_coefficient,
        }
    }

    /// Quadratic cost of leaving a line short of `max_width`.
    pub fn fill_penalty(&self, width: f64, max_width: f64) -> f64 {
        if width < max_width && max_width > 0.0 {
            let slack = 1.0 - width / max_width;
            self.fill_coefficient * slack * slack
        } else {
            0.0
        }
    }

    /// Choose break offsets for `text`.
    ///
    /// `breakpoints` must be ordered by strictly increasing position, as
    /// produced by [`BreakPointScanner::find_break_points`]. The returned
    /// offsets are in reading order and exclude `0` and `text.len()`.
    ///
    /// Every mandatory point is kept. When `max_width` is NaN, not positive,
    /// or narrower than some character, the text is broken after every
    /// character instead. An infinite width never forces a break.
    pub fn calculate_optimal_breaks<F>(
        &self,
        text: &[char],
        breakpoints: &[BreakPoint],
        width_fn: F,
        max_width: f64,
    ) -> Vec<usize>
    where
        F: Fn(char) -> f64,
    {
        if breakpoints.len() < 2 {
            return Vec::new();
        }
        debug_assert!(
            breakpoints.windows(2).all(|w| w[0].position < w[1].position),
            "break points must be strictly increasing"
        );

        let mut prefix = Vec::with_capacity(text.len() + 1);
        prefix.push(0.0);
        let mut acc = 0.0f64;
        let mut widest = 0.0f64;
        for &ch in text {
            let w = if ch == '\n' { 0.0 } else { sanitize(width_fn(ch)) };
            widest = widest.max(w);
            acc += w;
            prefix.push(acc);
        }

        let degenerate = max_width.is_nan() || max_width <= 0.0 || widest > max_width;
        let points: Cow<'_, [BreakPoint]> = if degenerate {
            log::debug!(
                "max width {} unusable (widest char {}); breaking per character",
                max_width,
                widest
            );
            Cow::Owned(BreakPointScanner::forced_break_points(text))
        } else {
            Cow::Borrowed(breakpoints)
        };
        if points.len() < 2 {
            return Vec::new();
        }

        let n = points.len();
        let last = n - 1;
        let mut best: Vec<Option<Cost>> = vec![None; n];
        let mut prev = vec![0usize; n];
        best[0] = Some(Cost::ZERO);
        // Most recent mandatory index; no transition may jump over it.
        let mut floor = 0usize;

        for j in 1..n {
            let end = points[j].position.min(text.len());
            let must_reach = points[j].mandatory || j == last;
            for i in (floor..j).rev() {
                let Some(base) = best[i] else {
                    continue;
                };
                let start = points[i].position.min(end);
                let width = prefix[end] - prefix[start];
                let overflow = width > max_width;
                if overflow && !must_reach {
                    // Segments only widen as i moves back.
                    break;
                }
                let cost = base.extend(
                    overflow,
                    self.fill_penalty(width, max_width) + points[j].penalty,
                );
                let better = match best[j] {
                    Some(current) => cost.compare(&current) == Ordering::Less,
                    None => true,
                };
                if better {
                    best[j] = Some(cost);
                    prev[j] = i;
                }
            }
            if points[j].mandatory {
                floor = j;
            }
        }

        let mut breaks = Vec::with_capacity(n);
        let mut j = prev[last];
        while j > 0 {
            breaks.push(points[j].position);
            j = prev[j];
        }
        breaks.reverse();
        if let Some(cost) = best[last] {
            log::trace!(
                "solved {} points: {} breaks, {} overflowing, penalty {:.3}",
                n,
                breaks.len(),
                cost.overflows,
                cost.penalty
            );
        }
        breaks
    }
}

fn sanitize(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn unit(_: char) -> f64 {
        1.0
    }

    fn solve(text: &str, max_width: f64) -> Vec<usize> {
        let rules = RuleSet::jis_x4051();
        let text = chars(text);
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        OptimalBreakSolver::new().calculate_optimal_breaks(&text, &points, unit, max_width)
    }

    fn point(position: usize, penalty: f64, mandatory: bool) -> BreakPoint {
        BreakPoint {
            position,
            penalty,
            mandatory,
        }
    }

    #[test]
    fn fewer_than_two_points_yields_no_breaks() {
        let solver = OptimalBreakSolver::new();
        assert!(solver.calculate_optimal_breaks(&[], &[], unit, 10.0).is_empty());
        let only_start = [point(0, 1000.0, false)];
        assert!(solver
            .calculate_optimal_breaks(&chars("abc"), &only_start, unit, 10.0)
            .is_empty());
    }

    #[test]
    fn newline_splits_even_when_everything_fits() {
        assert_eq!(solve("AB\nCD", 1000.0), vec![3]);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert!(solve("あいうえお", 10.0).is_empty());
    }

    #[test]
    fn prefers_balanced_lines_over_greedy_fill() {
        // Greedy would take "aa bb " then "cc".
        assert_eq!(solve("aa bb cc", 6.0), vec![3]);
    }

    #[test]
    fn every_line_fits_when_a_fitting_path_exists() {
        let text = chars("あいうえおかきくけこさしすせそ");
        let rules = RuleSet::jis_x4051();
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        let breaks = OptimalBreakSolver::new().calculate_optimal_breaks(&text, &points, unit, 4.0);
        let mut start = 0;
        for end in breaks.iter().copied().chain([text.len()]) {
            assert!(end - start <= 4, "segment {start}..{end}");
            start = end;
        }
    }

    #[test]
    fn fitting_path_beats_cheaper_overflow() {
        let text = chars("aaaa");
        let points = [
            point(0, 1000.0, false),
            point(2, 10_000.0, false),
            point(4, 0.0, true),
        ];
        let breaks = OptimalBreakSolver::new().calculate_optimal_breaks(&text, &points, unit, 3.0);
        assert_eq!(breaks, vec![2]);
    }

    #[test]
    fn mandatory_points_are_never_skipped() {
        let text = chars("a\nbc");
        let points = [
            point(0, 1000.0, false),
            point(2, 0.0, true),
            point(4, 0.0, true),
        ];
        let breaks =
            OptimalBreakSolver::new().calculate_optimal_breaks(&text, &points, unit, 1000.0);
        assert_eq!(breaks, vec![2]);
    }

    #[test]
    fn overflow_is_accepted_when_no_break_fits() {
        // Single unbreakable word wider than the line.
        assert!(solve("abcdefgh", 4.0).is_empty());
        // Overflowing lines only end at mandatory points.
        assert_eq!(solve("abcdefgh\nij", 4.0), vec![9]);
    }

    #[test]
    fn degenerate_widths_break_after_every_character() {
        let wide = |_: char| 10.0;
        let text = chars("あいう");
        let rules = RuleSet::jis_x4051();
        let points = BreakPointScanner::new(&rules).find_break_points(&text);
        let solver = OptimalBreakSolver::new();
        for max_width in [5.0, 0.0, -3.0, f64::NAN, f64::NEG_INFINITY] {
            assert_eq!(
                solver.calculate_optimal_breaks(&text, &points, wide, max_width),
                vec![1, 2],
                "max_width {max_width}"
            );
        }
    }

    #[test]
    fn infinite_width_keeps_paragraphs_whole() {
        assert!(solve("あいうえお", f64::INFINITY).is_empty());
        assert_eq!(solve("あいう\nえお", f64::INFINITY), vec![4]);
    }

    #[test]
    fn degenerate_breaking_keeps_newlines_attached() {
        assert_eq!(solve("ab\ncd", 0.0), vec![1, 3, 4]);
    }

    #[test]
    fn fill_penalty_is_quadratic_and_zero_when_full() {
        let solver = OptimalBreakSolver::new();
        assert_eq!(solver.fill_penalty(10.0, 10.0), 0.0);
        assert_eq!(solver.fill_penalty(12.0, 10.0), 0.0);
        assert!((solver.fill_penalty(5.0, 10.0) - 25.0).abs() < 1e-9);
        assert!((solver.fill_penalty(0.0, 10.0) - 100.0).abs() < 1e-9);
    }
}
