use core::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::adjust::{HangingAdjuster, Justifier, ProhibitionAdjuster};
use crate::break_points::{BreakPointScanner, PenaltyConfig};
use crate::error::TypesetError;
use crate::measure::{CharacterWidth, FontSizeWidth};
use crate::rules::RuleSet;
use crate::solver::OptimalBreakSolver;
use crate::style::{Style, TextAlignment};

/// Baseline offset from the line top, as a fraction of the font size.
const BASELINE_RATIO: f64 = 0.8;

/// Kinsoku repair policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProhibitionConfig {
    /// Run the post-break prohibition pass.
    pub enabled: bool,
}

impl Default for ProhibitionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Justification policy, applied when the style alignment is `Justify`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JustificationConfig {
    /// Lines filled below this fraction of the max width are justified.
    pub min_fill_ratio: f64,
}

impl Default for JustificationConfig {
    fn default() -> Self {
        Self {
            min_fill_ratio: 0.95,
        }
    }
}

/// Hanging punctuation policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HangingConfig {
    /// Apply hanging to trailing hanging characters.
    pub enabled: bool,
    /// Fraction of the hanging character's width allowed past the line end.
    pub hang_ratio: f64,
}

impl Default for HangingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hang_ratio: 0.5,
        }
    }
}

/// Engine tuning surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesetConfig {
    /// Break point and fill penalties.
    pub penalties: PenaltyConfig,
    /// Post-break prohibition repair.
    pub prohibition: ProhibitionConfig,
    /// Justification of loose lines.
    pub justification: JustificationConfig,
    /// Hanging punctuation.
    pub hanging: HangingConfig,
}

impl TypesetConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TypesetError> {
        serde_json::from_str(json).map_err(|err| {
            TypesetError::new("CONFIG_PARSE", err.to_string()).with_line(err.line())
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TypesetError> {
        let path = path.as_ref();
        let json =
            fs::read_to_string(path).map_err(|err| TypesetError::io("CONFIG_READ", path, err))?;
        Self::from_json_str(&json).map_err(|err| err.with_path(path.display().to_string()))
    }
}

/// One typeset line borrowing its characters from the source text.
#[derive(Clone, Copy, PartialEq)]
pub struct TextLine<'a> {
    source: &'a [char],
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// Reported advance in the inline direction.
    pub width: f64,
    pub height: f64,
    /// Baseline offset from the top of the line.
    pub baseline: f64,
    /// The line was ended by a newline. The newline is not part of the line.
    pub has_line_break: bool,
    /// Extra gap per inter-character position when justified.
    pub justification_spacing: f64,
}

impl<'a> TextLine<'a> {
    pub(crate) fn new(source: &'a [char], start: usize, end: usize, has_line_break: bool) -> Self {
        debug_assert!(start <= end && end <= source.len());
        Self {
            source,
            start,
            end,
            width: 0.0,
            height: 0.0,
            baseline: 0.0,
            has_line_break,
            justification_spacing: 0.0,
        }
    }

    /// Characters on this line.
    pub fn chars(&self) -> &'a [char] {
        &self.source[self.start..self.end]
    }

    pub fn text(&self) -> String {
        self.chars().iter().collect()
    }

    /// Character range of this line within the source text.
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn first(&self) -> Option<char> {
        self.chars().first().copied()
    }

    pub fn last(&self) -> Option<char> {
        self.chars().last().copied()
    }
}

impl fmt::Debug for TextLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLine")
            .field("text", &self.text())
            .field("range", &self.range())
            .field("width", &self.width)
            .field("has_line_break", &self.has_line_break)
            .field("justification_spacing", &self.justification_spacing)
            .finish()
    }
}

impl Serialize for TextLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut line = serializer.serialize_struct("TextLine", 8)?;
        line.serialize_field("text", &self.text())?;
        line.serialize_field("start", &self.start)?;
        line.serialize_field("end", &self.end)?;
        line.serialize_field("width", &self.width)?;
        line.serialize_field("height", &self.height)?;
        line.serialize_field("baseline", &self.baseline)?;
        line.serialize_field("has_line_break", &self.has_line_break)?;
        line.serialize_field("justification_spacing", &self.justification_spacing)?;
        line.end()
    }
}

/// Result of one typeset call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBlock<'a> {
    pub lines: Vec<TextLine<'a>>,
    /// Target line width the block was set to.
    pub width: f64,
    /// Sum of line heights.
    pub height: f64,
}

impl<'a> TextBlock<'a> {
    fn new(lines: Vec<TextLine<'a>>, width: f64) -> Self {
        let height = lines.iter().map(|line| line.height).sum();
        Self {
            lines,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Rebuild the source text from the lines.
    pub fn to_source_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.extend(line.chars());
            if line.has_line_break {
                out.push('\n');
            }
        }
        out
    }
}

/// Japanese line breaking engine.
///
/// Holds a [`RuleSet`], tuning config and an optional width provider. A
/// call never mutates the engine, so one engine may serve many threads.
#[derive(Clone)]
pub struct TypesettingEngine {
    rules: RuleSet,
    config: TypesetConfig,
    character_width: Option<Arc<dyn CharacterWidth>>,
}

impl fmt::Debug for TypesettingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypesettingEngine")
            .field("rules", &self.rules)
            .field("config", &self.config)
            .field("has_character_width", &self.character_width.is_some())
            .finish()
    }
}

impl Default for TypesettingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TypesettingEngine {
    /// Engine with JIS X 4051 rules and default tuning.
    pub fn new() -> Self {
        Self {
            rules: RuleSet::jis_x4051(),
            config: TypesetConfig::default(),
            character_width: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_config(mut self, config: TypesetConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a width provider in place of the font-size heuristic.
    pub fn with_character_width(mut self, width: Arc<dyn CharacterWidth>) -> Self {
        self.character_width = Some(width);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Mutable rules for edits between typeset calls.
    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
    }

    pub fn config(&self) -> &TypesetConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TypesetConfig) {
        self.config = config;
    }

    /// Advance of `ch` from the installed provider or [`FontSizeWidth`].
    pub fn character_width(&self, ch: char, style: &Style, vertical: bool) -> f64 {
        match self.character_width.as_deref() {
            Some(width) => width.char_width(ch, style, vertical),
            None => FontSizeWidth.char_width(ch, style, vertical),
        }
    }

    /// Total advance of `text`. Newlines have no width.
    pub fn text_width(&self, text: &[char], style: &Style, vertical: bool) -> f64 {
        text.iter()
            .filter(|&&ch| ch != '\n')
            .map(|&ch| self.character_width(ch, style, vertical))
            .sum()
    }

    /// Break `text` into measured lines without any post-break adjustment.
    pub fn break_lines<'a>(
        &self,
        text: &'a [char],
        style: &Style,
        max_width: f64,
        vertical: bool,
    ) -> Vec<TextLine<'a>> {
        if text.is_empty() {
            return Vec::new();
        }
        let penalties = self.config.penalties;
        let points =
            BreakPointScanner::with_penalties(&self.rules, penalties).find_break_points(text);
        let breaks = OptimalBreakSolver::with_penalties(penalties)
            .calculate_optimal_breaks(
                text,
                &points,
                |ch| self.character_width(ch, style, vertical),
                max_width,
            );
        self.slice_lines(text, &breaks, style, vertical)
    }

    fn slice_lines<'a>(
        &self,
        text: &'a [char],
        breaks: &[usize],
        style: &Style,
        vertical: bool,
    ) -> Vec<TextLine<'a>> {
        let height = style.line_pitch();
        let baseline = style.font_size * BASELINE_RATIO;
        let mut lines = Vec::with_capacity(breaks.len() + 1);
        let mut start = 0usize;
        for end in breaks.iter().copied().chain(core::iter::once(text.len())) {
            if end <= start || end > text.len() {
                continue;
            }
            let has_line_break = text[end - 1] == '\n';
            let content_end = if has_line_break { end - 1 } else { end };
            let mut line = TextLine::new(text, start, content_end, has_line_break);
            line.width = self.text_width(line.chars(), style, vertical);
            line.height = height;
            line.baseline = baseline;
            lines.push(line);
            start = end;
        }
        lines
    }

    /// Typeset `text` into a block of lines no wider than `max_width`.
    ///
    /// Lines come from the penalty solver, then pass through prohibition
    /// repair, justification and hanging in that order. Empty text yields an
    /// empty block.
    pub fn typeset_text<'a>(
        &self,
        text: &'a [char],
        style: &Style,
        max_width: f64,
        vertical: bool,
    ) -> TextBlock<'a> {
        let mut lines = self.break_lines(text, style, max_width, vertical);
        let width_of = |ch: char| self.character_width(ch, style, vertical);

        if self.config.prohibition.enabled {
            ProhibitionAdjuster::new(&self.rules).adjust(&mut lines, width_of);
        }
        if style.text_alignment == TextAlignment::Justify {
            Justifier::new(self.config.justification.min_fill_ratio).justify(&mut lines, max_width);
        }
        if self.config.hanging.enabled {
            HangingAdjuster::with_ratio(&self.rules, self.config.hanging.hang_ratio)
                .adjust(&mut lines, width_of);
        }

        log::debug!(
            "typeset {} chars into {} lines (max width {}, vertical {})",
            text.len(),
            lines.len(),
            max_width,
            vertical
        );
        TextBlock::new(lines, max_width)
    }
}
