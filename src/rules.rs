use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::TypesetError;

/// One of the four kinsoku character sets held by a [`RuleSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    /// Characters that must not start a line.
    LineStartProhibited,
    /// Characters that must not end a line.
    LineEndProhibited,
    /// Characters that must not be separated from their neighbours.
    Inseparable,
    /// Characters allowed to hang past the line end.
    Hanging,
}

impl RuleKind {
    /// All kinds in file order.
    pub const ALL: [RuleKind; 4] = [
        Self::LineStartProhibited,
        Self::LineEndProhibited,
        Self::Inseparable,
        Self::Hanging,
    ];

    /// Section name used by the rules file format.
    pub fn section_name(self) -> &'static str {
        match self {
            Self::LineStartProhibited => "LineStartProhibited",
            Self::LineEndProhibited => "LineEndProhibited",
            Self::Inseparable => "Inseparable",
            Self::Hanging => "Hanging",
        }
    }

    /// Resolve a section name; unknown names map to `None`.
    pub fn from_section_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.section_name() == name)
    }
}

// Sentence punctuation, closing brackets, small kana, iteration marks,
// dashes and unit symbols.
const DEFAULT_LINE_START_PROHIBITED: &[char] = &[
    '、', '。', '，', '．', '・', '：', '；', '？', '！', '‥', '…', '—', '―', //
    '）', '］', '｝', '」', '』', '】', '〕', '〉', '》', '〗', '〙', '〟', //
    'ゝ', 'ゞ', 'ー', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ッ', 'ャ', 'ュ', 'ョ', 'ヮ', 'ヵ', 'ヶ', //
    'ぁ', 'ぃ', 'ぅ', 'ぇ', 'ぉ', 'っ', 'ゃ', 'ゅ', 'ょ', 'ゎ', '々', '〻', //
    '‐', '゠', '–', '〜', '?', '!', '‼', '⁇', '⁈', '⁉', //
    '℃', '％', '‰', '‱', '°',
];

const DEFAULT_LINE_END_PROHIBITED: &[char] = &[
    '（', '［', '｛', '「', '『', '【', '〔', '〈', '《', '〖', '〘', '〝',
];

const DEFAULT_INSEPARABLE: &[char] = &['$', '￥', '￡', '℃', '°'];

const DEFAULT_HANGING: &[char] = &[
    '、', '。', '，', '．', //
    '）', '］', '｝', '」', '』', '】', '〕', '〉', '》',
];

/// Outcome of loading rules text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RulesLoadSummary {
    /// Content lines whose characters were added.
    pub applied_lines: usize,
    /// Malformed lines that were skipped.
    pub skipped_lines: usize,
    /// Content lines under unknown section headers.
    pub ignored_lines: usize,
}

/// Kinsoku character sets.
///
/// The sets are independent; a character may belong to several or none.
/// A `RuleSet` is read-only while a breaking pass runs and may be edited
/// between passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    line_start_prohibited: BTreeSet<char>,
    line_end_prohibited: BTreeSet<char>,
    inseparable: BTreeSet<char>,
    hanging: BTreeSet<char>,
}

impl RuleSet {
    /// Rule set with no members.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rule set populated with the JIS X 4051 baseline.
    pub fn jis_x4051() -> Self {
        let mut rules = Self::empty();
        rules.set_default_jis_x4051_rules();
        rules
    }

    /// Reset all four sets to the JIS X 4051 baseline.
    pub fn set_default_jis_x4051_rules(&mut self) {
        self.clear();
        self.line_start_prohibited
            .extend(DEFAULT_LINE_START_PROHIBITED.iter().copied());
        self.line_end_prohibited
            .extend(DEFAULT_LINE_END_PROHIBITED.iter().copied());
        self.inseparable.extend(DEFAULT_INSEPARABLE.iter().copied());
        self.hanging.extend(DEFAULT_HANGING.iter().copied());
    }

    /// Remove every member from every set.
    pub fn clear(&mut self) {
        for kind in RuleKind::ALL {
            self.set_mut(kind).clear();
        }
    }

    fn set(&self, kind: RuleKind) -> &BTreeSet<char> {
        match kind {
            RuleKind::LineStartProhibited => &self.line_start_prohibited,
            RuleKind::LineEndProhibited => &self.line_end_prohibited,
            RuleKind::Inseparable => &self.inseparable,
            RuleKind::Hanging => &self.hanging,
        }
    }

    fn set_mut(&mut self, kind: RuleKind) -> &mut BTreeSet<char> {
        match kind {
            RuleKind::LineStartProhibited => &mut self.line_start_prohibited,
            RuleKind::LineEndProhibited => &mut self.line_end_prohibited,
            RuleKind::Inseparable => &mut self.inseparable,
            RuleKind::Hanging => &mut self.hanging,
        }
    }

    /// Add `ch` to the `kind` set. Re-adding is a no-op.
    pub fn add(&mut self, kind: RuleKind, ch: char) {
        self.set_mut(kind).insert(ch);
    }

    /// Remove `ch` from the `kind` set. Returns whether it was present.
    pub fn remove(&mut self, kind: RuleKind, ch: char) -> bool {
        self.set_mut(kind).remove(&ch)
    }

    /// Whether `ch` belongs to the `kind` set.
    pub fn contains(&self, kind: RuleKind, ch: char) -> bool {
        self.set(kind).contains(&ch)
    }

    /// Members of the `kind` set in code point order.
    pub fn chars(&self, kind: RuleKind) -> impl Iterator<Item = char> + '_ {
        self.set(kind).iter().copied()
    }

    /// Number of members in the `kind` set.
    pub fn len(&self, kind: RuleKind) -> usize {
        self.set(kind).len()
    }

    /// Whether all four sets are empty.
    pub fn is_empty(&self) -> bool {
        RuleKind::ALL.into_iter().all(|kind| self.set(kind).is_empty())
    }

    pub fn add_line_start_prohibited(&mut self, ch: char) {
        self.add(RuleKind::LineStartProhibited, ch);
    }

    pub fn remove_line_start_prohibited(&mut self, ch: char) -> bool {
        self.remove(RuleKind::LineStartProhibited, ch)
    }

    pub fn is_line_start_prohibited(&self, ch: char) -> bool {
        self.line_start_prohibited.contains(&ch)
    }

    pub fn add_line_end_prohibited(&mut self, ch: char) {
        self.add(RuleKind::LineEndProhibited, ch);
    }

    pub fn remove_line_end_prohibited(&mut self, ch: char) -> bool {
        self.remove(RuleKind::LineEndProhibited, ch)
    }

    pub fn is_line_end_prohibited(&self, ch: char) -> bool {
        self.line_end_prohibited.contains(&ch)
    }

    pub fn add_inseparable(&mut self, ch: char) {
        self.add(RuleKind::Inseparable, ch);
    }

    pub fn remove_inseparable(&mut self, ch: char) -> bool {
        self.remove(RuleKind::Inseparable, ch)
    }

    pub fn is_inseparable(&self, ch: char) -> bool {
        self.inseparable.contains(&ch)
    }

    pub fn add_hanging(&mut self, ch: char) {
        self.add(RuleKind::Hanging, ch);
    }

    pub fn remove_hanging(&mut self, ch: char) -> bool {
        self.remove(RuleKind::Hanging, ch)
    }

    pub fn is_hanging(&self, ch: char) -> bool {
        self.hanging.contains(&ch)
    }

    /// Merge rules text into this set.
    ///
    /// The format is a sequence of `[Section]` headers, each followed by
    /// comma-separated `U+XXXX` literals. Malformed lines are skipped and
    /// logged; unknown sections are ignored.
    pub fn load_str(&mut self, text: &str) -> RulesLoadSummary {
        let mut summary = RulesLoadSummary::default();
        // Outer None: no header seen yet. Inner None: unknown section.
        let mut section: Option<Option<RuleKind>> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let kind = RuleKind::from_section_name(name.trim());
                if kind.is_none() {
                    log::debug!("ignoring unknown rules section [{}]", name);
                }
                section = Some(kind);
                continue;
            }
            let kind = match section {
                Some(Some(kind)) => kind,
                Some(None) => {
                    summary.ignored_lines += 1;
                    continue;
                }
                None => {
                    log::warn!("rules line {} precedes any section header; skipped", idx + 1);
                    summary.skipped_lines += 1;
                    continue;
                }
            };
            match parse_code_point_list(line) {
                Ok(chars) => {
                    self.set_mut(kind).extend(chars);
                    summary.applied_lines += 1;
                }
                Err(token) => {
                    log::warn!(
                        "malformed rules line {} in [{}]: bad token '{}'; skipped",
                        idx + 1,
                        kind.section_name(),
                        token
                    );
                    summary.skipped_lines += 1;
                }
            }
        }
        summary
    }

    /// Serialize all four sets in the rules file format.
    pub fn to_rules_string(&self) -> String {
        let mut out = String::with_capacity(256);
        for (idx, kind) in RuleKind::ALL.into_iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push('[');
            out.push_str(kind.section_name());
            out.push_str("]\n");
            for (n, ch) in self.chars(kind).enumerate() {
                if n > 0 {
                    out.push(',');
                }
                let _ = write!(out, "U+{:04X}", ch as u32);
            }
            out.push('\n');
        }
        out
    }

    /// Merge rules from a file. See [`RuleSet::load_str`].
    pub fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<RulesLoadSummary, TypesetError> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|err| TypesetError::io("RULES_READ", path, err))?;
        let summary = self.load_str(&text);
        if summary.skipped_lines > 0 {
            log::warn!(
                "{}: skipped {} malformed rules line(s)",
                path.display(),
                summary.skipped_lines
            );
        }
        Ok(summary)
    }

    /// Write all four sets to a file. See [`RuleSet::to_rules_string`].
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), TypesetError> {
        let path = path.as_ref();
        fs::write(path, self.to_rules_string())
            .map_err(|err| TypesetError::io("RULES_WRITE", path, err))
    }
}

/// Parse `U+XXXX,U+YYYY,...`. On failure returns the offending token.
fn parse_code_point_list(line: &str) -> Result<Vec<char>, &str> {
    let mut out = Vec::with_capacity(line.len() / 6 + 1);
    for token in line.split(',') {
        let token = token.trim();
        // Tolerate a trailing comma.
        if token.is_empty() {
            continue;
        }
        let hex = token
            .strip_prefix("U+")
            .or_else(|| token.strip_prefix("u+"))
            .ok_or(token)?;
        if hex.is_empty() || hex.len() > 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(token);
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| token)?;
        out.push(char::from_u32(value).ok_or(token)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut rules = RuleSet::empty();
        rules.add_line_start_prohibited('ッ');
        assert!(rules.is_line_start_prohibited('ッ'));
        rules.add_line_start_prohibited('ッ');
        assert!(rules.is_line_start_prohibited('ッ'));
        assert_eq!(rules.len(RuleKind::LineStartProhibited), 1);
    }

    #[test]
    fn sets_are_independent() {
        let mut rules = RuleSet::empty();
        rules.add_hanging('。');
        assert!(rules.is_hanging('。'));
        assert!(!rules.is_line_start_prohibited('。'));
        assert!(!rules.is_line_end_prohibited('。'));
        assert!(!rules.is_inseparable('。'));
        assert!(rules.remove_hanging('。'));
        assert!(!rules.remove_hanging('。'));
        assert!(rules.is_empty());
    }

    #[test]
    fn defaults_cover_documented_categories() {
        let rules = RuleSet::jis_x4051();
        for ch in ['\u{FF09}', '\u{300D}', '\u{3001}', '\u{3002}', '\u{30FB}', 'ゃ', '々'] {
            assert!(rules.is_line_start_prohibited(ch), "{ch}");
        }
        for ch in ['\u{FF08}', '\u{300C}', '\u{3010}', '\u{300A}'] {
            assert!(rules.is_line_end_prohibited(ch), "{ch}");
        }
        for ch in ['\u{0024}', '\u{FFE5}', '\u{FFE1}', '\u{2103}', '\u{00B0}'] {
            assert!(rules.is_inseparable(ch), "{ch}");
        }
        for ch in ['、', '。', '」', '）'] {
            assert!(rules.is_hanging(ch), "{ch}");
        }
        assert!(!rules.is_hanging('（'));
    }

    #[test]
    fn set_default_rules_resets_to_baseline() {
        let mut rules = RuleSet::jis_x4051();
        rules.add_line_start_prohibited('x');
        rules.remove_line_end_prohibited('（');
        rules.set_default_jis_x4051_rules();
        assert_eq!(rules, RuleSet::jis_x4051());
    }

    #[test]
    fn rules_text_roundtrip_is_lossless() {
        let mut rules = RuleSet::jis_x4051();
        rules.add_inseparable('\u{10FFFF}');
        rules.add_hanging('\u{0}');
        let text = rules.to_rules_string();

        let mut loaded = RuleSet::empty();
        let summary = loaded.load_str(&text);
        assert_eq!(loaded, rules);
        assert_eq!(summary.skipped_lines, 0);
        assert_eq!(summary.applied_lines, 4);
    }

    #[test]
    fn saved_empty_sets_load_back_empty() {
        let mut loaded = RuleSet::empty();
        loaded.load_str(&RuleSet::empty().to_rules_string());
        assert!(loaded.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = "U+3001\n\
                    [LineStartProhibited]\n\
                    U+3001,U+3002\n\
                    U+ZZZZ,U+3003\n\
                    U+D800\n\
                    \n\
                    [Future]\n\
                    U+0041\n\
                    [Hanging]\n\
                    u+3002, U+300D ,\n";
        let mut rules = RuleSet::empty();
        let summary = rules.load_str(text);
        assert_eq!(
            summary,
            RulesLoadSummary {
                applied_lines: 2,
                skipped_lines: 3,
                ignored_lines: 1,
            }
        );
        assert!(rules.is_line_start_prohibited('、'));
        assert!(rules.is_line_start_prohibited('。'));
        assert!(!rules.is_line_start_prohibited('〃'));
        assert!(rules.is_hanging('。'));
        assert!(rules.is_hanging('」'));
        assert_eq!(rules.len(RuleKind::LineEndProhibited), 0);
    }

    #[test]
    fn signed_code_points_are_rejected() {
        let mut rules = RuleSet::empty();
        let summary = rules.load_str("[LineStartProhibited]\nU++3001\nU+-3002\nU+3000\n");
        assert_eq!(summary.applied_lines, 1);
        assert_eq!(summary.skipped_lines, 2);
        assert!(!rules.is_line_start_prohibited('、'));
        assert!(!rules.is_line_start_prohibited('。'));
        assert!(rules.is_line_start_prohibited('\u{3000}'));
    }

    #[test]
    fn short_hex_without_leading_zeros_is_accepted() {
        let mut rules = RuleSet::empty();
        rules.load_str("[Inseparable]\nU+24\n");
        assert!(rules.is_inseparable('$'));
    }

    #[test]
    fn loading_merges_into_existing_sets() {
        let mut rules = RuleSet::empty();
        rules.add_hanging('、');
        rules.load_str("[Hanging]\nU+3002\n");
        assert!(rules.is_hanging('、'));
        assert!(rules.is_hanging('。'));
    }
}
