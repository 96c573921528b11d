use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesetError;

/// Inline alignment of a typeset line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAlignment {
    Left,
    Right,
    Center,
    #[default]
    Justify,
}

impl TextAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Center => "Center",
            Self::Justify => "Justify",
        }
    }
}

impl FromStr for TextAlignment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            "justify" => Ok(Self::Justify),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TextAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strictness of line breaking. Carried for output layers; the breaking
/// rules themselves come from the engine's `RuleSet`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineBreakMode {
    #[default]
    Normal,
    Strict,
    Loose,
}

impl LineBreakMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Strict => "Strict",
            Self::Loose => "Loose",
        }
    }
}

impl FromStr for LineBreakMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LineBreakMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typographic style of a text run.
///
/// Sizes are in points; spacings and indents are in ems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub font_family: String,
    pub font_size: f64,
    /// Line pitch as a multiple of `font_size`.
    pub line_height: f64,
    pub text_alignment: TextAlignment,
    pub line_break_mode: LineBreakMode,
    /// Extra advance added to every character.
    pub character_spacing: f64,
    pub word_spacing: f64,
    pub paragraph_spacing_before: f64,
    pub paragraph_spacing_after: f64,
    pub first_line_indent: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Free-form properties, written as `Property-<key>` lines.
    pub properties: BTreeMap<String, String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: "Mincho".to_string(),
            font_size: 10.5,
            line_height: 1.5,
            text_alignment: TextAlignment::Justify,
            line_break_mode: LineBreakMode::Normal,
            character_spacing: 0.0,
            word_spacing: 0.0,
            paragraph_spacing_before: 0.0,
            paragraph_spacing_after: 0.5,
            first_line_indent: 1.0,
            bold: false,
            italic: false,
            underline: false,
            properties: BTreeMap::new(),
        }
    }
}

/// Outcome of loading style text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleLoadSummary {
    /// Lines whose value was applied.
    pub applied_lines: usize,
    /// Lines skipped for an unknown key, a bad value or a missing colon.
    pub skipped_lines: usize,
}

const PROPERTY_PREFIX: &str = "Property-";

impl Style {
    /// Distance between consecutive baselines.
    pub fn line_pitch(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Apply `Key: Value` lines on top of the current values.
    pub fn load_str(&mut self, text: &str) -> StyleLoadSummary {
        let mut summary = StyleLoadSummary::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let applied = match line.split_once(':') {
                Some((key, value)) => self.apply(key.trim(), value.trim()),
                None => false,
            };
            if applied {
                summary.applied_lines += 1;
            } else {
                log::warn!("style line {} not understood: '{}'; skipped", idx + 1, line);
                summary.skipped_lines += 1;
            }
        }
        summary
    }

    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            "FontFamily" if !value.is_empty() => self.font_family = value.to_string(),
            "FontSize" => match parse_positive(value) {
                Some(v) => self.font_size = v,
                None => return false,
            },
            "LineHeight" => match parse_positive(value) {
                Some(v) => self.line_height = v,
                None => return false,
            },
            "TextAlignment" => match value.parse() {
                Ok(v) => self.text_alignment = v,
                Err(()) => return false,
            },
            "LineBreakMode" => match value.parse() {
                Ok(v) => self.line_break_mode = v,
                Err(()) => return false,
            },
            "CharacterSpacing" => return set_finite(&mut self.character_spacing, value),
            "WordSpacing" => return set_finite(&mut self.word_spacing, value),
            "ParagraphSpacingBefore" => {
                return set_finite(&mut self.paragraph_spacing_before, value)
            }
            "ParagraphSpacingAfter" => return set_finite(&mut self.paragraph_spacing_after, value),
            "FirstLineIndent" => return set_finite(&mut self.first_line_indent, value),
            "Bold" => return set_bool(&mut self.bold, value),
            "Italic" => return set_bool(&mut self.italic, value),
            "Underline" => return set_bool(&mut self.underline, value),
            _ => match key.strip_prefix(PROPERTY_PREFIX) {
                Some(name) if !name.is_empty() => {
                    self.properties.insert(name.to_string(), value.to_string());
                }
                _ => return false,
            },
        }
        true
    }

    /// Serialize in the `Key: Value` style format.
    pub fn to_style_string(&self) -> String {
        let mut out = String::with_capacity(320);
        let _ = writeln!(out, "FontFamily: {}", self.font_family);
        let _ = writeln!(out, "FontSize: {}", self.font_size);
        let _ = writeln!(out, "LineHeight: {}", self.line_height);
        let _ = writeln!(out, "TextAlignment: {}", self.text_alignment);
        let _ = writeln!(out, "LineBreakMode: {}", self.line_break_mode);
        let _ = writeln!(out, "CharacterSpacing: {}", self.character_spacing);
        let _ = writeln!(out, "WordSpacing: {}", self.word_spacing);
        let _ = writeln!(out, "ParagraphSpacingBefore: {}", self.paragraph_spacing_before);
        let _ = writeln!(out, "ParagraphSpacingAfter: {}", self.paragraph_spacing_after);
        let _ = writeln!(out, "FirstLineIndent: {}", self.first_line_indent);
        let _ = writeln!(out, "Bold: {}", self.bold);
        let _ = writeln!(out, "Italic: {}", self.italic);
        let _ = writeln!(out, "Underline: {}", self.underline);
        for (key, value) in &self.properties {
            let _ = writeln!(out, "{}{}: {}", PROPERTY_PREFIX, key, value);
        }
        out
    }

    /// Load a style file. See [`Style::load_str`].
    pub fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<StyleLoadSummary, TypesetError> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|err| TypesetError::io("STYLE_READ", path, err))?;
        Ok(self.load_str(&text))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), TypesetError> {
        let path = path.as_ref();
        fs::write(path, self.to_style_string())
            .map_err(|err| TypesetError::io("STYLE_WRITE", path, err))
    }
}

fn parse_positive(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn set_finite(slot: &mut f64, value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            *slot = v;
            true
        }
        _ => false,
    }
}

fn set_bool(slot: &mut bool, value: &str) -> bool {
    match value {
        "true" => *slot = true,
        "false" => *slot = false,
        _ => return false,
    }
    true
}
