//! Japanese line breaking and kinsoku (prohibition) processing.
//!
//! `kumihan` splits a run of characters into fixed-width lines following
//! JIS X 4051 style rules:
//!
//! - break opportunities are collected by [`BreakPointScanner`], which never
//!   offers a break before a line-start-prohibited character, after a
//!   line-end-prohibited character, or next to an inseparable character;
//! - [`OptimalBreakSolver`] picks the break set with the lowest total penalty
//!   under the width limit;
//! - [`ProhibitionAdjuster`], [`Justifier`] and [`HangingAdjuster`] repair and
//!   measure the resulting lines.
//!
//! [`TypesettingEngine`] wires the stages together:
//!
//! ```
//! use kumihan::{Style, TypesettingEngine};
//!
//! let engine = TypesettingEngine::new();
//! let text: Vec<char> = "これはテストです。".chars().collect();
//! let block = engine.typeset_text(&text, &Style::default(), 42.0, false);
//! assert!(block.lines.len() > 1);
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod adjust;
mod break_points;
mod classify;
mod engine;
mod error;
mod measure;
mod rules;
mod solver;
mod style;
pub mod vertical;

pub use adjust::{HangingAdjuster, Justifier, ProhibitionAdjuster};
pub use break_points::{BreakPoint, BreakPointScanner, PenaltyConfig};
pub use classify::{classify, is_full_width, is_half_width, is_japanese, CharClass};
pub use engine::{
    HangingConfig, JustificationConfig, ProhibitionConfig, TextBlock, TextLine, TypesetConfig,
    TypesettingEngine,
};
pub use error::TypesetError;
pub use measure::{CharacterWidth, FontSizeWidth};
pub use rules::{RuleKind, RuleSet, RulesLoadSummary};
pub use solver::OptimalBreakSolver;
pub use style::{LineBreakMode, Style, StyleLoadSummary, TextAlignment};
