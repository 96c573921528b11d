use std::path::Path;

pub const NOVEL_FIXTURE: &str = "tests/fixtures/wagahai.txt";
pub const MIXED_FIXTURE: &str = "tests/fixtures/mixed.txt";
pub const DEFAULT_RULES_FIXTURE: &str = "tests/fixtures/default.rules";

/// Read a UTF-8 fixture as code points.
pub fn fixture_chars(path: &str) -> Vec<char> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {}", path, e))
        .chars()
        .collect()
}

pub fn text_fixtures() -> Vec<&'static str> {
    [NOVEL_FIXTURE, MIXED_FIXTURE]
        .into_iter()
        .filter(|path| Path::new(path).exists())
        .collect()
}

