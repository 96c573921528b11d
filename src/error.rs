use core::fmt;
use std::io;
use std::path::Path;

/// Structured error for file-backed configuration (rules, styles, configs).
///
/// The layout core itself is infallible; only loading and saving external
/// files can fail.
#[derive(Debug)]
pub struct TypesetError {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional file path context.
    pub path: Option<Box<str>>,
    /// Optional 1-based line number context.
    pub line: Option<usize>,
    source: Option<io::Error>,
}

impl TypesetError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into().into_boxed_str(),
            path: None,
            line: None,
            source: None,
        }
    }

    pub(crate) fn io(code: &'static str, path: &Path, err: io::Error) -> Self {
        let mut out = Self::new(code, err.to_string()).with_path(path.display().to_string());
        out.source = Some(err);
        out
    }

    /// Attach file path context.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into().into_boxed_str());
        self
    }

    /// Attach line number context.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for TypesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(path) = self.path.as_deref() {
            write!(f, " [path={}]", path)?;
        }
        if let Some(line) = self.line {
            write!(f, " [line={}]", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for TypesetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}
