//! Source locations for diagnostics
//!
//! A [`Location`] pins a diagnostic to a file and line, and to a column when one is
//! known. It renders the way compilers usually print positions: `file:line:col`.

use serde::Serialize;
use std::fmt;

/// A position in a named source, used only for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: Option<usize>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{}:{}:{}", self.file, self.line, column),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}
