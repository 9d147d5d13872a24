//! Error types for table construction and parsing
//!
//! Lexical errors are not here: they are reported through a
//! [`DiagnosticSink`](crate::troff::diagnostics::DiagnosticSink) and never abort a parse.

use crate::troff::ast::Location;

/// A token sequence the grammar cannot reduce. Fatal for the current parse call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{loc}: {message}")]
pub struct SyntaxError {
    /// Line and 1-based column of the offending token; the column is not a byte offset.
    pub loc: Location,
    pub message: String,
}

impl SyntaxError {
    pub fn new(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            message: message.into(),
        }
    }
}

/// Failure to build a lexical or grammar table. Only happens at construction time.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    /// A lexical rule pattern does not compile.
    #[error("invalid lexical rule for {kind}: {source}")]
    LexRule {
        kind: &'static str,
        #[source]
        source: regex::Error,
    },

    /// A production rule is not of the form `lhs : symbol*`.
    #[error("production {production} is malformed: {text:?}")]
    MalformedProduction { production: usize, text: String },

    /// A production names a symbol the grammar does not define.
    #[error("production {production} refers to undefined symbol {symbol}")]
    UndefinedSymbol { production: usize, symbol: String },

    /// The grammar is not SLR(1).
    #[error("{kind} conflict in state {state} on {symbol}: {detail}")]
    Conflict {
        kind: &'static str,
        state: usize,
        symbol: String,
        detail: String,
    },

    /// Serialized table could not be produced.
    #[error("cannot serialize parse table: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_prefixes_location() {
        let err = SyntaxError::new(
            Location::new("ls.1", 4, Some(1)),
            "unexpected INDENT_END '.RE'",
        );
        assert_eq!(err.to_string(), "ls.1:4:1: unexpected INDENT_END '.RE'");
    }

    #[test]
    fn test_conflict_display() {
        let err = TableError::Conflict {
            kind: "shift/reduce",
            state: 3,
            symbol: "WORD".into(),
            detail: "inline -> ε".into(),
        };
        assert_eq!(
            err.to_string(),
            "shift/reduce conflict in state 3 on WORD: inline -> ε"
        );
    }
}
