//! Diagnostics sink for non-fatal lexical errors
//!
//! The lexer never aborts on a character it cannot match. It reports the character
//! through a [`DiagnosticSink`] handed to it at construction time and moves on. Any
//! `FnMut(&str, usize, usize)` closure is a sink, which is how tests collect reports:
//!
//! ```rust,ignore
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = {
//!     let seen = Rc::clone(&seen);
//!     move |msg: &str, line: usize, col: usize| seen.borrow_mut().push((msg.to_string(), line, col))
//! };
//! let lexer = Lexer::new(Box::new(sink))?;
//! ```

/// Receives one call per unrecognized character: message, 1-based line, 1-based column.
pub trait DiagnosticSink {
    fn report(&mut self, message: &str, line: usize, column: usize);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&str, usize, usize),
{
    fn report(&mut self, message: &str, line: usize, column: usize) {
        self(message, line, column)
    }
}

/// Default sink: emits each report as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, message: &str, line: usize, column: usize) {
        tracing::warn!(line, column, "{}", message);
    }
}

/// Sink that drops every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _message: &str, _line: usize, _column: usize) {}
}
