//! Implementation of the troff lexer
//!
//! [`Lexer`] is a pull tokenizer over one input at a time. It keeps a line counter
//! and the last token it handed out, both of which survive across `token()` calls and
//! are cleared by [`Lexer::reset`]. Reuse follows one rule: reset, then `input`.

use crate::troff::config::ParserConfig;
use crate::troff::diagnostics::{DiagnosticSink, LogSink};
use crate::troff::error::TableError;
use crate::troff::lexer::rules::{self, LexTable};
use crate::troff::lexer::tokens::{column_at, Token, TokenKind};
use std::sync::Arc;

pub struct Lexer {
    table: Arc<LexTable>,
    sink: Box<dyn DiagnosticSink>,
    fname: String,
    source: String,
    pos: usize,
    lineno: usize,
    last: Option<Token>,
    finished: bool,
}

impl Lexer {
    /// Lexer over the shared precompiled table.
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Result<Self, TableError> {
        Self::from_config(&ParserConfig::default(), sink)
    }

    /// Lexer whose table follows `lexer_optimize` / `lexer_table`.
    pub fn from_config(
        config: &ParserConfig,
        sink: Box<dyn DiagnosticSink>,
    ) -> Result<Self, TableError> {
        let table = rules::load(config.lexer_optimize, &config.lexer_table)?;
        Ok(Self::with_table(table, sink))
    }

    pub fn with_table(table: Arc<LexTable>, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            table,
            sink,
            fname: String::new(),
            source: String::new(),
            pos: 0,
            lineno: 1,
            last: None,
            finished: true,
        }
    }

    /// Clear per-pass state: line counter back to 1, no last token, scan position 0.
    pub fn reset(&mut self) {
        self.lineno = 1;
        self.last = None;
        self.pos = 0;
    }

    /// Load `source` and rewind to its start. The line counter is left alone.
    pub fn input(&mut self, source: &str) {
        self.source = source.to_string();
        self.pos = 0;
        self.finished = false;
    }

    /// Next token, or `None` once the end marker has been handed out.
    ///
    /// The stream always ends with exactly one ENDMARKER: the in-band `\x03` if the
    /// input has one (text after it is never scanned), else an empty-text marker at the
    /// end of input.
    pub fn token(&mut self) -> Option<Token> {
        self.last = self.scan();
        self.last.clone()
    }

    fn scan(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        while self.pos < self.source.len() {
            match self.table.match_at(&self.source, self.pos) {
                Some((kind, len)) => {
                    let start = self.pos;
                    let token = Token::new(
                        kind,
                        &self.source[start..start + len],
                        self.lineno,
                        start,
                    );
                    self.pos += len;
                    match kind {
                        // one byte per '\n'
                        TokenKind::Newline => self.lineno += len,
                        TokenKind::EndMarker => self.finished = true,
                        _ => {}
                    }
                    return Some(token);
                }
                None => self.skip_invalid(),
            }
        }

        self.finished = true;
        Some(Token::new(
            TokenKind::EndMarker,
            "",
            self.lineno,
            self.source.len(),
        ))
    }

    /// Report the character at the scan position and step over it.
    fn skip_invalid(&mut self) {
        let Some(ch) = self.source[self.pos..].chars().next() else {
            self.pos = self.source.len();
            return;
        };
        let column = column_at(&self.source, self.pos);
        let message = format!("Invalid token {:?}", ch);
        self.sink.report(&message, self.lineno, column);
        self.pos += ch.len_utf8();
    }

    /// Column of `token` in the current input.
    pub fn token_col(&self, token: &Token) -> usize {
        token.column_in(&self.source)
    }

    pub fn lineno(&self) -> usize {
        self.lineno
    }

    pub fn set_lineno(&mut self, lineno: usize) {
        self.lineno = lineno;
    }

    /// The most recent result of [`Lexer::token`]; `None` after end of stream.
    pub fn last_token(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    pub fn fname(&self) -> &str {
        &self.fname
    }

    pub fn set_fname(&mut self, fname: impl Into<String>) {
        self.fname = fname.into();
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn table(&self) -> &LexTable {
        &self.table
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.token()
    }
}

impl std::fmt::Debug for Lexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("table", &self.table.name())
            .field("fname", &self.fname)
            .field("pos", &self.pos)
            .field("lineno", &self.lineno)
            .field("last", &self.last)
            .finish()
    }
}

/// Convenience function to tokenize a string with the shared table, logging
/// lexical errors.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TableError> {
    let mut lexer = Lexer::new(Box::new(LogSink))?;
    lexer.input(source);
    Ok(lexer.collect())
}
