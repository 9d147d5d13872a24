//! The troff parser
//!
//! A [`Parser`] is built once and reused: every [`Parser::parse`] call resets the
//! lexer, feeds it the new text, and runs the automaton to completion. Results are
//! either a whole [`Document`] or a [`SyntaxError`]; nothing partial survives a failed
//! call.

use crate::troff::ast::{Document, Location};
use crate::troff::config::ParserConfig;
use crate::troff::diagnostics::{DiagnosticSink, LogSink};
use crate::troff::error::{SyntaxError, TableError};
use crate::troff::lexer::{Lexer, Token, TokenKind};
use crate::troff::parser::engine::{Automaton, EngineError};
use crate::troff::parser::grammar::{Grammar, Value};
use crate::troff::parser::table::{self, ParseTable};
use std::sync::Arc;

pub struct Parser {
    lexer: Lexer,
    grammar: Grammar,
    table: Arc<ParseTable>,
    config: ParserConfig,
    last_yielded: Option<Token>,
}

impl Parser {
    pub fn new(config: ParserConfig, sink: Box<dyn DiagnosticSink>) -> Result<Self, TableError> {
        let lexer = Lexer::from_config(&config, sink)?;
        let grammar = Grammar::man_page()?;
        let table = table::load(
            &grammar,
            config.grammar_optimize,
            &config.grammar_table,
            config.grammar_debug,
        )?;

        Ok(Self {
            lexer,
            grammar,
            table,
            config,
            last_yielded: None,
        })
    }

    /// Default configuration, lexical errors logged as warnings.
    pub fn with_defaults() -> Result<Self, TableError> {
        Self::new(ParserConfig::default(), Box::new(LogSink))
    }

    pub fn reset(&mut self) {
        self.lexer.reset();
        self.last_yielded = None;
    }

    /// Parse one document. `filename` only shows up in error locations.
    pub fn parse(
        &mut self,
        source: &str,
        filename: &str,
        debug_level: u32,
    ) -> Result<Document, SyntaxError> {
        self.reset();
        self.lexer.set_fname(filename);
        self.lexer.input(source);

        let debug_level = if self.config.grammar_debug {
            debug_level.max(1)
        } else {
            debug_level
        };
        tracing::trace!(file = filename, bytes = source.len(), "parse");

        let mut feed = LineTerminator::new(&mut self.lexer);
        let result = Automaton::new(&self.grammar, &self.table).run(|| feed.next(), debug_level);
        self.last_yielded = feed.last;

        match result {
            Ok(Value::Document(document)) => Ok(document),
            Ok(other) => Err(SyntaxError::new(
                self.location_of(self.last_yielded.as_ref()),
                format!("parse produced {:?} instead of a document", kind_of(&other)),
            )),
            Err(err) => Err(self.syntax_error(err)),
        }
    }

    fn syntax_error(&self, err: EngineError) -> SyntaxError {
        match err {
            EngineError::Unexpected { token, expected } => {
                let expected = expected
                    .iter()
                    .map(|kind| kind.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                let found = match &token {
                    Some(token) if !token.is_synthetic() => {
                        format!("unexpected {} {:?}", token.kind, token.text)
                    }
                    _ => "unexpected end of input".to_string(),
                };
                SyntaxError::new(
                    self.location_of(token.as_ref()),
                    format!("{}; expected one of {}", found, expected),
                )
            }
            EngineError::Action { production, token } => {
                let rule = self
                    .grammar
                    .production(production)
                    .map_or("?", |rule| rule.text());
                SyntaxError::new(
                    self.location_of(token.as_ref()),
                    format!("cannot build node for {}", rule),
                )
            }
        }
    }

    fn location_of(&self, token: Option<&Token>) -> Location {
        match token {
            Some(token) => self.currloc(token.line, token.column_in(self.lexer.source())),
            None => self.currloc(0, 1),
        }
    }

    /// Most recent token handed to the automaton.
    pub fn lookahead(&self) -> Option<&Token> {
        self.last_yielded.as_ref()
    }

    pub fn lineno(&self) -> usize {
        self.last_yielded.as_ref().map_or(0, |token| token.line)
    }

    pub fn col(&self) -> usize {
        self.last_yielded
            .as_ref()
            .map_or(1, |token| self.lexer.token_col(token))
    }

    pub fn currloc(&self, line: usize, column: usize) -> Location {
        Location::new(self.lexer.fname(), line, Some(column))
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("lexer", &self.lexer)
            .field("table", &self.table.name())
            .field("config", &self.config)
            .finish()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Token(_) => "token",
        Value::Inline(_) => "inline",
        Value::Block(_) => "block",
        Value::Blocks(_) => "blocks",
        Value::Subsection(_) => "subsection",
        Value::Subsections(_) => "subsections",
        Value::Section(_) => "section",
        Value::Sections(_) => "sections",
        Value::Document(_) => "document",
    }
}

/// Token feed that closes an unterminated last line: a synthetic empty NEWLINE goes
/// out before the end marker unless the previous token already was a newline.
struct LineTerminator<'a> {
    lexer: &'a mut Lexer,
    pending: Option<Token>,
    previous: Option<TokenKind>,
    last: Option<Token>,
}

impl<'a> LineTerminator<'a> {
    fn new(lexer: &'a mut Lexer) -> Self {
        Self {
            lexer,
            pending: None,
            previous: None,
            last: None,
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => {
                let token = self.lexer.token()?;
                let unterminated = self
                    .previous
                    .is_some_and(|previous| previous != TokenKind::Newline);
                if token.kind == TokenKind::EndMarker && unterminated {
                    let newline = Token::new(TokenKind::Newline, "", token.line, token.offset);
                    self.pending = Some(token);
                    newline
                } else {
                    token
                }
            }
        };
        self.previous = Some(token.kind);
        self.last = Some(token.clone());
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::troff::ast::{Block, Inline};

    fn parser() -> Parser {
        Parser::with_defaults().unwrap()
    }

    #[test]
    fn test_empty_input() {
        let mut parser = parser();
        let doc = parser.parse("", "empty.1", 0).unwrap();
        assert!(doc.is_empty());
        assert_eq!(parser.lookahead().map(|t| t.kind), Some(TokenKind::EndMarker));
    }

    #[test]
    fn test_unterminated_last_line() {
        let mut parser = parser();
        let doc = parser.parse(".SH NAME\nls", "ls.1", 0).unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(
            doc.sections[0].blocks,
            vec![Block::Text {
                line: 2,
                content: vec![Inline::word("ls")],
            }]
        );
    }

    #[test]
    fn test_stray_indent_end() {
        let mut parser = parser();
        let err = parser.parse("text\n.RE\n", "stray.1", 0).unwrap_err();
        assert_eq!(err.loc, Location::new("stray.1", 2, Some(1)));
        assert!(err.message.starts_with("unexpected INDENT_END \".RE\""));
        assert_eq!(parser.lineno(), 2);
        assert_eq!(parser.col(), 1);
    }

    #[test]
    fn test_unclosed_indent_reports_end_of_input() {
        let mut parser = parser();
        let err = parser.parse(".RS 4\nbody", "open.1", 0).unwrap_err();
        assert!(err.message.starts_with("unexpected end of input"));
        assert!(err.message.contains("INDENT_END"));
        assert_eq!(err.loc.line, 2);
    }

    #[test]
    fn test_accessors_before_any_parse() {
        let parser = parser();
        assert_eq!(parser.lookahead(), None);
        assert_eq!(parser.lineno(), 0);
        assert_eq!(parser.col(), 1);
        assert_eq!(parser.currloc(3, 7).to_string(), ":3:7");
    }

    #[test]
    fn test_line_terminator_passes_terminated_input_through() {
        let mut lexer = Lexer::new(Box::new(LogSink)).unwrap();
        lexer.input("a\n");
        let mut feed = LineTerminator::new(&mut lexer);
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| feed.next()).map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Word, TokenKind::Newline, TokenKind::EndMarker]
        );
    }

    #[test]
    fn test_line_terminator_inserts_newline() {
        let mut lexer = Lexer::new(Box::new(LogSink)).unwrap();
        lexer.input("a b");
        let mut feed = LineTerminator::new(&mut lexer);
        let tokens: Vec<Token> = std::iter::from_fn(|| feed.next()).collect();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[3], Token::new(TokenKind::Newline, "", 1, 3));
        assert_eq!(tokens[4].kind, TokenKind::EndMarker);
    }
}
