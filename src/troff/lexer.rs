//! Lexer module for troff
//!
//! This module contains the tokenization logic for troff man pages: token
//! definitions, the ordered lexical rule table, and the pull-based lexer that drives it.
//!
//! ## Line anchoring
//!
//! troff is a line language. A request such as `.SH` only means something as the
//! first thing on a physical line; the same characters later in a line are plain text.
//! Each rule in the table carries an anchor (line start, mid-line, anywhere), checked
//! against the scan position before the rule's pattern is tried.
//!
//! The lexer does no structural work: newline runs collapse into one NEWLINE token, and
//! deciding what a line means is left entirely to the parser's grammar.

pub mod detokenizer;
pub mod lexer_impl;
pub mod rules;
pub mod tokens;

pub use detokenizer::detokenize;
pub use lexer_impl::{tokenize, Lexer};
pub use rules::{Anchor, LexRule, LexTable, LEX_RULES};
pub use tokens::{column_at, Token, TokenKind};
