//! # troff-parser
//!
//! A tokenizer and parser for troff, the macro language man pages are written in.
//!
//! The pipeline is line oriented: the [lexer](troff::lexer) recognizes macros only at
//! the start of a physical line, and the [parser](troff::parser) reduces the resulting
//! token stream with an SLR(1) shift/reduce automaton into a [`Document`] tree.
//!
//! ```rust,ignore
//! use troff_parser::Parser;
//!
//! let mut parser = Parser::with_defaults()?;
//! let doc = parser.parse(".TH LS 1\n.SH NAME\nls \\- list directory contents\n", "ls.1", 0)?;
//! assert_eq!(doc.sections.len(), 1);
//! ```

pub mod troff;

pub use troff::ast::{Block, Document, Font, Inline, Location, Section, Subsection};
pub use troff::config::ParserConfig;
pub use troff::diagnostics::{DiagnosticSink, LogSink};
pub use troff::lexer::{tokenize, Lexer, Token, TokenKind};
pub use troff::parser::{Parser, SyntaxError, TableError};
