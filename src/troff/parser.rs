//! Parser for troff man pages
//!
//! The grammar ([`grammar`]) is a plain production table. [`table`] turns it into an
//! SLR(1) action/goto table, [`engine`] runs that table over a token stream, and
//! [`Parser`] ties the lexer, table and engine together behind `parse`.

pub mod engine;
pub mod grammar;
pub mod parser_impl;
pub mod table;

pub use crate::troff::error::{SyntaxError, TableError};
pub use grammar::{Grammar, Value};
pub use parser_impl::Parser;
pub use table::{ParseAction, ParseTable};
