//! Main module for troff library functionality

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod formats;
pub mod lexer;
pub mod parser;
