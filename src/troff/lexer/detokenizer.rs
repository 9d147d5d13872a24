//! Detokenizer
//!
//! Rebuilds source text from a token stream. Tokens hold their exact source text, so
//! for input without lexical errors this is the identity, end marker excluded.

use crate::troff::lexer::tokens::{Token, TokenKind};

/// Concatenate token texts, leaving out the end marker.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| token.kind != TokenKind::EndMarker)
        .map(|token| token.text.as_str())
        .collect()
}
