//! Token definitions for troff
//!
//! Tokens carry their exact source text, the line they start on and their byte
//! offset. Columns are not stored: they are recovered from the source on demand
//! with [`column_at`], which is all the diagnostics path needs.

use serde::Serialize;
use std::fmt;

/// All token kinds the lexer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Delimiters
    Newline,
    Comment,
    #[serde(rename = "ENDMARKER")]
    EndMarker,
    Space,

    // Macros
    Title,
    Section,
    Subsection,
    Paragraph,
    HangingParagraph,
    IndentStart,
    IndentEnd,

    // Text and font
    Word,
    Italics,
    Bold,
}

impl TokenKind {
    pub const ALL: [TokenKind; 14] = [
        TokenKind::Newline,
        TokenKind::Comment,
        TokenKind::EndMarker,
        TokenKind::Space,
        TokenKind::Title,
        TokenKind::Section,
        TokenKind::Subsection,
        TokenKind::Paragraph,
        TokenKind::HangingParagraph,
        TokenKind::IndentStart,
        TokenKind::IndentEnd,
        TokenKind::Word,
        TokenKind::Italics,
        TokenKind::Bold,
    ];

    /// Grammar name of the kind, e.g. `HANGING_PARAGRAPH`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Newline => "NEWLINE",
            TokenKind::Comment => "COMMENT",
            TokenKind::EndMarker => "ENDMARKER",
            TokenKind::Space => "SPACE",
            TokenKind::Title => "TITLE",
            TokenKind::Section => "SECTION",
            TokenKind::Subsection => "SUBSECTION",
            TokenKind::Paragraph => "PARAGRAPH",
            TokenKind::HangingParagraph => "HANGING_PARAGRAPH",
            TokenKind::IndentStart => "INDENT_START",
            TokenKind::IndentEnd => "INDENT_END",
            TokenKind::Word => "WORD",
            TokenKind::Italics => "ITALICS",
            TokenKind::Bold => "BOLD",
        }
    }

}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexeme with its position in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line the token starts on.
    pub line: usize,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            offset,
        }
    }

    /// Column of this token within `source`; see [`column_at`].
    pub fn column_in(&self, source: &str) -> usize {
        column_at(source, self.offset)
    }

    /// A token with no source text, such as the end marker appended at end of input.
    pub fn is_synthetic(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.text)
    }
}

/// 1-based column of the byte at `offset`.
///
/// Scans backward to the closest newline before `offset`; the start of input acts
/// as a newline at offset -1.
pub fn column_at(source: &str, offset: usize) -> usize {
    let upto = offset.min(source.len());
    match source.as_bytes()[..upto].iter().rposition(|&b| b == b'\n') {
        Some(newline) => offset - newline,
        None => offset + 1,
    }
}
