//! Lexical rule table
//!
//! Rules are data: an ordered list of `(kind, anchor, pattern)` entries. At each scan
//! position the lexer walks the table top to bottom and takes the first rule whose
//! anchor allows the position and whose pattern matches there. Priority is table order,
//! so longer macro codes are listed before the shorter codes they share a prefix with.
//!
//! | order | kind              | anchor     | pattern                 |
//! |-------|-------------------|------------|-------------------------|
//! | 1     | macros            | line start | `.TH` `.SH` ... `.B`    |
//! | 2     | COMMENT           | line start | `.\"` to end of line    |
//! | 3     | WORD              | line start | word run, no leading `.`|
//! | 4     | WORD              | mid-line   | word run                |
//! | 5     | SPACE             | anywhere   | one or more spaces      |
//! | 6     | NEWLINE           | anywhere   | one or more `\n`        |
//! | 7     | ENDMARKER         | anywhere   | `\x03`                  |
//!
//! A word character is anything but a space, a newline, or an ASCII control
//! character other than tab and carriage return, so CRLF input keeps its `\r` at
//! the end of the last word. A line that starts with a dot and matches no macro
//! therefore matches nothing at all: the lexer reports the dot and skips it.
//!
//! Compiling the table means compiling one regex per rule. The crate keeps one
//! precompiled copy per process ([`precompiled`]); [`load`] decides between that copy and
//! a fresh build.

use crate::troff::config::DEFAULT_LEXER_TABLE;
use crate::troff::error::TableError;
use crate::troff::lexer::tokens::TokenKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Where in a line a rule may match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Only at offset 0 or right after a newline.
    LineStart,
    /// Anywhere except the start of a line.
    MidLine,
    Anywhere,
}

impl Anchor {
    fn allows(self, at_line_start: bool) -> bool {
        match self {
            Anchor::LineStart => at_line_start,
            Anchor::MidLine => !at_line_start,
            Anchor::Anywhere => true,
        }
    }
}

/// One entry of the rule table
#[derive(Debug, Clone, Copy)]
pub struct LexRule {
    pub kind: TokenKind,
    pub anchor: Anchor,
    pub pattern: &'static str,
}

const fn rule(kind: TokenKind, anchor: Anchor, pattern: &'static str) -> LexRule {
    LexRule {
        kind,
        anchor,
        pattern,
    }
}

/// The troff rule table, in priority order.
pub const LEX_RULES: &[LexRule] = &[
    // Macros
    rule(TokenKind::Title, Anchor::LineStart, r"\.TH"),
    rule(TokenKind::Section, Anchor::LineStart, r"\.SH"),
    rule(TokenKind::Subsection, Anchor::LineStart, r"\.SS"),
    rule(TokenKind::HangingParagraph, Anchor::LineStart, r"\.HP"),
    rule(TokenKind::IndentStart, Anchor::LineStart, r"\.RS"),
    rule(TokenKind::IndentEnd, Anchor::LineStart, r"\.RE"),
    rule(TokenKind::Paragraph, Anchor::LineStart, r"\.P"),
    rule(TokenKind::Italics, Anchor::LineStart, r"\.I"),
    rule(TokenKind::Bold, Anchor::LineStart, r"\.B"),
    // Comments
    rule(TokenKind::Comment, Anchor::LineStart, r#"\.\\"[^\n]*"#),
    // Text
    rule(
        TokenKind::Word,
        Anchor::LineStart,
        r"[^.\x00-\x08\x0A-\x0C\x0E-\x20\x7F][^\x00-\x08\x0A-\x0C\x0E-\x20\x7F]*",
    ),
    rule(TokenKind::Word, Anchor::MidLine, r"[^\x00-\x08\x0A-\x0C\x0E-\x20\x7F]+"),
    // Delimiters
    rule(TokenKind::Space, Anchor::Anywhere, r"[ ]+"),
    rule(TokenKind::Newline, Anchor::Anywhere, r"\n+"),
    rule(TokenKind::EndMarker, Anchor::Anywhere, r"\x03"),
];

#[derive(Debug)]
struct CompiledRule {
    kind: TokenKind,
    anchor: Anchor,
    regex: Regex,
}

/// A compiled rule table, ready for matching
#[derive(Debug)]
pub struct LexTable {
    name: String,
    rules: Vec<CompiledRule>,
}

impl LexTable {
    /// Compile `rules` into a table. Each pattern is anchored to the scan position.
    pub fn compile(name: impl Into<String>, rules: &[LexRule]) -> Result<Self, TableError> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&format!("^(?:{})", rule.pattern))
                    .map(|regex| CompiledRule {
                        kind: rule.kind,
                        anchor: rule.anchor,
                        regex,
                    })
                    .map_err(|source| TableError::LexRule {
                        kind: rule.kind.name(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching `source` at byte offset `pos`: its kind and the match length.
    pub fn match_at(&self, source: &str, pos: usize) -> Option<(TokenKind, usize)> {
        let rest = source.get(pos..)?;
        let at_line_start = pos == 0 || source.as_bytes().get(pos - 1) == Some(&b'\n');

        self.rules
            .iter()
            .filter(|rule| rule.anchor.allows(at_line_start))
            .find_map(|rule| {
                rule.regex
                    .find(rest)
                    .filter(|m| m.end() > 0)
                    .map(|m| (rule.kind, m.end()))
            })
    }
}

static PRECOMPILED: Lazy<Result<Arc<LexTable>, TableError>> =
    Lazy::new(|| LexTable::compile(DEFAULT_LEXER_TABLE, LEX_RULES).map(Arc::new));

/// The shared precompiled table registered under `name`, if there is one.
pub fn precompiled(name: &str) -> Option<Result<Arc<LexTable>, TableError>> {
    (name == DEFAULT_LEXER_TABLE).then(|| (*PRECOMPILED).clone())
}

/// Table for a lexer: the shared copy when `optimize` is set and `name` is known,
/// otherwise a fresh compile of [`LEX_RULES`].
pub fn load(optimize: bool, name: &str) -> Result<Arc<LexTable>, TableError> {
    if optimize {
        if let Some(table) = precompiled(name) {
            return table;
        }
        tracing::debug!(table = name, "no precompiled lexical table, compiling");
    }
    LexTable::compile(name, LEX_RULES).map(Arc::new)
}
