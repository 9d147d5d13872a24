//! Document tree node definitions
//!
//! The parser reduces a man page into this shape:
//!
//! ```text
//! Document
//! ├─ preamble: blocks before the first .SH (usually the .TH title line)
//! └─ sections
//!    └─ Section (.SH heading)
//!       ├─ blocks
//!       └─ subsections
//!          └─ Subsection (.SS heading)
//!             └─ blocks
//! ```
//!
//! Blocks are line level constructs. `.RS`/`.RE` pairs nest blocks inside an
//! [`Block::Indent`]; everything else is flat and in source order. What each block
//! means on the page is left to the renderer.

use serde::Serialize;
use std::fmt;

/// Common interface for all tree nodes
pub trait AstNode {
    fn node_type(&self) -> &'static str;
    fn display_label(&self) -> String;
}

/// A run of text on one line. Consecutive spaces collapse into one [`Inline::Space`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    Word(String),
    Space,
}

impl Inline {
    pub fn word(text: impl Into<String>) -> Self {
        Inline::Word(text.into())
    }

    pub fn is_space(&self) -> bool {
        matches!(self, Inline::Space)
    }
}

/// Renders inline content as plain text, one space per space run.
pub fn inline_text(content: &[Inline]) -> String {
    let mut text = String::new();
    for inline in content {
        match inline {
            Inline::Word(word) => text.push_str(word),
            Inline::Space => text.push(' '),
        }
    }
    text
}

/// Words of inline content with the spacing dropped. Used for macro arguments.
pub fn inline_words(content: &[Inline]) -> Vec<String> {
    content
        .iter()
        .filter_map(|inline| match inline {
            Inline::Word(word) => Some(word.clone()),
            Inline::Space => None,
        })
        .collect()
}

/// Font selected by the one-line font macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Bold,
    Italic,
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Font::Bold => write!(f, "bold"),
            Font::Italic => write!(f, "italic"),
        }
    }
}

/// A line level construct. `line` is always the 1-based line the block starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `.TH name section [date [source [manual]]]`
    Title { line: usize, args: Vec<String> },
    /// `.\"` comment; `text` is everything after the marker.
    Comment { line: usize, text: String },
    /// `.P` paragraph break. Arguments are ignored.
    Paragraph { line: usize },
    /// `.HP [indent]`
    HangingParagraph { line: usize, args: Vec<String> },
    /// `.B text` or `.I text`
    Styled {
        line: usize,
        font: Font,
        content: Vec<Inline>,
    },
    /// A plain text line.
    Text { line: usize, content: Vec<Inline> },
    /// `.RS [indent]` ... `.RE`
    Indent {
        line: usize,
        args: Vec<String>,
        blocks: Vec<Block>,
    },
    /// An empty line ahead of any other content on its level.
    Blank { line: usize },
}

impl Block {
    pub fn line(&self) -> usize {
        match self {
            Block::Title { line, .. }
            | Block::Comment { line, .. }
            | Block::Paragraph { line }
            | Block::HangingParagraph { line, .. }
            | Block::Styled { line, .. }
            | Block::Text { line, .. }
            | Block::Indent { line, .. }
            | Block::Blank { line } => *line,
        }
    }

    /// Nested blocks; only `.RS` blocks have any.
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Indent { blocks, .. } => blocks,
            _ => &[],
        }
    }
}

impl AstNode for Block {
    fn node_type(&self) -> &'static str {
        match self {
            Block::Title { .. } => "Title",
            Block::Comment { .. } => "Comment",
            Block::Paragraph { .. } => "Paragraph",
            Block::HangingParagraph { .. } => "HangingParagraph",
            Block::Styled { .. } => "Styled",
            Block::Text { .. } => "Text",
            Block::Indent { .. } => "Indent",
            Block::Blank { .. } => "Blank",
        }
    }

    fn display_label(&self) -> String {
        match self {
            Block::Title { args, .. }
            | Block::HangingParagraph { args, .. }
            | Block::Indent { args, .. } => args.join(" "),
            Block::Comment { text, .. } => text.clone(),
            Block::Styled { font, content, .. } => format!("{} {}", font, inline_text(content)),
            Block::Text { content, .. } => inline_text(content),
            Block::Paragraph { .. } | Block::Blank { .. } => String::new(),
        }
    }
}

/// A `.SS` subsection and the blocks up to the next `.SS` or `.SH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subsection {
    pub line: usize,
    pub heading: Vec<Inline>,
    pub blocks: Vec<Block>,
}

impl Subsection {
    pub fn title(&self) -> String {
        inline_text(&self.heading).trim().to_string()
    }
}

impl AstNode for Subsection {
    fn node_type(&self) -> &'static str {
        "Subsection"
    }
    fn display_label(&self) -> String {
        self.title()
    }
}

/// A `.SH` section with its own blocks and any `.SS` subsections that follow them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub line: usize,
    pub heading: Vec<Inline>,
    pub blocks: Vec<Block>,
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn title(&self) -> String {
        inline_text(&self.heading).trim().to_string()
    }
}

impl AstNode for Section {
    fn node_type(&self) -> &'static str {
        "Section"
    }
    fn display_label(&self) -> String {
        self.title()
    }
}

/// Root of a parsed man page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub preamble: Vec<Block>,
    pub sections: Vec<Section>,
}

impl Document {
    /// The `.TH` line, if the preamble has one.
    pub fn title(&self) -> Option<&[String]> {
        self.preamble.iter().find_map(|block| match block {
            Block::Title { args, .. } => Some(args.as_slice()),
            _ => None,
        })
    }

    /// Looks up a section by heading, ignoring ASCII case.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.title().eq_ignore_ascii_case(heading))
    }

    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.sections.is_empty()
    }
}

impl AstNode for Document {
    fn node_type(&self) -> &'static str {
        "Document"
    }
    fn display_label(&self) -> String {
        match self.title() {
            Some(args) => args.join(" "),
            None => format!("{} sections", self.sections.len()),
        }
    }
}
