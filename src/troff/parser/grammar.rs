//! Man page grammar
//!
//! The grammar is a production table. Each rule is written as `lhs : rhs...`, with
//! upper-case names for token kinds and lower-case names for nonterminals, and paired
//! with the action that builds the tree node when the rule is reduced:
//!
//! ```text
//! start        : document ENDMARKER
//! document     : blocks sections
//! sections     : <empty> | sections section
//! section      : SECTION inline NEWLINE blocks subsections
//! subsections  : <empty> | subsections subsection
//! subsection   : SUBSECTION inline NEWLINE blocks
//! blocks       : <empty> | blocks block
//! block        : TITLE inline NEWLINE
//!              | COMMENT NEWLINE
//!              | PARAGRAPH inline NEWLINE
//!              | HANGING_PARAGRAPH inline NEWLINE
//!              | ITALICS inline NEWLINE
//!              | BOLD inline NEWLINE
//!              | WORD inline NEWLINE
//!              | SPACE inline NEWLINE
//!              | INDENT_START inline NEWLINE blocks INDENT_END inline NEWLINE
//!              | NEWLINE
//! inline       : <empty> | inline WORD | inline SPACE
//! ```
//!
//! Every line is newline terminated; the parser supplies the missing newline of an
//! unterminated last line. Sections only occur at the top level, so `.SH` inside an
//! `.RS` block, `.SS` before the first `.SH`, and an unmatched `.RE` are syntax errors.
//!
//! The first rule is the start rule. The table builder accepts any grammar written
//! this way; [`Grammar::man_page`] is the one the parser uses.

use crate::troff::ast::node::{inline_words, Block, Document, Font, Inline, Section, Subsection};
use crate::troff::error::TableError;
use crate::troff::lexer::{Token, TokenKind};
use std::fmt;

/// Semantic value on the parse stack
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Token(Token),
    Inline(Vec<Inline>),
    Block(Block),
    Blocks(Vec<Block>),
    Subsection(Subsection),
    Subsections(Vec<Subsection>),
    Section(Section),
    Sections(Vec<Section>),
    Document(Document),
}

/// Reduction action: receives the values of the right-hand side in order. `None` means
/// the values did not have the shape the rule expects.
pub type Action = fn(Vec<Value>) -> Option<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(TokenKind),
    NonTerminal(usize),
}

#[derive(Debug, Clone)]
pub struct Production {
    pub lhs: usize,
    pub rhs: Vec<Symbol>,
    pub action: Action,
    text: String,
}

impl Production {
    /// Rule as text, e.g. `blocks -> blocks block`.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    nonterminals: Vec<String>,
    productions: Vec<Production>,
}

impl Grammar {
    /// Build a grammar from `lhs : rhs...` rules. The first rule is the start rule.
    pub fn from_rules(rules: &[(&str, Action)]) -> Result<Self, TableError> {
        if rules.is_empty() {
            return Err(TableError::MalformedProduction {
                production: 0,
                text: String::new(),
            });
        }

        let mut split = Vec::with_capacity(rules.len());
        let mut nonterminals: Vec<String> = Vec::new();
        for (index, (rule, _)) in rules.iter().enumerate() {
            let (lhs, rhs) = rule
                .split_once(':')
                .map(|(lhs, rhs)| (lhs.trim(), rhs))
                .filter(|(lhs, _)| !lhs.is_empty() && !lhs.contains(char::is_whitespace))
                .ok_or_else(|| TableError::MalformedProduction {
                    production: index,
                    text: rule.to_string(),
                })?;
            if !nonterminals.iter().any(|name| name == lhs) {
                nonterminals.push(lhs.to_string());
            }
            split.push((lhs, rhs));
        }

        let lookup = |name: &str| nonterminals.iter().position(|nt| nt == name);
        let mut productions = Vec::with_capacity(rules.len());
        for (index, ((lhs, rhs), (_, action))) in split.into_iter().zip(rules).enumerate() {
            let rhs = rhs
                .split_whitespace()
                .map(|name| {
                    lookup(name)
                        .map(Symbol::NonTerminal)
                        .or_else(|| {
                            TokenKind::ALL
                                .iter()
                                .find(|kind| kind.name() == name)
                                .map(|kind| Symbol::Terminal(*kind))
                        })
                        .ok_or_else(|| TableError::UndefinedSymbol {
                            production: index,
                            symbol: name.to_string(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let lhs = lookup(lhs).ok_or_else(|| TableError::UndefinedSymbol {
                production: index,
                symbol: lhs.to_string(),
            })?;

            productions.push(Production {
                lhs,
                rhs,
                action: *action,
                text: String::new(),
            });
        }

        let mut grammar = Self {
            nonterminals,
            productions,
        };
        let texts: Vec<String> = grammar
            .productions
            .iter()
            .map(|production| grammar.render(production))
            .collect();
        for (production, text) in grammar.productions.iter_mut().zip(texts) {
            production.text = text;
        }
        Ok(grammar)
    }

    /// The man page grammar.
    pub fn man_page() -> Result<Self, TableError> {
        Self::from_rules(MAN_PAGE_RULES)
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminals
    }

    pub fn nonterminal_name(&self, index: usize) -> &str {
        self.nonterminals.get(index).map_or("?", String::as_str)
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(kind) => kind.name(),
            Symbol::NonTerminal(index) => self.nonterminal_name(index),
        }
    }

    /// All productions as text, one per line. Two grammars with the same signature
    /// produce the same parse table.
    pub fn signature(&self) -> String {
        self.productions
            .iter()
            .map(Production::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(&self, production: &Production) -> String {
        let rhs = if production.rhs.is_empty() {
            "ε".to_string()
        } else {
            production
                .rhs
                .iter()
                .map(|symbol| self.symbol_name(*symbol))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!("{} -> {}", self.nonterminal_name(production.lhs), rhs)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, production) in self.productions.iter().enumerate() {
            writeln!(f, "{:>3}  {}", index, production.text())?;
        }
        Ok(())
    }
}

pub const MAN_PAGE_RULES: &[(&str, Action)] = &[
    ("start : document ENDMARKER", start),
    ("document : blocks sections", document),
    ("sections :", empty_sections),
    ("sections : sections section", push_section),
    ("section : SECTION inline NEWLINE blocks subsections", section),
    ("subsections :", empty_subsections),
    ("subsections : subsections subsection", push_subsection),
    ("subsection : SUBSECTION inline NEWLINE blocks", subsection),
    ("blocks :", empty_blocks),
    ("blocks : blocks block", push_block),
    ("block : TITLE inline NEWLINE", title),
    ("block : COMMENT NEWLINE", comment),
    ("block : PARAGRAPH inline NEWLINE", paragraph),
    ("block : HANGING_PARAGRAPH inline NEWLINE", hanging_paragraph),
    ("block : ITALICS inline NEWLINE", italics),
    ("block : BOLD inline NEWLINE", bold),
    ("block : WORD inline NEWLINE", word_line),
    ("block : SPACE inline NEWLINE", space_line),
    (
        "block : INDENT_START inline NEWLINE blocks INDENT_END inline NEWLINE",
        indent,
    ),
    ("block : NEWLINE", blank),
    ("inline :", empty_inline),
    ("inline : inline WORD", push_word),
    ("inline : inline SPACE", push_space),
];

/// Typed access to right-hand side values, left to right.
struct Rhs(std::vec::IntoIter<Value>);

impl Rhs {
    fn new(values: Vec<Value>) -> Self {
        Self(values.into_iter())
    }

    fn skip(&mut self) -> Option<()> {
        self.0.next().map(|_| ())
    }

    fn token(&mut self) -> Option<Token> {
        match self.0.next()? {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    fn inline(&mut self) -> Option<Vec<Inline>> {
        match self.0.next()? {
            Value::Inline(content) => Some(content),
            _ => None,
        }
    }

    fn block(&mut self) -> Option<Block> {
        match self.0.next()? {
            Value::Block(block) => Some(block),
            _ => None,
        }
    }

    fn blocks(&mut self) -> Option<Vec<Block>> {
        match self.0.next()? {
            Value::Blocks(blocks) => Some(blocks),
            _ => None,
        }
    }

    fn subsection(&mut self) -> Option<Subsection> {
        match self.0.next()? {
            Value::Subsection(subsection) => Some(subsection),
            _ => None,
        }
    }

    fn subsections(&mut self) -> Option<Vec<Subsection>> {
        match self.0.next()? {
            Value::Subsections(subsections) => Some(subsections),
            _ => None,
        }
    }

    fn section(&mut self) -> Option<Section> {
        match self.0.next()? {
            Value::Section(section) => Some(section),
            _ => None,
        }
    }

    fn sections(&mut self) -> Option<Vec<Section>> {
        match self.0.next()? {
            Value::Sections(sections) => Some(sections),
            _ => None,
        }
    }

    fn document(&mut self) -> Option<Document> {
        match self.0.next()? {
            Value::Document(document) => Some(document),
            _ => None,
        }
    }
}

fn trim(mut content: Vec<Inline>) -> Vec<Inline> {
    while content.last().is_some_and(Inline::is_space) {
        content.pop();
    }
    let leading = content.iter().take_while(|inline| inline.is_space()).count();
    content.drain(..leading);
    content
}

fn trim_end(mut content: Vec<Inline>) -> Vec<Inline> {
    while content.last().is_some_and(Inline::is_space) {
        content.pop();
    }
    content
}

fn start(rhs: Vec<Value>) -> Option<Value> {
    Rhs::new(rhs).document().map(Value::Document)
}

fn document(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let preamble = rhs.blocks()?;
    let sections = rhs.sections()?;
    Some(Value::Document(Document { preamble, sections }))
}

fn empty_sections(_: Vec<Value>) -> Option<Value> {
    Some(Value::Sections(Vec::new()))
}

fn push_section(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let mut sections = rhs.sections()?;
    sections.push(rhs.section()?);
    Some(Value::Sections(sections))
}

fn section(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let request = rhs.token()?;
    let heading = trim(rhs.inline()?);
    rhs.skip()?;
    let blocks = rhs.blocks()?;
    let subsections = rhs.subsections()?;
    Some(Value::Section(Section {
        line: request.line,
        heading,
        blocks,
        subsections,
    }))
}

fn empty_subsections(_: Vec<Value>) -> Option<Value> {
    Some(Value::Subsections(Vec::new()))
}

fn push_subsection(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let mut subsections = rhs.subsections()?;
    subsections.push(rhs.subsection()?);
    Some(Value::Subsections(subsections))
}

fn subsection(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let request = rhs.token()?;
    let heading = trim(rhs.inline()?);
    rhs.skip()?;
    let blocks = rhs.blocks()?;
    Some(Value::Subsection(Subsection {
        line: request.line,
        heading,
        blocks,
    }))
}

fn empty_blocks(_: Vec<Value>) -> Option<Value> {
    Some(Value::Blocks(Vec::new()))
}

fn push_block(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let mut blocks = rhs.blocks()?;
    blocks.push(rhs.block()?);
    Some(Value::Blocks(blocks))
}

/// Request followed by its arguments: the request token and the argument run.
fn request_line(rhs: Vec<Value>) -> Option<(Token, Vec<Inline>)> {
    let mut rhs = Rhs::new(rhs);
    let request = rhs.token()?;
    let args = rhs.inline()?;
    Some((request, args))
}

fn title(rhs: Vec<Value>) -> Option<Value> {
    let (request, args) = request_line(rhs)?;
    Some(Value::Block(Block::Title {
        line: request.line,
        args: inline_words(&args),
    }))
}

fn comment(rhs: Vec<Value>) -> Option<Value> {
    let token = Rhs::new(rhs).token()?;
    let text = token
        .text
        .strip_prefix(".\\\"")
        .unwrap_or(&token.text)
        .to_string();
    Some(Value::Block(Block::Comment {
        line: token.line,
        text,
    }))
}

fn paragraph(rhs: Vec<Value>) -> Option<Value> {
    let (request, _) = request_line(rhs)?;
    Some(Value::Block(Block::Paragraph { line: request.line }))
}

fn hanging_paragraph(rhs: Vec<Value>) -> Option<Value> {
    let (request, args) = request_line(rhs)?;
    Some(Value::Block(Block::HangingParagraph {
        line: request.line,
        args: inline_words(&args),
    }))
}

fn styled(rhs: Vec<Value>, font: Font) -> Option<Value> {
    let (request, content) = request_line(rhs)?;
    Some(Value::Block(Block::Styled {
        line: request.line,
        font,
        content: trim(content),
    }))
}

fn italics(rhs: Vec<Value>) -> Option<Value> {
    styled(rhs, Font::Italic)
}

fn bold(rhs: Vec<Value>) -> Option<Value> {
    styled(rhs, Font::Bold)
}

fn text_line(rhs: Vec<Value>, first: impl FnOnce(Token) -> Inline) -> Option<Value> {
    let (token, rest) = request_line(rhs)?;
    let line = token.line;
    let mut content = vec![first(token)];
    content.extend(rest);
    Some(Value::Block(Block::Text {
        line,
        content: trim_end(content),
    }))
}

fn word_line(rhs: Vec<Value>) -> Option<Value> {
    text_line(rhs, |token| Inline::Word(token.text))
}

fn space_line(rhs: Vec<Value>) -> Option<Value> {
    text_line(rhs, |_| Inline::Space)
}

fn indent(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let request = rhs.token()?;
    let args = rhs.inline()?;
    rhs.skip()?;
    let blocks = rhs.blocks()?;
    Some(Value::Block(Block::Indent {
        line: request.line,
        args: inline_words(&args),
        blocks,
    }))
}

fn blank(rhs: Vec<Value>) -> Option<Value> {
    let token = Rhs::new(rhs).token()?;
    Some(Value::Block(Block::Blank { line: token.line }))
}

fn empty_inline(_: Vec<Value>) -> Option<Value> {
    Some(Value::Inline(Vec::new()))
}

fn push_word(rhs: Vec<Value>) -> Option<Value> {
    let mut rhs = Rhs::new(rhs);
    let mut content = rhs.inline()?;
    content.push(Inline::Word(rhs.token()?.text));
    Some(Value::Inline(content))
}

fn push_space(rhs: Vec<Value>) -> Option<Value> {
    let mut content = Rhs::new(rhs).inline()?;
    content.push(Inline::Space);
    Some(Value::Inline(content))
}
