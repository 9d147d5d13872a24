//! Treeviz formatter for man page trees
//!
//! One line per node, nesting drawn with box characters:
//!
//! ```text
//! ├─ Title: LS 1
//! └─ Section: NAME
//!   └─ Text: ls \- list directory contents
//! ```
//!
//! Labels are cut at 30 characters. Top-level nodes are the preamble blocks followed
//! by the sections; a section lists its blocks before its subsections.

use crate::troff::ast::node::AstNode;
use crate::troff::ast::{Block, Document, Section, Subsection};

const LABEL_WIDTH: usize = 30;

#[derive(Clone, Copy)]
enum Node<'a> {
    Block(&'a Block),
    Section(&'a Section),
    Subsection(&'a Subsection),
}

impl<'a> Node<'a> {
    fn as_ast(&self) -> &dyn AstNode {
        match *self {
            Node::Block(block) => block,
            Node::Section(section) => section,
            Node::Subsection(subsection) => subsection,
        }
    }

    fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Block(block) => block.children().iter().map(Node::Block).collect(),
            Node::Section(section) => section
                .blocks
                .iter()
                .map(Node::Block)
                .chain(section.subsections.iter().map(Node::Subsection))
                .collect(),
            Node::Subsection(subsection) => subsection.blocks.iter().map(Node::Block).collect(),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(doc: &Document) -> String {
    let top: Vec<Node> = doc
        .preamble
        .iter()
        .map(Node::Block)
        .chain(doc.sections.iter().map(Node::Section))
        .collect();

    let mut result = String::new();
    append_children(&mut result, &top, "");
    result
}

fn append_node(result: &mut String, node: Node, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let ast = node.as_ast();
    let label = truncate(&ast.display_label(), LABEL_WIDTH);

    if label.is_empty() {
        result.push_str(&format!("{}{} {}\n", prefix, connector, ast.node_type()));
    } else {
        result.push_str(&format!(
            "{}{} {}: {}\n",
            prefix,
            connector,
            ast.node_type(),
            label
        ));
    }

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    append_children(result, &node.children(), &new_prefix);
}

fn append_children(result: &mut String, children: &[Node], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        append_node(result, *child, prefix, i + 1 == children.len());
    }
}
