//! Parsing whole man pages

use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;
use troff_parser::troff::diagnostics::NullSink;
use troff_parser::troff::formats::to_treeviz_str;
use troff_parser::{Block, Document, Font, Inline, Location, Parser, ParserConfig};

const LS_PAGE: &str = include_str!("samples/ls.1");

fn parse(source: &str) -> Document {
    Parser::with_defaults()
        .unwrap()
        .parse(source, "test.1", 0)
        .unwrap()
}

fn words(text: &str) -> Vec<Inline> {
    let mut content = Vec::new();
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            content.push(Inline::Space);
        }
        content.push(Inline::word(word));
    }
    content
}

#[test]
fn test_ls_page_structure() {
    let doc = parse(LS_PAGE);

    assert_eq!(
        doc.title(),
        Some(&["LS", "1", "2024-03-01", "coreutils"].map(String::from)[..])
    );
    assert_eq!(
        doc.preamble[0],
        Block::Comment {
            line: 1,
            text: " Manual page for ls".into(),
        }
    );

    let titles: Vec<String> = doc.sections.iter().map(|s| s.title()).collect();
    assert_eq!(titles, ["NAME", "SYNOPSIS", "DESCRIPTION", "AUTHOR"]);

    let synopsis = doc.section("synopsis").unwrap();
    assert_eq!(synopsis.line, 5);
    assert_eq!(
        synopsis.blocks,
        vec![
            Block::Styled {
                line: 6,
                font: Font::Bold,
                content: words("ls"),
            },
            Block::Text {
                line: 7,
                content: words("[OPTION]... [FILE]..."),
            },
        ]
    );

    let description = doc.section("DESCRIPTION").unwrap();
    assert_eq!(description.blocks.len(), 3);
    assert_eq!(description.blocks[1], Block::Paragraph { line: 10 });
    assert_eq!(description.subsections.len(), 1);

    let options = &description.subsections[0];
    assert_eq!(options.title(), "Options");
    assert_eq!(
        options.blocks[0],
        Block::HangingParagraph {
            line: 13,
            args: vec!["4".into()],
        }
    );
    assert_eq!(
        options.blocks[3],
        Block::Indent {
            line: 16,
            args: vec!["4".into()],
            blocks: vec![
                Block::Styled {
                    line: 17,
                    font: Font::Italic,
                    content: words("note:"),
                },
                Block::Text {
                    line: 18,
                    content: words("hidden files"),
                },
            ],
        }
    );
}

#[test]
fn test_ls_page_treeviz() {
    let doc = parse(LS_PAGE);
    insta::assert_snapshot!(to_treeviz_str(&doc), @r###"
    ├─ Comment:  Manual page for ls
    ├─ Title: LS 1 2024-03-01 coreutils
    ├─ Section: NAME
    │ └─ Text: ls \- list directory contents
    ├─ Section: SYNOPSIS
    │ ├─ Styled: bold ls
    │ └─ Text: [OPTION]... [FILE]...
    ├─ Section: DESCRIPTION
    │ ├─ Text: List information about the FIL...
    │ ├─ Paragraph
    │ ├─ Text: Mandatory arguments to long op...
    │ └─ Subsection: Options
    │   ├─ HangingParagraph: 4
    │   ├─ Styled: bold \-a, \-\-all
    │   ├─ Text: do not ignore entries starting...
    │   └─ Indent: 4
    │     ├─ Styled: italic note:
    │     └─ Text: hidden files
    └─ Section: AUTHOR
      └─ Text: Written by Richard Stallman.
    "###);
}

#[test]
fn test_document_serializes_to_json() {
    let doc = parse(".TH X 1\n.SH NAME\n.B x\n");
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["preamble"][0]["type"], "title");
    assert_eq!(json["sections"][0]["blocks"][0]["type"], "styled");
    assert_eq!(json["sections"][0]["blocks"][0]["font"], "bold");
}

#[rstest]
#[case::stray_indent_end("text\n.RE\n", 2, 1)]
#[case::indent_end_first(".RE\n", 1, 1)]
#[case::subsection_before_section(".TH A 1\n.SS Early\n", 2, 1)]
#[case::section_inside_indent(".SH A\n.RS\n.SH B\n.RE\n", 3, 1)]
fn test_syntax_error_location(#[case] source: &str, #[case] line: usize, #[case] column: usize) {
    let mut parser = Parser::with_defaults().unwrap();
    let err = parser.parse(source, "bad.1", 0).unwrap_err();
    assert_eq!(err.loc, Location::new("bad.1", line, Some(column)));
    let prefix = format!("bad.1:{}:{}: unexpected", line, column);
    assert!(err.to_string().starts_with(&prefix));
}

#[test]
fn test_unclosed_indent_fails_at_end_of_input() {
    let mut parser = Parser::with_defaults().unwrap();
    let err = parser.parse(".SH A\n.RS 2\nbody\n", "open.1", 0).unwrap_err();
    assert_eq!(err.loc.line, 4);
    assert!(err.message.starts_with("unexpected end of input; expected one of"));
}

#[test]
fn test_parser_reuse_leaks_no_state() {
    let small = ".SH NAME\nfoo\n";
    let expected = parse(small);

    let mut parser = Parser::with_defaults().unwrap();
    parser.parse(LS_PAGE, "ls.1", 0).unwrap();
    parser.parse("a\nb\nc\n.RE\n", "bad.1", 0).unwrap_err();

    let again = parser.parse(small, "small.1", 0).unwrap();
    assert_eq!(again, expected);
    assert_eq!(again.sections[0].blocks[0].line(), 2);
    assert_eq!(parser.lineno(), 3);
}

#[test]
fn test_fresh_tables_match_shared_tables() {
    let shared = parse(LS_PAGE);

    let mut fresh = Parser::new(ParserConfig::unoptimized(), Box::new(NullSink)).unwrap();
    assert_eq!(fresh.parse(LS_PAGE, "ls.1", 1).unwrap(), shared);

    let optimized = Parser::with_defaults().unwrap();
    assert_eq!(fresh.table(), optimized.table());
}

#[test]
fn test_lexical_errors_do_not_stop_parsing() {
    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let reports = Rc::clone(&reports);
        move |msg: &str, line: usize, col: usize| {
            reports.borrow_mut().push((msg.to_string(), line, col))
        }
    };
    let mut parser = Parser::new(ParserConfig::default(), Box::new(sink)).unwrap();

    let doc = parser.parse(".SH NAME\n.XY foo\x01bar\n", "x.1", 0).unwrap();
    assert_eq!(
        doc.sections[0].blocks,
        vec![Block::Text {
            line: 2,
            content: vec![
                Inline::word("XY"),
                Inline::Space,
                Inline::word("foo"),
                Inline::word("bar"),
            ],
        }]
    );
    assert_eq!(
        *reports.borrow(),
        vec![
            ("Invalid token '.'".to_string(), 2, 1),
            ("Invalid token '\\u{1}'".to_string(), 2, 8),
        ]
    );
}

#[rstest]
#[case::empty("", Document::default())]
#[case::unterminated_line(
    "hello world",
    Document {
        preamble: vec![Block::Text { line: 1, content: words("hello world") }],
        sections: vec![],
    }
)]
#[case::leading_blank_lines(
    "\n\nfoo\n",
    Document {
        preamble: vec![
            Block::Blank { line: 1 },
            Block::Text { line: 3, content: words("foo") },
        ],
        sections: vec![],
    }
)]
#[case::mid_line_macro_is_text(
    "see .B here\n",
    Document {
        preamble: vec![Block::Text { line: 1, content: words("see .B here") }],
        sections: vec![],
    }
)]
#[case::leading_space_is_kept(
    "  indented  text  \n",
    Document {
        preamble: vec![Block::Text {
            line: 1,
            content: vec![
                Inline::Space,
                Inline::word("indented"),
                Inline::Space,
                Inline::word("text"),
            ],
        }],
        sections: vec![],
    }
)]
fn test_small_documents(#[case] source: &str, #[case] expected: Document) {
    assert_eq!(parse(source), expected);
}

#[test]
fn test_section_heading_is_trimmed_and_blocks_are_scoped() {
    let doc = parse(".SH   SEE ALSO  \nfoo\n.SS One\nbar\n.SH NEXT\n");
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].heading, words("SEE ALSO"));
    assert_eq!(doc.sections[0].blocks.len(), 1);
    assert_eq!(doc.sections[0].subsections[0].blocks.len(), 1);
    assert!(doc.sections[1].blocks.is_empty());
}
