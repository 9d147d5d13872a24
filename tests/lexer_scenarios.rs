//! Token streams for small troff inputs

use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;
use troff_parser::{Lexer, Token, TokenKind};

type Reports = Rc<RefCell<Vec<(String, usize, usize)>>>;

fn lexer_with_reports() -> (Lexer, Reports) {
    let reports: Reports = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let reports = Rc::clone(&reports);
        move |msg: &str, line: usize, col: usize| {
            reports.borrow_mut().push((msg.to_string(), line, col))
        }
    };
    (Lexer::new(Box::new(sink)).unwrap(), reports)
}

fn lex(source: &str) -> (Vec<Token>, Reports, usize) {
    let (mut lexer, reports) = lexer_with_reports();
    lexer.input(source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    let line = lexer.lineno();
    (tokens, reports, line)
}

fn pairs(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
    tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
}

use TokenKind::*;

#[rstest]
#[case::title(
    ".TH test 1\n",
    vec![(Title, ".TH"), (Space, " "), (Word, "test"), (Space, " "), (Word, "1"), (Newline, "\n"), (EndMarker, "")]
)]
#[case::blank_lines(
    "A\n\n\nB",
    vec![(Word, "A"), (Newline, "\n\n\n"), (Word, "B"), (EndMarker, "")]
)]
#[case::section(
    ".SH NAME\nfoo\n",
    vec![(Section, ".SH"), (Space, " "), (Word, "NAME"), (Newline, "\n"), (Word, "foo"), (Newline, "\n"), (EndMarker, "")]
)]
#[case::control_character(
    "A\x01B",
    vec![(Word, "A"), (Word, "B"), (EndMarker, "")]
)]
#[case::mid_line_macro_is_a_word(
    "see .B\n",
    vec![(Word, "see"), (Space, " "), (Word, ".B"), (Newline, "\n"), (EndMarker, "")]
)]
#[case::comment(
    ".\\\" note\n.P\n",
    vec![(Comment, ".\\\" note"), (Newline, "\n"), (Paragraph, ".P"), (Newline, "\n"), (EndMarker, "")]
)]
#[case::indent(
    ".RS 4\n.RE\n",
    vec![(IndentStart, ".RS"), (Space, " "), (Word, "4"), (Newline, "\n"), (IndentEnd, ".RE"), (Newline, "\n"), (EndMarker, "")]
)]
#[case::tab_is_a_word_character(
    "a\tb c",
    vec![(Word, "a\tb"), (Space, " "), (Word, "c"), (EndMarker, "")]
)]
#[case::in_band_end_marker(
    "x\x03.SH ignored\n",
    vec![(Word, "x"), (EndMarker, "\x03")]
)]
fn test_token_stream(#[case] source: &str, #[case] expected: Vec<(TokenKind, &str)>) {
    let (tokens, _, _) = lex(source);
    assert_eq!(pairs(&tokens), expected);
}

#[test]
fn test_newline_run_advances_line_by_its_length() {
    let (tokens, _, line) = lex("A\n\n\nB");
    assert_eq!(line, 4);
    assert_eq!(tokens[2].line, 4);
}

#[test]
fn test_invalid_character_reports_line_and_column() {
    let (_, reports, _) = lex("A\x01B");
    assert_eq!(
        *reports.borrow(),
        vec![("Invalid token '\\u{1}'".to_string(), 1, 2)]
    );
}

#[rstest]
#[case("x\n\x02y\n", 2, 1)]
#[case("ab\ncd\x07\n", 2, 3)]
#[case(".SH A\x7f\n", 1, 6)]
fn test_invalid_character_positions(
    #[case] source: &str,
    #[case] line: usize,
    #[case] column: usize,
) {
    let (_, reports, _) = lex(source);
    let reports = reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!((reports[0].1, reports[0].2), (line, column));
}

#[test]
fn test_unknown_macro_reports_the_dot_once() {
    let (tokens, reports, _) = lex(".XY foo\n");
    assert_eq!(
        pairs(&tokens),
        vec![
            (Word, "XY"),
            (Space, " "),
            (Word, "foo"),
            (Newline, "\n"),
            (EndMarker, "")
        ]
    );
    assert_eq!(
        *reports.borrow(),
        vec![("Invalid token '.'".to_string(), 1, 1)]
    );
}

#[test]
fn test_crlf_line_endings_lex_without_reports() {
    let (tokens, reports, line) = lex(".TH X 1\r\n.SH NAME\r\n.PP\r\nfoo\r\n");
    assert!(reports.borrow().is_empty());
    assert_eq!(
        pairs(&tokens),
        vec![
            (Title, ".TH"),
            (Space, " "),
            (Word, "X"),
            (Space, " "),
            (Word, "1\r"),
            (Newline, "\n"),
            (Section, ".SH"),
            (Space, " "),
            (Word, "NAME\r"),
            (Newline, "\n"),
            (Paragraph, ".P"),
            (Word, "P\r"),
            (Newline, "\n"),
            (Word, "foo\r"),
            (Newline, "\n"),
            (EndMarker, ""),
        ]
    );
    assert_eq!(line, 5);
}

#[test]
fn test_line_start_after_newline_run() {
    let (tokens, _, _) = lex("x\n\n.B y\n");
    assert_eq!(tokens[2].kind, Bold);
    assert_eq!(tokens[2].line, 3);
}

#[test]
fn test_token_after_end_is_none() {
    let (mut lexer, _) = lexer_with_reports();
    lexer.input("a");
    assert_eq!(lexer.token().map(|t| t.kind), Some(Word));
    assert_eq!(lexer.token().map(|t| t.kind), Some(EndMarker));
    assert_eq!(lexer.token(), None);
    assert_eq!(lexer.token(), None);
}
