//! Integration tests for a small language with template strings.
//!
//! Template strings switch the lexer into a text context, `${ ... }` switches
//! into an interpolation context and block comments have a context of their
//! own. One lexer is built once and shared by every test.

use std::{collections::HashMap, thread};

use klexer::{render_error, ErrorKind, Lexer, LexerContext, TokenGenerator, MK_RULE, MK_SKIP};
use lazy_static::lazy_static;
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mode {
    Code,
    Template,
    Interpolation,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TokenKind {
    #[default]
    Whitespace,
    Identifier,
    Number,
    Let,
    Fn,
    Return,
    Assignment,
    Plus,
    Semicolon,
    OpenParen,
    CloseParen,
    TemplateStart,
    TemplateText,
    InterpolationStart,
    InterpolationEnd,
    TemplateEnd,
}

lazy_static! {
    static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("fn", TokenKind::Fn);
        map.insert("return", TokenKind::Return);
        map
    };
    static ref LEXER: Lexer<TokenKind, Mode> = build_lexer();
}

fn expression_rules(mode: Mode) -> Vec<TokenGenerator<TokenKind, Mode>> {
    vec![
        TokenGenerator::new("[a-zA-Z_][a-zA-Z0-9_]*", move |text: &str| {
            let kind = RESERVED_LOOKUP
                .get(text)
                .copied()
                .unwrap_or(TokenKind::Identifier);
            (Some(kind), mode, true)
        }),
        MK_RULE!("[0-9]+(?:\\.[0-9]+)?", TokenKind::Number, mode),
        MK_SKIP!("\\s+", mode),
        MK_RULE!("=", TokenKind::Assignment, mode),
        MK_RULE!("\\+", TokenKind::Plus, mode),
        MK_RULE!("\\(", TokenKind::OpenParen, mode),
        MK_RULE!("\\)", TokenKind::CloseParen, mode),
    ]
}

fn build_lexer() -> Lexer<TokenKind, Mode> {
    let mut code = vec![
        MK_SKIP!("/\\*", Mode::Comment),
        MK_SKIP!("//[^\\n]*", Mode::Code),
        MK_RULE!("`", TokenKind::TemplateStart, Mode::Template),
        MK_RULE!(";", TokenKind::Semicolon, Mode::Code),
    ];
    code.extend(expression_rules(Mode::Code));

    let template = vec![
        MK_RULE!("`", TokenKind::TemplateEnd, Mode::Code),
        MK_RULE!("\\$\\{", TokenKind::InterpolationStart, Mode::Interpolation),
        MK_RULE!("[^`$]+", TokenKind::TemplateText, Mode::Template),
        MK_RULE!("\\$", TokenKind::TemplateText, Mode::Template),
    ];

    let mut interpolation = vec![MK_RULE!("\\}", TokenKind::InterpolationEnd, Mode::Template)];
    interpolation.extend(expression_rules(Mode::Interpolation));

    let comment = vec![
        MK_SKIP!("\\*/", Mode::Code),
        MK_SKIP!("[^*]+", Mode::Comment),
        MK_SKIP!("\\*", Mode::Comment),
    ];

    Lexer::new(vec![
        (
            Mode::Code,
            LexerContext::new(code, "unexpected character in code", None).unwrap(),
        ),
        (
            Mode::Template,
            LexerContext::new(template, "unexpected character in template", None).unwrap(),
        ),
        (
            Mode::Interpolation,
            LexerContext::new(interpolation, "unexpected character in interpolation", None)
                .unwrap(),
        ),
        (
            Mode::Comment,
            LexerContext::new(comment, "unexpected character in comment", None).unwrap(),
        ),
    ])
    .unwrap()
}

fn kinds(input: &str) -> Vec<TokenKind> {
    LEXER
        .tokenize(input)
        .unwrap()
        .iter()
        .map(|token| *token.kind())
        .collect()
}

#[test]
fn test_program_with_template_string() {
    let source = "let x = 1;\nfn f() return `a${x + 2}b`; // done";
    let tokens = LEXER.tokenize(source).unwrap();

    let summary: Vec<(TokenKind, &str)> = tokens
        .iter()
        .map(|token| (*token.kind(), token.text()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (TokenKind::Let, "let"),
            (TokenKind::Identifier, "x"),
            (TokenKind::Assignment, "="),
            (TokenKind::Number, "1"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Fn, "fn"),
            (TokenKind::Identifier, "f"),
            (TokenKind::OpenParen, "("),
            (TokenKind::CloseParen, ")"),
            (TokenKind::Return, "return"),
            (TokenKind::TemplateStart, "`"),
            (TokenKind::TemplateText, "a"),
            (TokenKind::InterpolationStart, "${"),
            (TokenKind::Identifier, "x"),
            (TokenKind::Plus, "+"),
            (TokenKind::Number, "2"),
            (TokenKind::InterpolationEnd, "}"),
            (TokenKind::TemplateText, "b"),
            (TokenKind::TemplateEnd, "`"),
            (TokenKind::Semicolon, ";"),
        ]
    );

    let fn_token = &tokens[5];
    assert_eq!(fn_token.pos().index, 11);
    assert_eq!(fn_token.pos().row_begin, 2);
    assert_eq!(fn_token.pos().column_begin, 1);

    let template_start = &tokens[10];
    assert_eq!(template_start.pos().row_begin, 2);
    assert_eq!(template_start.pos().column_begin, 15);
    assert_eq!(template_start.resume_state().context, Mode::Template);
}

#[test]
fn test_template_text_keeps_whitespace() {
    let tokens = LEXER.tokenize("`a b $ c`").unwrap();
    let texts: Vec<&str> = tokens.iter().map(|token| token.text()).collect();

    assert_eq!(texts, vec!["`", "a b ", "$", " c", "`"]);
    assert_eq!(
        kinds("`a b $ c`"),
        vec![
            TokenKind::TemplateStart,
            TokenKind::TemplateText,
            TokenKind::TemplateText,
            TokenKind::TemplateText,
            TokenKind::TemplateEnd,
        ]
    );
}

#[test]
fn test_number_literals() {
    let tokens = LEXER.tokenize("42 3.14 0").unwrap();
    let texts: Vec<&str> = tokens.iter().map(|token| token.text()).collect();

    assert_eq!(texts, vec!["42", "3.14", "0"]);
}

#[test]
fn test_block_comment_across_lines() {
    let tokens = LEXER.tokenize("1 /* a\n * b */ 2").unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].text(), "2");
    assert_eq!(tokens[1].pos().row_begin, 2);
    assert_eq!(tokens[1].pos().column_begin, 9);
}

#[test]
fn test_line_comment_stops_at_newline() {
    assert_eq!(
        kinds("x // ignored\ny"),
        vec![TokenKind::Identifier, TokenKind::Identifier]
    );
}

#[test]
fn test_unterminated_template_ends_in_template_context() {
    let tokens = LEXER.tokenize("`open").unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].resume_state().context, Mode::Template);

    // the next parse starts over in code
    assert_eq!(kinds("let"), vec![TokenKind::Let]);
}

#[test]
fn test_unrecognized_character() {
    let source = "let x = @;";
    let error = LEXER.tokenize(source).unwrap_err();

    assert_eq!(error.get_kind(), ErrorKind::Lexical);
    assert_eq!(error.to_string(), "unexpected character in code: '@'");

    let position = error.get_position().unwrap();
    assert_eq!(position.row_begin, 1);
    assert_eq!(position.column_begin, 9);

    let rendered = render_error(&error, source);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[2], "1 | let x = @;");
    assert_eq!(lines[3], "  | --------^");
}

#[test]
fn test_unrecognized_character_in_interpolation() {
    let error = LEXER.tokenize("`${;}`").unwrap_err();

    assert_eq!(error.to_string(), "unexpected character in interpolation: ';'");
    assert_eq!(error.get_position().unwrap().index, 3);
}

#[test]
fn test_lazy_chain_matches_tokenize() {
    let source = "fn g() return `${1}${2}`;";

    let head = LEXER.parse(source).unwrap().unwrap();

    let mut walked = vec![];
    let mut current = Some(&head);
    while let Some(token) = current {
        walked.push((*token.kind(), token.text().to_string(), *token.pos()));
        current = token.next().unwrap();
    }

    let collected: Vec<_> = LEXER
        .tokenize(source)
        .unwrap()
        .iter()
        .map(|token| (*token.kind(), token.text().to_string(), *token.pos()))
        .collect();

    assert_eq!(walked, collected);
}

#[test]
fn test_shared_lexer_across_threads() {
    let inputs = vec![
        ("let a = 1;", 5),
        ("`x${y}z`", 7),
        ("fn f() return 2;", 7),
        ("/* c */ q", 1),
    ];

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|(input, expected)| {
            thread::spawn(move || {
                for _ in 0..50 {
                    assert_eq!(LEXER.tokenize(input).unwrap().len(), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
