#![allow(clippy::module_inception)]

//! A context-sensitive, regex driven lexer.
//!
//! A [`Lexer`] is built from a table of named contexts. Each context is a
//! [`LexerContext`]: an ordered list of [`TokenGenerator`]s compiled into one
//! regex. Every match is classified into a token kind, the context to continue
//! in, and whether the token is kept or skipped. Tokens are produced lazily and
//! carry their row/column [`Position`].

pub mod errors;
pub mod lexer;
pub mod macros;

extern crate regex;

pub use errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip};
pub use lexer::context::{Classifier, LexerContext, Match, RegexFlags, TokenGenerator};
pub use lexer::lexer::{ContextId, Lexer, ScanState, Tokens};
pub use lexer::tokens::Token;

/// Location of a token in the input.
///
/// `index` counts the characters before the token, `offset` the bytes. Rows
/// and columns are 1-based and count characters; the end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub index: usize,
    pub offset: usize,
    pub row_begin: usize,
    pub column_begin: usize,
    pub row_end: usize,
    pub column_end: usize,
}

impl Position {
    /// A zero-width position, used to point at a single location.
    pub fn at(index: usize, offset: usize, row: usize, column: usize) -> Self {
        Position {
            index,
            offset,
            row_begin: row,
            column_begin: column,
            row_end: row,
            column_end: column,
        }
    }
}

pub fn get_line_at_row(source: &str, row: usize) -> Option<&str> {
    if row == 0 {
        return None;
    }

    source.split('\n').nth(row - 1)
}

/// Formats an error as a caret diagnostic:
///
/// ```text
/// error: NoRuleMatches (unexpected character)
///   |
/// 2 | let a = #;
///   | --------^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let mut out = if let ErrorTip::None = error.get_tip() {
        format!("error: {} ({})\n", error.get_error_name(), error)
    } else {
        format!(
            "error: {} ({}, {})\n",
            error.get_error_name(),
            error,
            error.get_tip()
        )
    };

    let Some(position) = error.get_position() else {
        return out;
    };
    let Some(line_text) = get_line_at_row(source, position.row_begin) else {
        return out;
    };

    let line_string = position.row_begin.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = position
        .column_begin
        .saturating_sub(removed_whitespace)
        .max(1);
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();

    (&string[start..], start)
}
