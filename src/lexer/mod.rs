//! Lexical analysis module.
//!
//! This module contains the context-sensitive lexer. It handles:
//!
//! - Compiling the token generators of a context into one anchored regex
//! - Switching between contexts as classifiers request it
//! - Skipping discarded matches such as whitespace and comments
//! - Row/column position tracking for tokens and errors

pub mod context;
pub mod lexer;
pub mod tokens;
