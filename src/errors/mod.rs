//! Error types for lexer construction and scanning.
//!
//! Errors come in two classes:
//!
//! - Configuration errors: the context table is invalid (capturing groups,
//!   unknown contexts, classifiers without a token kind, ...)
//! - Lexical errors: no rule of the active context matches the input
//!
//! Both carry an optional [`Position`](crate::Position) pointing at the
//! offending location.

pub mod errors;
