use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Option<Position>,
}

/// The two classes of failure a lexer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The context table itself is invalid. Not recoverable.
    Configuration,
    /// No rule of the active context matches the input.
    Lexical,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Option<Position>) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::NoRuleMatches { .. } => ErrorKind::Lexical,
            _ => ErrorKind::Configuration,
        }
    }

    pub fn is_lexical(&self) -> bool {
        self.get_kind() == ErrorKind::Lexical
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::CapturingGroup { .. } => "CapturingGroup",
            ErrorImpl::InvalidPattern { .. } => "InvalidPattern",
            ErrorImpl::GlobalFlag => "GlobalFlag",
            ErrorImpl::InvalidFlag { .. } => "InvalidFlag",
            ErrorImpl::NoContexts => "NoContexts",
            ErrorImpl::DuplicateContext { .. } => "DuplicateContext",
            ErrorImpl::UnknownContext { .. } => "UnknownContext",
            ErrorImpl::MissingKind { .. } => "MissingKind",
            ErrorImpl::EmptyMatch { .. } => "EmptyMatch",
            ErrorImpl::InvalidOffset { .. } => "InvalidOffset",
            ErrorImpl::NoRuleMatches { .. } => "NoRuleMatches",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::CapturingGroup { pattern } => ErrorTip::Suggestion(format!(
                "replace the groups in `{}` with non-capturing groups `(?:...)`",
                pattern
            )),
            ErrorImpl::InvalidPattern { .. } => ErrorTip::None,
            ErrorImpl::GlobalFlag => ErrorTip::Suggestion(String::from(
                "drop the `g` flag, matching is always anchored at the scan offset",
            )),
            ErrorImpl::InvalidFlag { .. } => ErrorTip::Suggestion(String::from(
                "supported flags are `i`, `m`, `s`, `u`, `x`, `y`, `U` and `R`",
            )),
            ErrorImpl::NoContexts => ErrorTip::Suggestion(String::from(
                "register at least one context, the first one is the initial context",
            )),
            ErrorImpl::DuplicateContext { context } => {
                ErrorTip::Suggestion(format!("context {} is registered twice", context))
            }
            ErrorImpl::UnknownContext { context } => ErrorTip::Suggestion(format!(
                "register a context named {} or fix the classifier returning it",
                context
            )),
            ErrorImpl::MissingKind { text, .. } => ErrorTip::Suggestion(format!(
                "the classifier for {:?} must return a token kind",
                text
            )),
            ErrorImpl::EmptyMatch { pattern } => ErrorTip::Suggestion(format!(
                "pattern `{}` must consume at least one character",
                pattern
            )),
            ErrorImpl::InvalidOffset { .. } => ErrorTip::None,
            ErrorImpl::NoRuleMatches { .. } => ErrorTip::None,
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    #[error("pattern must not contain capturing groups: {pattern:?}")]
    CapturingGroup { pattern: String },
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("the g flag must not be used")]
    GlobalFlag,
    #[error("unsupported regex flag: {flag:?}")]
    InvalidFlag { flag: char },
    #[error("at least one lexer context must be provided")]
    NoContexts,
    #[error("context {context} is defined more than once")]
    DuplicateContext { context: String },
    #[error("context {context} does not exist")]
    UnknownContext { context: String },
    #[error("{message}")]
    MissingKind { message: String, text: String },
    #[error("pattern {pattern:?} matched the empty string")]
    EmptyMatch { pattern: String },
    #[error("offset {offset} is not a character boundary of the input")]
    InvalidOffset { offset: usize },
    #[error("{message}: {character:?}")]
    NoRuleMatches { character: char, message: String },
}
