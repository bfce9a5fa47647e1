//! Utility macros for building context tables.
//!
//! - `MK_RULE!` - A generator that always produces the same kept token
//! - `MK_SKIP!` - A generator whose matches are discarded
//!
//! These macros reduce boilerplate when most rules are fixed tokens.

/// Creates a [`TokenGenerator`](crate::TokenGenerator) that yields `$kind`,
/// continues in `$context` and keeps the token.
///
/// # Example
///
/// ```ignore
/// MK_RULE!("[0-9]+", Kind::Number, ContextId::from("main"))
/// ```
#[macro_export]
macro_rules! MK_RULE {
    ($pattern:expr, $kind:expr, $context:expr) => {
        $crate::TokenGenerator::new($pattern, move |_text: &str| {
            (Some($kind), $context, true)
        })
    };
}

/// Creates a [`TokenGenerator`](crate::TokenGenerator) whose matches are
/// skipped.
///
/// Without an explicit kind, `Default::default()` is used; it is never
/// surfaced since the token is not kept.
///
/// # Example
///
/// ```ignore
/// MK_SKIP!("\\s+", ContextId::from("main"))
/// ```
#[macro_export]
macro_rules! MK_SKIP {
    ($pattern:expr, $context:expr) => {
        $crate::TokenGenerator::new($pattern, move |_text: &str| {
            (Some(::std::default::Default::default()), $context, false)
        })
    };
    ($pattern:expr, $kind:expr, $context:expr) => {
        $crate::TokenGenerator::new($pattern, move |_text: &str| {
            (Some($kind), $context, false)
        })
    };
}
