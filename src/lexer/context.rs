use std::{fmt, str::FromStr};

use regex::RegexBuilder;
use regex_automata::{meta, util::syntax, Anchored, Input};
use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// Always the last alternative of a context. It makes sure every scan
/// consumes at least one character, so an unmatched character can be
/// reported at its exact position.
const CATCH_ALL: &str = "((?su:.))";

/// Maps the matched text to `(kind, next context, keep)`.
///
/// A `None` kind is a configuration error. The next context may be the
/// current one.
pub type Classifier<K, C> = Box<dyn Fn(&str) -> (Option<K>, C, bool) + Send + Sync>;

/// A regex snippet and the classifier called when it matches.
///
/// The snippet must not contain capturing groups; use `(?:...)` instead.
pub struct TokenGenerator<K, C> {
    pattern: String,
    classifier: Classifier<K, C>,
}

impl<K, C> TokenGenerator<K, C> {
    pub fn new<F>(pattern: impl Into<String>, classifier: F) -> Self
    where
        F: Fn(&str) -> (Option<K>, C, bool) + Send + Sync + 'static,
    {
        TokenGenerator {
            pattern: pattern.into(),
            classifier: Box::new(classifier),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn classify(&self, text: &str) -> (Option<K>, C, bool) {
        (self.classifier)(text)
    }
}

impl<K, C> fmt::Debug for TokenGenerator<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Matching modes of a context.
///
/// Anchoring at the scan offset and dot-matches-newline are always on and
/// cannot be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub unicode: bool,
    pub ignore_whitespace: bool,
    pub swap_greed: bool,
    pub crlf: bool,
}

impl Default for RegexFlags {
    fn default() -> Self {
        RegexFlags {
            case_insensitive: false,
            multi_line: false,
            unicode: true,
            ignore_whitespace: false,
            swap_greed: false,
            crlf: false,
        }
    }
}

impl RegexFlags {
    fn builder(&self, pattern: &str) -> RegexBuilder {
        let mut builder = RegexBuilder::new(pattern);
        builder
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .unicode(self.unicode)
            .ignore_whitespace(self.ignore_whitespace)
            .swap_greed(self.swap_greed)
            .crlf(self.crlf)
            .dot_matches_new_line(true);
        builder
    }

    fn syntax_config(&self) -> syntax::Config {
        syntax::Config::new()
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .unicode(self.unicode)
            .ignore_whitespace(self.ignore_whitespace)
            .swap_greed(self.swap_greed)
            .crlf(self.crlf)
            .dot_matches_new_line(true)
    }
}

/// Parses JavaScript style flag letters, e.g. `"iu"`.
///
/// `s` and `y` are accepted and ignored since both modes are always on. `g`
/// is rejected.
impl FromStr for RegexFlags {
    type Err = Error;

    fn from_str(flags: &str) -> Result<Self, Self::Err> {
        let mut result = RegexFlags::default();

        for flag in flags.chars() {
            match flag {
                'g' => return Err(Error::new(ErrorImpl::GlobalFlag, None)),
                'i' => result.case_insensitive = true,
                'm' => result.multi_line = true,
                'u' => result.unicode = true,
                'x' => result.ignore_whitespace = true,
                'U' => result.swap_greed = true,
                'R' => result.crlf = true,
                's' | 'y' => {}
                _ => return Err(Error::new(ErrorImpl::InvalidFlag { flag }, None)),
            }
        }

        Ok(result)
    }
}

/// Result of a successful [`LexerContext::match_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'i, K, C> {
    pub kind: Option<K>,
    pub next_context: C,
    pub text: &'i str,
    pub keep: bool,
}

/// One lexer context: its generators compiled into a single regex.
///
/// The composite regex has the shape `(?:(p1)|(p2)|...|(.))` and is always
/// searched anchored at the scan offset of the whole input, so `^`, `\b` and
/// friends see the text before the offset. The index of the group that
/// participated in a match selects the classifier.
pub struct LexerContext<K, C> {
    error_message: String,
    pattern: String,
    regex: meta::Regex,
    flags: RegexFlags,
    generators: Vec<TokenGenerator<K, C>>,
}

impl<K, C> LexerContext<K, C> {
    /// Compiles a context, with flags given as letters (see [`RegexFlags`]).
    pub fn new(
        generators: Vec<TokenGenerator<K, C>>,
        error_message: impl Into<String>,
        flags: Option<&str>,
    ) -> Result<Self, Error> {
        let flags = match flags {
            Some(flags) => flags.parse()?,
            None => RegexFlags::default(),
        };

        Self::with_flags(generators, error_message, flags)
    }

    pub fn with_flags(
        generators: Vec<TokenGenerator<K, C>>,
        error_message: impl Into<String>,
        flags: RegexFlags,
    ) -> Result<Self, Error> {
        for generator in &generators {
            check_pattern(&generator.pattern, &flags)?;
        }

        // a trailing `# comment` must not swallow the closing parenthesis
        let separator = if flags.ignore_whitespace { "\n" } else { "" };
        let alternatives: String = generators
            .iter()
            .map(|generator| format!("({}{})|", generator.pattern, separator))
            .collect();
        let pattern = format!("(?:{}{})", alternatives, CATCH_ALL);

        let regex = meta::Regex::builder()
            .syntax(flags.syntax_config())
            .build(&pattern)
            .map_err(|err| {
                Error::new(
                    ErrorImpl::InvalidPattern {
                        pattern: pattern.clone(),
                        message: err.to_string(),
                    },
                    None,
                )
            })?;

        debug!(patterns = generators.len(), %pattern, "compiled lexer context");

        Ok(LexerContext {
            error_message: error_message.into(),
            pattern,
            regex,
            flags,
            generators,
        })
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Source of the composite regex.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn regex(&self) -> &meta::Regex {
        &self.regex
    }

    pub fn flags(&self) -> &RegexFlags {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Matches the context against `input` exactly at byte `offset`. The
    /// text before `offset` is visible to look-behind assertions.
    ///
    /// `row` and `column` only serve to position errors. Fails with a lexical
    /// error when no generator matches the character at `offset`.
    pub fn match_at<'i>(
        &self,
        input: &'i str,
        offset: usize,
        row: usize,
        column: usize,
    ) -> Result<Match<'i, K, C>, Error> {
        if offset >= input.len() || !input.is_char_boundary(offset) {
            return Err(Error::new(
                ErrorImpl::InvalidOffset { offset },
                Some(Position::at(char_index(input, offset), offset, row, column)),
            ));
        }

        let search = Input::new(input)
            .span(offset..input.len())
            .anchored(Anchored::Yes);
        let mut captures = self.regex.create_captures();
        self.regex.search_captures(&search, &mut captures);

        // group 0 is the whole match
        let matched = (1..captures.group_len()).find_map(|group| {
            captures
                .get_group(group)
                .map(|span| (group - 1, &input[span.range()]))
        });

        let (index, text) = match matched {
            Some((index, text)) if index < self.generators.len() => (index, text),
            _ => return Err(self.no_rule_matches(input, offset, row, column)),
        };

        let generator = &self.generators[index];
        if text.is_empty() {
            return Err(Error::new(
                ErrorImpl::EmptyMatch {
                    pattern: generator.pattern.clone(),
                },
                Some(Position::at(char_index(input, offset), offset, row, column)),
            ));
        }

        let (kind, next_context, keep) = generator.classify(text);

        Ok(Match {
            kind,
            next_context,
            text,
            keep,
        })
    }

    fn no_rule_matches(&self, input: &str, offset: usize, row: usize, column: usize) -> Error {
        Error::new(
            ErrorImpl::NoRuleMatches {
                character: input[offset..].chars().next().unwrap_or_default(),
                message: self.error_message.clone(),
            },
            Some(Position::at(char_index(input, offset), offset, row, column)),
        )
    }
}

impl<K, C> fmt::Debug for LexerContext<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexerContext")
            .field("error_message", &self.error_message)
            .field("pattern", &self.pattern)
            .field("flags", &self.flags)
            .field("generators", &self.generators)
            .finish()
    }
}

/// Number of characters before byte `offset`. Only used on error paths; the
/// lexer tracks the index incrementally.
fn char_index(input: &str, offset: usize) -> usize {
    input
        .get(..offset)
        .map_or(offset, |prefix| prefix.chars().count())
}

/// Compiles a snippet on its own to reject syntax errors and capturing
/// groups before they end up in the composite regex.
fn check_pattern(pattern: &str, flags: &RegexFlags) -> Result<(), Error> {
    let regex = flags
        .builder(pattern)
        .build()
        .map_err(|err| invalid_pattern(pattern, err))?;

    // group 0 is the whole match
    if regex.captures_len() > 1 {
        return Err(Error::new(
            ErrorImpl::CapturingGroup {
                pattern: pattern.to_string(),
            },
            None,
        ));
    }

    Ok(())
}

fn invalid_pattern(pattern: &str, err: regex::Error) -> Error {
    Error::new(
        ErrorImpl::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        },
        None,
    )
}
