use std::{
    fmt::{self, Debug, Display},
    hash::Hash,
    sync::OnceLock,
};

use crate::{errors::errors::Error, Position};

use super::lexer::{ContextId, Lexer, ScanState};

type NextToken<'l, 'i, K, C> = Result<Option<Box<Token<'l, 'i, K, C>>>, Error>;

/// A kept token. The following token is scanned on the first call to
/// [`Token::next`] and memoized.
pub struct Token<'l, 'i, K, C = ContextId> {
    lexer: &'l Lexer<K, C>,
    input: &'i str,
    kind: K,
    text: &'i str,
    pos: Position,
    keep: bool,
    resume: ScanState<C>,
    next: OnceLock<NextToken<'l, 'i, K, C>>,
}

impl<'l, 'i, K, C> Token<'l, 'i, K, C> {
    pub(crate) fn new(
        lexer: &'l Lexer<K, C>,
        input: &'i str,
        kind: K,
        text: &'i str,
        pos: Position,
        resume: ScanState<C>,
    ) -> Self {
        Token {
            lexer,
            input,
            kind,
            text,
            pos,
            keep: true,
            resume,
            next: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn text(&self) -> &'i str {
        self.text
    }

    pub fn pos(&self) -> &Position {
        &self.pos
    }

    pub fn keep(&self) -> bool {
        self.keep
    }

    /// Byte offset right after this token.
    pub fn end(&self) -> usize {
        self.pos.offset + self.text.len()
    }

    /// The state scanning continues from: the end of this token and the
    /// context its classifier selected.
    pub fn resume_state(&self) -> &ScanState<C> {
        &self.resume
    }
}

impl<'l, 'i, K, C> Token<'l, 'i, K, C>
where
    C: Clone + Eq + Hash + Debug,
{
    /// Returns the following kept token, `None` at the end of the input.
    ///
    /// Scans at most once; later calls return the memoized result.
    pub fn next(&self) -> Result<Option<&Token<'l, 'i, K, C>>, Error> {
        let next = self.next.get_or_init(|| {
            self.lexer
                .parse_next_available(self.input, self.resume.clone())
                .map(|token| token.map(Box::new))
        });

        match next {
            Ok(token) => Ok(token.as_deref()),
            Err(error) => Err(error.clone()),
        }
    }
}

// Unlinks the chain first so a long token list is not dropped recursively.
impl<'l, 'i, K, C> Drop for Token<'l, 'i, K, C> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(Ok(Some(mut token))) = next {
            next = token.next.take();
        }
    }
}

impl<'l, 'i, K: PartialEq, C> PartialEq for Token<'l, 'i, K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.text == other.text
            && self.pos == other.pos
            && self.keep == other.keep
    }
}

impl<'l, 'i, K: Debug, C: Debug> Debug for Token<'l, 'i, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("pos", &self.pos)
            .field("keep", &self.keep)
            .field("resume", &self.resume)
            .finish()
    }
}

impl<'l, 'i, K: Display, C> Display for Token<'l, 'i, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} @{}:{}-{}:{}",
            self.kind,
            self.text,
            self.pos.row_begin,
            self.pos.column_begin,
            self.pos.row_end,
            self.pos.column_end
        )
    }
}
