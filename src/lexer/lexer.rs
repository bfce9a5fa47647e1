use std::{
    collections::HashMap,
    fmt::{self, Debug, Display},
    hash::Hash,
    iter::FusedIterator,
};

use tracing::{debug, trace};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{context::LexerContext, tokens::Token};

/// Default identifier of a lexer context: either a name or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextId {
    Name(String),
    Index(i64),
}

impl From<&str> for ContextId {
    fn from(name: &str) -> Self {
        ContextId::Name(name.to_string())
    }
}

impl From<String> for ContextId {
    fn from(name: String) -> Self {
        ContextId::Name(name)
    }
}

impl From<i64> for ContextId {
    fn from(index: i64) -> Self {
        ContextId::Index(index)
    }
}

impl Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextId::Name(name) => write!(f, "{}", name),
            ContextId::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Where a scan stands: the active context and the next position to read.
///
/// `index` counts characters and `offset` bytes. Owned by the caller, so a
/// [`Lexer`] can be shared between scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanState<C> {
    pub context: C,
    pub index: usize,
    pub offset: usize,
    pub row: usize,
    pub column: usize,
}

impl<C> ScanState<C> {
    pub fn new(context: C) -> Self {
        ScanState {
            context,
            index: 0,
            offset: 0,
            row: 1,
            column: 1,
        }
    }

    /// Moves past `text`, which must start at the current offset.
    pub fn advance(&mut self, text: &str) {
        self.offset += text.len();

        for c in text.chars() {
            self.index += 1;

            if c == '\n' {
                self.row += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

/// A table of lexer contexts. The first registered context is the initial one.
pub struct Lexer<K, C = ContextId> {
    contexts: HashMap<C, LexerContext<K, C>>,
    initial: C,
}

impl<K, C> Lexer<K, C>
where
    C: Clone + Eq + Hash + Debug,
{
    pub fn new(contexts: Vec<(C, LexerContext<K, C>)>) -> Result<Self, Error> {
        let Some(initial) = contexts.first().map(|(id, _)| id.clone()) else {
            return Err(Error::new(ErrorImpl::NoContexts, None));
        };

        let mut table = HashMap::with_capacity(contexts.len());
        for (id, context) in contexts {
            if table.contains_key(&id) {
                return Err(Error::new(
                    ErrorImpl::DuplicateContext {
                        context: format!("{:?}", id),
                    },
                    None,
                ));
            }
            table.insert(id, context);
        }

        if !table.contains_key(&initial) {
            return Err(unknown_context(&initial, None));
        }

        debug!(contexts = table.len(), initial = ?initial, "created lexer");

        Ok(Lexer {
            contexts: table,
            initial,
        })
    }

    pub fn initial_context(&self) -> &C {
        &self.initial
    }

    pub fn context(&self, id: &C) -> Option<&LexerContext<K, C>> {
        self.contexts.get(id)
    }

    /// A state at the start of an input, in the initial context.
    pub fn initial_state(&self) -> ScanState<C> {
        ScanState::new(self.initial.clone())
    }

    /// Puts `state` back into the initial context. The position is untouched.
    pub fn reset(&self, state: &mut ScanState<C>) {
        state.context = self.initial.clone();
    }

    /// Returns the first kept token of `input`, or `None` if there is none.
    pub fn parse<'l, 'i>(&'l self, input: &'i str) -> Result<Option<Token<'l, 'i, K, C>>, Error> {
        self.parse_next_available(input, self.initial_state())
    }

    /// Scans from `state` until a kept token is found or the input ends.
    ///
    /// Discarded matches are consumed silently. Context switches requested by
    /// classifiers apply from the following match on.
    pub fn parse_next_available<'l, 'i>(
        &'l self,
        input: &'i str,
        mut state: ScanState<C>,
    ) -> Result<Option<Token<'l, 'i, K, C>>, Error> {
        loop {
            if state.offset >= input.len() {
                return Ok(None);
            }

            let start = Position::at(state.index, state.offset, state.row, state.column);

            let context = self
                .contexts
                .get(&state.context)
                .ok_or_else(|| unknown_context(&state.context, Some(start)))?;

            let matched = match context.match_at(input, state.offset, state.row, state.column) {
                Ok(matched) => matched,
                Err(error) => {
                    debug!(context = ?state.context, %error, "scan failed");
                    return Err(error);
                }
            };

            if matched.next_context != state.context {
                if !self.contexts.contains_key(&matched.next_context) {
                    return Err(unknown_context(&matched.next_context, Some(start)));
                }

                debug!(from = ?state.context, to = ?matched.next_context, "switching lexer context");
                state.context = matched.next_context;
            }

            let Some(kind) = matched.kind else {
                debug!(text = matched.text, "classifier returned no token kind");
                return Err(Error::new(
                    ErrorImpl::MissingKind {
                        message: context.error_message().to_string(),
                        text: matched.text.to_string(),
                    },
                    Some(start),
                ));
            };

            state.advance(matched.text);

            let pos = Position {
                index: start.index,
                offset: start.offset,
                row_begin: start.row_begin,
                column_begin: start.column_begin,
                row_end: state.row,
                column_end: state.column,
            };

            if matched.keep {
                trace!(text = matched.text, ?pos, "accepted token");
                return Ok(Some(Token::new(self, input, kind, matched.text, pos, state)));
            }

            trace!(text = matched.text, ?pos, "skipped token");
        }
    }

    /// Iterates over the kept tokens of `input`, stopping after the first error.
    pub fn tokens<'l, 'i>(&'l self, input: &'i str) -> Tokens<'l, 'i, K, C> {
        Tokens {
            lexer: self,
            input,
            state: Some(self.initial_state()),
        }
    }

    pub fn tokenize<'l, 'i>(&'l self, input: &'i str) -> Result<Vec<Token<'l, 'i, K, C>>, Error> {
        self.tokens(input).collect()
    }
}

impl<K, C: Debug> Debug for Lexer<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("contexts", &self.contexts)
            .field("initial", &self.initial)
            .finish()
    }
}

fn unknown_context<C: Debug>(context: &C, position: Option<Position>) -> Error {
    Error::new(
        ErrorImpl::UnknownContext {
            context: format!("{:?}", context),
        },
        position,
    )
}

/// Pull-based iterator over the kept tokens of an input.
pub struct Tokens<'l, 'i, K, C> {
    lexer: &'l Lexer<K, C>,
    input: &'i str,
    state: Option<ScanState<C>>,
}

impl<'l, 'i, K, C> Tokens<'l, 'i, K, C> {
    /// The state the next call to `next` scans from, `None` once finished.
    pub fn state(&self) -> Option<&ScanState<C>> {
        self.state.as_ref()
    }
}

impl<'l, 'i, K, C> Iterator for Tokens<'l, 'i, K, C>
where
    C: Clone + Eq + Hash + Debug,
{
    type Item = Result<Token<'l, 'i, K, C>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.take()?;

        match self.lexer.parse_next_available(self.input, state) {
            Ok(Some(token)) => {
                self.state = Some(token.resume_state().clone());
                Some(Ok(token))
            }
            Ok(None) => None,
            Err(error) => Some(Err(error)),
        }
    }
}

impl<'l, 'i, K, C> FusedIterator for Tokens<'l, 'i, K, C> where C: Clone + Eq + Hash + Debug {}
