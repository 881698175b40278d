//! FIFO of raw argument tokens consumed during one parse pass.

use std::collections::VecDeque;

/// Remaining raw tokens of a parse, consumed front to back.
///
/// # Examples
///
/// ```
/// use command_options_core::ArgumentCursor;
///
/// let mut cursor = ArgumentCursor::new(["add", "-n", "X"]);
/// assert_eq!(cursor.peek(), Some("add"));
/// assert_eq!(cursor.next_token().as_deref(), Some("add"));
/// assert_eq!(cursor.len(), 2);
/// assert_eq!(cursor.drain(), 2);
/// assert!(cursor.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentCursor {
    tokens: VecDeque<String>,
}

impl ArgumentCursor {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Removes and returns the next token.
    pub fn next_token(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Discards every remaining token, returning how many there were.
    pub fn drain(&mut self) -> usize {
        let remaining = self.tokens.len();
        self.tokens.clear();
        remaining
    }
}
