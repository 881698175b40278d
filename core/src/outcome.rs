//! The result of one parse: state, diagnostic, record and verb.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::router::ResultRouter;

/// Terminal state of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ParseState {
    /// All arguments were assigned.
    #[default]
    Succeeded,
    /// A multi-verb parser got no verb, an empty verb or an unknown one.
    MissingVerb,
    /// An option was expected at this argument.
    MissingOption,
    /// The option name is not declared.
    UnknownOption,
    /// The option's value token is missing.
    MissingValue,
    /// The value could not be converted to the option's type.
    BadValue,
    /// One of the help triggers was given.
    RequestHelp,
    /// Mandatory options were not supplied.
    MandatoryOption,
    /// Options were supplied more than once.
    DuplicateOption,
}

impl ParseState {
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }

    pub fn is_help(self) -> bool {
        self == Self::RequestHelp
    }

    /// Any state other than success and help.
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Succeeded | Self::RequestHelp)
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of [`Parser::parse`](crate::Parser::parse).
///
/// The record is present as soon as it was allocated, so a failed parse can
/// still expose the partially filled options.
#[derive(Default)]
pub struct Outcome {
    state: ParseState,
    message: String,
    record: Option<Box<dyn Any + Send>>,
    record_name: Option<&'static str>,
    verb: Option<String>,
}

impl Outcome {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Diagnostic text; empty on success and on help requests.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The verb token that selected the option set, if any.
    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }

    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }

    /// Short type name of the record, if one was allocated.
    pub fn record_name(&self) -> Option<&'static str> {
        self.record_name
    }

    /// Borrows the record if it is a `T`.
    pub fn record<T: Any>(&self) -> Option<&T> {
        self.record.as_ref()?.downcast_ref::<T>()
    }

    /// Takes the record out if it is a `T`.
    pub fn into_record<T: Any>(self) -> Option<T> {
        self.record?.downcast::<T>().ok().map(|record| *record)
    }

    /// Starts fluent dispatch over this outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_options_core::{OptionSet, Parser};
    ///
    /// #[derive(Debug, Default)]
    /// struct Greet {
    ///     name: String,
    /// }
    ///
    /// let set = OptionSet::builder::<Greet>()
    ///     .option("name", |o| &mut o.name, |d| d.position(0).mandatory())
    ///     .build()
    ///     .unwrap();
    /// let parser = Parser::new(set);
    ///
    /// let code = parser
    ///     .parse(["World"])
    ///     .route::<i32>()
    ///     .on::<Greet>(|o| if o.name == "World" { 0 } else { 1 })
    ///     .on_help(|_| -1)
    ///     .on_error(|_| -2)
    ///     .into_value();
    /// assert_eq!(code, 0);
    /// ```
    pub fn route<R>(&self) -> ResultRouter<'_, R> {
        ResultRouter::new(self)
    }

    /// Sets a terminal state unless one is already set.
    ///
    /// Returns `false` when an earlier terminal state is kept.
    pub(crate) fn set_state(&mut self, state: ParseState, message: impl Into<String>) -> bool {
        if !self.state.is_success() {
            return false;
        }
        self.state = state;
        self.message = message.into();
        true
    }

    pub(crate) fn set_record(&mut self, record: Box<dyn Any + Send>, name: &'static str) {
        self.record = Some(record);
        self.record_name = Some(name);
    }

    pub(crate) fn set_verb(&mut self, verb: String) {
        self.verb = Some(verb);
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("state", &self.state)
            .field("message", &self.message)
            .field("record", &self.record_name)
            .field("verb", &self.verb)
            .finish()
    }
}
