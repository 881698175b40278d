//! Fluent dispatch over an [`Outcome`].
//!
//! A [`ResultRouter`] runs at most one handler and keeps its return value in
//! a write-once [`ReturnSlot`]. Handlers are gated so that for any outcome at
//! most one of `on`/`on_verb`, `on_help` and `on_error` applies.

use std::any::Any;

use tracing::trace;

use crate::error::RouterError;
use crate::outcome::Outcome;

/// Write-once holder for a handler's return value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReturnSlot<R> {
    #[default]
    Pending,
    Completed(R),
}

impl<R> ReturnSlot<R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Stores the value.
    ///
    /// # Panics
    ///
    /// Panics if a value was already stored.
    #[track_caller]
    pub fn complete(&mut self, value: R) {
        assert!(self.is_pending(), "return value already set");
        *self = Self::Completed(value);
    }

    /// Returns the stored value, if any.
    pub fn into_inner(self) -> Option<R> {
        match self {
            Self::Pending => None,
            Self::Completed(value) => Some(value),
        }
    }
}

/// Chainable handler registration over a parse outcome.
///
/// # Examples
///
/// ```
/// use command_options_core::{OptionSet, Parser};
///
/// #[derive(Debug, Default)]
/// struct AddOptions { name: String }
/// #[derive(Debug, Default)]
/// struct ListOptions { active: bool }
///
/// let parser = Parser::with_option_sets(vec![
///     OptionSet::builder::<AddOptions>()
///         .verb("add")
///         .field("n", |o| &mut o.name)
///         .build()
///         .unwrap(),
///     OptionSet::builder::<ListOptions>()
///         .verb("list")
///         .field("a", |o| &mut o.active)
///         .build()
///         .unwrap(),
/// ])
/// .unwrap();
///
/// let dispatch = |args: &[&str]| {
///     parser
///         .parse(args.iter().copied())
///         .route::<i32>()
///         .on::<AddOptions>(|_| 1)
///         .on::<ListOptions>(|_| 2)
///         .on_help(|_| -1)
///         .on_error(|_| -2)
///         .into_value()
/// };
///
/// assert_eq!(dispatch(&["add", "-n", "some name"]), 1);
/// assert_eq!(dispatch(&["list", "-a"]), 2);
/// assert_eq!(dispatch(&["-?"]), -1);
/// assert_eq!(dispatch(&["list", "-g"]), -2);
/// ```
#[derive(Debug)]
pub struct ResultRouter<'a, R> {
    outcome: &'a Outcome,
    slot: ReturnSlot<R>,
}

impl<'a, R> ResultRouter<'a, R> {
    pub(crate) fn new(outcome: &'a Outcome) -> Self {
        Self {
            outcome,
            slot: ReturnSlot::Pending,
        }
    }

    /// Runs `handler` on a successfully parsed `T` record.
    ///
    /// Skipped once a value has been returned by an earlier handler.
    pub fn on<T: Any>(mut self, handler: impl FnOnce(&T) -> R) -> Self {
        if self.outcome.is_success() && self.slot.is_pending() {
            if let Some(record) = self.outcome.record::<T>() {
                trace!(record = std::any::type_name::<T>(), "Routing parsed record");
                self.slot.complete(handler(record));
            }
        }
        self
    }

    /// Like [`on`](Self::on), restricted to outcomes selected by `verb`.
    pub fn on_verb<T: Any>(mut self, verb: &str, handler: impl FnOnce(&T) -> R) -> Self {
        if self.outcome.verb() == Some(verb) {
            self = self.on(handler);
        }
        self
    }

    /// Runs `handler` when help was requested.
    ///
    /// # Panics
    ///
    /// Panics if a return value was already set.
    #[track_caller]
    pub fn on_help(mut self, handler: impl FnOnce(&Outcome) -> R) -> Self {
        if self.outcome.state().is_help() {
            trace!(verb = ?self.outcome.verb(), "Routing help request");
            self.slot.complete(handler(self.outcome));
        }
        self
    }

    /// Runs `handler` for any failure state.
    ///
    /// # Panics
    ///
    /// Panics if a return value was already set.
    #[track_caller]
    pub fn on_error(mut self, handler: impl FnOnce(&Outcome) -> R) -> Self {
        if self.outcome.state().is_failure() {
            trace!(state = ?self.outcome.state(), "Routing parse failure");
            self.slot.complete(handler(self.outcome));
        }
        self
    }

    /// Returns `true` once a handler has run.
    pub fn is_completed(&self) -> bool {
        !self.slot.is_pending()
    }

    pub fn outcome(&self) -> &'a Outcome {
        self.outcome
    }

    /// The value returned by the handler that ran.
    ///
    /// # Panics
    ///
    /// Panics if no handler ran.
    #[track_caller]
    pub fn into_value(self) -> R {
        match self.slot {
            ReturnSlot::Completed(value) => value,
            ReturnSlot::Pending => panic!("return value not set"),
        }
    }

    /// Non-panicking form of [`into_value`](Self::into_value).
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::ReturnNotSet`] if no handler ran.
    pub fn try_into_value(self) -> Result<R, RouterError> {
        self.slot.into_inner().ok_or(RouterError::ReturnNotSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ParseState;

    #[derive(Debug, Default)]
    struct AddOptions;

    #[derive(Debug, Default)]
    struct ListOptions;

    fn succeeded<T: Any + Send>(record: T, verb: Option<&str>) -> Outcome {
        let mut outcome = Outcome::new();
        outcome.set_record(Box::new(record), "test");
        if let Some(verb) = verb {
            outcome.set_verb(verb.to_string());
        }
        outcome
    }

    #[test]
    fn test_on_fires_only_for_matching_record_type() {
        let outcome = succeeded(ListOptions, Some("list"));
        let value = outcome
            .route::<i32>()
            .on::<AddOptions>(|_| 1)
            .on::<ListOptions>(|_| 2)
            .into_value();
        assert_eq!(value, 2);
    }

    #[test]
    fn test_on_skips_after_first_match() {
        let outcome = succeeded(AddOptions, Some("add"));
        let value = outcome
            .route::<i32>()
            .on_verb::<AddOptions>("add", |_| 1)
            .on::<AddOptions>(|_| 2)
            .into_value();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_on_verb_disambiguates_shared_record_type() {
        let outcome = succeeded(AddOptions, Some("remove"));
        let value = outcome
            .route::<&str>()
            .on_verb::<AddOptions>("add", |_| "add")
            .on_verb::<AddOptions>("remove", |_| "remove")
            .into_value();
        assert_eq!(value, "remove");
    }

    #[test]
    fn test_help_and_error_are_exclusive_with_on() {
        let mut outcome = succeeded(AddOptions, None);
        outcome.set_state(ParseState::RequestHelp, "");
        let value = outcome
            .route::<i32>()
            .on::<AddOptions>(|_| 1)
            .on_help(|_| -1)
            .on_error(|_| -2)
            .into_value();
        assert_eq!(value, -1);

        let mut outcome = succeeded(AddOptions, None);
        outcome.set_state(ParseState::BadValue, "bad");
        let value = outcome
            .route::<i32>()
            .on::<AddOptions>(|_| 1)
            .on_help(|_| -1)
            .on_error(|r| if r.message() == "bad" { -2 } else { -3 })
            .into_value();
        assert_eq!(value, -2);
    }

    #[test]
    fn test_try_into_value_reports_unset() {
        let outcome = succeeded(AddOptions, None);
        let router = outcome.route::<i32>().on::<ListOptions>(|_| 2);
        assert!(!router.is_completed());
        assert_eq!(router.try_into_value(), Err(RouterError::ReturnNotSet));
    }

    #[test]
    #[should_panic(expected = "return value not set")]
    fn test_into_value_panics_when_unset() {
        let outcome = succeeded(AddOptions, None);
        let _ = outcome.route::<i32>().on::<ListOptions>(|_| 2).into_value();
    }

    #[test]
    #[should_panic(expected = "return value already set")]
    fn test_second_completion_panics() {
        let mut outcome = Outcome::new();
        outcome.set_state(ParseState::RequestHelp, "");
        let _ = outcome.route::<i32>().on_help(|_| 1).on_help(|_| 2);
    }

    #[test]
    fn test_return_slot_transitions() {
        let mut slot = ReturnSlot::Pending;
        assert!(slot.is_pending());
        slot.complete(5);
        assert_eq!(slot, ReturnSlot::Completed(5));
        assert_eq!(slot.into_inner(), Some(5));
    }
}
