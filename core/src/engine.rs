//! Token-to-field assignment for a single option set.

use std::any::Any;

use tracing::{debug, trace};

use crate::coerce::coerce;
use crate::config::ParserConfig;
use crate::cursor::ArgumentCursor;
use crate::option::OptionSet;
use crate::outcome::{Outcome, ParseState};
use crate::value::Value;

/// Runs one option set over the remaining tokens of a cursor.
pub(crate) struct ParseEngine<'p> {
    set: &'p OptionSet,
    config: &'p ParserConfig,
}

impl<'p> ParseEngine<'p> {
    pub(crate) fn new(set: &'p OptionSet, config: &'p ParserConfig) -> Self {
        Self { set, config }
    }

    /// Allocates the record, writes defaults and assigns every token.
    ///
    /// The cursor is always empty afterwards. The record is stored on the
    /// outcome whatever the final state.
    pub(crate) fn run(&self, cursor: &mut ArgumentCursor, outcome: &mut Outcome) {
        let mut record = self.set.new_record();
        if let Err((index, err)) = self.set.apply_defaults(record.as_mut()) {
            let name = self.set.descriptors()[index].name();
            outcome.set_state(
                ParseState::BadValue,
                format!("bad default value for option '{name}' ({err})."),
            );
        }

        let mut seen = vec![0usize; self.set.len()];
        let mut count = 0usize;
        while outcome.state().is_success() {
            let Some(arg) = cursor.next_token() else {
                break;
            };
            self.step(&arg, count, cursor, record.as_mut(), &mut seen, outcome);
            count += 1;
        }

        let skipped = cursor.drain();
        if skipped > 0 {
            trace!(skipped, state = ?outcome.state(), "Skipped tokens after terminal state");
        }

        if outcome.state().is_success() {
            self.check_counts(&seen, outcome);
        }

        debug!(
            record = self.set.record_name(),
            state = ?outcome.state(),
            message = outcome.message(),
            "Parsed option set"
        );
        outcome.set_record(record, self.set.record_name());
    }

    fn step(
        &self,
        arg: &str,
        count: usize,
        cursor: &mut ArgumentCursor,
        record: &mut dyn Any,
        seen: &mut [usize],
        outcome: &mut Outcome,
    ) {
        if arg.is_empty() {
            outcome.set_state(
                ParseState::MissingOption,
                format!("option expected at [{count}]."),
            );
            return;
        }

        let named = arg.strip_prefix(self.config.option_char);
        if named.is_none() && count >= self.set.positional_len() {
            outcome.set_state(
                ParseState::MissingOption,
                format!("option expected at [{count}] '{arg}'."),
            );
            return;
        }

        if self.config.is_help(arg) {
            trace!(count, arg, "Help requested");
            outcome.set_state(ParseState::RequestHelp, "");
            return;
        }

        let (index, inline_value) = match named {
            Some(name) => match self.set.index_of(name) {
                Some(index) => (index, None),
                None => {
                    outcome.set_state(
                        ParseState::UnknownOption,
                        format!("option not known at [{count}] '{arg}'."),
                    );
                    return;
                }
            },
            None => match self.set.positional_index(count) {
                Some(index) => (index, Some(arg.to_string())),
                None => {
                    outcome.set_state(
                        ParseState::MissingOption,
                        format!("option expected at [{count}] '{arg}'."),
                    );
                    return;
                }
            },
        };

        seen[index] += 1;
        let descriptor = &self.set.descriptors()[index];
        trace!(
            count,
            arg,
            option = descriptor.name(),
            positional = inline_value.is_some(),
            "Matched option"
        );

        if descriptor.is_switch() {
            if let Err(err) = self.set.assign(record, index, Value::Bool(true)) {
                outcome.set_state(
                    ParseState::BadValue,
                    format!("bad option value at [{count}] '{arg}'='' ({err})."),
                );
            }
            return;
        }

        let value = match inline_value.or_else(|| cursor.next_token()) {
            Some(value) => value,
            None => {
                outcome.set_state(
                    ParseState::MissingValue,
                    format!("option needs value after [{count}] '{arg}'."),
                );
                return;
            }
        };

        let assigned = coerce(descriptor.target_type(), &value)
            .and_then(|typed| self.set.assign(record, index, typed));
        if let Err(err) = assigned {
            outcome.set_state(
                ParseState::BadValue,
                format!("bad option value at [{count}] '{arg}'='{value}' ({err})."),
            );
        }
    }

    fn check_counts(&self, seen: &[usize], outcome: &mut Outcome) {
        let descriptors = self.set.descriptors();

        let missing = self.names_where(|i| descriptors[i].is_mandatory() && seen[i] == 0);
        if !missing.is_empty() {
            outcome.set_state(
                ParseState::MandatoryOption,
                format!("mandatory options: {}", missing.join(", ")),
            );
            return;
        }

        let repeated = self.names_where(|i| seen[i] > 1);
        if !repeated.is_empty() {
            outcome.set_state(
                ParseState::DuplicateOption,
                format!("duplicate options: {}", repeated.join(", ")),
            );
        }
    }

    /// Names of the descriptors selected by `keep`, in declaration order.
    fn names_where(&self, keep: impl Fn(usize) -> bool) -> Vec<&'p str> {
        let set: &'p OptionSet = self.set;
        set.descriptors()
            .iter()
            .enumerate()
            .filter(|&(i, _)| keep(i))
            .map(|(_, d)| d.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Person {
        name: String,
        age: u8,
        quiet: bool,
        tags: Vec<String>,
    }

    fn person_set() -> OptionSet {
        OptionSet::builder::<Person>()
            .option("name", |o| &mut o.name, |d| d.position(0).mandatory())
            .option("age", |o| &mut o.age, |d| d.position(1).default_value(30u8))
            .field("quiet", |o| &mut o.quiet)
            .field("tags", |o| &mut o.tags)
            .build()
            .unwrap()
    }

    fn run(set: &OptionSet, args: &[&str]) -> (Outcome, ArgumentCursor) {
        let config = ParserConfig::default();
        let mut cursor = ArgumentCursor::new(args.iter().copied());
        let mut outcome = Outcome::new();
        ParseEngine::new(set, &config).run(&mut cursor, &mut outcome);
        (outcome, cursor)
    }

    #[test]
    fn test_positional_named_and_switch() {
        let set = person_set();
        let (outcome, cursor) = run(&set, &["Ann", "-quiet", "-tags", "a,b"]);
        assert!(cursor.is_empty());
        assert_eq!(outcome.state(), ParseState::Succeeded);
        let person = outcome.record::<Person>().unwrap();
        assert_eq!(person.name, "Ann");
        assert_eq!(person.age, 30);
        assert!(person.quiet);
        assert_eq!(person.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_value_token_does_not_advance_count() {
        let set = person_set();
        let (outcome, _) = run(&set, &["-name", "Ann", "41"]);
        assert_eq!(outcome.state(), ParseState::Succeeded);
        assert_eq!(outcome.record::<Person>().unwrap().age, 41);
    }

    #[test]
    fn test_diagnostics_carry_argument_index() {
        let set = person_set();

        let (outcome, _) = run(&set, &["Ann", ""]);
        assert_eq!(outcome.state(), ParseState::MissingOption);
        assert_eq!(outcome.message(), "option expected at [1].");

        let (outcome, _) = run(&set, &["Ann", "7", "stray"]);
        assert_eq!(outcome.state(), ParseState::MissingOption);
        assert_eq!(outcome.message(), "option expected at [2] 'stray'.");

        let (outcome, _) = run(&set, &["Ann", "-bogus"]);
        assert_eq!(outcome.state(), ParseState::UnknownOption);
        assert_eq!(outcome.message(), "option not known at [1] '-bogus'.");

        let (outcome, _) = run(&set, &["Ann", "-tags"]);
        assert_eq!(outcome.state(), ParseState::MissingValue);
        assert_eq!(outcome.message(), "option needs value after [1] '-tags'.");

        let (outcome, _) = run(&set, &["Ann", "-age", "300"]);
        assert_eq!(outcome.state(), ParseState::BadValue);
        assert_eq!(
            outcome.message(),
            "bad option value at [1] '-age'='300' ('300' is out of range for u8)."
        );
    }

    #[test]
    fn test_terminal_state_drains_cursor_and_keeps_record() {
        let set = person_set();
        let (outcome, cursor) = run(&set, &["-bogus", "-h", "Ann"]);
        assert!(cursor.is_empty());
        assert_eq!(outcome.state(), ParseState::UnknownOption);
        assert!(outcome.record::<Person>().is_some());
    }

    #[test]
    fn test_help_skips_mandatory_check() {
        let set = person_set();
        let (outcome, _) = run(&set, &["-h", "-bogus"]);
        assert_eq!(outcome.state(), ParseState::RequestHelp);
        assert_eq!(outcome.message(), "");
    }

    #[test]
    fn test_mandatory_reported_before_duplicates() {
        let set = person_set();
        let (outcome, _) = run(&set, &["-quiet", "-quiet"]);
        assert_eq!(outcome.state(), ParseState::MandatoryOption);
        assert_eq!(outcome.message(), "mandatory options: name");

        let (outcome, _) = run(&set, &["Ann", "-quiet", "-quiet", "-name", "Bob"]);
        assert_eq!(outcome.state(), ParseState::DuplicateOption);
        assert_eq!(outcome.message(), "duplicate options: name, quiet");
        assert_eq!(outcome.record::<Person>().unwrap().name, "Bob");
    }
}
