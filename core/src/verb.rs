//! Verb registration and selection for multi-verb parsers.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::cursor::ArgumentCursor;
use crate::error::ConfigurationError;
use crate::option::OptionSet;
use crate::outcome::{Outcome, ParseState};

/// Verb-keyed option sets in registration order.
pub(crate) type VerbTable = Vec<(String, Arc<OptionSet>)>;

/// Keys option sets by their declared verbs.
///
/// # Errors
///
/// Fails when a set has no verb or a verb is declared twice.
pub(crate) fn from_declared(sets: Vec<OptionSet>) -> Result<VerbTable, ConfigurationError> {
    let entries = sets
        .into_iter()
        .map(|set| match set.verb().map(str::to_string) {
            Some(verb) => Ok((verb, Arc::new(set))),
            None => Err(ConfigurationError::UndeclaredVerb {
                record: set.record_name(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_keys(entries)
}

/// Checks an explicit verb mapping.
///
/// # Errors
///
/// Fails on an empty mapping, an empty verb or a repeated verb.
pub(crate) fn from_mapping(entries: VerbTable) -> Result<VerbTable, ConfigurationError> {
    if entries.is_empty() {
        return Err(ConfigurationError::NoOptionSets);
    }
    check_keys(entries)
}

fn check_keys(entries: VerbTable) -> Result<VerbTable, ConfigurationError> {
    let mut seen = HashSet::new();
    for (verb, _) in &entries {
        if verb.is_empty() {
            return Err(ConfigurationError::EmptyVerb);
        }
        if !seen.insert(verb.as_str()) {
            warn!(verb = %verb, "Rejected duplicate verb");
            return Err(ConfigurationError::DuplicateVerb(verb.clone()));
        }
    }
    Ok(entries)
}

/// Consumes the leading verb token and picks the matching option set.
pub(crate) struct VerbRouter<'p, 'c> {
    verbs: &'p [(String, Arc<OptionSet>)],
    config: &'c ParserConfig,
}

impl<'p, 'c> VerbRouter<'p, 'c> {
    pub(crate) fn new(verbs: &'p [(String, Arc<OptionSet>)], config: &'c ParserConfig) -> Self {
        Self { verbs, config }
    }

    /// Returns the selected set, or `None` after setting a terminal state on
    /// `outcome` and draining the cursor.
    pub(crate) fn select(
        &self,
        cursor: &mut ArgumentCursor,
        outcome: &mut Outcome,
    ) -> Option<&'p OptionSet> {
        let Some(verb) = cursor.next_token() else {
            outcome.set_state(ParseState::MissingVerb, "no verb given");
            return None;
        };

        if verb.is_empty() {
            outcome.set_state(ParseState::MissingVerb, "empty verb");
        } else if self.config.is_help(&verb) {
            debug!(trigger = %verb, "Global help requested");
            outcome.set_state(ParseState::RequestHelp, "");
        } else if let Some((_, set)) = self.verbs.iter().find(|(v, _)| *v == verb) {
            debug!(verb = %verb, record = set.record_name(), "Selected verb");
            outcome.set_verb(verb);
            return Some(set.as_ref());
        } else {
            outcome.set_state(ParseState::MissingVerb, format!("verb '{verb}' not defined"));
            outcome.set_verb(verb);
        }

        cursor.drain();
        None
    }
}

/// Looks up the set registered under `verb`.
pub(crate) fn find<'p>(verbs: &'p [(String, Arc<OptionSet>)], verb: &str) -> Option<&'p OptionSet> {
    verbs
        .iter()
        .find(|(v, _)| v == verb)
        .map(|(_, set)| set.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct AddOptions {
        name: String,
    }

    #[derive(Debug, Default)]
    struct ListOptions;

    fn add() -> OptionSet {
        OptionSet::builder::<AddOptions>()
            .verb("add")
            .field("n", |o| &mut o.name)
            .build()
            .unwrap()
    }

    fn list() -> OptionSet {
        OptionSet::builder::<ListOptions>().verb("list").build().unwrap()
    }

    fn select<'p>(verbs: &'p VerbTable, args: &[&str]) -> (Option<&'p OptionSet>, Outcome, usize) {
        let config = ParserConfig::default();
        let mut cursor = ArgumentCursor::new(args.iter().copied());
        let mut outcome = Outcome::new();
        let set = VerbRouter::new(verbs, &config).select(&mut cursor, &mut outcome);
        (set, outcome, cursor.len())
    }

    #[test]
    fn test_from_declared_requires_verbs() {
        let err = from_declared(vec![add(), OptionSet::builder::<ListOptions>().build().unwrap()])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UndeclaredVerb { record: "ListOptions" });

        let err = from_declared(vec![add(), add()]).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateVerb("add".to_string()));
    }

    #[test]
    fn test_from_mapping_rejects_empty_input() {
        assert_eq!(from_mapping(Vec::new()).unwrap_err(), ConfigurationError::NoOptionSets);
        let err = from_mapping(vec![(String::new(), Arc::new(add()))]).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyVerb);
    }

    #[test]
    fn test_select_known_verb_leaves_rest() {
        let verbs = from_declared(vec![add(), list()]).unwrap();
        let (set, outcome, remaining) = select(&verbs, &["add", "-n", "X"]);
        assert_eq!(set.map(OptionSet::record_name), Some("AddOptions"));
        assert_eq!(outcome.verb(), Some("add"));
        assert_eq!(remaining, 2);
    }

    #[test]
    fn test_select_failures() {
        let verbs = from_declared(vec![add(), list()]).unwrap();

        let (set, outcome, _) = select(&verbs, &[]);
        assert!(set.is_none());
        assert_eq!(outcome.state(), ParseState::MissingVerb);
        assert_eq!(outcome.message(), "no verb given");

        let (_, outcome, remaining) = select(&verbs, &["", "-n"]);
        assert_eq!(outcome.message(), "empty verb");
        assert_eq!(remaining, 0);

        let (_, outcome, _) = select(&verbs, &["delete", "-n", "X"]);
        assert_eq!(outcome.state(), ParseState::MissingVerb);
        assert_eq!(outcome.message(), "verb 'delete' not defined");
        assert_eq!(outcome.verb(), Some("delete"));

        let (set, outcome, _) = select(&verbs, &["-?", "add"]);
        assert!(set.is_none());
        assert_eq!(outcome.state(), ParseState::RequestHelp);
        assert!(!outcome.has_record());
    }
}
