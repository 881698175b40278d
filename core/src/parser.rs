//! The parser facade: owns option sets and configuration, runs parses and
//! renders help.

use std::sync::Arc;

use tracing::debug;

use crate::config::ParserConfig;
use crate::cursor::ArgumentCursor;
use crate::engine::ParseEngine;
use crate::error::{ConfigError, ConfigurationError, HelpError};
use crate::help;
use crate::option::OptionSet;
use crate::outcome::Outcome;
use crate::verb::{self, VerbRouter, VerbTable};

/// Default column width for [`Parser::help_text`].
pub const DEFAULT_HELP_WIDTH: usize = 80;

#[derive(Debug, Clone)]
enum Dispatch {
    Single(Arc<OptionSet>),
    Verbs(VerbTable),
}

/// Parses argument lists against one or more option sets.
///
/// A parser is built once and reused; [`parse`](Self::parse) takes `&self`
/// so one parser can serve several threads.
///
/// # Examples
///
/// ```
/// use command_options_core::{OptionSet, ParseState, Parser};
///
/// #[derive(Debug, Default)]
/// struct Options {
///     names: Vec<String>,
///     verbose: bool,
/// }
///
/// let parser = Parser::new(
///     OptionSet::builder::<Options>()
///         .field("names", |o| &mut o.names)
///         .field("v", |o| &mut o.verbose)
///         .build()
///         .unwrap(),
/// );
///
/// let outcome = parser.parse(["-names", "Peter,Paul,Mary", "-v"]);
/// assert_eq!(outcome.state(), ParseState::Succeeded);
/// let options = outcome.record::<Options>().unwrap();
/// assert_eq!(options.names, ["Peter", "Paul", "Mary"]);
/// assert!(options.verbose);
///
/// assert_eq!(parser.parse(["-x"]).state(), ParseState::UnknownOption);
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    dispatch: Dispatch,
    config: ParserConfig,
}

impl Parser {
    /// Single-command parser; any verb declared on `set` is ignored.
    pub fn new(set: OptionSet) -> Self {
        Self {
            dispatch: Dispatch::Single(Arc::new(set)),
            config: ParserConfig::default(),
        }
    }

    /// Builds a parser from option sets.
    ///
    /// One set gives a single-command parser. With two or more, every set
    /// must declare a distinct verb.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoOptionSets`] for an empty list,
    /// [`ConfigurationError::UndeclaredVerb`] or
    /// [`ConfigurationError::DuplicateVerb`] for bad verb declarations.
    pub fn with_option_sets(mut sets: Vec<OptionSet>) -> Result<Self, ConfigurationError> {
        match sets.len() {
            0 => Err(ConfigurationError::NoOptionSets),
            1 => Ok(Self::new(sets.remove(0))),
            _ => Ok(Self {
                dispatch: Dispatch::Verbs(verb::from_declared(sets)?),
                config: ParserConfig::default(),
            }),
        }
    }

    /// Builds a multi-verb parser from an explicit verb mapping.
    ///
    /// Declared verbs on the sets are ignored. One set may be registered
    /// under several verbs by sharing an `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoOptionSets`] for an empty mapping,
    /// [`ConfigurationError::EmptyVerb`] or
    /// [`ConfigurationError::DuplicateVerb`] for bad keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use command_options_core::{OptionSet, Parser};
    ///
    /// #[derive(Debug, Default)]
    /// struct Target {
    ///     name: String,
    /// }
    ///
    /// let set = Arc::new(
    ///     OptionSet::builder::<Target>()
    ///         .option("name", |o| &mut o.name, |d| d.position(0))
    ///         .build()
    ///         .unwrap(),
    /// );
    /// let parser = Parser::with_verbs([("add", set.clone()), ("remove", set)]).unwrap();
    ///
    /// let outcome = parser.parse(["remove", "Ann"]);
    /// assert_eq!(outcome.verb(), Some("remove"));
    /// assert_eq!(outcome.record::<Target>().unwrap().name, "Ann");
    /// ```
    pub fn with_verbs<I, K, S>(verbs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Arc<OptionSet>>,
    {
        let entries = verbs
            .into_iter()
            .map(|(verb, set)| (verb.into(), set.into()))
            .collect();
        Ok(Self {
            dispatch: Dispatch::Verbs(verb::from_mapping(entries)?),
            config: ParserConfig::default(),
        })
    }

    /// Replaces the configuration.
    ///
    /// The configuration is checked with [`ParserConfig::validate`] first.
    pub fn with_config(mut self, config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replaces the help trigger names. An empty list turns help off.
    pub fn set_help_options<I, S>(&mut self, names: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.update_config(|config| config.help_options = names)
    }

    pub fn set_option_char(&mut self, option_char: char) -> Result<(), ConfigError> {
        self.update_config(|config| config.option_char = option_char)
    }

    /// Applies `change` to a copy of the configuration and keeps it only if
    /// it still validates.
    fn update_config(
        &mut self,
        change: impl FnOnce(&mut ParserConfig),
    ) -> Result<(), ConfigError> {
        let mut candidate = self.config.clone();
        change(&mut candidate);
        if let Err(err) = candidate.validate() {
            debug!(error = %err, "Rejected configuration change");
            return Err(err);
        }
        self.config = candidate;
        Ok(())
    }

    /// `true` when the parser dispatches on a leading verb.
    pub fn has_verbs(&self) -> bool {
        matches!(self.dispatch, Dispatch::Verbs(_))
    }

    /// Registered verbs in registration order; empty for a single-command
    /// parser.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.verb_table().iter().map(|(verb, _)| verb.as_str())
    }

    /// Parses `args` (without the program name).
    ///
    /// Never fails: malformed input is reported through the returned
    /// [`Outcome`]'s state.
    pub fn parse<I, S>(&self, args: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cursor = ArgumentCursor::new(args);
        let mut outcome = Outcome::new();
        debug!(tokens = cursor.len(), verbs = self.has_verbs(), "Parsing arguments");

        let set = match &self.dispatch {
            Dispatch::Single(set) => Some(set.as_ref()),
            Dispatch::Verbs(table) => VerbRouter::new(table, &self.config).select(&mut cursor, &mut outcome),
        };
        if let Some(set) = set {
            ParseEngine::new(set, &self.config).run(&mut cursor, &mut outcome);
        }
        outcome
    }

    /// Renders help for the parser or one of its verbs.
    ///
    /// # Errors
    ///
    /// Returns [`HelpError::VerbNotApplicable`] if a verb is given to a
    /// single-command parser, [`HelpError::VerbRequired`] if none is given to
    /// a multi-verb parser (use [`overview_text`](Self::overview_text)),
    /// [`HelpError::UnknownVerb`] for an unregistered verb and
    /// [`HelpError::WordTooWide`] if a word does not fit `width`.
    pub fn help_text(&self, verb: Option<&str>, width: usize) -> Result<String, HelpError> {
        match (&self.dispatch, verb) {
            (Dispatch::Single(set), None) => help::option_set_help(&self.config, set, None, width),
            (Dispatch::Single(_), Some(verb)) => Err(HelpError::VerbNotApplicable(verb.to_string())),
            (Dispatch::Verbs(_), None) => Err(HelpError::VerbRequired),
            (Dispatch::Verbs(table), Some(verb)) => {
                let set = verb::find(table, verb).ok_or_else(|| HelpError::UnknownVerb(verb.to_string()))?;
                help::option_set_help(&self.config, set, Some(verb), width)
            }
        }
    }

    /// Renders the verb overview of a multi-verb parser, or the option help
    /// of a single-command parser.
    ///
    /// # Errors
    ///
    /// Returns [`HelpError::WordTooWide`] if a word does not fit `width`.
    pub fn overview_text(&self, width: usize) -> Result<String, HelpError> {
        match &self.dispatch {
            Dispatch::Single(set) => help::option_set_help(&self.config, set, None, width),
            Dispatch::Verbs(table) => help::overview_help(
                &self.config,
                table.iter().map(|(verb, set)| (verb.as_str(), set.as_ref())),
                width,
            ),
        }
    }

    /// Help matching an outcome: the verb's help when one was selected,
    /// otherwise the overview.
    ///
    /// # Errors
    ///
    /// Same as [`overview_text`](Self::overview_text).
    pub fn help_for(&self, outcome: &Outcome, width: usize) -> Result<String, HelpError> {
        match (self.has_verbs(), outcome.verb()) {
            (true, Some(verb)) if verb::find(self.verb_table(), verb).is_some() => {
                self.help_text(Some(verb), width)
            }
            _ => self.overview_text(width),
        }
    }

    fn verb_table(&self) -> &[(String, Arc<OptionSet>)] {
        match &self.dispatch {
            Dispatch::Single(_) => &[],
            Dispatch::Verbs(table) => table,
        }
    }
}
