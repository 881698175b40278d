//! Error types for option-set construction, value conversion, help rendering
//! and configuration loading.
//!
//! Malformed command-line *input* is never an error in this crate: it is
//! reported through [`ParseState`](crate::ParseState) on the
//! [`Outcome`](crate::Outcome). The types here cover everything else.

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Fatal misconfiguration detected while building an
/// [`OptionSet`](crate::OptionSet) or a [`Parser`](crate::Parser).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// An option was declared with an empty name.
    #[error("option name cannot be empty on {record}")]
    EmptyOptionName {
        /// Record type the option belongs to.
        record: &'static str,
    },
    /// Two options on the same record share a name.
    #[error("duplicate option '{name}' on {record}")]
    DuplicateOption {
        /// The repeated option name.
        name: String,
        /// Record type the options belong to.
        record: &'static str,
    },
    /// An option declares a position below zero.
    #[error("negative position {position} for option '{name}' on {record}")]
    NegativePosition {
        /// Option carrying the bad position.
        name: String,
        /// The declared position.
        position: i32,
        /// Record type the option belongs to.
        record: &'static str,
    },
    /// Two options declare the same position.
    #[error("position {position} declared by both '{first}' and '{second}' on {record}")]
    DuplicatePosition {
        /// The contested position.
        position: i32,
        /// Option declared first.
        first: String,
        /// Option declared second.
        second: String,
        /// Record type the options belong to.
        record: &'static str,
    },
    /// Declared positions skip a slot.
    #[error("position {expected} is missing on {record} (option '{name}' declares {found})")]
    PositionGap {
        /// The first unoccupied slot.
        expected: i32,
        /// The position found in its place.
        found: i32,
        /// Option declaring `found`.
        name: String,
        /// Record type the option belongs to.
        record: &'static str,
    },
    /// A default value does not fit the option's target type.
    #[error("invalid default for option '{name}' on {record}: {reason}")]
    InvalidDefault {
        /// Option carrying the default.
        name: String,
        /// Why the default was rejected.
        reason: String,
        /// Record type the option belongs to.
        record: &'static str,
    },
    /// A parser was built without any option sets.
    #[error("no option sets specified")]
    NoOptionSets,
    /// A verb key is empty.
    #[error("empty verbs are not allowed")]
    EmptyVerb,
    /// One of several option sets does not declare a verb.
    #[error("option set {record} declares no verb")]
    UndeclaredVerb {
        /// Record type lacking a verb.
        record: &'static str,
    },
    /// Two option sets are registered under the same verb.
    #[error("duplicate verb: {0}")]
    DuplicateVerb(String),
}

/// Failure to convert a raw token into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Not a valid integer.
    #[error("'{text}' is not a valid integer: {source}")]
    InvalidInteger {
        /// Attempted text.
        text: String,
        /// Underlying parse failure.
        #[source]
        source: ParseIntError,
    },
    /// A valid integer that does not fit the target width.
    #[error("'{text}' is out of range for {kind}")]
    OutOfRange {
        /// Attempted text.
        text: String,
        /// Name of the target integer kind.
        kind: &'static str,
    },
    /// Not a valid floating point number.
    #[error("'{text}' is not a valid number: {source}")]
    InvalidFloat {
        /// Attempted text.
        text: String,
        /// Underlying parse failure.
        #[source]
        source: ParseFloatError,
    },
    /// Not a valid fixed-point decimal.
    #[error("'{text}' is not a valid decimal")]
    InvalidDecimal {
        /// Attempted text.
        text: String,
    },
    /// Not `true` or `false`.
    #[error("'{text}' is not a valid boolean")]
    InvalidBool {
        /// Attempted text.
        text: String,
    },
    /// Not a recognised date or date-time.
    #[error("'{text}' is not a valid {kind}: {source}")]
    InvalidDate {
        /// Attempted text.
        text: String,
        /// `date` or `datetime`.
        kind: &'static str,
        /// Underlying parse failure from the last format tried.
        #[source]
        source: chrono::ParseError,
    },
    /// Does not follow the `[-][d.]hh:mm[:ss[.fffffff]]` grammar.
    #[error("'{text}' is not a valid time span")]
    InvalidTimeSpan {
        /// Attempted text.
        text: String,
    },
    /// Not one of the enum's variant names.
    #[error("'{text}' is not a variant of {name} (expected one of: {expected})")]
    UnknownVariant {
        /// Attempted text.
        text: String,
        /// Enum type name.
        name: String,
        /// Comma separated variant names.
        expected: String,
    },
    /// A [`Value`](crate::Value) of the wrong shape reached a field.
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        /// Value kind the field accepts.
        expected: &'static str,
        /// Value kind that was supplied.
        found: &'static str,
    },
}

/// Caller misuse of [`Parser::help_text`](crate::Parser::help_text).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelpError {
    /// A verb was given to a single-command parser.
    #[error("parser has no verbs, but help was requested for '{0}'")]
    VerbNotApplicable(String),
    /// No verb was given to a multi-verb parser.
    #[error("parser has verbs, help requires one of them")]
    VerbRequired,
    /// The verb is not registered.
    #[error("verb '{0}' not defined")]
    UnknownVerb(String),
    /// A single word does not fit the requested width.
    #[error("text too wide for {width} columns: '{word}'")]
    WordTooWide {
        /// The word that could not be placed.
        word: String,
        /// Available width after indentation.
        width: usize,
    },
}

/// Errors loading or validating a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither YAML nor JSON.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Structurally valid but unusable settings.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Non-panicking [`ResultRouter`](crate::ResultRouter) misuse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No handler fired for the outcome.
    #[error("return value not set")]
    ReturnNotSet,
}

/// Convenience alias for configuration loading results.
pub type Result<T> = std::result::Result<T, ConfigError>;
