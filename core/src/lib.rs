//! Declarative command-line option parsing.
//!
//! This crate maps raw argument lists onto user-defined option records:
//!
//! - [`OptionSet`] — the options of one record type, declared with
//!   [`OptionSet::builder`] (names, positions, mandatory flags, defaults,
//!   descriptions, verb).
//! - [`Parser`] — owns one option set or several verb-keyed ones and turns an
//!   argument list into an [`Outcome`].
//! - [`Outcome`] — the [`ParseState`], a diagnostic message and the filled
//!   record.
//! - [`ResultRouter`] — fluent dispatch on the outcome with typed handlers.
//! - [`ParserConfig`] — option marker, help triggers and banner text,
//!   loadable from YAML or JSON.
//!
//! Values are converted with [`coerce`] according to each option's
//! [`TargetType`]; the [`FieldType`] trait ties Rust field types to target
//! types.
//!
//! # Example
//!
//! ```
//! use command_options_core::*;
//!
//! #[derive(Debug, Default)]
//! struct AddOptions {
//!     name: String,
//!     age: Option<u8>,
//!     tags: Vec<String>,
//! }
//!
//! let parser = Parser::new(
//!     OptionSet::builder::<AddOptions>()
//!         .option("name", |o| &mut o.name, |d| d.position(0).mandatory())
//!         .field("age", |o| &mut o.age)
//!         .field("tags", |o| &mut o.tags)
//!         .build()
//!         .unwrap(),
//! );
//!
//! let outcome = parser.parse(["Ann", "-age", "41", "-tags", "chess,golf"]);
//! let options = outcome.record::<AddOptions>().unwrap();
//! assert_eq!(options.name, "Ann");
//! assert_eq!(options.age, Some(41));
//! assert_eq!(options.tags, ["chess", "golf"]);
//!
//! let outcome = parser.parse(["-age", "41"]);
//! assert_eq!(outcome.state(), ParseState::MandatoryOption);
//! assert_eq!(outcome.message(), "mandatory options: name");
//! ```

mod coerce;
mod config;
mod cursor;
mod engine;
mod error;
mod help;
mod option;
mod outcome;
mod parser;
mod router;
mod value;
mod verb;

pub use coerce::{COLLECTION_SEPARATOR, coerce};
pub use config::{DEFAULT_HELP_OPTIONS, DEFAULT_OPTION_CHAR, ParserConfig, ProgramInfo};
pub use cursor::ArgumentCursor;
pub use error::{ConfigError, ConfigurationError, ConversionError, HelpError, Result, RouterError};
pub use option::{OptionDescriptor, OptionSet, OptionSetBuilder};
pub use outcome::{Outcome, ParseState};
pub use parser::{DEFAULT_HELP_WIDTH, Parser};
pub use router::{ResultRouter, ReturnSlot};
pub use value::{Decimal, EnumSpec, FieldType, IntegerKind, TargetType, Value};
