//! Option metadata: descriptors for single fields and the option set that
//! describes a whole record type.
//!
//! An [`OptionSet`] is declared once with [`OptionSet::builder`] and
//! validated when built. Parsing never re-validates it.
//!
//! # Examples
//!
//! ```
//! use command_options_core::OptionSet;
//!
//! #[derive(Debug, Default)]
//! struct AddOptions {
//!     name: String,
//!     company: String,
//!     quiet: bool,
//! }
//!
//! let set = OptionSet::builder::<AddOptions>()
//!     .verb("add")
//!     .description("Adds a person to the club")
//!     .option("name", |o| &mut o.name, |d| d.position(0).mandatory())
//!     .option("company", |o| &mut o.company, |d| d.position(1).default_value("myCompany"))
//!     .field("quiet", |o| &mut o.quiet)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(set.verb(), Some("add"));
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.positional().count(), 2);
//! assert!(set.descriptor("quiet").unwrap().is_switch());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::coerce::coerce;
use crate::error::{ConfigurationError, ConversionError};
use crate::value::{FieldType, TargetType, Value};

/// Type-erased write handle into a record instance.
pub(crate) type Setter =
    Arc<dyn Fn(&mut dyn Any, Value) -> Result<(), ConversionError> + Send + Sync>;

type Factory = fn() -> Box<dyn Any + Send>;

fn new_record<T: Default + Send + 'static>() -> Box<dyn Any + Send> {
    Box::new(T::default())
}

/// Static description of one option field.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    name: String,
    position: Option<i32>,
    mandatory: bool,
    default_value: Option<Value>,
    default_text: Option<String>,
    target_type: TargetType,
    description: Option<String>,
}

impl OptionDescriptor {
    /// Creates an optional, named-only descriptor.
    pub fn new(name: &str, target_type: TargetType) -> Self {
        Self {
            name: name.to_string(),
            position: None,
            mandatory: false,
            default_value: None,
            default_text: None,
            target_type,
            description: None,
        }
    }

    /// Binds the option to a positional slot.
    pub fn position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    /// Marks the option as required.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Value written into the record before any token is consumed.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self.default_text = None;
        self
    }

    /// Default given as text; coerced to the target type when the option set
    /// is built.
    pub fn default_text(mut self, text: &str) -> Self {
        self.default_text = Some(text.to_string());
        self.default_value = None;
        self
    }

    /// Adds a description shown in help text.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_position(&self) -> Option<i32> {
        self.position
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    pub fn describe(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A switch takes no value token.
    pub fn is_switch(&self) -> bool {
        self.target_type.is_switch()
    }

    /// Usage token for help text, e.g. `[-company <string>]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_options_core::{IntegerKind, OptionDescriptor, TargetType};
    ///
    /// let number = OptionDescriptor::new("number", TargetType::Integer(IntegerKind::I32))
    ///     .position(1)
    ///     .mandatory();
    /// assert_eq!(number.usage('-'), "[-number] <i32>");
    ///
    /// let quiet = OptionDescriptor::new("quiet", TargetType::Bool);
    /// assert_eq!(quiet.usage('/'), "[/quiet]");
    /// ```
    pub fn usage(&self, marker: char) -> String {
        let mut name = format!("{marker}{}", self.name);
        if self.position.is_some() {
            name = format!("[{name}]");
        }
        let text = if self.is_switch() {
            name
        } else {
            format!("{name} <{}>", self.target_type.type_name())
        };
        if self.mandatory {
            text
        } else {
            format!("[{text}]")
        }
    }

    fn resolve_default(&mut self, record: &'static str) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidDefault {
            name: self.name.clone(),
            reason,
            record,
        };
        if let Some(text) = self.default_text.take() {
            let value = coerce(&self.target_type, &text).map_err(|e| invalid(e.to_string()))?;
            self.default_value = Some(value);
        } else if let Some(value) = &self.default_value {
            if !self.target_type.accepts(value) {
                return Err(invalid(format!(
                    "expected {} value, found {}",
                    self.target_type.type_name(),
                    value.kind_name()
                )));
            }
        }
        Ok(())
    }
}

/// Full option metadata for one record type.
///
/// Immutable once built; cheap to share behind an [`Arc`].
#[derive(Clone)]
pub struct OptionSet {
    record_type: TypeId,
    record_name: &'static str,
    verb: Option<String>,
    description: Option<String>,
    descriptors: Vec<OptionDescriptor>,
    setters: Vec<Setter>,
    positional: Vec<usize>,
    factory: Factory,
}

impl OptionSet {
    /// Starts declaring the options of record type `T`.
    pub fn builder<T: Default + Send + 'static>() -> OptionSetBuilder<T> {
        OptionSetBuilder::new()
    }

    /// Verb declared on the set, if any.
    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Short type name of the record, e.g. `AddOptions`.
    pub fn record_name(&self) -> &'static str {
        short_type_name(self.record_name)
    }

    pub fn record_type(&self) -> TypeId {
        self.record_type
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    /// Positional descriptors ordered by position.
    pub fn positional(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.positional.iter().map(|&i| &self.descriptors[i])
    }

    /// Finds a descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&OptionDescriptor> {
        self.index_of(name).map(|i| &self.descriptors[i])
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name == name)
    }

    pub(crate) fn positional_index(&self, slot: usize) -> Option<usize> {
        self.positional.get(slot).copied()
    }

    pub(crate) fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Allocates a fresh record from the type's `Default`.
    pub(crate) fn new_record(&self) -> Box<dyn Any + Send> {
        (self.factory)()
    }

    /// Writes every declared default into `record`.
    ///
    /// On failure returns the index of the offending descriptor.
    pub(crate) fn apply_defaults(&self, record: &mut dyn Any) -> Result<(), (usize, ConversionError)> {
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            if let Some(value) = &descriptor.default_value {
                self.assign(record, index, value.clone())
                    .map_err(|e| (index, e))?;
            }
        }
        Ok(())
    }

    pub(crate) fn assign(
        &self,
        record: &mut dyn Any,
        index: usize,
        value: Value,
    ) -> Result<(), ConversionError> {
        (self.setters[index])(record, value)
    }
}

impl fmt::Debug for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSet")
            .field("record", &self.record_name)
            .field("verb", &self.verb)
            .field("descriptors", &self.descriptors)
            .field("positional", &self.positional)
            .finish_non_exhaustive()
    }
}

/// Declares the options of record type `T`.
pub struct OptionSetBuilder<T> {
    verb: Option<String>,
    description: Option<String>,
    descriptors: Vec<OptionDescriptor>,
    setters: Vec<Setter>,
    _record: std::marker::PhantomData<fn() -> T>,
}

impl<T: Default + Send + 'static> OptionSetBuilder<T> {
    fn new() -> Self {
        Self {
            verb: None,
            description: None,
            descriptors: Vec::new(),
            setters: Vec::new(),
            _record: std::marker::PhantomData,
        }
    }

    /// Verb selecting this set when a parser holds several.
    pub fn verb(mut self, verb: &str) -> Self {
        self.verb = Some(verb.to_string());
        self
    }

    /// Description shown in the verb overview.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Declares an optional, named-only option backed by a record field.
    pub fn field<F: FieldType + 'static>(self, name: &str, accessor: fn(&mut T) -> &mut F) -> Self {
        self.option(name, accessor, |d| d)
    }

    /// Declares an option backed by a record field; `configure` adds
    /// position, mandatory flag, default and description.
    ///
    /// The target type is taken from the field's [`FieldType`].
    pub fn option<F: FieldType + 'static>(
        self,
        name: &str,
        accessor: fn(&mut T) -> &mut F,
        configure: impl FnOnce(OptionDescriptor) -> OptionDescriptor,
    ) -> Self {
        let descriptor = configure(OptionDescriptor::new(name, F::target_type()));
        self.option_with(descriptor, move |record: &mut T, value| {
            *accessor(record) = F::from_value(value)?;
            Ok(())
        })
    }

    /// Declares an option with an explicit descriptor and setter, for fields
    /// whose storage does not implement [`FieldType`].
    pub fn option_with<S>(mut self, descriptor: OptionDescriptor, setter: S) -> Self
    where
        S: Fn(&mut T, Value) -> Result<(), ConversionError> + Send + Sync + 'static,
    {
        let erased: Setter = Arc::new(move |record: &mut dyn Any, value: Value| -> Result<(), ConversionError> {
            let record = record
                .downcast_mut::<T>()
                .ok_or(ConversionError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                    found: "record",
                })?;
            setter(record, value)
        });
        self.descriptors.push(descriptor);
        self.setters.push(erased);
        self
    }

    /// Validates the declarations and produces the option set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for empty or duplicate names,
    /// negative, duplicate or non-contiguous positions, and defaults that do
    /// not fit their option's type.
    pub fn build(self) -> Result<OptionSet, ConfigurationError> {
        let record_name = std::any::type_name::<T>();
        let short_name = short_type_name(record_name);
        let Self {
            verb,
            description,
            mut descriptors,
            setters,
            ..
        } = self;

        let positional = validate_descriptors(&mut descriptors, short_name).inspect_err(|err| {
            warn!(record = short_name, error = %err, "Rejected option set");
        })?;

        Ok(OptionSet {
            record_type: TypeId::of::<T>(),
            record_name,
            verb,
            description,
            descriptors,
            setters,
            positional,
            factory: new_record::<T>,
        })
    }
}

/// Checks names, positions and defaults; returns descriptor indices ordered
/// by position.
fn validate_descriptors(
    descriptors: &mut [OptionDescriptor],
    record: &'static str,
) -> Result<Vec<usize>, ConfigurationError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for descriptor in descriptors.iter() {
        if descriptor.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyOptionName { record });
        }
        if !seen.insert(descriptor.name.as_str()) {
            return Err(ConfigurationError::DuplicateOption {
                name: descriptor.name.clone(),
                record,
            });
        }
    }

    let mut positioned: Vec<(i32, usize)> = descriptors
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.position.map(|p| (p, i)))
        .collect();

    if let Some(&(position, i)) = positioned.iter().find(|(p, _)| *p < 0) {
        return Err(ConfigurationError::NegativePosition {
            name: descriptors[i].name.clone(),
            position,
            record,
        });
    }

    positioned.sort_by_key(|&(p, _)| p);
    for pair in positioned.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if first.0 == second.0 {
            return Err(ConfigurationError::DuplicatePosition {
                position: first.0,
                first: descriptors[first.1].name.clone(),
                second: descriptors[second.1].name.clone(),
                record,
            });
        }
    }

    for (expected, &(found, i)) in (0i32..).zip(positioned.iter()) {
        if found != expected {
            return Err(ConfigurationError::PositionGap {
                expected,
                found,
                name: descriptors[i].name.clone(),
                record,
            });
        }
    }

    for descriptor in descriptors.iter_mut() {
        descriptor.resolve_default(record)?;
    }

    Ok(positioned.into_iter().map(|(_, i)| i).collect())
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
