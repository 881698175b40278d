//! Typed values and the target types option fields are coerced into.
//!
//! [`TargetType`] is the closed set of kinds an option can hold. The coercer
//! turns raw tokens into [`Value`]s of those kinds, and [`FieldType`] turns a
//! [`Value`] back into the concrete Rust type of a record field.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::ConversionError;

/// Width and signedness of an integer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntegerKind {
    /// Rust name of the kind, used in help text and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }

    /// Inclusive bounds of the kind.
    pub fn bounds(self) -> (i128, i128) {
        match self {
            Self::I8 => (i8::MIN.into(), i8::MAX.into()),
            Self::I16 => (i16::MIN.into(), i16::MAX.into()),
            Self::I32 => (i32::MIN.into(), i32::MAX.into()),
            Self::I64 => (i64::MIN.into(), i64::MAX.into()),
            Self::U8 => (0, u8::MAX.into()),
            Self::U16 => (0, u16::MAX.into()),
            Self::U32 => (0, u32::MAX.into()),
            Self::U64 => (0, u64::MAX.into()),
        }
    }

    /// Returns `true` if `value` fits the kind.
    pub fn contains(self, value: i128) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

/// An enumeration selectable by variant name.
///
/// # Examples
///
/// ```
/// use command_options_core::EnumSpec;
///
/// let spec = EnumSpec::new("Choice", ["One", "Two", "Many"]);
/// assert_eq!(spec.resolve("Many"), Some("Many"));
/// assert_eq!(spec.resolve("many"), Some("Many"));
/// assert_eq!(spec.resolve("Few"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumSpec {
    /// Type name shown in help text.
    pub name: String,
    /// Canonical variant names.
    pub variants: Vec<String>,
}

impl EnumSpec {
    /// Creates an enum description from its type name and variant names.
    pub fn new<I, S>(name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Finds the canonical variant for `text`.
    ///
    /// An exact match wins; otherwise an ASCII case-insensitive match is
    /// accepted.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.as_str() == text)
            .or_else(|| self.variants.iter().find(|v| v.eq_ignore_ascii_case(text)))
            .map(String::as_str)
    }
}

/// The kind of value an option holds.
///
/// # Examples
///
/// ```
/// use command_options_core::{IntegerKind, TargetType};
///
/// let names = TargetType::collection(TargetType::Text);
/// assert_eq!(names.type_name(), "string[]");
///
/// let count = TargetType::nullable(TargetType::Integer(IntegerKind::I32));
/// assert_eq!(count.type_name(), "i32?");
/// assert!(!count.is_switch());
/// assert!(TargetType::Bool.is_switch());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// Free text, passed through unchanged.
    Text,
    /// A switch when used directly; `true`/`false` inside nullable or
    /// collection types.
    Bool,
    /// Range-checked integer.
    Integer(IntegerKind),
    /// Double precision floating point.
    Float,
    /// Exact fixed-point decimal.
    Decimal,
    /// Calendar date.
    Date,
    /// Date and time of day without offset.
    DateTime,
    /// Signed duration in `[-][d.]hh:mm[:ss[.fffffff]]` notation.
    TimeSpan,
    /// Enum selected by variant name.
    Enum(EnumSpec),
    /// Optional field; set only when the option is supplied.
    Nullable(Box<TargetType>),
    /// Comma separated sequence of the inner type.
    Collection(Box<TargetType>),
}

impl TargetType {
    pub fn nullable(inner: TargetType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn collection(inner: TargetType) -> Self {
        Self::Collection(Box::new(inner))
    }

    /// Options of a bare `Bool` type take no value token.
    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Display name used in usage lines (`<i32?>`, `<string[]>`).
    pub fn type_name(&self) -> String {
        match self {
            Self::Text => "string".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Integer(kind) => kind.name().to_string(),
            Self::Float => "f64".to_string(),
            Self::Decimal => "decimal".to_string(),
            Self::Date => "date".to_string(),
            Self::DateTime => "datetime".to_string(),
            Self::TimeSpan => "timespan".to_string(),
            Self::Enum(spec) => spec.name.clone(),
            Self::Nullable(inner) => format!("{}?", inner.type_name()),
            Self::Collection(inner) => format!("{}[]", inner.type_name()),
        }
    }

    /// Returns `true` if `value` can be stored in a field of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Text, Value::Text(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Float, Value::Float(_))
            | (Self::Decimal, Value::Decimal(_))
            | (Self::Date, Value::Date(_))
            | (Self::DateTime, Value::DateTime(_))
            | (Self::TimeSpan, Value::TimeSpan(_)) => true,
            (Self::Integer(kind), Value::Integer(n)) => kind.contains(*n),
            (Self::Enum(spec), Value::Enum(name)) => spec.variants.contains(name),
            (Self::Nullable(inner), value) => inner.accepts(value),
            (Self::Collection(inner), Value::List(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            _ => false,
        }
    }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Integer(i128),
    Float(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    TimeSpan(TimeDelta),
    /// Canonical variant name.
    Enum(String),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the value's kind, used in mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::TimeSpan(_) => "timespan",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
        }
    }

    /// Unwraps an enum value into its variant name.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::TypeMismatch`] for any other kind.
    pub fn into_enum(self) -> Result<String, ConversionError> {
        match self {
            Self::Enum(name) => Ok(name),
            other => Err(mismatch("enum", &other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Enum(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::TimeSpan(span) => f.write_str(&crate::coerce::format_time_span(*span)),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<TimeDelta> for Value {
    fn from(span: TimeDelta) -> Self {
        Self::TimeSpan(span)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! integer_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Integer(n.into())
                }
            }
        )*
    };
}

integer_value!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Exact fixed-point decimal number.
///
/// Stored as an integer mantissa and a decimal scale, normalised so that
/// trailing fractional zeros are removed (`47.110` equals `47.11`).
///
/// # Examples
///
/// ```
/// use command_options_core::Decimal;
///
/// let d: Decimal = "47.110".parse().unwrap();
/// assert_eq!(d, Decimal::new(4711, 2));
/// assert_eq!(d.to_string(), "47.11");
/// assert!("4.7e3".parse::<Decimal>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Most fractional digits a decimal may carry.
    pub const MAX_SCALE: u32 = 28;

    /// Creates `mantissa * 10^-scale`, normalised.
    pub fn new(mantissa: i128, scale: u32) -> Self {
        let mut d = Self { mantissa, scale };
        while d.scale > 0 && d.mantissa % 10 == 0 {
            d.mantissa /= 10;
            d.scale -= 1;
        }
        d
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Lossy conversion to `f64`.
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }
}

impl FromStr for Decimal {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConversionError::InvalidDecimal {
            text: s.to_string(),
        };
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let scale = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
        if scale > Self::MAX_SCALE {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for digit in int_part.chars().chain(frac_part.chars()) {
            let d = i128::from(digit.to_digit(10).ok_or_else(invalid)?);
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(d))
                .ok_or_else(invalid)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Ok(Self::new(mantissa, scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        let sign = if self.mantissa < 0 { "-" } else { "" };
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

/// A Rust type that can back an option field.
///
/// Implemented for the scalar kinds of [`TargetType`], for `Option<T>`
/// (nullable) and `Vec<T>` (collection). Enum fields implement it by hand
/// using [`EnumSpec`] and [`Value::into_enum`].
pub trait FieldType: Sized {
    /// Target type the coercer produces for this field.
    fn target_type() -> TargetType;

    /// Converts a coerced value into the field's type.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the value has the wrong kind or does
    /// not fit the type.
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch(expected: &'static str, found: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

impl FieldType for String {
    fn target_type() -> TargetType {
        TargetType::Text
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FieldType for bool {
    fn target_type() -> TargetType {
        TargetType::Bool
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! integer_field {
    ($($ty:ty => $kind:ident),*) => {
        $(
            impl FieldType for $ty {
                fn target_type() -> TargetType {
                    TargetType::Integer(IntegerKind::$kind)
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Integer(n) => <$ty>::try_from(n).map_err(|_| {
                            ConversionError::OutOfRange {
                                text: n.to_string(),
                                kind: IntegerKind::$kind.name(),
                            }
                        }),
                        other => Err(mismatch("integer", &other)),
                    }
                }
            }
        )*
    };
}

integer_field!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64
);

impl FieldType for f64 {
    fn target_type() -> TargetType {
        TargetType::Float
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FieldType for Decimal {
    fn target_type() -> TargetType {
        TargetType::Decimal
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Decimal(d) => Ok(d),
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl FieldType for NaiveDate {
    fn target_type() -> TargetType {
        TargetType::Date
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FieldType for NaiveDateTime {
    fn target_type() -> TargetType {
        TargetType::DateTime
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl FieldType for TimeDelta {
    fn target_type() -> TargetType {
        TargetType::TimeSpan
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::TimeSpan(span) => Ok(span),
            other => Err(mismatch("timespan", &other)),
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn target_type() -> TargetType {
        TargetType::nullable(T::target_type())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        T::from_value(value).map(Some)
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn target_type() -> TargetType {
        TargetType::collection(T::target_type())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}
