//! Token to value coercion.
//!
//! [`coerce`] is the single entry point: it dispatches on the
//! [`TargetType`] and turns one raw token into a [`Value`], splitting
//! collection tokens on `,`.
//!
//! # Examples
//!
//! ```
//! use command_options_core::{coerce, IntegerKind, TargetType, Value};
//!
//! let names = coerce(&TargetType::collection(TargetType::Text), "Peter,Paul,Mary").unwrap();
//! assert_eq!(names, Value::from(vec!["Peter", "Paul", "Mary"]));
//!
//! let number = coerce(&TargetType::Integer(IntegerKind::I32), "42").unwrap();
//! assert_eq!(number, Value::Integer(42));
//!
//! assert!(coerce(&TargetType::Integer(IntegerKind::U8), "300").is_err());
//! ```

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

use crate::error::ConversionError;
use crate::value::{Decimal, TargetType, Value};

/// Separator between elements of a collection token.
pub const COLLECTION_SEPARATOR: char = ',';

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

static TIME_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sign>-)?(?:(?P<days>\d+)\.)?(?P<hours>\d{1,2}):(?P<minutes>\d{1,2})(?::(?P<seconds>\d{1,2})(?:\.(?P<fraction>\d{1,7}))?)?$",
    )
    .expect("static regex must compile")
});

static DAYS_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<sign>-)?(?P<days>\d+)$").expect("static regex must compile"));

/// Converts `text` into a value of `target`.
///
/// # Errors
///
/// Returns a [`ConversionError`] describing the first part of the token that
/// could not be converted.
pub fn coerce(target: &TargetType, text: &str) -> Result<Value, ConversionError> {
    match target {
        TargetType::Collection(element) => text
            .split(COLLECTION_SEPARATOR)
            .map(|part| coerce(element, part))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        TargetType::Nullable(inner) => coerce(inner, text),
        TargetType::Text => Ok(Value::Text(text.to_string())),
        TargetType::TimeSpan => parse_time_span(text).map(Value::TimeSpan),
        TargetType::Bool => parse_bool(text).map(Value::Bool),
        TargetType::Integer(kind) => {
            let trimmed = text.trim();
            let n = trimmed
                .parse::<i128>()
                .map_err(|source| ConversionError::InvalidInteger {
                    text: text.to_string(),
                    source,
                })?;
            if kind.contains(n) {
                Ok(Value::Integer(n))
            } else {
                Err(ConversionError::OutOfRange {
                    text: text.to_string(),
                    kind: kind.name(),
                })
            }
        }
        TargetType::Float => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|source| ConversionError::InvalidFloat {
                text: text.to_string(),
                source,
            }),
        TargetType::Decimal => text.parse::<Decimal>().map(Value::Decimal),
        TargetType::Date => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|source| ConversionError::InvalidDate {
                text: text.to_string(),
                kind: "date",
                source,
            }),
        TargetType::DateTime => parse_date_time(text).map(Value::DateTime),
        TargetType::Enum(spec) => spec
            .resolve(text.trim())
            .map(|name| Value::Enum(name.to_string()))
            .ok_or_else(|| ConversionError::UnknownVariant {
                text: text.to_string(),
                name: spec.name.clone(),
                expected: spec.variants.join(", "),
            }),
    }
}

fn parse_bool(text: &str) -> Result<bool, ConversionError> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConversionError::InvalidBool {
            text: text.to_string(),
        })
    }
}

fn parse_date_time(text: &str) -> Result<NaiveDateTime, ConversionError> {
    let trimmed = text.trim();
    let mut last_error = match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => return Ok(date.and_time(NaiveTime::MIN)),
        Err(e) => e,
    };
    for format in DATETIME_FORMATS {
        match NaiveDateTime::parse_from_str(trimmed, format) {
            Ok(dt) => return Ok(dt),
            Err(e) => last_error = e,
        }
    }
    Err(ConversionError::InvalidDate {
        text: text.to_string(),
        kind: "datetime",
        source: last_error,
    })
}

/// Parses `[-][d.]hh:mm[:ss[.fffffff]]` or a bare day count.
///
/// Hours must be below 24, minutes and seconds below 60. The fraction holds
/// up to seven digits (100ns ticks).
pub(crate) fn parse_time_span(text: &str) -> Result<TimeDelta, ConversionError> {
    let invalid = || ConversionError::InvalidTimeSpan {
        text: text.to_string(),
    };
    let trimmed = text.trim();

    let number = |caps: &regex::Captures<'_>, name: &str| -> Result<i64, ConversionError> {
        caps.name(name)
            .map_or(Ok(0), |m| m.as_str().parse::<i64>())
            .map_err(|_| invalid())
    };

    let (negative, total_seconds, nanos) = if let Some(caps) = DAYS_ONLY_RE.captures(trimmed) {
        let days = number(&caps, "days")?;
        let seconds = days.checked_mul(86_400).ok_or_else(invalid)?;
        (caps.name("sign").is_some(), seconds, 0)
    } else if let Some(caps) = TIME_SPAN_RE.captures(trimmed) {
        let days = number(&caps, "days")?;
        let hours = number(&caps, "hours")?;
        let minutes = number(&caps, "minutes")?;
        let seconds = number(&caps, "seconds")?;
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        let nanos = match caps.name("fraction") {
            Some(m) => format!("{:0<9}", m.as_str())
                .parse::<u32>()
                .map_err(|_| invalid())?,
            None => 0,
        };
        let total = days
            .checked_mul(86_400)
            .and_then(|s| s.checked_add(hours * 3_600 + minutes * 60 + seconds))
            .ok_or_else(invalid)?;
        (caps.name("sign").is_some(), total, nanos)
    } else {
        return Err(invalid());
    };

    let span = TimeDelta::new(total_seconds, nanos).ok_or_else(invalid)?;
    Ok(if negative { -span } else { span })
}

/// Formats a span in the grammar [`parse_time_span`] accepts.
pub(crate) fn format_time_span(span: TimeDelta) -> String {
    let negative = span < TimeDelta::zero();
    let magnitude = if negative { -span } else { span };
    let total = magnitude.num_seconds();
    let ticks = magnitude.subsec_nanos() / 100;

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if ticks > 0 {
        out.push_str(&format!(".{ticks:07}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::value::{EnumSpec, IntegerKind};

    fn span(days: i64, hours: i64, minutes: i64, seconds: i64, millis: i64) -> TimeDelta {
        TimeDelta::days(days)
            + TimeDelta::hours(hours)
            + TimeDelta::minutes(minutes)
            + TimeDelta::seconds(seconds)
            + TimeDelta::milliseconds(millis)
    }

    #[test]
    fn test_time_span_full_grammar() {
        assert_eq!(
            parse_time_span("5.11:46:47.5000000").unwrap(),
            span(5, 11, 46, 47, 500)
        );
        assert_eq!(parse_time_span("11:46").unwrap(), span(0, 11, 46, 0, 0));
        assert_eq!(parse_time_span("-00:00:30").unwrap(), -span(0, 0, 0, 30, 0));
        assert_eq!(parse_time_span("3").unwrap(), span(3, 0, 0, 0, 0));
    }

    #[test]
    fn test_time_span_rejects_out_of_range_fields() {
        assert!(parse_time_span("24:00").is_err());
        assert!(parse_time_span("10:60").is_err());
        assert!(parse_time_span("10:10:75").is_err());
        assert!(parse_time_span("ten minutes").is_err());
        assert!(parse_time_span("").is_err());
    }

    #[test]
    fn test_time_span_format_matches_grammar() {
        let value = span(5, 11, 46, 47, 500);
        let text = format_time_span(value);
        assert_eq!(text, "5.11:46:47.5000000");
        assert_eq!(parse_time_span(&text).unwrap(), value);
        assert_eq!(format_time_span(-span(0, 0, 1, 0, 0)), "-00:01:00");
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(
            coerce(&TargetType::Text, " padded ").unwrap(),
            Value::Text(" padded ".to_string())
        );
        assert_eq!(coerce(&TargetType::Bool, "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(
            coerce(&TargetType::Integer(IntegerKind::I64), "123467890").unwrap(),
            Value::Integer(123_467_890)
        );
        assert_eq!(coerce(&TargetType::Float, "2.5").unwrap(), Value::Float(2.5));
        assert_eq!(
            coerce(&TargetType::Decimal, "47.11").unwrap(),
            Value::Decimal(Decimal::new(4711, 2))
        );
    }

    #[test]
    fn test_coerce_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(coerce(&TargetType::Date, "2024-01-01").unwrap(), Value::Date(date));

        let now = date.and_hms_opt(15, 14, 53).unwrap();
        assert_eq!(
            coerce(&TargetType::DateTime, "2024-01-01 15:14:53").unwrap(),
            Value::DateTime(now)
        );
        assert_eq!(
            coerce(&TargetType::DateTime, "2024-01-01T15:14:53").unwrap(),
            Value::DateTime(now)
        );
        assert_eq!(
            coerce(&TargetType::DateTime, "2024-01-01").unwrap(),
            Value::DateTime(date.and_time(NaiveTime::MIN))
        );

        let err = coerce(&TargetType::Date, "01/01/2024").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidDate { kind: "date", .. }));
    }

    #[test]
    fn test_coerce_enum_by_name() {
        let choice = TargetType::Enum(EnumSpec::new("Choice", ["One", "Two", "Many"]));
        assert_eq!(coerce(&choice, "two").unwrap(), Value::Enum("Two".to_string()));

        let err = coerce(&choice, "Few").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'Few' is not a variant of Choice (expected one of: One, Two, Many)"
        );
    }

    #[test]
    fn test_coerce_collection_fails_on_first_bad_element() {
        let numbers = TargetType::collection(TargetType::Integer(IntegerKind::I32));
        assert_eq!(
            coerce(&numbers, "1,2,3").unwrap(),
            Value::from(vec![1i32, 2, 3])
        );

        let err = coerce(&numbers, "1,x,y").unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInteger { ref text, .. } if text == "x"));
    }

    #[test]
    fn test_coerce_nullable_unwraps_inner() {
        let maybe = TargetType::nullable(TargetType::Integer(IntegerKind::I32));
        assert_eq!(coerce(&maybe, "42").unwrap(), Value::Integer(42));
        assert_eq!(
            coerce(&TargetType::nullable(TargetType::Bool), "false").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_coerce_integer_out_of_range() {
        let err = coerce(&TargetType::Integer(IntegerKind::I8), "128").unwrap_err();
        assert_eq!(err.to_string(), "'128' is out of range for i8");
    }
}
