//! Parsing of URI literal text against an expected primitive type.
//!
//! Used for service operation parameters, whose values arrive as raw query
//! option text.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::edm::{PrimitiveKind, TypeReference};
use crate::syntax::LiteralValue;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses `text` as a URI literal of the type `target`.
///
/// Returns `None` if the text is not a valid literal of that type, if the
/// value is out of range, or if the target is not primitive. `null` is only
/// accepted for nullable targets.
#[must_use]
pub fn parse_uri_literal(text: &str, target: &TypeReference) -> Option<LiteralValue> {
    if text == "null" {
        return target.is_nullable().then_some(LiteralValue::Null);
    }
    let kind = target.primitive_kind()?;
    let value = match kind {
        PrimitiveKind::Boolean => match text {
            "true" => LiteralValue::Boolean(true),
            "false" => LiteralValue::Boolean(false),
            _ => return None,
        },
        PrimitiveKind::Byte => LiteralValue::Byte(parse_integer(text)?),
        PrimitiveKind::SByte => LiteralValue::SByte(parse_integer(text)?),
        PrimitiveKind::Int16 => LiteralValue::Int16(parse_integer(text)?),
        PrimitiveKind::Int32 => LiteralValue::Int32(parse_integer(text)?),
        PrimitiveKind::Int64 => {
            let digits = strip_suffix(text, 'L');
            LiteralValue::Int64(digits.parse().ok()?)
        }
        PrimitiveKind::Single => LiteralValue::Single(strip_suffix(text, 'f').parse().ok()?),
        PrimitiveKind::Double => LiteralValue::Double(strip_suffix(text, 'd').parse().ok()?),
        PrimitiveKind::Decimal => {
            LiteralValue::Decimal(Decimal::from_str(strip_suffix(text, 'm')).ok()?)
        }
        PrimitiveKind::String => LiteralValue::String(unquote(text)?),
        PrimitiveKind::Guid => LiteralValue::Guid(Uuid::parse_str(quoted(text, "guid")?).ok()?),
        PrimitiveKind::DateTime => {
            let inner = quoted(text, "datetime")?;
            let parsed = DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(inner, format).ok())?;
            LiteralValue::DateTime(parsed)
        }
        PrimitiveKind::DateTimeOffset => LiteralValue::DateTimeOffset(
            DateTime::parse_from_rfc3339(quoted(text, "datetimeoffset")?).ok()?,
        ),
        PrimitiveKind::Time => LiteralValue::Time(parse_duration(quoted(text, "time")?)?),
        PrimitiveKind::Binary => {
            let inner = quoted(text, "X").or_else(|| quoted(text, "binary"))?;
            LiteralValue::Binary(decode_hex(inner)?)
        }
    };
    Some(value)
}

/// Parses a decimal integer and range-checks it for the target width.
fn parse_integer<T: TryFrom<i64>>(text: &str) -> Option<T> {
    let value: i64 = text.parse().ok()?;
    T::try_from(value).ok()
}

/// Removes an optional case-insensitive type suffix.
fn strip_suffix(text: &str, suffix: char) -> &str {
    text.strip_suffix(suffix.to_ascii_lowercase())
        .or_else(|| text.strip_suffix(suffix.to_ascii_uppercase()))
        .unwrap_or(text)
}

/// Returns the inner text of `prefix'...'`, matching the prefix case-insensitively.
fn quoted<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    text[prefix.len()..].strip_prefix('\'')?.strip_suffix('\'')
}

/// Unquotes a string literal, collapsing doubled single quotes.
fn unquote(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // A lone quote terminates the literal early.
            if chars.next() != Some('\'') {
                return None;
            }
        }
        result.push(c);
    }
    Some(result)
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Parses an ISO 8601 duration of the form `[-]P[nD][T[nH][nM][n[.n]S]]`.
fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('P')?;
    let (days, time) = match rest.split_once('T') {
        Some((days, time)) => (days, Some(time)),
        None => (rest, None),
    };
    if days.is_empty() && time.is_none() {
        return None;
    }

    let mut total = TimeDelta::zero();
    if !days.is_empty() {
        let count: i64 = days.strip_suffix('D')?.parse().ok()?;
        total = total.checked_add(&TimeDelta::try_days(count)?)?;
    }

    if let Some(time) = time {
        if time.is_empty() {
            return None;
        }
        let designators = ['H', 'M', 'S'];
        let mut next_designator = 0;
        let mut number = String::new();
        for c in time.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let position = designators.iter().position(|d| *d == c)?;
            if position < next_designator || number.is_empty() {
                return None;
            }
            next_designator = position + 1;
            let component = match c {
                'H' => TimeDelta::try_hours(number.parse().ok()?)?,
                'M' => TimeDelta::try_minutes(number.parse().ok()?)?,
                _ => {
                    let seconds: f64 = number.parse().ok()?;
                    TimeDelta::nanoseconds((seconds * 1e9).round() as i64)
                }
            };
            total = total.checked_add(&component)?;
            number.clear();
        }
        if !number.is_empty() {
            return None;
        }
    }

    Some(if negative { -total } else { total })
}
