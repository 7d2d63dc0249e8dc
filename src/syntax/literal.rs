//! Literal values carried by query tokens and constant nodes.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::edm::{PrimitiveKind, TypeReference};

/// A typed literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// The `null` literal; it has no static type.
    Null,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Guid(Uuid),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Time(#[serde(with = "duration_millis")] TimeDelta),
    Binary(Vec<u8>),
}

impl LiteralValue {
    /// Returns the primitive kind of the literal, or `None` for null.
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            LiteralValue::Null => return None,
            LiteralValue::Boolean(_) => PrimitiveKind::Boolean,
            LiteralValue::Byte(_) => PrimitiveKind::Byte,
            LiteralValue::SByte(_) => PrimitiveKind::SByte,
            LiteralValue::Int16(_) => PrimitiveKind::Int16,
            LiteralValue::Int32(_) => PrimitiveKind::Int32,
            LiteralValue::Int64(_) => PrimitiveKind::Int64,
            LiteralValue::Single(_) => PrimitiveKind::Single,
            LiteralValue::Double(_) => PrimitiveKind::Double,
            LiteralValue::Decimal(_) => PrimitiveKind::Decimal,
            LiteralValue::String(_) => PrimitiveKind::String,
            LiteralValue::Guid(_) => PrimitiveKind::Guid,
            LiteralValue::DateTime(_) => PrimitiveKind::DateTime,
            LiteralValue::DateTimeOffset(_) => PrimitiveKind::DateTimeOffset,
            LiteralValue::Time(_) => PrimitiveKind::Time,
            LiteralValue::Binary(_) => PrimitiveKind::Binary,
        };
        Some(kind)
    }

    /// Returns the static type of the literal, or `None` for null.
    ///
    /// Strings and binaries are reference types and therefore nullable.
    #[must_use]
    pub fn type_reference(&self) -> Option<TypeReference> {
        let kind = self.primitive_kind()?;
        let nullable = matches!(kind, PrimitiveKind::String | PrimitiveKind::Binary);
        Some(TypeReference::primitive(kind, nullable))
    }

    /// Returns true for the null literal.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Byte(v) => write!(f, "{v}"),
            LiteralValue::SByte(v) => write!(f, "{v}"),
            LiteralValue::Int16(v) => write!(f, "{v}"),
            LiteralValue::Int32(v) => write!(f, "{v}"),
            LiteralValue::Int64(v) => write!(f, "{v}L"),
            LiteralValue::Single(v) => write!(f, "{v}f"),
            LiteralValue::Double(v) => write!(f, "{v}d"),
            LiteralValue::Decimal(v) => write!(f, "{v}m"),
            LiteralValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            LiteralValue::Guid(g) => write!(f, "guid'{g}'"),
            LiteralValue::DateTime(dt) => write!(f, "datetime'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            LiteralValue::DateTimeOffset(dt) => write!(f, "datetimeoffset'{}'", dt.to_rfc3339()),
            LiteralValue::Time(d) => write!(f, "time'{d}'"),
            LiteralValue::Binary(bytes) => {
                f.write_str("X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

mod duration_millis {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        value.num_milliseconds().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        i64::deserialize(deserializer).map(TimeDelta::milliseconds)
    }
}
