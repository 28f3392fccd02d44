//! Dynamic PLC values: a tagged sum covering everything a resolved type can
//! describe, plus the byte-level marshaller.

pub mod marshal;

pub use marshal::{MarshalOptions, parse_value, serialize_value};

use adskit_core::ads::AdsDataTypeId;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically typed PLC value.
///
/// Marshalling dispatches on the resolved type view, not on the runtime
/// shape of the value, so integer variants may be freely interchanged when
/// writing (range-checked).
#[derive(Debug, Clone, PartialEq)]
pub enum PlcValue {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// `STRING`: single-byte, Windows-1252.
    String(String),
    /// `WSTRING`: UTF-16LE.
    WString(String),
    /// `DATE`/`DT` converted to wall clock.
    Date(DateTime<Utc>),
    /// Opaque blob (unknown types, raw reads).
    Bytes(Vec<u8>),
    /// Struct value, keyed by member name.
    Struct(BTreeMap<String, PlcValue>),
    /// Array value; nested for multi-dimensional arrays.
    Array(Vec<PlcValue>),
    /// Enum value: decoded number plus the member name when known.
    Enum {
        name: Option<String>,
        value: Box<PlcValue>,
    },
}

impl PlcValue {
    /// The value as a signed integer, if it is any integer or bool variant.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            PlcValue::Bool(b) => Some(*b as i128),
            PlcValue::Int8(v) => Some(*v as i128),
            PlcValue::UInt8(v) => Some(*v as i128),
            PlcValue::Int16(v) => Some(*v as i128),
            PlcValue::UInt16(v) => Some(*v as i128),
            PlcValue::Int32(v) => Some(*v as i128),
            PlcValue::UInt32(v) => Some(*v as i128),
            PlcValue::Int64(v) => Some(*v as i128),
            PlcValue::UInt64(v) => Some(*v as i128),
            PlcValue::Enum { value, .. } => value.as_i128(),
            _ => None,
        }
    }

    /// The value as an `i64`, when integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// The value as an `f64` (integers convert losslessly up to 2^53).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PlcValue::Float32(v) => Some(*v as f64),
            PlcValue::Float64(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// The value as a bool, for the bool variant only.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlcValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as text, for either string flavour.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlcValue::String(s) | PlcValue::WString(s) => Some(s),
            _ => None,
        }
    }

    /// Struct member access.
    pub fn get(&self, key: &str) -> Option<&PlcValue> {
        match self {
            PlcValue::Struct(map) => map.get(key),
            _ => None,
        }
    }

    /// Array element access.
    pub fn index(&self, i: usize) -> Option<&PlcValue> {
        match self {
            PlcValue::Array(items) => items.get(i),
            _ => None,
        }
    }
}

impl fmt::Display for PlcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlcValue::Bool(v) => write!(f, "{v}"),
            PlcValue::Int8(v) => write!(f, "{v}"),
            PlcValue::UInt8(v) => write!(f, "{v}"),
            PlcValue::Int16(v) => write!(f, "{v}"),
            PlcValue::UInt16(v) => write!(f, "{v}"),
            PlcValue::Int32(v) => write!(f, "{v}"),
            PlcValue::UInt32(v) => write!(f, "{v}"),
            PlcValue::Int64(v) => write!(f, "{v}"),
            PlcValue::UInt64(v) => write!(f, "{v}"),
            PlcValue::Float32(v) => write!(f, "{v}"),
            PlcValue::Float64(v) => write!(f, "{v}"),
            PlcValue::String(s) | PlcValue::WString(s) => write!(f, "'{s}'"),
            PlcValue::Date(d) => write!(f, "{d}"),
            PlcValue::Bytes(b) => write!(f, "[{} bytes]", b.len()),
            PlcValue::Struct(map) => write!(f, "{{{} members}}", map.len()),
            PlcValue::Array(items) => write!(f, "[{} elements]", items.len()),
            PlcValue::Enum { name, value } => match name {
                Some(name) => write!(f, "{name} ({value})"),
                None => write!(f, "{value}"),
            },
        }
    }
}

macro_rules! impl_from_numeric {
    ($($variant:ident: $ty:ty),* $(,)?) => {
        $(impl From<$ty> for PlcValue {
            fn from(value: $ty) -> Self {
                PlcValue::$variant(value)
            }
        })*
    };
}

impl_from_numeric! {
    Bool: bool,
    Int8: i8,
    UInt8: u8,
    Int16: i16,
    UInt16: u16,
    Int32: i32,
    UInt32: u32,
    Int64: i64,
    UInt64: u64,
    Float32: f32,
    Float64: f64,
}

impl From<&str> for PlcValue {
    fn from(value: &str) -> Self {
        PlcValue::String(value.to_owned())
    }
}

impl From<String> for PlcValue {
    fn from(value: String) -> Self {
        PlcValue::String(value)
    }
}

/// Decodes raw little-endian bytes of a primitive tag. Used to decode enum
/// member values during type resolution; returns `None` for non-primitive
/// tags or short buffers.
pub fn decode_enum_raw(id: AdsDataTypeId, raw: &[u8]) -> Option<PlcValue> {
    let value = match id {
        AdsDataTypeId::Bit => PlcValue::Bool(*raw.first()? != 0),
        AdsDataTypeId::Int8 => PlcValue::Int8(*raw.first()? as i8),
        AdsDataTypeId::UInt8 => PlcValue::UInt8(*raw.first()?),
        AdsDataTypeId::Int16 => PlcValue::Int16(i16::from_le_bytes(raw.get(..2)?.try_into().ok()?)),
        AdsDataTypeId::UInt16 => {
            PlcValue::UInt16(u16::from_le_bytes(raw.get(..2)?.try_into().ok()?))
        }
        AdsDataTypeId::Int32 => PlcValue::Int32(i32::from_le_bytes(raw.get(..4)?.try_into().ok()?)),
        AdsDataTypeId::UInt32 => {
            PlcValue::UInt32(u32::from_le_bytes(raw.get(..4)?.try_into().ok()?))
        }
        AdsDataTypeId::Int64 => PlcValue::Int64(i64::from_le_bytes(raw.get(..8)?.try_into().ok()?)),
        AdsDataTypeId::UInt64 => {
            PlcValue::UInt64(u64::from_le_bytes(raw.get(..8)?.try_into().ok()?))
        }
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accessors() {
        assert_eq!(PlcValue::Int16(-5).as_i64(), Some(-5));
        assert_eq!(PlcValue::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(PlcValue::Float32(1.5).as_f64(), Some(1.5));
        assert_eq!(PlcValue::Bool(true).as_i64(), Some(1));
    }

    #[test]
    fn enum_unwraps_to_number() {
        let v = PlcValue::Enum {
            name: Some("RUNNING".into()),
            value: Box::new(PlcValue::Int16(1)),
        };
        assert_eq!(v.as_i64(), Some(1));
        assert_eq!(v.to_string(), "RUNNING (1)");
    }

    #[test]
    fn decode_enum_raw_primitives() {
        assert_eq!(
            decode_enum_raw(AdsDataTypeId::Int16, &[1, 0]),
            Some(PlcValue::Int16(1))
        );
        assert_eq!(
            decode_enum_raw(AdsDataTypeId::UInt32, &[1, 0, 0, 0]),
            Some(PlcValue::UInt32(1))
        );
        assert_eq!(decode_enum_raw(AdsDataTypeId::Int16, &[1]), None);
        assert_eq!(decode_enum_raw(AdsDataTypeId::String, b"x\0"), None);
    }
}
