//! Byte-level marshalling: resolved type view + bytes ↔ [`PlcValue`].
//!
//! Both directions dispatch on the type view. Reading never fails on value
//! content (unknown blobs come back as [`PlcValue::Bytes`]); writing is
//! strict and reports exactly what is missing so callers can merge with the
//! current PLC value and retry.

use super::PlcValue;
use crate::error::{ClientError, Result};
use crate::meta::base_types::is_date_type;
use crate::meta::resolver::DataType;
use crate::meta::ArrayInfo;
use adskit_core::ads::strings::{decode_string, decode_wstring, encode_string, encode_wstring};
use adskit_core::ads::AdsDataTypeId;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;

/// Options governing both marshalling directions.
#[derive(Debug, Clone, Copy)]
pub struct MarshalOptions {
    /// Decode enums into `{name, value}` pairs instead of bare numbers.
    pub objectify_enumerations: bool,
    /// Convert `DATE`/`DT` to wall-clock timestamps (and accept them back).
    pub convert_dates: bool,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            objectify_enumerations: true,
            convert_dates: true,
        }
    }
}

/// Parses wire bytes into a typed value.
pub fn parse_value(ty: &DataType, bytes: &[u8], opts: &MarshalOptions) -> Result<PlcValue> {
    if bytes.len() < ty.byte_len() {
        return Err(mismatch(
            ty,
            format!("need {} bytes, got {}", ty.byte_len(), bytes.len()),
        ));
    }

    if ty.is_array() {
        parse_array(ty, &ty.array_info, bytes, opts)
    } else {
        parse_scalar(ty, bytes, opts)
    }
}

/// Serializes a typed value into exactly `ty.byte_len()` wire bytes.
pub fn serialize_value(ty: &DataType, value: &PlcValue, opts: &MarshalOptions) -> Result<Vec<u8>> {
    let mut out = vec![0u8; ty.byte_len()];
    if ty.is_array() {
        write_array(ty, &ty.array_info, value, &mut out, opts)?;
    } else {
        write_scalar(ty, value, &mut out, opts)?;
    }
    Ok(out)
}

fn mismatch(ty: &DataType, detail: impl Into<String>) -> ClientError {
    ClientError::ValueMismatch {
        type_name: ty.type_name.clone(),
        detail: detail.into(),
    }
}

fn parse_array(
    ty: &DataType,
    dims: &[ArrayInfo],
    bytes: &[u8],
    opts: &MarshalOptions,
) -> Result<PlcValue> {
    let dim = dims[0];
    let inner_count: usize = dims[1..].iter().map(|d| d.length as usize).product();
    let chunk = ty.size as usize * inner_count;

    let mut items = Vec::with_capacity(dim.length as usize);
    for i in 0..dim.length as usize {
        let slice = &bytes[i * chunk..(i + 1) * chunk];
        let item = if dims.len() > 1 {
            parse_array(ty, &dims[1..], slice, opts)?
        } else {
            parse_scalar(ty, slice, opts)?
        };
        items.push(item);
    }
    Ok(PlcValue::Array(items))
}

fn parse_scalar(ty: &DataType, bytes: &[u8], opts: &MarshalOptions) -> Result<PlcValue> {
    if ty.is_enum() {
        let value = parse_primitive(ty, bytes, opts)?;
        if !opts.objectify_enumerations {
            return Ok(value);
        }
        let name = ty.enum_name_of(&value).map(str::to_owned);
        return Ok(PlcValue::Enum {
            name,
            value: Box::new(value),
        });
    }

    if ty.is_struct() {
        let mut map = BTreeMap::new();
        for sub in &ty.sub_items {
            let start = sub.offset as usize;
            let end = start + sub.byte_len();
            if end > bytes.len() {
                return Err(mismatch(
                    ty,
                    format!(
                        "member '{}' spans {start}..{end} but buffer is {} bytes",
                        sub.name,
                        bytes.len()
                    ),
                ));
            }
            let value = if sub.is_array() {
                parse_array(sub, &sub.array_info, &bytes[start..end], opts)?
            } else {
                parse_scalar(sub, &bytes[start..end], opts)?
            };
            map.insert(sub.name.clone(), value);
        }
        return Ok(PlcValue::Struct(map));
    }

    parse_primitive(ty, bytes, opts)
}

fn parse_primitive(ty: &DataType, bytes: &[u8], opts: &MarshalOptions) -> Result<PlcValue> {
    // Member-less views of a containing block can still carry a data offset.
    let bytes = if ty.sub_items.is_empty() && ty.offset > 0 && bytes.len() > ty.offset as usize {
        &bytes[ty.offset as usize..]
    } else {
        bytes
    };

    let size = ty.size as usize;
    if bytes.len() < size {
        return Err(mismatch(
            ty,
            format!("need {size} bytes, got {}", bytes.len()),
        ));
    }

    let value = match ty.data_type_id {
        AdsDataTypeId::Bit => PlcValue::Bool(bytes[0] != 0),
        AdsDataTypeId::Int8 => PlcValue::Int8(bytes[0] as i8),
        AdsDataTypeId::UInt8 => PlcValue::UInt8(bytes[0]),
        AdsDataTypeId::Int16 => PlcValue::Int16(i16::from_le_bytes(bytes[..2].try_into().unwrap())),
        AdsDataTypeId::UInt16 => {
            PlcValue::UInt16(u16::from_le_bytes(bytes[..2].try_into().unwrap()))
        }
        AdsDataTypeId::Int32 => PlcValue::Int32(i32::from_le_bytes(bytes[..4].try_into().unwrap())),
        AdsDataTypeId::UInt32 => {
            let raw = u32::from_le_bytes(bytes[..4].try_into().unwrap());
            if opts.convert_dates && is_date_type(&ty.type_name) {
                match Utc.timestamp_opt(raw as i64, 0).single() {
                    Some(dt) => PlcValue::Date(dt),
                    None => PlcValue::UInt32(raw),
                }
            } else {
                PlcValue::UInt32(raw)
            }
        }
        AdsDataTypeId::Int64 => PlcValue::Int64(i64::from_le_bytes(bytes[..8].try_into().unwrap())),
        AdsDataTypeId::UInt64 => {
            PlcValue::UInt64(u64::from_le_bytes(bytes[..8].try_into().unwrap()))
        }
        AdsDataTypeId::Real32 => {
            PlcValue::Float32(f32::from_le_bytes(bytes[..4].try_into().unwrap()))
        }
        AdsDataTypeId::Real64 => {
            PlcValue::Float64(f64::from_le_bytes(bytes[..8].try_into().unwrap()))
        }
        AdsDataTypeId::String => PlcValue::String(decode_string(&bytes[..size])),
        AdsDataTypeId::WString => PlcValue::WString(decode_wstring(&bytes[..size])),
        // Unknown or opaque content stays raw.
        _ => PlcValue::Bytes(bytes[..size].to_vec()),
    };
    Ok(value)
}

fn write_array(
    ty: &DataType,
    dims: &[ArrayInfo],
    value: &PlcValue,
    out: &mut [u8],
    opts: &MarshalOptions,
) -> Result<()> {
    let dim = dims[0];
    let expected = dim.length as usize;

    let items = match value {
        PlcValue::Array(items) => items,
        _ => return Err(mismatch(ty, format!("expected an array value, got {value}"))),
    };
    if items.len() != expected {
        return Err(ClientError::IncompleteArray {
            expected,
            got: items.len(),
        });
    }

    let inner_count: usize = dims[1..].iter().map(|d| d.length as usize).product();
    let chunk = ty.size as usize * inner_count;

    for (i, item) in items.iter().enumerate() {
        let slice = &mut out[i * chunk..(i + 1) * chunk];
        if dims.len() > 1 {
            write_array(ty, &dims[1..], item, slice, opts)?;
        } else {
            write_scalar(ty, item, slice, opts)?;
        }
    }
    Ok(())
}

fn write_scalar(
    ty: &DataType,
    value: &PlcValue,
    out: &mut [u8],
    opts: &MarshalOptions,
) -> Result<()> {
    if ty.is_enum() {
        return write_enum(ty, value, out, opts);
    }

    if ty.is_struct() {
        let map = match value {
            PlcValue::Struct(map) => map,
            _ => return Err(mismatch(ty, format!("expected a struct value, got {value}"))),
        };

        let missing: Vec<String> = ty
            .sub_items
            .iter()
            .filter(|sub| !map.contains_key(&sub.name))
            .map(|sub| sub.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ClientError::IncompleteStruct { missing });
        }

        for sub in &ty.sub_items {
            let start = sub.offset as usize;
            let end = start + sub.byte_len();
            if end > out.len() {
                return Err(mismatch(
                    ty,
                    format!("member '{}' does not fit the type size", sub.name),
                ));
            }
            let member = &map[&sub.name];
            if sub.is_array() {
                write_array(sub, &sub.array_info, member, &mut out[start..end], opts)?;
            } else {
                write_scalar(sub, member, &mut out[start..end], opts)?;
            }
        }
        return Ok(());
    }

    write_primitive(ty, value, out, opts)
}

/// Enums accept a bare number, a member name, or the `{name, value}` shapes.
fn write_enum(ty: &DataType, value: &PlcValue, out: &mut [u8], opts: &MarshalOptions) -> Result<()> {
    let numeric: PlcValue = match value {
        PlcValue::Enum { value, .. } => (**value).clone(),
        PlcValue::String(name) | PlcValue::WString(name) => ty
            .enum_value_of(name)
            .cloned()
            .ok_or_else(|| mismatch(ty, format!("unknown enum member '{name}'")))?,
        PlcValue::Struct(map) => {
            if let Some(v) = map.get("value") {
                v.clone()
            } else if let Some(PlcValue::String(name)) = map.get("name") {
                ty.enum_value_of(name)
                    .cloned()
                    .ok_or_else(|| mismatch(ty, format!("unknown enum member '{name}'")))?
            } else {
                return Err(mismatch(ty, "enum object needs a 'name' or 'value' key"));
            }
        }
        other => other.clone(),
    };
    write_primitive(ty, &numeric, out, opts)
}

fn write_primitive(
    ty: &DataType,
    value: &PlcValue,
    out: &mut [u8],
    opts: &MarshalOptions,
) -> Result<()> {
    let size = ty.size as usize;
    if out.len() < size {
        return Err(mismatch(ty, "output buffer shorter than type size"));
    }

    match ty.data_type_id {
        AdsDataTypeId::Bit => {
            let v = value
                .as_bool()
                .or_else(|| value.as_i128().map(|n| n != 0))
                .ok_or_else(|| mismatch(ty, format!("expected BOOL, got {value}")))?;
            out[0] = v as u8;
        }
        AdsDataTypeId::Int8 => out[0] = int_in_range::<i8>(ty, value)? as u8,
        AdsDataTypeId::UInt8 => out[0] = int_in_range::<u8>(ty, value)?,
        AdsDataTypeId::Int16 => {
            out[..2].copy_from_slice(&int_in_range::<i16>(ty, value)?.to_le_bytes())
        }
        AdsDataTypeId::UInt16 => {
            out[..2].copy_from_slice(&int_in_range::<u16>(ty, value)?.to_le_bytes())
        }
        AdsDataTypeId::Int32 => {
            out[..4].copy_from_slice(&int_in_range::<i32>(ty, value)?.to_le_bytes())
        }
        AdsDataTypeId::UInt32 => {
            let raw = if opts.convert_dates && is_date_type(&ty.type_name) {
                date_seconds(ty, value)?
            } else {
                int_in_range::<u32>(ty, value)?
            };
            out[..4].copy_from_slice(&raw.to_le_bytes());
        }
        AdsDataTypeId::Int64 => {
            out[..8].copy_from_slice(&int_in_range::<i64>(ty, value)?.to_le_bytes())
        }
        AdsDataTypeId::UInt64 => {
            out[..8].copy_from_slice(&int_in_range::<u64>(ty, value)?.to_le_bytes())
        }
        AdsDataTypeId::Real32 => {
            let v = value
                .as_f64()
                .ok_or_else(|| mismatch(ty, format!("expected REAL, got {value}")))?;
            out[..4].copy_from_slice(&(v as f32).to_le_bytes());
        }
        AdsDataTypeId::Real64 => {
            let v = value
                .as_f64()
                .ok_or_else(|| mismatch(ty, format!("expected LREAL, got {value}")))?;
            out[..8].copy_from_slice(&v.to_le_bytes());
        }
        AdsDataTypeId::String => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch(ty, format!("expected STRING, got {value}")))?;
            out[..size].copy_from_slice(&encode_string(s, size)?);
        }
        AdsDataTypeId::WString => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch(ty, format!("expected WSTRING, got {value}")))?;
            out[..size].copy_from_slice(&encode_wstring(s, size)?);
        }
        _ => {
            let bytes = match value {
                PlcValue::Bytes(b) => b,
                _ => return Err(mismatch(ty, format!("expected raw bytes, got {value}"))),
            };
            if bytes.len() != size {
                return Err(mismatch(
                    ty,
                    format!("raw value is {} bytes, type needs {size}", bytes.len()),
                ));
            }
            out[..size].copy_from_slice(bytes);
        }
    }
    Ok(())
}

fn int_in_range<T>(ty: &DataType, value: &PlcValue) -> Result<T>
where
    T: TryFrom<i128>,
{
    let raw = value
        .as_i128()
        .ok_or_else(|| mismatch(ty, format!("expected an integer, got {value}")))?;
    T::try_from(raw).map_err(|_| mismatch(ty, format!("{raw} out of range")))
}

/// `DATE`/`DT` writes accept either a wall-clock value or bare epoch seconds.
fn date_seconds(ty: &DataType, value: &PlcValue) -> Result<u32> {
    match value {
        PlcValue::Date(dt) => u32::try_from(dt.timestamp())
            .map_err(|_| mismatch(ty, "date out of the DATE_AND_TIME range")),
        other => int_in_range::<u32>(ty, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::base_types;
    use crate::meta::resolver::ResolvedEnumValue;

    fn prim(name: &str) -> DataType {
        DataType::terminal(name, base_types::lookup(name).unwrap())
    }

    fn point_type() -> DataType {
        let mut ty = prim("DINT");
        ty.type_name = "ST_Point".into();
        ty.data_type_id = AdsDataTypeId::BigType;
        ty.size = 8;
        let mut x = prim("DINT");
        x.name = "x".into();
        let mut y = prim("DINT");
        y.name = "y".into();
        y.offset = 4;
        ty.sub_items = vec![x, y];
        ty
    }

    #[test]
    fn primitive_roundtrip() {
        let ty = prim("DINT");
        let opts = MarshalOptions::default();
        let bytes = serialize_value(&ty, &PlcValue::Int32(42), &opts).unwrap();
        assert_eq!(bytes, vec![0x2A, 0, 0, 0]);
        assert_eq!(parse_value(&ty, &bytes, &opts).unwrap(), PlcValue::Int32(42));
    }

    #[test]
    fn string_roundtrip_and_size() {
        let ty = prim("STRING(10)");
        let opts = MarshalOptions::default();
        let bytes = serialize_value(&ty, &"hello".into(), &opts).unwrap();
        assert_eq!(bytes.len(), ty.byte_len());
        assert_eq!(
            parse_value(&ty, &bytes, &opts).unwrap(),
            PlcValue::String("hello".into())
        );
    }

    #[test]
    fn struct_roundtrip() {
        let ty = point_type();
        let opts = MarshalOptions::default();
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), PlcValue::Int32(-3));
        map.insert("y".to_string(), PlcValue::Int32(900));
        let value = PlcValue::Struct(map);

        let bytes = serialize_value(&ty, &value, &opts).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(parse_value(&ty, &bytes, &opts).unwrap(), value);
    }

    #[test]
    fn struct_missing_key_lists_it() {
        let ty = point_type();
        let opts = MarshalOptions::default();
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), PlcValue::Int32(1));
        let err = serialize_value(&ty, &PlcValue::Struct(map), &opts).unwrap_err();
        match err {
            ClientError::IncompleteStruct { missing } => assert_eq!(missing, vec!["y"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn array_roundtrip_and_total_size() {
        let mut ty = prim("INT");
        ty.array_info = vec![ArrayInfo { start_index: 0, length: 3 }];
        let opts = MarshalOptions::default();

        let value = PlcValue::Array(vec![
            PlcValue::Int16(1),
            PlcValue::Int16(2),
            PlcValue::Int16(3),
        ]);
        let bytes = serialize_value(&ty, &value, &opts).unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(parse_value(&ty, &bytes, &opts).unwrap(), value);
    }

    #[test]
    fn nested_array_roundtrip() {
        let mut ty = prim("SINT");
        ty.array_info = vec![
            ArrayInfo { start_index: 0, length: 2 },
            ArrayInfo { start_index: 0, length: 3 },
        ];
        let opts = MarshalOptions::default();

        let value = PlcValue::Array(vec![
            PlcValue::Array(vec![1i8.into(), 2i8.into(), 3i8.into()]),
            PlcValue::Array(vec![4i8.into(), 5i8.into(), 6i8.into()]),
        ]);
        let bytes = serialize_value(&ty, &value, &opts).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(parse_value(&ty, &bytes, &opts).unwrap(), value);
    }

    #[test]
    fn array_requires_every_index() {
        let mut ty = prim("INT");
        ty.array_info = vec![ArrayInfo { start_index: 0, length: 3 }];
        let opts = MarshalOptions::default();
        let err = serialize_value(
            &ty,
            &PlcValue::Array(vec![PlcValue::Int16(1)]),
            &opts,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::IncompleteArray { expected: 3, got: 1 }));
    }

    fn mode_enum() -> DataType {
        let mut ty = prim("INT");
        ty.type_name = "E_Mode".into();
        ty.enum_values = vec![
            ResolvedEnumValue { name: "IDLE".into(), value: PlcValue::Int16(0) },
            ResolvedEnumValue { name: "RUNNING".into(), value: PlcValue::Int16(1) },
        ];
        ty
    }

    #[test]
    fn enum_objectified_read() {
        let ty = mode_enum();
        let opts = MarshalOptions::default();
        let value = parse_value(&ty, &[1, 0], &opts).unwrap();
        assert_eq!(
            value,
            PlcValue::Enum {
                name: Some("RUNNING".into()),
                value: Box::new(PlcValue::Int16(1)),
            }
        );

        // Unmatched values keep name = None.
        let value = parse_value(&ty, &[9, 0], &opts).unwrap();
        assert_eq!(
            value,
            PlcValue::Enum { name: None, value: Box::new(PlcValue::Int16(9)) }
        );
    }

    #[test]
    fn enum_plain_read_when_not_objectified() {
        let ty = mode_enum();
        let opts = MarshalOptions {
            objectify_enumerations: false,
            ..Default::default()
        };
        assert_eq!(parse_value(&ty, &[1, 0], &opts).unwrap(), PlcValue::Int16(1));
    }

    #[test]
    fn enum_write_accepts_all_shapes() {
        let ty = mode_enum();
        let opts = MarshalOptions::default();

        for value in [
            PlcValue::Int16(1),
            PlcValue::String("RUNNING".into()),
            PlcValue::String("running".into()),
            PlcValue::Enum { name: None, value: Box::new(PlcValue::Int16(1)) },
            PlcValue::Struct(BTreeMap::from([("value".to_string(), PlcValue::Int16(1))])),
            PlcValue::Struct(BTreeMap::from([(
                "name".to_string(),
                PlcValue::String("RUNNING".into()),
            )])),
        ] {
            assert_eq!(serialize_value(&ty, &value, &opts).unwrap(), vec![1, 0]);
        }

        assert!(serialize_value(&ty, &PlcValue::String("BOGUS".into()), &opts).is_err());
    }

    #[test]
    fn date_conversion_both_ways() {
        let mut ty = prim("DINT");
        ty.type_name = "DT".into();
        ty.data_type_id = AdsDataTypeId::UInt32;
        let opts = MarshalOptions::default();

        let secs: u32 = 1_655_526_400;
        let parsed = parse_value(&ty, &secs.to_le_bytes(), &opts).unwrap();
        match &parsed {
            PlcValue::Date(dt) => assert_eq!(dt.timestamp(), secs as i64),
            other => panic!("expected a date, got {other}"),
        }

        // Accepts the wall-clock value back, and bare seconds too.
        assert_eq!(serialize_value(&ty, &parsed, &opts).unwrap(), secs.to_le_bytes());
        assert_eq!(
            serialize_value(&ty, &PlcValue::UInt32(secs), &opts).unwrap(),
            secs.to_le_bytes()
        );

        // With conversion off it is a plain UDINT.
        let opts = MarshalOptions { convert_dates: false, ..Default::default() };
        assert_eq!(
            parse_value(&ty, &secs.to_le_bytes(), &opts).unwrap(),
            PlcValue::UInt32(secs)
        );
    }

    #[test]
    fn wstring_roundtrip() {
        let ty = prim("WSTRING(5)");
        let opts = MarshalOptions::default();
        let bytes = serialize_value(&ty, &PlcValue::WString("Grüß".into()), &opts).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(
            parse_value(&ty, &bytes, &opts).unwrap(),
            PlcValue::WString("Grüß".into())
        );
    }

    #[test]
    fn unknown_blob_roundtrip() {
        let mut ty = prim("DINT");
        ty.data_type_id = AdsDataTypeId::BigType;
        ty.type_name = "FB_Opaque".into();
        ty.size = 3;
        let opts = MarshalOptions::default();

        let parsed = parse_value(&ty, &[7, 8, 9], &opts).unwrap();
        assert_eq!(parsed, PlcValue::Bytes(vec![7, 8, 9]));
        assert_eq!(serialize_value(&ty, &parsed, &opts).unwrap(), vec![7, 8, 9]);
    }
}
