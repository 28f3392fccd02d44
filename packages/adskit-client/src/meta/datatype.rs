//! Raw data-type entries as uploaded from the target. Recursive: struct-like
//! entries nest their members as complete sub-entries.

use super::{ArrayInfo, Attribute, Scanner};
use crate::error::ClientError;
use adskit_core::ads::AdsDataTypeId;

/// Type flag: the entry is a type declaration (not a data item).
pub const TYPE_FLAG_DATA_TYPE: u32 = 0x0000_0001;
/// Type flag: the entry is a data item (struct member).
pub const TYPE_FLAG_DATA_ITEM: u32 = 0x0000_0002;
/// Type flag: the entry is a reference.
pub const TYPE_FLAG_REFERENCE_TO: u32 = 0x0000_0004;
/// Type flag: entry carries a 16-byte type GUID.
pub const TYPE_FLAG_TYPE_GUID: u32 = 0x0000_0080;
/// Type flag: entry carries a copy mask of `size` bytes.
pub const TYPE_FLAG_COPY_MASK: u32 = 0x0000_0200;
/// Type flag: entry carries RPC method descriptors.
pub const TYPE_FLAG_METHOD_INFOS: u32 = 0x0000_0800;
/// Type flag: entry carries an attribute block.
pub const TYPE_FLAG_ATTRIBUTES: u32 = 0x0000_1000;
/// Type flag: entry carries enum name/value pairs.
pub const TYPE_FLAG_ENUM_INFOS: u32 = 0x0000_2000;

/// One enum member: its name and the raw wire bytes of its value
/// (`size` bytes of the underlying primitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub raw: Vec<u8>,
}

/// Metadata of an RPC method exposed by a function block. Invocation is not
/// part of this engine; the descriptors are parsed so the surrounding entry
/// decodes correctly and tooling can list them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcMethod {
    pub name: String,
    pub return_type: String,
    pub comment: String,
}

/// A raw data-type entry: one row of the target's type table, with nested
/// sub-entries for struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTypeEntry {
    pub version: u32,
    pub hash_value: u32,
    pub type_hash_value: u32,
    pub size: u32,
    pub offset: u32,
    pub data_type_id: AdsDataTypeId,
    pub flags: u32,
    pub array_dimension: u16,
    pub name: String,
    pub type_name: String,
    pub comment: String,
    pub array_info: Vec<ArrayInfo>,
    pub sub_items: Vec<DataTypeEntry>,
    pub type_guid: Option<[u8; 16]>,
    pub rpc_methods: Vec<RpcMethod>,
    pub attributes: Vec<Attribute>,
    pub enum_values: Vec<EnumValue>,
}

impl DataTypeEntry {
    /// Fixed header before the strings: entry length through sub-item count.
    const FIXED_LEN: usize = 42;

    /// True when the `DataType` declaration flag is set.
    pub fn is_data_type(&self) -> bool {
        self.flags & TYPE_FLAG_DATA_TYPE != 0
    }

    /// Parses one length-prefixed entry, returning it and the bytes consumed.
    pub fn parse_entry(data: &[u8]) -> Result<(Self, usize), ClientError> {
        let mut s = Scanner::new(data);

        let entry_length = s.u32()? as usize;
        if entry_length < Self::FIXED_LEN || entry_length > data.len() {
            return Err(ClientError::Metadata(format!(
                "data-type entry length {entry_length} out of range (buffer {})",
                data.len()
            )));
        }

        let version = s.u32()?;
        let hash_value = s.u32()?;
        let type_hash_value = s.u32()?;
        let size = s.u32()?;
        let offset = s.u32()?;
        let data_type_id = AdsDataTypeId::from(s.u32()?);
        let flags = s.u32()?;
        let name_len = s.u16()? as usize;
        let type_len = s.u16()? as usize;
        let comment_len = s.u16()? as usize;
        let array_dimension = s.u16()?;
        let sub_item_count = s.u16()? as usize;

        let name = s.cstring(name_len)?;
        let type_name = s.cstring(type_len)?;
        let comment = s.cstring(comment_len)?;

        let array_info = s.array_info(array_dimension as usize)?;

        let mut sub_items = Vec::with_capacity(sub_item_count.min(256));
        for _ in 0..sub_item_count {
            let rest = &data[s.position()..entry_length.min(data.len())];
            let (sub, consumed) = Self::parse_entry(rest)?;
            sub_items.push(sub);
            s.skip(consumed)?;
        }

        let type_guid = if flags & TYPE_FLAG_TYPE_GUID != 0 {
            Some(s.take(16)?.try_into().unwrap())
        } else {
            None
        };

        if flags & TYPE_FLAG_COPY_MASK != 0 {
            s.skip(size as usize)?;
        }

        let rpc_methods = if flags & TYPE_FLAG_METHOD_INFOS != 0 {
            parse_rpc_methods(&mut s)?
        } else {
            Vec::new()
        };

        let attributes = if flags & TYPE_FLAG_ATTRIBUTES != 0 {
            s.attributes()?
        } else {
            Vec::new()
        };

        let enum_values = if flags & TYPE_FLAG_ENUM_INFOS != 0 {
            parse_enum_values(&mut s, size as usize)?
        } else {
            Vec::new()
        };

        Ok((
            Self {
                version,
                hash_value,
                type_hash_value,
                size,
                offset,
                data_type_id,
                flags,
                array_dimension,
                name,
                type_name,
                comment,
                array_info,
                sub_items,
                type_guid,
                rpc_methods,
                attributes,
                enum_values,
            },
            entry_length,
        ))
    }

    /// Parses a bulk data-type upload: consecutive length-prefixed entries.
    pub fn parse_upload(data: &[u8]) -> Result<Vec<Self>, ClientError> {
        let mut entries = Vec::new();
        let mut cursor = 0;
        while data.len() - cursor >= 4 {
            let (entry, consumed) = Self::parse_entry(&data[cursor..])?;
            entries.push(entry);
            cursor += consumed;
        }
        Ok(entries)
    }
}

/// Enum block: `u16 count`, then per member a u8 name length, the
/// NUL-terminated name and `value_size` raw value bytes.
fn parse_enum_values(s: &mut Scanner<'_>, value_size: usize) -> Result<Vec<EnumValue>, ClientError> {
    let count = s.u16()? as usize;
    let mut values = Vec::with_capacity(count.min(256));
    for _ in 0..count {
        let name_len = s.u8()? as usize;
        let name = s.cstring(name_len)?;
        let raw = s.take(value_size)?.to_vec();
        values.push(EnumValue { name, raw });
    }
    Ok(values)
}

/// RPC method block: `u16 count`, then per method a length-prefixed
/// descriptor. Only name, return type and comment are kept; parameter lists
/// are skipped via the descriptor length.
fn parse_rpc_methods(s: &mut Scanner<'_>) -> Result<Vec<RpcMethod>, ClientError> {
    let count = s.u16()? as usize;
    let mut methods = Vec::with_capacity(count.min(64));

    for _ in 0..count {
        let start = s.position();
        let entry_length = s.u32()? as usize;
        if entry_length < 56 {
            return Err(ClientError::Metadata(format!(
                "rpc method entry length {entry_length} too small"
            )));
        }

        s.skip(4)?; // version
        s.skip(4)?; // vtable index
        s.skip(4)?; // return size
        s.skip(4)?; // return align size
        s.skip(4)?; // reserved
        s.skip(16)?; // return type guid
        s.skip(4)?; // return data type
        s.skip(4)?; // flags
        let name_len = s.u16()? as usize;
        let type_len = s.u16()? as usize;
        let comment_len = s.u16()? as usize;
        let _parameter_count = s.u16()?;

        let name = s.cstring(name_len)?;
        let return_type = s.cstring(type_len)?;
        let comment = s.cstring(comment_len)?;

        // Parameter descriptors follow; skip to the end of the method entry.
        let consumed = s.position() - start;
        if entry_length < consumed {
            return Err(ClientError::Metadata(
                "rpc method entry shorter than its strings".into(),
            ));
        }
        s.skip(entry_length - consumed)?;

        methods.push(RpcMethod {
            name,
            return_type,
            comment,
        });
    }

    Ok(methods)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Encodes a data-type entry the way the target does (tests only).
    pub fn encode_entry(e: &DataTypeEntry) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&e.version.to_le_bytes());
        body.extend_from_slice(&e.hash_value.to_le_bytes());
        body.extend_from_slice(&e.type_hash_value.to_le_bytes());
        body.extend_from_slice(&e.size.to_le_bytes());
        body.extend_from_slice(&e.offset.to_le_bytes());
        body.extend_from_slice(&u32::from(e.data_type_id).to_le_bytes());
        body.extend_from_slice(&e.flags.to_le_bytes());
        body.extend_from_slice(&(e.name.len() as u16).to_le_bytes());
        body.extend_from_slice(&(e.type_name.len() as u16).to_le_bytes());
        body.extend_from_slice(&(e.comment.len() as u16).to_le_bytes());
        body.extend_from_slice(&e.array_dimension.to_le_bytes());
        body.extend_from_slice(&(e.sub_items.len() as u16).to_le_bytes());
        for text in [&e.name, &e.type_name, &e.comment] {
            body.extend_from_slice(text.as_bytes());
            body.push(0);
        }
        for info in &e.array_info {
            body.extend_from_slice(&info.start_index.to_le_bytes());
            body.extend_from_slice(&info.length.to_le_bytes());
        }
        for sub in &e.sub_items {
            body.extend_from_slice(&encode_entry(sub));
        }
        if let Some(guid) = e.type_guid {
            body.extend_from_slice(&guid);
        }
        if e.flags & TYPE_FLAG_ATTRIBUTES != 0 {
            body.extend_from_slice(&(e.attributes.len() as u16).to_le_bytes());
            for attr in &e.attributes {
                body.push(attr.name.len() as u8);
                body.push(attr.value.len() as u8);
                body.extend_from_slice(attr.name.as_bytes());
                body.push(0);
                body.extend_from_slice(attr.value.as_bytes());
                body.push(0);
            }
        }
        if e.flags & TYPE_FLAG_ENUM_INFOS != 0 {
            body.extend_from_slice(&(e.enum_values.len() as u16).to_le_bytes());
            for v in &e.enum_values {
                body.push(v.name.len() as u8);
                body.extend_from_slice(v.name.as_bytes());
                body.push(0);
                body.extend_from_slice(&v.raw);
            }
        }

        let mut entry = Vec::with_capacity(4 + body.len());
        entry.extend_from_slice(&((4 + body.len()) as u32).to_le_bytes());
        entry.extend_from_slice(&body);
        entry
    }

    /// A primitive declaration entry, e.g. `INT`.
    pub fn primitive_entry(name: &str, id: AdsDataTypeId, size: u32) -> DataTypeEntry {
        DataTypeEntry {
            version: 1,
            hash_value: 0,
            type_hash_value: 0,
            size,
            offset: 0,
            data_type_id: id,
            flags: TYPE_FLAG_DATA_TYPE,
            array_dimension: 0,
            name: name.into(),
            type_name: String::new(),
            comment: String::new(),
            array_info: Vec::new(),
            sub_items: Vec::new(),
            type_guid: None,
            rpc_methods: Vec::new(),
            attributes: Vec::new(),
            enum_values: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn primitive_roundtrip() {
        let entry = primitive_entry("INT", AdsDataTypeId::Int16, 2);
        let encoded = encode_entry(&entry);
        let (parsed, consumed) = DataTypeEntry::parse_entry(&encoded).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(parsed, entry);
    }

    #[test]
    fn struct_with_sub_items() {
        let mut outer = primitive_entry("ST_Point", AdsDataTypeId::BigType, 8);
        let mut x = primitive_entry("x", AdsDataTypeId::Int32, 4);
        x.type_name = "DINT".into();
        x.flags = TYPE_FLAG_DATA_ITEM;
        let mut y = x.clone();
        y.name = "y".into();
        y.offset = 4;
        outer.sub_items = vec![x, y];

        let encoded = encode_entry(&outer);
        let (parsed, _) = DataTypeEntry::parse_entry(&encoded).unwrap();
        assert_eq!(parsed.sub_items.len(), 2);
        assert_eq!(parsed.sub_items[1].name, "y");
        assert_eq!(parsed.sub_items[1].offset, 4);
    }

    #[test]
    fn enum_values_parse() {
        let mut entry = primitive_entry("E_Mode", AdsDataTypeId::Int16, 2);
        entry.type_name = "INT".into();
        entry.flags |= TYPE_FLAG_ENUM_INFOS;
        entry.enum_values = vec![
            EnumValue { name: "IDLE".into(), raw: vec![0, 0] },
            EnumValue { name: "RUNNING".into(), raw: vec![1, 0] },
        ];

        let encoded = encode_entry(&entry);
        let (parsed, _) = DataTypeEntry::parse_entry(&encoded).unwrap();
        assert_eq!(parsed.enum_values.len(), 2);
        assert_eq!(parsed.enum_values[1].name, "RUNNING");
        assert_eq!(parsed.enum_values[1].raw, vec![1, 0]);
    }

    #[test]
    fn upload_with_multiple_entries() {
        let mut data = encode_entry(&primitive_entry("INT", AdsDataTypeId::Int16, 2));
        data.extend_from_slice(&encode_entry(&primitive_entry("DINT", AdsDataTypeId::Int32, 4)));
        let entries = DataTypeEntry::parse_upload(&data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "DINT");
    }
}
