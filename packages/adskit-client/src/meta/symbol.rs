//! Symbol entries and the upload-info summary.

use super::{ArrayInfo, Attribute, Scanner};
use crate::error::ClientError;
use adskit_core::ads::{AdsDataTypeId, IndexGroup, IndexOffset};

/// Symbol flag: entry carries a 16-byte type GUID.
pub const SYMBOL_FLAG_TYPE_GUID: u16 = 0x0008;
/// Symbol flag: entry carries an attribute block.
pub const SYMBOL_FLAG_ATTRIBUTES: u16 = 0x1000;
/// Symbol flag: entry carries a u32 of extended flags.
pub const SYMBOL_FLAG_EXTENDED_FLAGS: u16 = 0x8000;

/// One entry of the target's symbol table: a named variable with a fixed
/// address, size and type.
#[derive(Debug, Clone, PartialEq)]
pub struct AdsSymbol {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub size: u32,
    pub data_type_id: AdsDataTypeId,
    pub flags: u16,
    pub array_dimension: u16,
    pub name: String,
    pub type_name: String,
    pub comment: String,
    pub array_info: Vec<ArrayInfo>,
    pub type_guid: Option<[u8; 16]>,
    pub attributes: Vec<Attribute>,
    pub extended_flags: u32,
}

impl AdsSymbol {
    /// Parses one length-prefixed symbol entry, returning it and the number
    /// of bytes consumed (the entry length from the wire).
    pub fn parse_entry(data: &[u8]) -> Result<(Self, usize), ClientError> {
        let mut s = Scanner::new(data);

        let entry_length = s.u32()? as usize;
        if entry_length < 30 || entry_length > data.len() {
            return Err(ClientError::Metadata(format!(
                "symbol entry length {entry_length} out of range (buffer {})",
                data.len()
            )));
        }

        let index_group = s.u32()?;
        let index_offset = s.u32()?;
        let size = s.u32()?;
        let data_type_id = AdsDataTypeId::from(s.u32()?);
        let flags = s.u16()?;
        let array_dimension = s.u16()?;
        let name_len = s.u16()? as usize;
        let type_len = s.u16()? as usize;
        let comment_len = s.u16()? as usize;

        let name = s.cstring(name_len)?;
        let type_name = s.cstring(type_len)?;
        let comment = s.cstring(comment_len)?;

        let array_info = s.array_info(array_dimension as usize)?;

        let type_guid = if flags & SYMBOL_FLAG_TYPE_GUID != 0 {
            Some(s.take(16)?.try_into().unwrap())
        } else {
            None
        };

        let attributes = if flags & SYMBOL_FLAG_ATTRIBUTES != 0 {
            s.attributes()?
        } else {
            Vec::new()
        };

        let extended_flags = if flags & SYMBOL_FLAG_EXTENDED_FLAGS != 0 {
            s.u32()?
        } else {
            0
        };

        Ok((
            Self {
                index_group,
                index_offset,
                size,
                data_type_id,
                flags,
                array_dimension,
                name,
                type_name,
                comment,
                array_info,
                type_guid,
                attributes,
                extended_flags,
            },
            entry_length,
        ))
    }

    /// Parses a bulk symbol upload: consecutive length-prefixed entries.
    pub fn parse_upload(data: &[u8]) -> Result<Vec<Self>, ClientError> {
        let mut symbols = Vec::new();
        let mut cursor = 0;
        while data.len() - cursor >= 4 {
            let (symbol, consumed) = Self::parse_entry(&data[cursor..])?;
            symbols.push(symbol);
            cursor += consumed;
        }
        Ok(symbols)
    }
}

/// Target-reported sizes of the symbol and data-type tables, used to size
/// the bulk downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadInfo {
    pub symbol_count: u32,
    pub symbol_length: u32,
    pub data_type_count: u32,
    pub data_type_length: u32,
    pub extra_count: u32,
    pub extra_length: u32,
}

impl UploadInfo {
    /// Length of the upload-info block on the wire.
    pub const BODY_LEN: usize = 24;

    /// Parses the 24-byte summary.
    pub fn parse_body(body: &[u8]) -> Result<Self, ClientError> {
        let mut s = Scanner::new(body);
        Ok(Self {
            symbol_count: s.u32()?,
            symbol_length: s.u32()?,
            data_type_count: s.u32()?,
            data_type_length: s.u32()?,
            extra_count: s.u32()?,
            extra_length: s.u32()?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn entry_roundtrip() {
        let mut sym = dint_symbol("MAIN.counter");
        sym.comment = "cycle counter".into();
        sym.flags = SYMBOL_FLAG_ATTRIBUTES;
        sym.attributes = vec![Attribute {
            name: "monitoring".into(),
            value: "call".into(),
        }];

        let encoded = encode_symbol(&sym);
        let (parsed, consumed) = AdsSymbol::parse_entry(&encoded).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(parsed, sym);
    }

    #[test]
    fn upload_with_multiple_entries() {
        let mut data = encode_symbol(&dint_symbol("MAIN.a"));
        data.extend_from_slice(&encode_symbol(&dint_symbol("MAIN.b")));

        let symbols = AdsSymbol::parse_upload(&data).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[1].name, "MAIN.b");
    }

    #[test]
    fn truncated_entry_rejected() {
        let encoded = encode_symbol(&dint_symbol("MAIN.a"));
        assert!(AdsSymbol::parse_entry(&encoded[..20]).is_err());
    }

    #[test]
    fn upload_info_parse() {
        let mut body = Vec::new();
        for v in [10u32, 800, 5, 600, 0, 0] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        let info = UploadInfo::parse_body(&body).unwrap();
        assert_eq!(info.symbol_count, 10);
        assert_eq!(info.data_type_length, 600);
    }
}
