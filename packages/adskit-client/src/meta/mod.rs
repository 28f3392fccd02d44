//! Target metadata: symbol entries, raw data-type entries and the recursive
//! resolver that turns them into marshallable type views.

pub mod base_types;
pub mod datatype;
pub mod resolver;
pub mod symbol;

pub use base_types::BaseType;
pub use datatype::{DataTypeEntry, EnumValue, RpcMethod};
pub use resolver::{DataType, ResolvedEnumValue};
pub use symbol::{AdsSymbol, UploadInfo};

use crate::error::ClientError;

/// One array dimension: PLC lower bound and element count.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayInfo {
    pub start_index: i32,
    pub length: u32,
}

impl ArrayInfo {
    /// Length of an array-info block on the wire.
    pub const LENGTH: usize = 8;
}

/// A name/value attribute attached to a symbol or type (pragmas like
/// `{attribute 'monitoring' := 'call'}`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Cursor over a metadata buffer with bounds-checked little-endian reads.
/// Entry layouts interleave fixed fields, length-prefixed strings and
/// flag-gated blocks, so all parsers share this.
pub(crate) struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn need(&self, n: usize) -> Result<(), ClientError> {
        if self.remaining() < n {
            return Err(ClientError::Metadata(format!(
                "truncated entry: needed {n} more bytes at offset {}, have {}",
                self.pos,
                self.remaining()
            )));
        }
        Ok(())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ClientError> {
        self.need(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ClientError> {
        self.need(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8, ClientError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, ClientError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, ClientError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn i32(&mut self) -> Result<i32, ClientError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes(b.try_into().unwrap()))
    }

    /// Reads `len` string bytes plus the NUL terminator that follows them.
    pub fn cstring(&mut self, len: usize) -> Result<String, ClientError> {
        let bytes = self.take(len + 1)?;
        Ok(adskit_core::ads::strings::decode_string(&bytes[..len]))
    }

    /// Reads `count` array-info blocks.
    pub fn array_info(&mut self, count: usize) -> Result<Vec<ArrayInfo>, ClientError> {
        let mut infos = Vec::with_capacity(count);
        for _ in 0..count {
            let start_index = self.i32()?;
            let length = self.u32()?;
            infos.push(ArrayInfo { start_index, length });
        }
        Ok(infos)
    }

    /// Reads a `u16 count` attribute block: per attribute a u8 name length,
    /// u8 value length, then both strings NUL-terminated.
    pub fn attributes(&mut self) -> Result<Vec<Attribute>, ClientError> {
        let count = self.u16()? as usize;
        let mut attrs = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let name_len = self.u8()? as usize;
            let value_len = self.u8()? as usize;
            let name = self.cstring(name_len)?;
            let value = self.cstring(value_len)?;
            attrs.push(Attribute { name, value });
        }
        Ok(attrs)
    }
}
