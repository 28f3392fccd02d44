//! Sum commands: bundling many reads/writes/handle operations into a single
//! `ReadWrite` round trip against the `0xF08x` services.
//!
//! Response layouts put all per-target error codes first, then the data
//! blocks in request order, so splitting needs the original target list.

use crate::error::{ClientError, Result};
use adskit_core::ads::strings::decode_string;
use adskit_core::ads::{AdsReturnCode, IndexGroup, IndexOffset};
use adskit_core::index_group;
use adskit_core::payload::ReadWriteRequest;

/// One target of a multi-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumReadTarget {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub size: u32,
}

/// One target of a multi-write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumWriteTarget {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub data: Vec<u8>,
}

/// Per-target outcome of a sum command: the data on success, the target's
/// own return code otherwise. One failing target does not fail the batch.
pub type SumResult<T> = std::result::Result<T, AdsReturnCode>;

/// Builds a multi-read: payload is `count` × `{ig, io, size}`, the reply is
/// sized for `count` error codes plus all data.
pub fn build_read(targets: &[SumReadTarget]) -> ReadWriteRequest {
    let count = targets.len() as u32;
    let data_len: u32 = targets.iter().map(|t| t.size).sum();

    let mut payload = Vec::with_capacity(targets.len() * 12);
    for t in targets {
        payload.extend_from_slice(&t.index_group.to_le_bytes());
        payload.extend_from_slice(&t.index_offset.to_le_bytes());
        payload.extend_from_slice(&t.size.to_le_bytes());
    }

    ReadWriteRequest::new(
        index_group::SUM_READ,
        count,
        data_len + 4 * count,
        payload,
    )
}

/// Splits a multi-read response: `count` error codes, then the data blocks
/// in request order.
pub fn split_read(targets: &[SumReadTarget], data: &[u8]) -> Result<Vec<SumResult<Vec<u8>>>> {
    let count = targets.len();
    if data.len() < 4 * count {
        return Err(ClientError::Metadata(format!(
            "sum read response too short: {} bytes for {count} targets",
            data.len()
        )));
    }

    let mut results = Vec::with_capacity(count);
    let mut cursor = 4 * count;
    for (i, target) in targets.iter().enumerate() {
        let code = AdsReturnCode::from_bytes(data[i * 4..i * 4 + 4].try_into().unwrap());
        let size = target.size as usize;
        if data.len() < cursor + size {
            return Err(ClientError::Metadata(format!(
                "sum read response truncated at target {i}"
            )));
        }
        let block = &data[cursor..cursor + size];
        cursor += size;

        results.push(if code.is_ok() {
            Ok(block.to_vec())
        } else {
            Err(code)
        });
    }
    Ok(results)
}

/// Builds a multi-write: `count` × `{ig, io, size}` descriptors, then the
/// concatenated data. The reply carries `count` error codes.
pub fn build_write(targets: &[SumWriteTarget]) -> ReadWriteRequest {
    let count = targets.len() as u32;

    let mut payload = Vec::new();
    for t in targets {
        payload.extend_from_slice(&t.index_group.to_le_bytes());
        payload.extend_from_slice(&t.index_offset.to_le_bytes());
        payload.extend_from_slice(&(t.data.len() as u32).to_le_bytes());
    }
    for t in targets {
        payload.extend_from_slice(&t.data);
    }

    ReadWriteRequest::new(index_group::SUM_WRITE, count, 4 * count, payload)
}

/// Splits a multi-write response: `count` error codes.
pub fn split_write(count: usize, data: &[u8]) -> Result<Vec<SumResult<()>>> {
    if data.len() < 4 * count {
        return Err(ClientError::Metadata(format!(
            "sum write response too short: {} bytes for {count} targets",
            data.len()
        )));
    }

    Ok((0..count)
        .map(|i| {
            let code = AdsReturnCode::from_bytes(data[i * 4..i * 4 + 4].try_into().unwrap());
            if code.is_ok() { Ok(()) } else { Err(code) }
        })
        .collect())
}

/// Builds a multi-handle create on the sum read-write service: per name a
/// `{SYMBOL_HANDLE_BY_NAME, 0, readLen 4, writeLen len+1}` descriptor, then
/// the NUL-terminated names.
pub fn build_create_handles(names: &[&str]) -> ReadWriteRequest {
    let count = names.len() as u32;

    let mut payload = Vec::new();
    for name in names {
        payload.extend_from_slice(&index_group::SYMBOL_HANDLE_BY_NAME.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&4u32.to_le_bytes());
        payload.extend_from_slice(&((name.len() + 1) as u32).to_le_bytes());
    }
    for name in names {
        payload.extend_from_slice(name.as_bytes());
        payload.push(0);
    }

    // Reply: count x {error, size} headers + a 4-byte handle per name.
    ReadWriteRequest::new(index_group::SUM_READ_WRITE, count, 8 * count + 4 * count, payload)
}

/// Splits a multi-handle create response: `count` × `{u32 error, u32 size}`,
/// then the variable-size data blocks; a 4-byte block is the handle.
pub fn split_create_handles(count: usize, data: &[u8]) -> Result<Vec<SumResult<u32>>> {
    if data.len() < 8 * count {
        return Err(ClientError::Metadata(format!(
            "sum create-handles response too short: {} bytes for {count} targets",
            data.len()
        )));
    }

    let mut headers = Vec::with_capacity(count);
    for i in 0..count {
        let code = AdsReturnCode::from_bytes(data[i * 8..i * 8 + 4].try_into().unwrap());
        let size = u32::from_le_bytes(data[i * 8 + 4..i * 8 + 8].try_into().unwrap()) as usize;
        headers.push((code, size));
    }

    let mut results = Vec::with_capacity(count);
    let mut cursor = 8 * count;
    for (i, (code, size)) in headers.into_iter().enumerate() {
        if data.len() < cursor + size {
            return Err(ClientError::Metadata(format!(
                "sum create-handles response truncated at target {i}"
            )));
        }
        let block = &data[cursor..cursor + size];
        cursor += size;

        if code.is_err() {
            results.push(Err(code));
        } else if size >= 4 {
            results.push(Ok(u32::from_le_bytes(block[..4].try_into().unwrap())));
        } else {
            return Err(ClientError::Metadata(format!(
                "handle block for target {i} is {size} bytes"
            )));
        }
    }
    Ok(results)
}

/// Builds a multi-handle delete on the sum write service: per handle a
/// `{SYMBOL_RELEASE_HANDLE, 0, writeLen 4}` descriptor and the handle bytes.
pub fn build_delete_handles(handles: &[u32]) -> ReadWriteRequest {
    let targets: Vec<SumWriteTarget> = handles
        .iter()
        .map(|h| SumWriteTarget {
            index_group: index_group::SYMBOL_RELEASE_HANDLE,
            index_offset: 0,
            data: h.to_le_bytes().to_vec(),
        })
        .collect();
    build_write(&targets)
}

/// A single-handle create response: handle first, then optional extended
/// fields (size, type decoration, type name) newer targets append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedHandle {
    pub handle: u32,
    pub size: Option<u32>,
    pub type_name: Option<String>,
}

impl CreatedHandle {
    /// Parses a create-handle response body.
    pub fn parse_body(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(ClientError::Metadata(format!(
                "create-handle response is {} bytes, need at least 4",
                data.len()
            )));
        }
        let handle = u32::from_le_bytes(data[..4].try_into().unwrap());

        // Extended form: handle, size, type decoration, u16 name length, name.
        if data.len() >= 14 {
            let size = u32::from_le_bytes(data[4..8].try_into().unwrap());
            let name_len = u16::from_le_bytes(data[12..14].try_into().unwrap()) as usize;
            let type_name = data
                .get(14..14 + name_len)
                .map(decode_string)
                .filter(|s| !s.is_empty());
            return Ok(Self {
                handle,
                size: Some(size),
                type_name,
            });
        }

        Ok(Self {
            handle,
            size: None,
            type_name: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_request_layout() {
        let targets = [
            SumReadTarget { index_group: 0xF005, index_offset: 1, size: 4 },
            SumReadTarget { index_group: 0xF005, index_offset: 2, size: 2 },
        ];
        let req = build_read(&targets);
        assert_eq!(req.index_group, index_group::SUM_READ);
        assert_eq!(req.index_offset, 2);
        assert_eq!(req.read_length, 6 + 8);
        assert_eq!(req.write_data.len(), 24);
    }

    #[test]
    fn read_response_split() {
        let targets = [
            SumReadTarget { index_group: 0xF005, index_offset: 1, size: 4 },
            SumReadTarget { index_group: 0xF005, index_offset: 2, size: 2 },
        ];
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x710u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]); // target 0 data
        data.extend_from_slice(&[5, 6]); // target 1 data (present even on error)

        let results = split_read(&targets, &data).unwrap();
        assert_eq!(results[0], Ok(vec![1, 2, 3, 4]));
        assert_eq!(results[1], Err(AdsReturnCode::SYMBOL_NOT_FOUND));
    }

    #[test]
    fn write_request_layout() {
        let targets = [
            SumWriteTarget { index_group: 0xF005, index_offset: 1, data: vec![1, 2] },
            SumWriteTarget { index_group: 0xF005, index_offset: 2, data: vec![3] },
        ];
        let req = build_write(&targets);
        assert_eq!(req.index_group, index_group::SUM_WRITE);
        assert_eq!(req.read_length, 8);
        assert_eq!(req.write_data.len(), 24 + 3);
        // Descriptors first, then concatenated data.
        assert_eq!(&req.write_data[24..], &[1, 2, 3]);
    }

    #[test]
    fn write_response_split() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x701u32.to_le_bytes());
        let results = split_write(2, &data).unwrap();
        assert_eq!(results[0], Ok(()));
        assert_eq!(results[1], Err(AdsReturnCode::new(0x701)));
    }

    #[test]
    fn create_handles_roundtrip() {
        let req = build_create_handles(&["MAIN.a", "MAIN.b"]);
        assert_eq!(req.index_group, index_group::SUM_READ_WRITE);
        assert_eq!(req.index_offset, 2);
        // 2 descriptors of 16 bytes + "MAIN.a\0" + "MAIN.b\0"
        assert_eq!(req.write_data.len(), 32 + 7 + 7);

        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0x710u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0xABCDu32.to_le_bytes()); // handle for target 0

        let results = split_create_handles(2, &data).unwrap();
        assert_eq!(results[0], Ok(0xABCD));
        assert_eq!(results[1], Err(AdsReturnCode::SYMBOL_NOT_FOUND));
    }

    #[test]
    fn delete_handles_uses_release_service() {
        let req = build_delete_handles(&[7, 8]);
        assert_eq!(req.index_group, index_group::SUM_WRITE);
        // Two descriptors targeting the release-handle service.
        assert_eq!(
            u32::from_le_bytes(req.write_data[0..4].try_into().unwrap()),
            index_group::SYMBOL_RELEASE_HANDLE
        );
        // Handle values are the payload.
        assert_eq!(&req.write_data[24..28], &7u32.to_le_bytes());
    }

    #[test]
    fn created_handle_short_and_extended() {
        let short = CreatedHandle::parse_body(&0x55u32.to_le_bytes()).unwrap();
        assert_eq!(short.handle, 0x55);
        assert_eq!(short.size, None);

        let mut data = Vec::new();
        data.extend_from_slice(&0x55u32.to_le_bytes());
        data.extend_from_slice(&4u32.to_le_bytes()); // size
        data.extend_from_slice(&0u32.to_le_bytes()); // type decoration
        data.extend_from_slice(&4u16.to_le_bytes()); // name length
        data.extend_from_slice(b"DINT\0");
        let ext = CreatedHandle::parse_body(&data).unwrap();
        assert_eq!(ext.size, Some(4));
        assert_eq!(ext.type_name.as_deref(), Some("DINT"));
    }
}
