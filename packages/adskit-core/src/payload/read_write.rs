use super::{PayloadError, expect_at_least, read_u32};
use crate::ads::{AdsReturnCode, IndexGroup, IndexOffset};

/// `ReadWrite` request (command `0x0009`): write `write_data`, then read back
/// up to `read_length` bytes, in one round trip. The workhorse behind symbol
/// lookups, handle creation and the sum commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteRequest {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub read_length: u32,
    pub write_data: Vec<u8>,
}

impl ReadWriteRequest {
    /// Fixed prefix: index group (4) + index offset (4) + read length (4)
    /// + write length (4).
    pub const PREFIX_LEN: usize = 16;

    /// Creates a new read-write request.
    pub fn new(
        index_group: IndexGroup,
        index_offset: IndexOffset,
        read_length: u32,
        write_data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            index_group,
            index_offset,
            read_length,
            write_data: write_data.into(),
        }
    }

    /// Encodes the command body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::PREFIX_LEN + self.write_data.len());
        body.extend_from_slice(&self.index_group.to_le_bytes());
        body.extend_from_slice(&self.index_offset.to_le_bytes());
        body.extend_from_slice(&self.read_length.to_le_bytes());
        body.extend_from_slice(&(self.write_data.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.write_data);
        body
    }

    /// Parses the command body (server side / tests).
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_at_least(body, Self::PREFIX_LEN)?;
        let write_length = read_u32(body, 12) as usize;
        expect_at_least(body, Self::PREFIX_LEN + write_length)?;
        Ok(Self {
            index_group: read_u32(body, 0),
            index_offset: read_u32(body, 4),
            read_length: read_u32(body, 8),
            write_data: body[Self::PREFIX_LEN..Self::PREFIX_LEN + write_length].to_vec(),
        })
    }
}

/// `ReadWrite` response: result code, data length and the read-back data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteResponse {
    pub result: AdsReturnCode,
    pub data: Vec<u8>,
}

impl ReadWriteResponse {
    /// Minimum body length: result (4) + length (4).
    pub const MIN_BODY_LEN: usize = 8;

    /// Parses the command body.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_at_least(body, Self::MIN_BODY_LEN)?;

        let result = AdsReturnCode::from_bytes(body[0..4].try_into().unwrap());
        let length = read_u32(body, 4) as usize;
        expect_at_least(body, Self::MIN_BODY_LEN + length)?;

        Ok(Self {
            result,
            data: body[Self::MIN_BODY_LEN..Self::MIN_BODY_LEN + length].to_vec(),
        })
    }

    /// Encodes the command body (server side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::MIN_BODY_LEN + self.data.len());
        body.extend_from_slice(&self.result.to_bytes());
        body.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.data);
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_roundtrip() {
        let req = ReadWriteRequest::new(0xF003, 0, 0xFFFF_FFFF, b"MAIN.counter\0".to_vec());
        assert_eq!(ReadWriteRequest::parse_body(&req.encode_body()).unwrap(), req);
    }

    #[test]
    fn response_roundtrip() {
        let resp = ReadWriteResponse {
            result: AdsReturnCode::OK,
            data: vec![1, 2, 3, 4],
        };
        assert_eq!(ReadWriteResponse::parse_body(&resp.encode_body()).unwrap(), resp);
    }
}
