use super::{PayloadError, expect_at_least, read_u32};
use crate::ads::{AdsReturnCode, IndexGroup, IndexOffset};

/// `Read` request (command `0x0002`): read `length` bytes at
/// index group/offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub length: u32,
}

impl ReadRequest {
    /// Body length: index group (4) + index offset (4) + length (4).
    pub const BODY_LEN: usize = 12;

    /// Creates a new read request.
    pub fn new(index_group: IndexGroup, index_offset: IndexOffset, length: u32) -> Self {
        Self {
            index_group,
            index_offset,
            length,
        }
    }

    /// Encodes the command body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::BODY_LEN);
        body.extend_from_slice(&self.index_group.to_le_bytes());
        body.extend_from_slice(&self.index_offset.to_le_bytes());
        body.extend_from_slice(&self.length.to_le_bytes());
        body
    }

    /// Parses the command body (server side / tests).
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        super::expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            index_group: read_u32(body, 0),
            index_offset: read_u32(body, 4),
            length: read_u32(body, 8),
        })
    }
}

/// `Read` response: result code, data length and the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    pub result: AdsReturnCode,
    pub data: Vec<u8>,
}

impl ReadResponse {
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
    fn request_layout() {
        let body = ReadRequest::new(0xF005, 0x1234, 4).encode_body();
        assert_eq!(body.len(), ReadRequest::BODY_LEN);
        assert_eq!(&body[0..4], &0xF005u32.to_le_bytes());
        assert_eq!(&body[8..12], &4u32.to_le_bytes());
        assert_eq!(ReadRequest::parse_body(&body).unwrap().index_offset, 0x1234);
    }

    #[test]
    fn response_roundtrip() {
        let resp = ReadResponse {
            result: AdsReturnCode::OK,
            data: vec![0x2A, 0, 0, 0],
        };
        assert_eq!(ReadResponse::parse_body(&resp.encode_body()).unwrap(), resp);
    }

    #[test]
    fn response_truncated_data() {
        let mut body = AdsReturnCode::OK.to_bytes().to_vec();
        body.extend_from_slice(&8u32.to_le_bytes());
        body.extend_from_slice(&[1, 2, 3]); // claims 8, carries 3
        assert!(matches!(
            ReadResponse::parse_body(&body),
            Err(PayloadError::Truncated { .. })
        ));
    }
}
