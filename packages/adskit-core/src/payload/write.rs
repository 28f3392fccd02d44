use super::{PayloadError, expect_len, read_u32};
use crate::ads::{AdsReturnCode, IndexGroup, IndexOffset};

/// `Write` request (command `0x0003`): write `data` at index group/offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub data: Vec<u8>,
}

impl WriteRequest {
    /// Fixed prefix: index group (4) + index offset (4) + length (4).
    pub const PREFIX_LEN: usize = 12;

    /// Creates a new write request.
    pub fn new(index_group: IndexGroup, index_offset: IndexOffset, data: impl Into<Vec<u8>>) -> Self {
        Self {
            index_group,
            index_offset,
            data: data.into(),
        }
    }

    /// Encodes the command body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::PREFIX_LEN + self.data.len());
        body.extend_from_slice(&self.index_group.to_le_bytes());
        body.extend_from_slice(&self.index_offset.to_le_bytes());
        body.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.data);
        body
    }

    /// Parses the command body (server side / tests).
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        super::expect_at_least(body, Self::PREFIX_LEN)?;
        let length = read_u32(body, 8) as usize;
        super::expect_at_least(body, Self::PREFIX_LEN + length)?;
        Ok(Self {
            index_group: read_u32(body, 0),
            index_offset: read_u32(body, 4),
            data: body[Self::PREFIX_LEN..Self::PREFIX_LEN + length].to_vec(),
        })
    }
}

/// `Write` response: just a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResponse {
    pub result: AdsReturnCode,
}

impl WriteResponse {
    /// Body length: result (4).
    pub const BODY_LEN: usize = 4;

    /// Parses the command body.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            result: AdsReturnCode::from_bytes(body[0..4].try_into().unwrap()),
        })
    }

    /// Encodes the command body (server side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        self.result.to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_roundtrip() {
        let req = WriteRequest::new(0x4020, 16, vec![9, 8, 7]);
        assert_eq!(WriteRequest::parse_body(&req.encode_body()).unwrap(), req);
    }

    #[test]
    fn response_error_code() {
        let body = 0x710u32.to_le_bytes();
        let resp = WriteResponse::parse_body(&body).unwrap();
        assert_eq!(resp.result, AdsReturnCode::SYMBOL_NOT_FOUND);
    }
}
