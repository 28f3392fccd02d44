use super::{PayloadError, expect_len, read_u16, read_u32};
use crate::ads::{AdsReturnCode, AdsState, DeviceState};

/// `WriteControl` request (command `0x0005`): change the target's ADS and
/// device state, optionally with extra data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteControlRequest {
    pub ads_state: AdsState,
    pub device_state: DeviceState,
    pub data: Vec<u8>,
}

impl WriteControlRequest {
    /// Fixed prefix: ADS state (2) + device state (2) + data length (4).
    pub const PREFIX_LEN: usize = 8;

    /// Creates a new write-control request.
    pub fn new(ads_state: AdsState, device_state: DeviceState, data: impl Into<Vec<u8>>) -> Self {
        Self {
            ads_state,
            device_state,
            data: data.into(),
        }
    }

    /// Encodes the command body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::PREFIX_LEN + self.data.len());
        body.extend_from_slice(&self.ads_state.to_bytes());
        body.extend_from_slice(&self.device_state.to_le_bytes());
        body.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.data);
        body
    }

    /// Parses the command body (server side / tests).
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        super::expect_at_least(body, Self::PREFIX_LEN)?;
        let length = read_u32(body, 4) as usize;
        super::expect_at_least(body, Self::PREFIX_LEN + length)?;
        Ok(Self {
            ads_state: AdsState::from_bytes([body[0], body[1]]),
            device_state: read_u16(body, 2),
            data: body[Self::PREFIX_LEN..Self::PREFIX_LEN + length].to_vec(),
        })
    }
}

/// `WriteControl` response: just a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteControlResponse {
    pub result: AdsReturnCode,
}

impl WriteControlResponse {
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
        let req = WriteControlRequest::new(AdsState::Reset, 0, Vec::new());
        let body = req.encode_body();
        assert_eq!(body.len(), WriteControlRequest::PREFIX_LEN);
        assert_eq!(WriteControlRequest::parse_body(&body).unwrap(), req);
    }

    #[test]
    fn preserves_device_state() {
        let req = WriteControlRequest::new(AdsState::Run, 0x1234, Vec::new());
        let parsed = WriteControlRequest::parse_body(&req.encode_body()).unwrap();
        assert_eq!(parsed.device_state, 0x1234);
    }
}
