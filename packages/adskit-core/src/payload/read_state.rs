use super::{PayloadError, expect_len, read_u16};
use crate::ads::{AdsReturnCode, AdsState, DeviceState};

/// `ReadState` request (command `0x0004`). The body is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadStateRequest;

impl ReadStateRequest {
    /// Encodes the (empty) command body.
    pub fn encode_body(&self) -> Vec<u8> {
        Vec::new()
    }
}

/// `ReadState` response: result code, ADS state and device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStateResponse {
    pub result: AdsReturnCode,
    pub ads_state: AdsState,
    pub device_state: DeviceState,
}

impl ReadStateResponse {
    /// Body length: result (4) + ADS state (2) + device state (2).
    pub const BODY_LEN: usize = 8;

    /// Parses the command body.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            result: AdsReturnCode::from_bytes(body[0..4].try_into().unwrap()),
            ads_state: AdsState::from_bytes([body[4], body[5]]),
            device_state: read_u16(body, 6),
        })
    }

    /// Encodes the command body (server side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::BODY_LEN);
        body.extend_from_slice(&self.result.to_bytes());
        body.extend_from_slice(&self.ads_state.to_bytes());
        body.extend_from_slice(&self.device_state.to_le_bytes());
        body
    }
}
