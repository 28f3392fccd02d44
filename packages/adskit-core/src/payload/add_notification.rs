use super::{PayloadError, expect_len, read_u32};
use crate::ads::{AdsReturnCode, IndexGroup, IndexOffset, NotificationHandle, TransMode};

/// `AddNotification` request (command `0x0006`): register a device
/// notification on the watched region.
///
/// `max_delay` and `cycle_time` are submitted in 100-nanosecond units; the
/// engine converts from milliseconds before building this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddNotificationRequest {
    pub index_group: IndexGroup,
    pub index_offset: IndexOffset,
    pub length: u32,
    pub trans_mode: TransMode,
    /// Maximum buffering delay, 100-ns units.
    pub max_delay: u32,
    /// Change-check interval, 100-ns units.
    pub cycle_time: u32,
}

impl AddNotificationRequest {
    /// Body length: 6 u32 fields + 16 reserved bytes.
    pub const BODY_LEN: usize = 40;

    /// Encodes the command body, reserved block zeroed.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::BODY_LEN);
        body.extend_from_slice(&self.index_group.to_le_bytes());
        body.extend_from_slice(&self.index_offset.to_le_bytes());
        body.extend_from_slice(&self.length.to_le_bytes());
        body.extend_from_slice(&self.trans_mode.to_bytes());
        body.extend_from_slice(&self.max_delay.to_le_bytes());
        body.extend_from_slice(&self.cycle_time.to_le_bytes());
        body.extend_from_slice(&[0u8; 16]);
        body
    }

    /// Parses the command body (server side / tests).
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            index_group: read_u32(body, 0),
            index_offset: read_u32(body, 4),
            length: read_u32(body, 8),
            trans_mode: TransMode::from(read_u32(body, 12)),
            max_delay: read_u32(body, 16),
            cycle_time: read_u32(body, 20),
        })
    }
}

/// `AddNotification` response: result code and the server-assigned handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddNotificationResponse {
    pub result: AdsReturnCode,
    pub handle: NotificationHandle,
}

impl AddNotificationResponse {
    /// Body length: result (4) + handle (4).
    pub const BODY_LEN: usize = 8;

    /// Parses the command body.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            result: AdsReturnCode::from_bytes(body[0..4].try_into().unwrap()),
            handle: NotificationHandle::from_bytes(body[4..8].try_into().unwrap()),
        })
    }

    /// Encodes the command body (server side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::BODY_LEN);
        body.extend_from_slice(&self.result.to_bytes());
        body.extend_from_slice(&self.handle.to_bytes());
        body
    }
}
