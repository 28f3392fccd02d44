use super::{PayloadError, expect_len};
use crate::ads::{AdsReturnCode, NotificationHandle};

/// `DeleteNotification` request (command `0x0007`): cancel a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteNotificationRequest {
    pub handle: NotificationHandle,
}

impl DeleteNotificationRequest {
    /// Body length: handle (4).
    pub const BODY_LEN: usize = 4;

    /// Creates a new delete request.
    pub fn new(handle: NotificationHandle) -> Self {
        Self { handle }
    }

    /// Encodes the command body.
    pub fn encode_body(&self) -> Vec<u8> {
        self.handle.to_bytes().to_vec()
    }

    /// Parses the command body (server side / tests).
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            handle: NotificationHandle::from_bytes(body[0..4].try_into().unwrap()),
        })
    }
}

/// `DeleteNotification` response: just a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteNotificationResponse {
    pub result: AdsReturnCode,
}

impl DeleteNotificationResponse {
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
        let req = DeleteNotificationRequest::new(NotificationHandle::new(7));
        assert_eq!(
            DeleteNotificationRequest::parse_body(&req.encode_body()).unwrap(),
            req
        );
    }

    #[test]
    fn response_surfaces_invalid_handle() {
        let body = 0x714u32.to_le_bytes();
        let resp = DeleteNotificationResponse::parse_body(&body).unwrap();
        assert_eq!(resp.result, AdsReturnCode::NOTIFICATION_HANDLE_INVALID);
    }
}
