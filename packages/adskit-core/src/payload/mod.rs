//! Body codecs for every ADS command and the router-level packets.
//!
//! Requests encode only the command body; the engine owns header assembly
//! (invoke ids, source/target, state flags) and prepends the
//! [`AdsHeader`](crate::ads::AdsHeader) itself. Responses parse the body that
//! follows the header.

pub mod add_notification;
pub mod delete_notification;
pub mod device_info;
pub mod notification;
pub mod read;
pub mod read_state;
pub mod read_write;
pub mod router;
pub mod write;
pub mod write_control;

pub use add_notification::{AddNotificationRequest, AddNotificationResponse};
pub use delete_notification::{DeleteNotificationRequest, DeleteNotificationResponse};
pub use device_info::{DeviceInfoRequest, DeviceInfoResponse};
pub use notification::{Notification, NotificationSample, NotificationStamp};
pub use read::{ReadRequest, ReadResponse};
pub use read_state::{ReadStateRequest, ReadStateResponse};
pub use read_write::{ReadWriteRequest, ReadWriteResponse};
pub use router::{
    GetLocalNetIdRequest, PortCloseRequest, PortConnectRequest, PortConnectResponse, RouterNote,
};
pub use write::{WriteRequest, WriteResponse};
pub use write_control::{WriteControlRequest, WriteControlResponse};

/// Errors when decoding a command body.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("unexpected body length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },

    #[error("truncated body: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("inconsistent body: {0}")]
    Inconsistent(&'static str),
}

/// Requires an exact body length.
pub(crate) fn expect_len(body: &[u8], expected: usize) -> Result<(), PayloadError> {
    if body.len() != expected {
        return Err(PayloadError::UnexpectedLength {
            expected,
            got: body.len(),
        });
    }
    Ok(())
}

/// Requires a minimum body length.
pub(crate) fn expect_at_least(body: &[u8], needed: usize) -> Result<(), PayloadError> {
    if body.len() < needed {
        return Err(PayloadError::Truncated {
            needed,
            got: body.len(),
        });
    }
    Ok(())
}

/// Reads a little-endian u32 at `offset`. Caller has checked the length.
pub(crate) fn read_u32(body: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(body[offset..offset + 4].try_into().unwrap())
}

/// Reads a little-endian u16 at `offset`. Caller has checked the length.
pub(crate) fn read_u16(body: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(body[offset..offset + 2].try_into().unwrap())
}
