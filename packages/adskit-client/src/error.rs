//! Client error types.
//!
//! Three wire-facing kinds exist: transport problems (synthetic code `-1`),
//! AMS errors (routing level, non-zero code in the ADS header) and ADS errors
//! (operation refused by the target, non-zero code in the payload). The rest
//! are engine-side failures such as marshalling problems.

use adskit_core::ads::{AdsReturnCode, StringError};
use adskit_core::payload::PayloadError;

/// Synthetic error code for transport-level problems (timeout, socket error).
pub const TRANSPORT_ERROR_CODE: i64 = -1;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Socket-level failure. Carries the synthetic code `-1`.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The request deadline fired before a response arrived.
    /// Carries the synthetic code `-1`.
    #[error("timeout")]
    Timeout,

    /// The connection was torn down while the request was pending.
    #[error("connection lost")]
    ConnectionLost,

    /// No active connection.
    #[error("not connected")]
    NotConnected,

    /// `connect` called on an already-connected client.
    #[error("already connected")]
    AlreadyConnected,

    /// Routing-level error: the command never reached its target.
    #[error("AMS error: {0}")]
    Ams(AdsReturnCode),

    /// The target refused the operation.
    #[error("ADS error: {0}")]
    Ads(AdsReturnCode),

    /// A response body did not decode.
    #[error("protocol error: {0}")]
    Protocol(#[from] PayloadError),

    /// Port registration with the router failed.
    #[error("port registration failed: {0}")]
    Registration(String),

    /// The addressed symbol does not exist (engine-side, e.g. empty name).
    #[error("invalid symbol path: {0}")]
    InvalidSymbolPath(String),

    /// A type name could not be resolved to a marshallable view.
    #[error("unknown data type '{0}'")]
    UnknownType(String),

    /// The value does not match the resolved type.
    #[error("value does not match type '{type_name}': {detail}")]
    ValueMismatch { type_name: String, detail: String },

    /// A struct value is missing keys the type requires. Callers may merge
    /// with the current PLC value and retry.
    #[error("incomplete struct value: missing {missing:?}")]
    IncompleteStruct { missing: Vec<String> },

    /// An array value is missing indices (all elements must be present).
    #[error("incomplete array value: expected {expected} elements, got {got}")]
    IncompleteArray { expected: usize, got: usize },

    /// String encode/decode failure.
    #[error("string encoding: {0}")]
    Encoding(#[from] StringError),

    /// Metadata (symbol/type upload) did not parse.
    #[error("metadata parse error: {0}")]
    Metadata(String),
}

impl ClientError {
    /// The numeric code carried by this error: the ADS/AMS return code, or
    /// the synthetic `-1` for transport-level problems.
    pub fn code(&self) -> i64 {
        match self {
            ClientError::Ams(code) | ClientError::Ads(code) => i64::from(code.raw()),
            ClientError::Transport(_) | ClientError::Timeout | ClientError::ConnectionLost => {
                TRANSPORT_ERROR_CODE
            }
            _ => 0,
        }
    }

    /// True for transport-kind errors (synthetic code `-1`).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Timeout | ClientError::ConnectionLost
        )
    }

    /// Maps a non-zero AMS header code to an error.
    pub fn check_ams(code: AdsReturnCode) -> Result<()> {
        code.into_result().map_err(ClientError::Ams)
    }

    /// Maps a non-zero payload result code to an error.
    pub fn check_ads(code: AdsReturnCode) -> Result<()> {
        code.into_result().map_err(ClientError::Ads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_code_is_minus_one() {
        assert_eq!(ClientError::Timeout.code(), -1);
        assert!(ClientError::Timeout.is_transport());
        assert!(ClientError::ConnectionLost.is_transport());
    }

    #[test]
    fn ads_code_passes_through() {
        let err = ClientError::Ads(AdsReturnCode::new(0x710));
        assert_eq!(err.code(), 0x710);
        assert!(!err.is_transport());
        assert!(err.to_string().contains("symbol not found"));
    }

    #[test]
    fn check_helpers() {
        assert!(ClientError::check_ams(AdsReturnCode::OK).is_ok());
        assert!(matches!(
            ClientError::check_ads(AdsReturnCode::new(0x701)),
            Err(ClientError::Ads(_))
        ));
    }
}
