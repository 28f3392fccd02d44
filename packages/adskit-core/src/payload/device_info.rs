use super::{PayloadError, expect_len};
use crate::ads::strings::decode_string;
use crate::ads::{AdsReturnCode, DeviceVersion};

/// `ReadDeviceInfo` request (command `0x0001`). The body is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceInfoRequest;

impl DeviceInfoRequest {
    /// Encodes the (empty) command body.
    pub fn encode_body(&self) -> Vec<u8> {
        Vec::new()
    }
}

/// `ReadDeviceInfo` response: result code, version triple and a 16-byte
/// NUL-padded device name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfoResponse {
    pub result: AdsReturnCode,
    pub version: DeviceVersion,
    pub name: String,
}

impl DeviceInfoResponse {
    /// Body length: result (4) + version (4) + name (16).
    pub const BODY_LEN: usize = 24;

    /// Length of the device name field.
    pub const NAME_LEN: usize = 16;

    /// Parses the command body.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;

        Ok(Self {
            result: AdsReturnCode::from_bytes(body[0..4].try_into().unwrap()),
            version: DeviceVersion::from_bytes(body[4..8].try_into().unwrap()),
            name: decode_string(&body[8..24]),
        })
    }

    /// Encodes the command body (server side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::BODY_LEN);
        body.extend_from_slice(&self.result.to_bytes());
        body.extend_from_slice(&self.version.to_bytes());

        let mut name = [0u8; Self::NAME_LEN];
        let bytes = self.name.as_bytes();
        let n = bytes.len().min(Self::NAME_LEN - 1);
        name[..n].copy_from_slice(&bytes[..n]);
        body.extend_from_slice(&name);
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_twincat_plc() {
        let mut body = vec![0, 0, 0, 0, 3, 1];
        body.extend_from_slice(&4024u16.to_le_bytes());
        body.extend_from_slice(b"TCatPlcCtrl\0\0\0\0\0");

        let info = DeviceInfoResponse::parse_body(&body).unwrap();
        assert!(info.result.is_ok());
        assert_eq!(info.version, DeviceVersion::new(3, 1, 4024));
        assert_eq!(info.name, "TCatPlcCtrl");
    }

    #[test]
    fn roundtrip() {
        let info = DeviceInfoResponse {
            result: AdsReturnCode::OK,
            version: DeviceVersion::new(3, 1, 4026),
            name: "Plc30 App".into(),
        };
        assert_eq!(DeviceInfoResponse::parse_body(&info.encode_body()).unwrap(), info);
    }

    #[test]
    fn wrong_length() {
        assert!(DeviceInfoResponse::parse_body(&[0u8; 23]).is_err());
    }
}
