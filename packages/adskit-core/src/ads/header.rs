use super::command::AdsCommandId;
use super::error::AdsHeaderError;
use super::return_code::AdsReturnCode;
use super::state_flags::StateFlags;
use crate::ams::AmsAddr;

/// The 32-byte routing header that follows the AMS/TCP header in every ADS
/// frame: target and source endpoints, command id, flags, payload length,
/// routing-level error code and the invoke id used to correlate replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdsHeader {
    target: AmsAddr,
    source: AmsAddr,
    command_id: AdsCommandId,
    state_flags: StateFlags,
    length: u32,
    error_code: AdsReturnCode,
    invoke_id: u32,
}

impl AdsHeader {
    /// Length of the ADS header on the wire.
    pub const LENGTH: usize = 32;

    /// Creates a new header.
    pub fn new(
        target: AmsAddr,
        source: AmsAddr,
        command_id: AdsCommandId,
        state_flags: StateFlags,
        length: u32,
        error_code: AdsReturnCode,
        invoke_id: u32,
    ) -> Self {
        Self {
            target,
            source,
            command_id,
            state_flags,
            length,
            error_code,
            invoke_id,
        }
    }

    /// Creates a request header for the given command with the payload length.
    pub fn request(
        target: AmsAddr,
        source: AmsAddr,
        command_id: AdsCommandId,
        length: u32,
        invoke_id: u32,
    ) -> Self {
        Self::new(
            target,
            source,
            command_id,
            StateFlags::request(),
            length,
            AdsReturnCode::OK,
            invoke_id,
        )
    }

    /// The endpoint the packet is addressed to.
    pub fn target(&self) -> AmsAddr {
        self.target
    }

    /// The endpoint the packet was sent from.
    pub fn source(&self) -> AmsAddr {
        self.source
    }

    /// The ADS command id.
    pub fn command_id(&self) -> AdsCommandId {
        self.command_id
    }

    /// Request/response and transport flags.
    pub fn state_flags(&self) -> StateFlags {
        self.state_flags
    }

    /// Length of the ADS payload that follows this header.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Routing-level (AMS) error code. Non-zero means the command never
    /// reached its target.
    pub fn error_code(&self) -> AdsReturnCode {
        self.error_code
    }

    /// Correlation id assigned by the sender.
    pub fn invoke_id(&self) -> u32 {
        self.invoke_id
    }

    /// Serializes into a 32-byte array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut buf = [0u8; Self::LENGTH];
        buf[0..8].copy_from_slice(&self.target.to_bytes());
        buf[8..16].copy_from_slice(&self.source.to_bytes());
        buf[16..18].copy_from_slice(&self.command_id.to_bytes());
        buf[18..20].copy_from_slice(&self.state_flags.to_bytes());
        buf[20..24].copy_from_slice(&self.length.to_le_bytes());
        buf[24..28].copy_from_slice(&self.error_code.to_bytes());
        buf[28..32].copy_from_slice(&self.invoke_id.to_le_bytes());
        buf
    }

    /// Deserializes from a 32-byte array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            target: AmsAddr::from_bytes(bytes[0..8].try_into().unwrap()),
            source: AmsAddr::from_bytes(bytes[8..16].try_into().unwrap()),
            command_id: AdsCommandId::from_bytes([bytes[16], bytes[17]]),
            state_flags: StateFlags::from_bytes([bytes[18], bytes[19]]),
            length: u32::from_le_bytes(bytes[20..24].try_into().unwrap()),
            error_code: AdsReturnCode::from_bytes(bytes[24..28].try_into().unwrap()),
            invoke_id: u32::from_le_bytes(bytes[28..32].try_into().unwrap()),
        }
    }

    /// Splits an AMS packet payload into the leading ADS header and the
    /// command body that follows it.
    pub fn split_prefix(payload: &[u8]) -> Result<(Self, &[u8]), AdsHeaderError> {
        if payload.len() < Self::LENGTH {
            return Err(AdsHeaderError::BufferTooSmall {
                expected: Self::LENGTH,
                found: payload.len(),
            });
        }

        let header = Self::from_bytes(payload[..Self::LENGTH].try_into().unwrap());
        Ok((header, &payload[Self::LENGTH..]))
    }
}
