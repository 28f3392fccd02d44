use super::error::AdsCommandIdError;

/// ADS command identifiers carried in the [`AdsHeader`](super::AdsHeader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AdsCommandId {
    /// Reserved (0).
    #[default]
    Invalid,
    /// Query name and version of the target device (1).
    ReadDeviceInfo,
    /// Read data addressed by index group/offset (2).
    Read,
    /// Write data addressed by index group/offset (3).
    Write,
    /// Query the ADS and device state (4).
    ReadState,
    /// Change the ADS and device state (5).
    WriteControl,
    /// Register a device notification (6).
    AddNotification,
    /// Cancel a device notification (7).
    DeleteNotification,
    /// A pushed notification packet, target to client only (8).
    Notification,
    /// Write, then read back in a single round trip (9).
    ReadWrite,
    /// A command id this library does not know.
    Unknown(u16),
}

impl AdsCommandId {
    /// Length of a command id on the wire.
    pub const LENGTH: usize = 2;

    /// Serializes into a 2-byte little-endian array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        u16::from(*self).to_le_bytes()
    }

    /// Deserializes from a 2-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        u16::from_le_bytes(bytes).into()
    }

    /// Tries to parse a command id from the first 2 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsCommandIdError> {
        if bytes.len() < Self::LENGTH {
            return Err(AdsCommandIdError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes([bytes[0], bytes[1]]))
    }
}

impl From<u16> for AdsCommandId {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::ReadDeviceInfo,
            2 => Self::Read,
            3 => Self::Write,
            4 => Self::ReadState,
            5 => Self::WriteControl,
            6 => Self::AddNotification,
            7 => Self::DeleteNotification,
            8 => Self::Notification,
            9 => Self::ReadWrite,
            n => Self::Unknown(n),
        }
    }
}

impl From<AdsCommandId> for u16 {
    fn from(value: AdsCommandId) -> Self {
        match value {
            AdsCommandId::Invalid => 0,
            AdsCommandId::ReadDeviceInfo => 1,
            AdsCommandId::Read => 2,
            AdsCommandId::Write => 3,
            AdsCommandId::ReadState => 4,
            AdsCommandId::WriteControl => 5,
            AdsCommandId::AddNotification => 6,
            AdsCommandId::DeleteNotification => 7,
            AdsCommandId::Notification => 8,
            AdsCommandId::ReadWrite => 9,
            AdsCommandId::Unknown(n) => n,
        }
    }
}
