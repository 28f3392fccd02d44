use super::command::AmsCommand;
use super::error::AmsTcpHeaderError;

/// The 6-byte prefix of every AMS/TCP packet: a command word and the number
/// of payload bytes that follow the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmsTcpHeader {
    command: AmsCommand,
    length: u32,
}

impl AmsTcpHeader {
    /// Length of the AMS/TCP header in bytes.
    pub const LENGTH: usize = 6;

    /// Creates a new header.
    pub fn new(command: AmsCommand, length: u32) -> Self {
        Self { command, length }
    }

    /// Returns the router-level command.
    pub fn command(&self) -> AmsCommand {
        self.command
    }

    /// Returns the payload length in bytes (excluding this header).
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Serializes into a 6-byte array, little-endian.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut buf = [0u8; Self::LENGTH];
        buf[..2].copy_from_slice(&u16::from(self.command).to_le_bytes());
        buf[2..].copy_from_slice(&self.length.to_le_bytes());
        buf
    }

    /// Deserializes from a 6-byte array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            command: AmsCommand::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            length: u32::from_le_bytes(bytes[2..6].try_into().unwrap()),
        }
    }

    /// Tries to parse a header from the first 6 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AmsTcpHeaderError> {
        if bytes.len() < Self::LENGTH {
            return Err(AmsTcpHeaderError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes(bytes[..Self::LENGTH].try_into().unwrap()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let header = AmsTcpHeader::new(AmsCommand::PortConnect, 0xA1B2_C3D4);
        let bytes = header.to_bytes();
        assert_eq!(bytes, [0x00, 0x10, 0xD4, 0xC3, 0xB2, 0xA1]);
        assert_eq!(AmsTcpHeader::from_bytes(bytes), header);
    }

    #[test]
    fn slice_too_small() {
        let err = AmsTcpHeader::try_from_slice(&[0u8; 5]).unwrap_err();
        assert!(matches!(err, AmsTcpHeaderError::BufferTooSmall { .. }));
    }
}
