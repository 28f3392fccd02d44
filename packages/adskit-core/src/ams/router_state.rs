use super::error::RouterStateError;
use std::fmt;

/// Operational state of the local AMS router, delivered in `RouterNote`
/// packets (AMS/TCP command `0x1001`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouterState {
    /// Router is stopped (0).
    Stop,
    /// Router is started (1).
    Start,
    /// Router was removed (2).
    Removed,
    /// A state code this library does not know.
    Unknown(u32),
}

impl RouterState {
    /// Length of a router state on the wire.
    pub const LENGTH: usize = 4;

    /// Serializes into a 4-byte little-endian array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        u32::from(*self).to_le_bytes()
    }

    /// Deserializes from a 4-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        u32::from_le_bytes(bytes).into()
    }

    /// Tries to parse a router state from the first 4 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, RouterStateError> {
        if bytes.len() < Self::LENGTH {
            return Err(RouterStateError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes(bytes[..Self::LENGTH].try_into().unwrap()))
    }
}

impl From<u32> for RouterState {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Stop,
            1 => Self::Start,
            2 => Self::Removed,
            n => Self::Unknown(n),
        }
    }
}

impl From<RouterState> for u32 {
    fn from(value: RouterState) -> Self {
        match value {
            RouterState::Stop => 0,
            RouterState::Start => 1,
            RouterState::Removed => 2,
            RouterState::Unknown(n) => n,
        }
    }
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "Stop"),
            Self::Start => write!(f, "Start"),
            Self::Removed => write!(f, "Removed"),
            Self::Unknown(n) => write!(f, "Unknown({n})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_roundtrip() {
        for code in [0u32, 1, 2, 77] {
            assert_eq!(u32::from(RouterState::from(code)), code);
        }
    }

    #[test]
    fn bytes_roundtrip() {
        assert_eq!(RouterState::from_bytes([1, 0, 0, 0]), RouterState::Start);
        assert_eq!(RouterState::Removed.to_bytes(), [2, 0, 0, 0]);
    }
}
