use super::error::TransModeError;

/// Transmission mode of a device notification: when the server pushes samples.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransMode {
    /// No transmission (0).
    None,
    /// Client-driven cyclic polling (1).
    ClientCycle,
    /// Client-driven on-change polling (2).
    ClientOnChange,
    /// Server sends a sample every cycle (3).
    Cyclic,
    /// Server sends a sample only when the value changed (4).
    OnChange,
    /// A mode this library does not know.
    Unknown(u32),
}

impl TransMode {
    /// Length of a transmission mode on the wire.
    pub const LENGTH: usize = 4;

    /// Serializes into a 4-byte little-endian array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        u32::from(*self).to_le_bytes()
    }

    /// Deserializes from a 4-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        u32::from_le_bytes(bytes).into()
    }

    /// Tries to parse a transmission mode from the first 4 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, TransModeError> {
        if bytes.len() < Self::LENGTH {
            return Err(TransModeError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes(bytes[..Self::LENGTH].try_into().unwrap()))
    }
}

impl From<u32> for TransMode {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::None,
            1 => Self::ClientCycle,
            2 => Self::ClientOnChange,
            3 => Self::Cyclic,
            4 => Self::OnChange,
            n => Self::Unknown(n),
        }
    }
}

impl From<TransMode> for u32 {
    fn from(value: TransMode) -> Self {
        match value {
            TransMode::None => 0,
            TransMode::ClientCycle => 1,
            TransMode::ClientOnChange => 2,
            TransMode::Cyclic => 3,
            TransMode::OnChange => 4,
            TransMode::Unknown(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_roundtrip() {
        for code in [0u32, 1, 2, 3, 4, 99] {
            assert_eq!(u32::from(TransMode::from(code)), code);
        }
    }

    #[test]
    fn on_change_is_four() {
        assert_eq!(TransMode::OnChange.to_bytes(), [4, 0, 0, 0]);
    }
}
