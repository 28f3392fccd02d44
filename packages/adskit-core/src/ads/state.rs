use super::error::AdsStateError;
use std::fmt;

/// Device-specific status word. Almost always `0` for a TwinCAT PLC; custom
/// ADS servers are free to put their own flags in it.
pub type DeviceState = u16;

/// The ADS operating state of a device (`Run`, `Stop`, `Config`, ...).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdsState {
    Invalid,
    Idle,
    Reset,
    Init,
    Start,
    Run,
    Stop,
    SaveCfg,
    LoadCfg,
    PowerFailure,
    PowerGood,
    Error,
    Shutdown,
    Suspend,
    Resume,
    Config,
    Reconfig,
    Stopping,
    Incompatible,
    Exception,
    /// A state code this library does not know.
    Unknown(u16),
}

impl AdsState {
    /// Length of an ADS state on the wire.
    pub const LENGTH: usize = 2;

    /// Serializes into a 2-byte little-endian array.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        u16::from(*self).to_le_bytes()
    }

    /// Deserializes from a 2-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        u16::from_le_bytes(bytes).into()
    }

    /// Tries to parse an ADS state from the first 2 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsStateError> {
        if bytes.len() < Self::LENGTH {
            return Err(AdsStateError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes([bytes[0], bytes[1]]))
    }
}

impl From<u16> for AdsState {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::Idle,
            2 => Self::Reset,
            3 => Self::Init,
            4 => Self::Start,
            5 => Self::Run,
            6 => Self::Stop,
            7 => Self::SaveCfg,
            8 => Self::LoadCfg,
            9 => Self::PowerFailure,
            10 => Self::PowerGood,
            11 => Self::Error,
            12 => Self::Shutdown,
            13 => Self::Suspend,
            14 => Self::Resume,
            15 => Self::Config,
            16 => Self::Reconfig,
            17 => Self::Stopping,
            18 => Self::Incompatible,
            19 => Self::Exception,
            n => Self::Unknown(n),
        }
    }
}

impl From<AdsState> for u16 {
    fn from(value: AdsState) -> Self {
        match value {
            AdsState::Invalid => 0,
            AdsState::Idle => 1,
            AdsState::Reset => 2,
            AdsState::Init => 3,
            AdsState::Start => 4,
            AdsState::Run => 5,
            AdsState::Stop => 6,
            AdsState::SaveCfg => 7,
            AdsState::LoadCfg => 8,
            AdsState::PowerFailure => 9,
            AdsState::PowerGood => 10,
            AdsState::Error => 11,
            AdsState::Shutdown => 12,
            AdsState::Suspend => 13,
            AdsState::Resume => 14,
            AdsState::Config => 15,
            AdsState::Reconfig => 16,
            AdsState::Stopping => 17,
            AdsState::Incompatible => 18,
            AdsState::Exception => 19,
            AdsState::Unknown(n) => n,
        }
    }
}

impl fmt::Display for AdsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_roundtrip() {
        for code in 0u16..=25 {
            assert_eq!(u16::from(AdsState::from(code)), code);
        }
    }

    #[test]
    fn run_is_five() {
        assert_eq!(u16::from(AdsState::Run), 5);
        assert_eq!(AdsState::from_bytes([5, 0]), AdsState::Run);
    }

    #[test]
    fn slice_too_small() {
        assert!(AdsState::try_from_slice(&[5]).is_err());
    }
}
