use super::error::FiletimeError;
use chrono::{DateTime, TimeZone, Utc};

/// A Windows FILETIME timestamp: 100-nanosecond ticks since
/// `1601-01-01 00:00:00 UTC`. Used to stamp device notification samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Filetime(u64);

impl Filetime {
    /// Length of a FILETIME on the wire (little-endian u64).
    pub const LENGTH: usize = 8;

    /// Ticks between `1601-01-01` and the Unix epoch.
    pub const EPOCH_DIFF_TICKS: u64 = 116_444_736_000_000_000;

    /// Ticks per millisecond.
    pub const TICKS_PER_MILLI: u64 = 10_000;

    /// Creates a FILETIME from a raw tick count.
    pub const fn from_raw(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Serializes into an 8-byte little-endian array.
    pub fn to_bytes(self) -> [u8; Self::LENGTH] {
        self.0.to_le_bytes()
    }

    /// Deserializes from an 8-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// Tries to parse a FILETIME from the first 8 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, FiletimeError> {
        if bytes.len() < Self::LENGTH {
            return Err(FiletimeError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes(bytes[..Self::LENGTH].try_into().unwrap()))
    }

    /// Milliseconds since the Unix epoch. Saturates to 0 for timestamps
    /// before 1970, which never occur in practice.
    pub fn unix_millis(self) -> i64 {
        let millis = self.0 / Self::TICKS_PER_MILLI;
        millis.saturating_sub(Self::EPOCH_DIFF_TICKS / Self::TICKS_PER_MILLI) as i64
    }

    /// Converts to a wall-clock timestamp.
    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.unix_millis())
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }

    /// Converts from a wall-clock timestamp. Times before 1601 saturate to 0.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let millis = dt.timestamp_millis().max(0) as u64;
        Self(millis * Self::TICKS_PER_MILLI + Self::EPOCH_DIFF_TICKS)
    }
}

impl From<u64> for Filetime {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Filetime> for u64 {
    fn from(value: Filetime) -> Self {
        value.0
    }
}
