use super::error::NotificationHandleError;
use std::fmt;

/// Server-assigned handle identifying an active device notification.
///
/// Opaque beyond identity; equality and hashing are well-defined so it can
/// key the dispatch map for incoming samples.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationHandle(u32);

impl NotificationHandle {
    /// Length of a handle on the wire.
    pub const LENGTH: usize = 4;

    /// Creates a handle from its raw value.
    pub const fn new(handle: u32) -> Self {
        Self(handle)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Serializes into a 4-byte little-endian array.
    pub fn to_bytes(self) -> [u8; Self::LENGTH] {
        self.0.to_le_bytes()
    }

    /// Deserializes from a 4-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Tries to parse a handle from the first 4 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, NotificationHandleError> {
        if bytes.len() < Self::LENGTH {
            return Err(NotificationHandleError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes(bytes[..Self::LENGTH].try_into().unwrap()))
    }
}

impl From<u32> for NotificationHandle {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<NotificationHandle> for u32 {
    fn from(value: NotificationHandle) -> Self {
        value.0
    }
}

impl fmt::Debug for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationHandle({:#x})", self.0)
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let handle = NotificationHandle::new(0xCAFE_BABE);
        assert_eq!(NotificationHandle::from_bytes(handle.to_bytes()), handle);
    }

    #[test]
    fn slice_too_small() {
        assert!(NotificationHandle::try_from_slice(&[1, 2, 3]).is_err());
    }
}
