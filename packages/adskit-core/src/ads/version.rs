use std::fmt;

/// Version of an ADS device, as reported by `ReadDeviceInfo`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u16,
}

impl DeviceVersion {
    /// Length of a device version on the wire.
    pub const LENGTH: usize = 4;

    /// Creates a new version.
    pub const fn new(major: u8, minor: u8, build: u16) -> Self {
        Self { major, minor, build }
    }

    /// Serializes into a 4-byte array (major, minor, build little-endian).
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let build = self.build.to_le_bytes();
        [self.major, self.minor, build[0], build[1]]
    }

    /// Deserializes from a 4-byte array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            major: bytes[0],
            minor: bytes[1],
            build: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }
}

impl fmt::Display for DeviceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let version = DeviceVersion::new(3, 1, 4024);
        assert_eq!(DeviceVersion::from_bytes(version.to_bytes()), version);
        assert_eq!(version.to_string(), "3.1.4024");
    }
}
