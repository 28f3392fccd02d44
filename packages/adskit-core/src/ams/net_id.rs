use super::error::NetIdError;
use std::fmt;
use std::str::FromStr;

/// A 6-octet AMS routing address, written as dotted decimal (e.g. `192.168.1.120.1.1`).
///
/// The Net ID is purely logical; by convention it is derived from the host's
/// IPv4 address with `.1.1` appended, but the router is free to assign anything.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AmsNetId([u8; 6]);

impl AmsNetId {
    /// Length of an AMS Net ID on the wire.
    pub const LENGTH: usize = 6;

    /// The loopback Net ID, `127.0.0.1.1.1`.
    ///
    /// Targets with this Net ID address the local router. The string literal
    /// `localhost` also parses to this value.
    pub const LOCAL: AmsNetId = AmsNetId([127, 0, 0, 1, 1, 1]);

    /// Creates a Net ID from its six octets.
    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self([a, b, c, d, e, f])
    }

    /// Returns the octets as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the octets as a byte array.
    pub fn to_bytes(self) -> [u8; Self::LENGTH] {
        self.0
    }

    /// Creates a Net ID from a byte array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Tries to parse a Net ID from the first 6 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, NetIdError> {
        Self::try_from(bytes)
    }

    /// True for the loopback Net ID.
    pub fn is_local(&self) -> bool {
        *self == Self::LOCAL
    }
}

impl From<[u8; AmsNetId::LENGTH]> for AmsNetId {
    fn from(value: [u8; AmsNetId::LENGTH]) -> Self {
        Self(value)
    }
}

impl From<AmsNetId> for [u8; AmsNetId::LENGTH] {
    fn from(value: AmsNetId) -> Self {
        value.0
    }
}

impl TryFrom<&[u8]> for AmsNetId {
    type Error = NetIdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < Self::LENGTH {
            return Err(NetIdError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }

        let mut arr = [0u8; Self::LENGTH];
        arr.copy_from_slice(&bytes[..Self::LENGTH]);
        Ok(Self(arr))
    }
}

impl FromStr for AmsNetId {
    type Err = NetIdError;

    /// Parses `"a.b.c.d.e.f"`. The literal `"localhost"` maps to [`AmsNetId::LOCAL`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("localhost") {
            return Ok(Self::LOCAL);
        }

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != Self::LENGTH {
            return Err(NetIdError::WrongOctetCount {
                expected: Self::LENGTH,
                found: parts.len(),
            });
        }

        let mut bytes = [0u8; Self::LENGTH];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = part.parse::<u8>().map_err(|_| NetIdError::InvalidOctet {
                position: i,
                value: part.to_string(),
            })?;
        }

        Ok(Self(bytes))
    }
}

impl fmt::Display for AmsNetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Debug for AmsNetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
