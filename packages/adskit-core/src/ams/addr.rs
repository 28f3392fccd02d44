//! AMS endpoint addressing: a Net ID plus a 16-bit port number.

use super::error::AddrError;
use super::net_id::AmsNetId;
use std::fmt;
use std::str::FromStr;

/// AMS port number.
pub type AmsPort = u16;

/// A full AMS endpoint address (Net ID + port), e.g. `192.168.1.120.1.1:851`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AmsAddr {
    net_id: AmsNetId,
    port: AmsPort,
}

impl AmsAddr {
    /// Length of an AMS address on the wire (6 bytes Net ID + 2 bytes port).
    pub const LENGTH: usize = 8;

    /// Creates a new AMS address.
    pub const fn new(net_id: AmsNetId, port: AmsPort) -> Self {
        Self { net_id, port }
    }

    /// Returns the Net ID.
    pub fn net_id(&self) -> AmsNetId {
        self.net_id
    }

    /// Returns the port number.
    pub fn port(&self) -> AmsPort {
        self.port
    }

    /// Serializes to 8 bytes (Net ID, then port little-endian).
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut buf = [0u8; Self::LENGTH];
        buf[..AmsNetId::LENGTH].copy_from_slice(self.net_id.as_bytes());
        buf[AmsNetId::LENGTH..].copy_from_slice(&self.port.to_le_bytes());
        buf
    }

    /// Deserializes from an 8-byte array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            net_id: AmsNetId::from_bytes(bytes[..6].try_into().unwrap()),
            port: AmsPort::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    /// Tries to parse an address from the first 8 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddrError> {
        Self::try_from(bytes)
    }
}

impl From<(AmsNetId, AmsPort)> for AmsAddr {
    fn from((net_id, port): (AmsNetId, AmsPort)) -> Self {
        Self::new(net_id, port)
    }
}

impl TryFrom<&[u8]> for AmsAddr {
    type Error = AddrError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < Self::LENGTH {
            return Err(AddrError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }

        let net_id = AmsNetId::try_from(&bytes[..6])?;
        let port = AmsPort::from_le_bytes([bytes[6], bytes[7]]);
        Ok(Self { net_id, port })
    }
}

impl FromStr for AmsAddr {
    type Err = AddrError;

    /// Parses `"a.b.c.d.e.f:port"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (netid_str, port_str) = s.rsplit_once(':').ok_or(AddrError::MissingSeparator)?;

        let net_id = netid_str.parse::<AmsNetId>()?;
        let port = port_str
            .parse::<AmsPort>()
            .map_err(|_| AddrError::InvalidPort(port_str.to_string()))?;

        Ok(Self { net_id, port })
    }
}

impl fmt::Display for AmsAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.net_id, self.port)
    }
}
