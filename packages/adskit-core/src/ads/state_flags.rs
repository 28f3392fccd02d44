use std::fmt;

/// The 16-bit state-flag field of the [`AdsHeader`](super::AdsHeader).
///
/// Outgoing ADS commands carry [`StateFlags::request`]; the matching answers
/// come back with the [`RESPONSE`](Self::RESPONSE) bit added.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StateFlags(pub u16);

impl StateFlags {
    /// Length of the state flags on the wire.
    pub const LENGTH: usize = 2;

    /// Set on answers to a request.
    pub const RESPONSE: u16 = 0x0001;
    /// The receiver must not answer this command.
    pub const NO_RETURN: u16 = 0x0002;
    /// The frame carries an ADS command (rather than a router command).
    pub const ADS_COMMAND: u16 = 0x0004;
    /// Router/system-level command.
    pub const SYS_COMMAND: u16 = 0x0008;
    /// Priority handling requested.
    pub const HIGH_PRIORITY: u16 = 0x0010;
    /// An 8-byte timestamp is appended to the payload.
    pub const TIMESTAMP_ADDED: u16 = 0x0020;
    /// Transport is UDP instead of TCP.
    pub const UDP: u16 = 0x0040;
    /// Command sent during system initialization.
    pub const INIT_CMD: u16 = 0x0080;
    /// Broadcast to all reachable nodes.
    pub const BROADCAST: u16 = 0x8000;

    /// Creates flags from a raw value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Flags for an outgoing ADS request over TCP.
    pub const fn request() -> Self {
        Self(Self::ADS_COMMAND)
    }

    /// Flags for an ADS response over TCP.
    pub const fn response() -> Self {
        Self(Self::ADS_COMMAND | Self::RESPONSE)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// True if the RESPONSE bit is set.
    pub const fn is_response(self) -> bool {
        self.0 & Self::RESPONSE != 0
    }

    /// True if the RESPONSE bit is clear.
    pub const fn is_request(self) -> bool {
        !self.is_response()
    }

    /// True if the frame carries an ADS command.
    pub const fn is_ads_command(self) -> bool {
        self.0 & Self::ADS_COMMAND != 0
    }

    /// True if the given bits are all set.
    pub const fn contains(self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    /// Serializes into a 2-byte little-endian array.
    pub fn to_bytes(self) -> [u8; Self::LENGTH] {
        self.0.to_le_bytes()
    }

    /// Deserializes from a 2-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl From<u16> for StateFlags {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<StateFlags> for u16 {
    fn from(value: StateFlags) -> Self {
        value.0
    }
}

impl fmt::Debug for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateFlags({:#06x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_response() {
        assert!(StateFlags::request().is_request());
        assert!(StateFlags::request().is_ads_command());
        assert!(StateFlags::response().is_response());
        assert_eq!(StateFlags::response().raw(), 0x0005);
    }

    #[test]
    fn bytes_roundtrip() {
        let flags = StateFlags::new(StateFlags::ADS_COMMAND | StateFlags::BROADCAST);
        assert_eq!(StateFlags::from_bytes(flags.to_bytes()), flags);
    }

    #[test]
    fn contains_bits() {
        let flags = StateFlags::response();
        assert!(flags.contains(StateFlags::RESPONSE));
        assert!(!flags.contains(StateFlags::UDP));
    }
}
