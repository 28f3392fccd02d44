use super::error::AdsReturnCodeError;
use std::fmt;

/// An ADS return code, passed through from the target verbatim.
///
/// `0` means success. Every other value maps to the vendor error table via
/// [`description`](Self::description); codes outside the table are kept as-is
/// and render as `unknown ADS error`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AdsReturnCode(pub u32);

impl AdsReturnCode {
    /// Length of a return code on the wire.
    pub const LENGTH: usize = 4;

    /// Success.
    pub const OK: AdsReturnCode = AdsReturnCode(0);

    /// Target port not found (0x6): the ADS server is not started or not reachable.
    pub const TARGET_PORT_NOT_FOUND: AdsReturnCode = AdsReturnCode(0x6);
    /// Target machine not found (0x7): no AMS route to the target.
    pub const TARGET_MACHINE_NOT_FOUND: AdsReturnCode = AdsReturnCode(0x7);
    /// Symbol not found (0x710).
    pub const SYMBOL_NOT_FOUND: AdsReturnCode = AdsReturnCode(0x710);
    /// Symbol version invalid (0x711): handles must be recreated.
    pub const SYMBOL_VERSION_INVALID: AdsReturnCode = AdsReturnCode(0x711);
    /// Notification handle invalid (0x714).
    pub const NOTIFICATION_HANDLE_INVALID: AdsReturnCode = AdsReturnCode(0x714);
    /// Device timeout (0x719).
    pub const DEVICE_TIMEOUT: AdsReturnCode = AdsReturnCode(0x719);

    /// Creates a return code from a raw value.
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Returns the raw code.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for code `0`.
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// True for any non-zero code.
    pub const fn is_err(self) -> bool {
        self.0 != 0
    }

    /// Turns a non-zero code into `Err(self)`.
    pub fn into_result(self) -> Result<(), AdsReturnCode> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }

    /// Serializes into a 4-byte little-endian array.
    pub fn to_bytes(self) -> [u8; Self::LENGTH] {
        self.0.to_le_bytes()
    }

    /// Deserializes from a 4-byte little-endian array.
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Tries to parse a return code from the first 4 bytes of a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsReturnCodeError> {
        if bytes.len() < Self::LENGTH {
            return Err(AdsReturnCodeError::BufferTooSmall {
                expected: Self::LENGTH,
                found: bytes.len(),
            });
        }
        Ok(Self::from_bytes(bytes[..Self::LENGTH].try_into().unwrap()))
    }

    /// Human-readable description from the vendor error table.
    pub fn description(self) -> &'static str {
        match self.0 {
            0x0 => "no error",
            0x1 => "internal error",
            0x2 => "no real time",
            0x3 => "allocation locked, memory error",
            0x4 => "mailbox full, the ADS message could not be sent",
            0x5 => "wrong receive HMSG",
            0x6 => "target port not found, ADS server is not started or not reachable",
            0x7 => "target computer not found, AMS route was not found",
            0x8 => "unknown command id",
            0x9 => "invalid task id",
            0xA => "no IO",
            0xB => "unknown AMS command",
            0xC => "Win32 error",
            0xD => "port not connected",
            0xE => "invalid AMS length",
            0xF => "invalid AMS Net ID",
            0x10 => "installation level is too low, TwinCAT 2 license error",
            0x11 => "no debugging available",
            0x12 => "port disabled, TwinCAT system service not started",
            0x13 => "port already connected",
            0x14 => "AMS Sync Win32 error",
            0x15 => "AMS Sync timeout",
            0x16 => "AMS Sync error",
            0x17 => "no index map for AMS Sync available",
            0x18 => "invalid AMS port",
            0x19 => "no memory",
            0x1A => "TCP send error",
            0x1B => "host unreachable",
            0x1C => "invalid AMS fragment",
            0x1D => "TLS send error, secure ADS connection failed",
            0x1E => "access denied, secure ADS access denied",

            0x500 => "router: locked memory cannot be allocated",
            0x501 => "router: the router memory size could not be changed",
            0x502 => "router: the mailbox has reached the maximum number of possible messages",
            0x503 => "router: the debug mailbox has reached the maximum number of possible messages",
            0x504 => "router: the port type is unknown",
            0x505 => "router: the router is not initialized",
            0x506 => "router: the port number is already assigned",
            0x507 => "router: the port is not registered",
            0x508 => "router: the maximum number of ports has been reached",
            0x509 => "router: the port is invalid",
            0x50A => "router: the router is not active",
            0x50B => "router: the mailbox has reached the maximum number of fragmented messages",
            0x50C => "router: a fragment timeout has occurred",
            0x50D => "router: the port is removed",

            0x700 => "general device error",
            0x701 => "service is not supported by the server",
            0x702 => "invalid index group",
            0x703 => "invalid index offset",
            0x704 => "reading or writing not permitted",
            0x705 => "parameter size not correct",
            0x706 => "invalid data values",
            0x707 => "device is not in a ready state",
            0x708 => "device is busy",
            0x709 => "invalid operating system context",
            0x70A => "out of memory",
            0x70B => "invalid parameter values",
            0x70C => "not found (files, ...)",
            0x70D => "syntax error in command or file",
            0x70E => "objects do not match",
            0x70F => "object already exists",
            0x710 => "symbol not found",
            0x711 => "invalid symbol version, handles must be recreated",
            0x712 => "server is in an invalid state",
            0x713 => "ADS transmission mode not supported",
            0x714 => "notification handle is invalid",
            0x715 => "notification client not registered",
            0x716 => "no further notification handle available",
            0x717 => "notification size too large",
            0x718 => "device not initialized",
            0x719 => "device has a timeout",
            0x71A => "interface query failed",
            0x71B => "wrong interface requested",
            0x71C => "class id is invalid",
            0x71D => "object id is invalid",
            0x71E => "request is pending",
            0x71F => "request is aborted",
            0x720 => "signal warning",
            0x721 => "invalid array index",
            0x722 => "symbol not active, release handle and try again",
            0x723 => "access denied",
            0x724 => "no license found, activate license",
            0x725 => "license expired",
            0x726 => "license exceeded",
            0x727 => "license invalid",
            0x728 => "invalid system id in license",
            0x729 => "license not time limited",
            0x72A => "license issue time in the future",
            0x72B => "license time period too long",
            0x72C => "exception in device specific code, check the target device",
            0x72D => "license file read twice",
            0x72E => "invalid signature",
            0x72F => "invalid public key certificate",

            0x740 => "general client error",
            0x741 => "invalid parameter at service call",
            0x742 => "polling list is empty",
            0x743 => "var connection already in use",
            0x744 => "invoke id in use",
            0x745 => "timeout elapsed, check the AMS route and the target state",
            0x746 => "error in Win32 subsystem",
            0x747 => "invalid client timeout value",
            0x748 => "ADS port not opened",
            0x749 => "no AMS address",
            0x750 => "internal error in ADS sync",
            0x751 => "hash table overflow",
            0x752 => "key not found in hash table",
            0x753 => "no more symbols in cache",
            0x754 => "invalid response received",
            0x755 => "sync port is locked",

            _ => "unknown ADS error",
        }
    }
}

impl From<u32> for AdsReturnCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<AdsReturnCode> for u32 {
    fn from(value: AdsReturnCode) -> Self {
        value.0
    }
}

impl fmt::Display for AdsReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.description(), self.0)
    }
}

impl fmt::Debug for AdsReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdsReturnCode({:#x}: {})", self.0, self.description())
    }
}
