use crate::ams::{AmsCommand, AmsTcpHeader};

/// Maximum AMS frame payload (64 KiB minus the TCP header), guarding against
/// allocation attacks from corrupt length fields.
pub const MAX_FRAME_LEN: usize = 65535 - AmsTcpHeader::LENGTH;

/// One complete AMS/TCP packet: a 6-byte header plus its payload.
///
/// I/O-agnostic; reading and writing frames is the job of
/// [`FrameReader`](super::FrameReader) and [`FrameWriter`](super::FrameWriter).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmsFrame {
    header: AmsTcpHeader,
    payload: Vec<u8>,
}

impl AmsFrame {
    /// Creates a frame for the given command.
    ///
    /// Returns `None` if the payload exceeds [`MAX_FRAME_LEN`].
    pub fn new(command: AmsCommand, payload: impl Into<Vec<u8>>) -> Option<Self> {
        let payload = payload.into();
        if payload.len() > MAX_FRAME_LEN {
            return None;
        }
        Some(Self {
            header: AmsTcpHeader::new(command, payload.len() as u32),
            payload,
        })
    }

    /// Creates a frame with an empty payload.
    pub fn empty(command: AmsCommand) -> Self {
        Self {
            header: AmsTcpHeader::new(command, 0),
            payload: Vec::new(),
        }
    }

    /// Assembles a frame from a header and an already-validated payload.
    ///
    /// Intended for readers that have read exactly `header.length()` bytes;
    /// consistency is not re-checked.
    pub fn from_parts(header: AmsTcpHeader, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// Returns the frame header.
    pub fn header(&self) -> AmsTcpHeader {
        self.header
    }

    /// Returns the router-level command.
    pub fn command(&self) -> AmsCommand {
        self.header.command()
    }

    /// Returns the payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Splits the frame into header and payload.
    pub fn into_parts(self) -> (AmsTcpHeader, Vec<u8>) {
        (self.header, self.payload)
    }

    /// Serializes the whole frame (header + payload) into a byte vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(AmsTcpHeader::LENGTH + self.payload.len());
        vec.extend_from_slice(&self.header.to_bytes());
        vec.extend_from_slice(&self.payload);
        vec
    }
}
