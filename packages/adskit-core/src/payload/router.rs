//! Router-level packets: port registration, unregistration and the state
//! notes the router pushes. These are complete frames (no ADS header).

use super::{PayloadError, expect_len};
use crate::ams::{AmsAddr, AmsCommand, AmsPort, AmsTcpHeader, RouterState};
use crate::io::AmsFrame;

/// `PORT_CONNECT` (0x1000): register a local ADS port with the router.
/// Requesting port `0` asks the router to assign one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortConnectRequest {
    pub port: AmsPort,
}

impl PortConnectRequest {
    /// Creates a request for a specific port, or `0` for router-assigned.
    pub fn new(port: AmsPort) -> Self {
        Self { port }
    }

    /// Builds the complete frame.
    pub fn to_frame(&self) -> AmsFrame {
        AmsFrame::from_parts(
            AmsTcpHeader::new(AmsCommand::PortConnect, 2),
            self.port.to_le_bytes().to_vec(),
        )
    }
}

/// `PORT_CONNECT` response: the local AMS address the router assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConnectResponse {
    pub address: AmsAddr,
}

impl PortConnectResponse {
    /// Payload length: Net ID (6) + port (2).
    pub const BODY_LEN: usize = 8;

    /// Parses the frame payload.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            address: AmsAddr::from_bytes(body[..8].try_into().unwrap()),
        })
    }

    /// Encodes the frame payload (router side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        self.address.to_bytes().to_vec()
    }
}

/// `PORT_CLOSE` (0x0001): unregister a local ADS port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCloseRequest {
    pub port: AmsPort,
}

impl PortCloseRequest {
    /// Creates a close request for the given port.
    pub fn new(port: AmsPort) -> Self {
        Self { port }
    }

    /// Builds the complete frame.
    pub fn to_frame(&self) -> AmsFrame {
        AmsFrame::from_parts(
            AmsTcpHeader::new(AmsCommand::PortClose, 2),
            self.port.to_le_bytes().to_vec(),
        )
    }
}

/// `GET_LOCAL_NETID` (0x1002): ask the router for its local Net ID. The
/// request body is four reserved zero bytes; the response carries the
/// 6-byte Net ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetLocalNetIdRequest;

impl GetLocalNetIdRequest {
    /// Builds the complete frame.
    pub fn to_frame(&self) -> AmsFrame {
        AmsFrame::from_parts(
            AmsTcpHeader::new(AmsCommand::GetLocalNetId, 4),
            vec![0u8; 4],
        )
    }
}

/// `ROUTER_NOTE` (0x1001): the router announces a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterNote {
    pub state: RouterState,
}

impl RouterNote {
    /// Payload length: state (4).
    pub const BODY_LEN: usize = 4;

    /// Parses the frame payload.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_len(body, Self::BODY_LEN)?;
        Ok(Self {
            state: RouterState::from_bytes(body[..4].try_into().unwrap()),
        })
    }

    /// Encodes the frame payload (router side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        self.state.to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ams::AmsNetId;

    #[test]
    fn port_connect_frame_layout() {
        let frame = PortConnectRequest::new(0).to_frame();
        assert_eq!(frame.to_vec(), vec![0x00, 0x10, 0x02, 0x00, 0x00, 0x00, 0, 0]);
    }

    #[test]
    fn port_connect_response_roundtrip() {
        let resp = PortConnectResponse {
            address: AmsAddr::new(AmsNetId::new(192, 168, 1, 100, 1, 1), 32905),
        };
        assert_eq!(
            PortConnectResponse::parse_body(&resp.encode_body()).unwrap(),
            resp
        );
    }

    #[test]
    fn port_close_frame_layout() {
        let frame = PortCloseRequest::new(32905).to_frame();
        let bytes = frame.to_vec();
        assert_eq!(&bytes[..2], &[0x01, 0x00]);
        assert_eq!(&bytes[6..], &32905u16.to_le_bytes());
    }

    #[test]
    fn router_note_parse() {
        let note = RouterNote::parse_body(&[1, 0, 0, 0]).unwrap();
        assert_eq!(note.state, RouterState::Start);
    }
}
