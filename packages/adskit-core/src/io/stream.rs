use super::frame::AmsFrame;
use super::reader::FrameReader;
use super::writer::FrameWriter;
use std::time::Duration;
use tokio::io::{self, AsyncRead, AsyncWrite};
use tokio::net::{self, TcpStream};
use tokio::time::timeout;

/// Default TCP port of the AMS router.
pub const AMS_TCP_PORT: u16 = 48898;

/// A connected AMS byte stream, the entry point for talking to a router.
///
/// Wraps a raw stream (normally a [`TcpStream`]) and splits into a buffered
/// [`FrameReader`]/[`FrameWriter`] pair for concurrent use.
pub struct AmsStream<S: AsyncRead + AsyncWrite + Unpin = TcpStream> {
    stream: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin> AmsStream<S> {
    /// Wraps an already-connected stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Reads one frame with exact-sized reads, no read-ahead.
    ///
    /// Handy for a simple handshake before [`split`](Self::split); in a read
    /// loop prefer the buffered [`FrameReader`]. (A buffered reader would
    /// read ahead and drop bytes belonging to the next frame when released.)
    pub async fn read_frame(&mut self) -> io::Result<AmsFrame> {
        use crate::ams::AmsTcpHeader;
        use crate::io::frame::MAX_FRAME_LEN;
        use tokio::io::AsyncReadExt;

        let mut header_buf = [0u8; AmsTcpHeader::LENGTH];
        self.stream.read_exact(&mut header_buf).await?;
        let header = AmsTcpHeader::from_bytes(header_buf);

        let payload_len = header.length() as usize;
        if payload_len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("payload too large: {payload_len} bytes (max {MAX_FRAME_LEN})"),
            ));
        }

        let mut payload = vec![0u8; payload_len];
        self.stream.read_exact(&mut payload).await?;
        Ok(AmsFrame::from_parts(header, payload))
    }

    /// Writes one frame and flushes.
    pub async fn write_frame(&mut self, frame: &AmsFrame) -> io::Result<()> {
        let mut writer = FrameWriter::new(&mut self.stream);
        writer.write_frame(frame).await
    }

    /// Splits into a buffered reader and writer sharing the stream.
    pub fn split(self) -> (FrameReader<io::ReadHalf<S>>, FrameWriter<io::WriteHalf<S>>) {
        let (reader, writer) = io::split(self.stream);
        (FrameReader::new(reader), FrameWriter::new(writer))
    }
}

impl AmsStream<TcpStream> {
    /// Connects to a router with a bounded deadline and `TCP_NODELAY` set.
    ///
    /// Nagle's algorithm would batch the small request frames ADS traffic is
    /// made of, so it is disabled unconditionally.
    pub async fn connect<A: net::ToSocketAddrs>(addr: A, deadline: Duration) -> io::Result<Self> {
        let stream = timeout(deadline, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }

    /// Like [`connect`](Self::connect), but binds the local side of the
    /// socket first (multi-homed hosts, fixed source ports).
    pub async fn connect_from(
        local: std::net::SocketAddr,
        remote: std::net::SocketAddr,
        deadline: Duration,
    ) -> io::Result<Self> {
        let socket = match local {
            std::net::SocketAddr::V4(_) => net::TcpSocket::new_v4()?,
            std::net::SocketAddr::V6(_) => net::TcpSocket::new_v6()?,
        };
        socket.bind(local)?;
        let stream = timeout(deadline, socket.connect(remote))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }

    /// Splits the TCP stream into owned halves (no locking overhead).
    pub fn into_split(
        self,
    ) -> (
        FrameReader<net::tcp::OwnedReadHalf>,
        FrameWriter<net::tcp::OwnedWriteHalf>,
    ) {
        let (reader, writer) = self.stream.into_split();
        (FrameReader::new(reader), FrameWriter::new(writer))
    }

    /// Returns the peer socket address.
    pub fn peer_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.stream.peer_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ams::AmsCommand;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn duplex_read_write() {
        let (client, mut server) = io::duplex(1024);
        let mut stream = AmsStream::new(client);

        server
            .write_all(&[0x00, 0x10, 0x02, 0x00, 0x00, 0x00, 0x01, 0x01])
            .await
            .unwrap();

        let frame = stream.read_frame().await.unwrap();
        assert_eq!(frame.command(), AmsCommand::PortConnect);
        assert_eq!(frame.payload(), &[0x01, 0x01]);

        let out = AmsFrame::new(AmsCommand::PortClose, vec![0xFF]).unwrap();
        stream.write_frame(&out).await.unwrap();

        let mut buf = [0u8; 7];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF]);
    }
}
