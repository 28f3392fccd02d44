use super::frame::{AmsFrame, MAX_FRAME_LEN};
use crate::ams::AmsTcpHeader;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::task::yield_now;

/// Buffered reader turning an async byte stream into complete [`AmsFrame`]s.
///
/// Partial frames simply stay in the buffer until more bytes arrive; a burst
/// of back-to-back packets yields to the scheduler between frames so decoding
/// does not starve other tasks.
pub struct FrameReader<R: AsyncRead> {
    reader: BufReader<R>,
    /// Frames handed out since the last yield.
    burst: u32,
}

/// How many back-to-back frames to decode before yielding.
const BURST_BUDGET: u32 = 16;

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Creates a reader with default buffering.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            burst: 0,
        }
    }

    /// Creates a reader with a specific buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            burst: 0,
        }
    }

    /// Reads the next complete frame.
    ///
    /// Returns `UnexpectedEof` on a cleanly closed stream, `InvalidData` when
    /// the header announces a payload beyond [`MAX_FRAME_LEN`].
    pub async fn read_frame(&mut self) -> io::Result<AmsFrame> {
        if self.burst >= BURST_BUDGET {
            self.burst = 0;
            yield_now().await;
        }

        if self.reader.fill_buf().await?.is_empty() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }

        let mut header_buf = [0u8; AmsTcpHeader::LENGTH];
        self.reader.read_exact(&mut header_buf).await?;
        let header = AmsTcpHeader::from_bytes(header_buf);

        let payload_len = header.length() as usize;
        if payload_len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("payload too large: {payload_len} bytes (max {MAX_FRAME_LEN})"),
            ));
        }

        let mut payload = vec![0u8; payload_len];
        self.reader.read_exact(&mut payload).await?;

        self.burst += 1;
        Ok(AmsFrame::from_parts(header, payload))
    }

    /// Consumes the reader, returning the underlying stream. Buffered bytes
    /// are lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ams::AmsCommand;
    use std::time::Duration;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn reassembles_fragmented_frame() {
        let mut mock = Builder::new()
            .read(&[0x00, 0x10, 0x02]) // PortConnect, length split mid-field
            .wait(Duration::from_millis(5))
            .read(&[0x00, 0x00, 0x00])
            .read(&[0xCA, 0xFE])
            .build();

        let mut reader = FrameReader::new(&mut mock);
        let frame = reader.read_frame().await.unwrap();

        assert_eq!(frame.command(), AmsCommand::PortConnect);
        assert_eq!(frame.payload(), &[0xCA, 0xFE]);
    }

    #[tokio::test]
    async fn yields_k_frames_and_keeps_partial_tail() {
        // Two complete frames followed by a partial third, in one burst.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x11]);
        bytes.extend_from_slice(&[0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x22, 0x33]);
        bytes.extend_from_slice(&[0x00, 0x10, 0x04]); // partial header

        let mut mock = Builder::new()
            .read(&bytes)
            .wait(Duration::from_millis(5))
            .read(&[0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 0xDD]) // rest arrives later
            .build();

        let mut reader = FrameReader::new(&mut mock);

        let first = reader.read_frame().await.unwrap();
        assert_eq!(first.payload(), &[0x11]);

        let second = reader.read_frame().await.unwrap();
        assert_eq!(second.command(), AmsCommand::PortClose);
        assert_eq!(second.payload(), &[0x22, 0x33]);

        let third = reader.read_frame().await.unwrap();
        assert_eq!(third.command(), AmsCommand::PortConnect);
        assert_eq!(third.payload(), &[0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[tokio::test]
    async fn clean_eof() {
        let mut mock = Builder::new().build();
        let mut reader = FrameReader::new(&mut mock);
        let err = reader.read_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn eof_inside_header() {
        let mut mock = Builder::new().read(&[0x00, 0x10]).build();
        let mut reader = FrameReader::new(&mut mock);
        let err = reader.read_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn oversized_length_rejected() {
        let mut header = [0u8; AmsTcpHeader::LENGTH];
        header[2..6].copy_from_slice(&(MAX_FRAME_LEN as u32 + 1).to_le_bytes());

        let mut mock = Builder::new().read(&header).build();
        let mut reader = FrameReader::new(&mut mock);
        let err = reader.read_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
