use super::frame::AmsFrame;
use std::io::IoSlice;
use tokio::io::{self, AsyncWrite, AsyncWriteExt, BufWriter};

/// Buffered writer sending [`AmsFrame`]s over an async byte stream.
///
/// Header and payload go out as one vectored write and are flushed
/// immediately; combined with `TCP_NODELAY` this keeps small request frames
/// from being delayed by Nagle's algorithm.
pub struct FrameWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Creates a writer with default buffering.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Writes a frame and flushes.
    pub async fn write_frame(&mut self, frame: &AmsFrame) -> io::Result<()> {
        let header_bytes = frame.header().to_bytes();
        let mut bufs = [IoSlice::new(&header_bytes), IoSlice::new(frame.payload())];

        write_all_vectored(&mut self.writer, &mut bufs).await?;
        self.writer.flush().await
    }

    /// Consumes the writer, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

/// Writes every byte of every slice, unlike `write_vectored` which may stop
/// after a partial write.
async fn write_all_vectored<W: AsyncWrite + Unpin>(
    writer: &mut W,
    mut bufs: &mut [IoSlice<'_>],
) -> io::Result<()> {
    IoSlice::advance_slices(&mut bufs, 0);

    while !bufs.is_empty() {
        match writer.write_vectored(bufs).await {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole frame",
                ));
            }
            Ok(n) => IoSlice::advance_slices(&mut bufs, n),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ams::AmsCommand;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn writes_header_then_payload() {
        let frame = AmsFrame::new(AmsCommand::PortClose, vec![0xFF, 0xEE]).unwrap();
        let expected = frame.to_vec();

        let mut mock = Builder::new().write(&expected).build();
        let mut writer = FrameWriter::new(&mut mock);
        writer.write_frame(&frame).await.unwrap();
    }
}
