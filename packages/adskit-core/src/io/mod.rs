//! Frame I/O: [`AmsFrame`] plus buffered tokio readers/writers and the
//! connected [`AmsStream`].

pub mod frame;
pub mod reader;
pub mod stream;
pub mod writer;

pub use frame::{AmsFrame, MAX_FRAME_LEN};
pub use reader::FrameReader;
pub use stream::{AMS_TCP_PORT, AmsStream};
pub use writer::FrameWriter;
