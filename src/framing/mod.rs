//! Stream framing for MB1 soundings
//!
//! Packets arrive over serial links, sockets and log files without any outer
//! framing, so a reader has to find packet boundaries from the contents. This
//! module recovers soundings from arbitrary byte chunks, skipping noise and
//! corrupted packets while counting what was lost.
//!
//! - [`FrameSync`] - the scanner; works on any byte slice or `BytesMut`
//! - [`FrameBuffer`] - push-based accumulator for callback-driven input
//! - [`Mb1FrameCodec`] - `tokio_util` codec for `FramedRead`/`FramedWrite`

mod codec;
mod sync;

pub use codec::Mb1FrameCodec;
pub use sync::{FrameBuffer, FrameSync, Scan, SyncStats, SyncedFrame};
