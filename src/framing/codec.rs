//! tokio-util codec for MB1 byte streams.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use super::sync::{FrameSync, SyncStats, SyncedFrame};
use crate::types::SoundingRecord;
use crate::wire::Mb1Codec;
use crate::Mb1Error;

/// Framed stream codec: resynchronizing decoder plus packet encoder.
///
/// Decoding never fails on corrupt input; bad bytes are skipped and reported
/// through [`SyncedFrame::lost_bytes`]. Only I/O errors end a stream.
#[derive(Debug, Clone, Default)]
pub struct Mb1FrameCodec {
    sync: FrameSync,
}

impl Mb1FrameCodec {
    pub fn new(codec: Mb1Codec) -> Self {
        Self { sync: FrameSync::new(codec) }
    }

    pub fn stats(&self) -> SyncStats {
        self.sync.stats()
    }
}

impl Decoder for Mb1FrameCodec {
    type Item = SyncedFrame;
    type Error = Mb1Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.sync.next_frame(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let pending = src.len();
        let frame = self.sync.next_final_frame(src);
        if frame.is_none() && pending > 0 {
            warn!(bytes = pending, "Stream ended inside an MB1 packet");
        }
        Ok(frame)
    }
}

impl<'a> Encoder<&'a SoundingRecord> for Mb1FrameCodec {
    type Error = Mb1Error;

    fn encode(&mut self, item: &'a SoundingRecord, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let codec = self.sync.codec();
        let len = codec.required_size(item)?;
        let start = dst.len();
        dst.resize(start + len, 0);
        if let Err(e) = codec.encode(item, &mut dst[start..]) {
            dst.truncate(start);
            return Err(e);
        }
        Ok(())
    }
}
