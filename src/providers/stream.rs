//! Stream provider for MB1 byte streams (pipes, sockets, stdin)

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, trace, warn};

use crate::Result;
use crate::framing::{Mb1FrameCodec, SyncStats};
use crate::provider::Provider;
use crate::types::SoundingPacket;
use crate::wire::Mb1Codec;

/// Provider that decodes soundings from any `AsyncRead`.
///
/// The transport is owned by the caller: connect the socket or spawn the
/// process, then hand over the read half. Corrupted input is skipped and
/// reported through [`SoundingPacket::lost_bytes`].
pub struct StreamProvider<R> {
    framed: FramedRead<R, Mb1FrameCodec>,
    next_sequence: u64,
    rate_hz: f64,
}

impl<R> StreamProvider<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(reader: R, codec: Mb1Codec) -> Self {
        Self {
            framed: FramedRead::new(reader, Mb1FrameCodec::new(codec)),
            next_sequence: 0,
            rate_hz: 0.0,
        }
    }

    /// Declare the sender's ping rate so subscribers can skip redundant throttling
    pub fn with_rate(mut self, rate_hz: f64) -> Self {
        self.rate_hz = rate_hz;
        self
    }

    pub fn stats(&self) -> SyncStats {
        self.framed.decoder().stats()
    }
}

#[async_trait::async_trait]
impl<R> Provider for StreamProvider<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async fn next_packet(&mut self) -> Result<Option<SoundingPacket>> {
        let Some(frame) = self.framed.next().await.transpose()? else {
            let stats = self.stats();
            info!(
                frames = stats.frames,
                lost_bytes = stats.lost_bytes,
                checksum_failures = stats.checksum_failures,
                "MB1 stream closed"
            );
            return Ok(None);
        };

        if frame.lost_bytes > 0 {
            warn!(lost_bytes = frame.lost_bytes, "Resynchronized MB1 stream");
        }
        if let Some((declared, computed)) = frame.decoded.payload_size_mismatch() {
            debug!(declared, computed, "MB1 payload size disagrees with beam count");
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        trace!(sequence, beams = frame.decoded.record.beam_count(), "Decoded sounding");

        let decoded = frame.decoded;
        Ok(Some(SoundingPacket::new(
            decoded.record,
            sequence,
            decoded.bytes_consumed,
            decoded.checksum,
            frame.lost_bytes,
        )))
    }

    fn nominal_rate(&self) -> f64 {
        self.rate_hz
    }
}
