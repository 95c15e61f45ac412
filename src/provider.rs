//! Provider trait for sounding sources

use crate::Result;
use crate::types::SoundingPacket;

/// Trait for MB1 sounding sources
///
/// Providers abstract over where soundings come from (log replay, a pipe, a
/// socket) and handle their own timing internally.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next sounding
    ///
    /// Returns:
    /// - `Ok(Some(packet))` - New sounding available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - Error occurred; the driver may call again
    ///
    /// Each provider handles timing internally:
    /// - Replay: paces records at the configured ping rate
    /// - Stream: waits for bytes from the transport
    async fn next_packet(&mut self) -> Result<Option<SoundingPacket>>;

    /// Nominal ping rate in Hz, or 0.0 when the source sets its own pace
    fn nominal_rate(&self) -> f64;
}
