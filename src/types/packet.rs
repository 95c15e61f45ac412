//! Sounding packets for the stream-based architecture

use std::sync::Arc;

use super::SoundingRecord;

/// A decoded sounding plus the wire metadata it arrived with.
///
/// This is the unit that flows from providers through the driver to
/// subscribers. The record is shared via `Arc` so fan-out never copies beams.
#[derive(Debug, Clone)]
pub struct SoundingPacket {
    /// Decoded ping
    pub record: Arc<SoundingRecord>,

    /// Monotonic packet counter assigned by the source
    pub sequence: u64,

    /// Bytes the packet occupied on the wire
    pub wire_len: usize,

    /// Checksum stored in (and verified against) the packet
    pub checksum: u32,

    /// Bytes discarded while resynchronizing before this packet
    pub lost_bytes: u64,
}

impl SoundingPacket {
    /// Create a new sounding packet
    pub fn new(
        record: SoundingRecord,
        sequence: u64,
        wire_len: usize,
        checksum: u32,
        lost_bytes: u64,
    ) -> Self {
        Self { record: Arc::new(record), sequence, wire_len, checksum, lost_bytes }
    }

    /// Ping timestamp in epoch seconds
    pub fn timestamp(&self) -> f64 {
        self.record.timestamp
    }
}
