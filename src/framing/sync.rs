//! Resynchronizing frame scanner
//!
//! Finds MB1 soundings in a byte stream that may start mid-packet, contain
//! noise between packets, or carry corrupted packets. The scanner looks for
//! the `"MB1"` tag, checks the framing fields for consistency before trusting
//! a candidate, and on any failure slides one byte and searches again.
//!
//! - `Frame`: a valid packet was found, possibly after some noise
//! - `Incomplete`: no packet yet; a prefix of the input can be dropped

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::types::TypeTag;
use crate::wire::{BEAMS_OFFSET, Decoded, Mb1Codec, WireHeader};
use crate::Mb1Error;

/// Outcome of scanning a byte slice for the next sounding.
#[derive(Debug)]
pub enum Scan {
    /// A valid packet starts at `offset`; the bytes before it are noise.
    Frame { offset: usize, decoded: Decoded },
    /// No complete packet. The first `discard` bytes can never start one;
    /// the rest may once more bytes arrive.
    Incomplete { discard: usize },
}

/// Running counters for a synchronized stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub frames: u64,
    pub lost_bytes: u64,
    /// Tag matches rejected on inconsistent framing fields.
    pub false_syncs: u64,
    pub checksum_failures: u64,
    /// Frames accepted with a disagreeing payload size field.
    pub size_mismatches: u64,
}

/// A sounding recovered from a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedFrame {
    pub decoded: Decoded,
    /// Bytes dropped since the previous frame.
    pub lost_bytes: u64,
}

/// Stream scanner state: codec settings plus counters.
#[derive(Debug, Clone)]
pub struct FrameSync {
    codec: Mb1Codec,
    stats: SyncStats,
    pending_lost: u64,
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new(Mb1Codec::default())
    }
}

impl FrameSync {
    pub fn new(codec: Mb1Codec) -> Self {
        Self { codec, stats: SyncStats::default(), pending_lost: 0 }
    }

    pub fn codec(&self) -> &Mb1Codec {
        &self.codec
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Locate the next valid sounding in `data`.
    ///
    /// The caller must drop the reported noise bytes (`offset` or `discard`)
    /// before scanning again; they are counted as lost here.
    pub fn scan(&mut self, data: &[u8]) -> Scan {
        self.scan_from(data, false)
    }

    /// Like [`scan`](Self::scan), but no more bytes will follow `data`.
    ///
    /// A candidate cut short by the end of input is treated as a false sync,
    /// so packets inside its claimed span are still found. `Incomplete` here
    /// always discards the whole slice.
    pub fn scan_final(&mut self, data: &[u8]) -> Scan {
        self.scan_from(data, true)
    }

    fn scan_from(&mut self, data: &[u8], at_eof: bool) -> Scan {
        let max_beams = self.codec.max_beams();
        let policy = self.codec.config().payload_size_policy;
        let order = self.codec.byte_order();
        let mut pos = 0;

        loop {
            let Some(found) = find_tag(&data[pos..]) else {
                let keep = if at_eof { 0 } else { partial_tag_len(data) };
                let discard = data.len() - keep;
                self.stats.lost_bytes += discard as u64;
                return Scan::Incomplete { discard };
            };
            pos += found;

            let candidate = &data[pos..];
            let Some(header) = WireHeader::peek(candidate, order) else {
                if at_eof {
                    trace!(offset = pos, "Dropping MB1 candidate cut short by end of input");
                    self.stats.false_syncs += 1;
                    pos += 1;
                    continue;
                }
                self.stats.lost_bytes += pos as u64;
                return Scan::Incomplete { discard: pos };
            };

            if !header.is_consistent(max_beams, policy) {
                trace!(
                    offset = pos,
                    beam_count = header.beam_count,
                    declared = header.declared_size,
                    "Rejecting inconsistent MB1 header"
                );
                self.stats.false_syncs += 1;
                pos += 1;
                continue;
            }

            let len = header.expected_len();
            if candidate.len() < len {
                if at_eof {
                    trace!(
                        offset = pos,
                        needed = len,
                        available = candidate.len(),
                        "Dropping MB1 candidate cut short by end of input"
                    );
                    self.stats.false_syncs += 1;
                    pos += 1;
                    continue;
                }
                self.stats.lost_bytes += pos as u64;
                return Scan::Incomplete { discard: pos };
            }

            match self.codec.decode(&candidate[..len]) {
                Ok(decoded) => {
                    if decoded.payload_size_mismatch().is_some() {
                        self.stats.size_mismatches += 1;
                    }
                    self.stats.frames += 1;
                    self.stats.lost_bytes += pos as u64;
                    return Scan::Frame { offset: pos, decoded };
                }
                Err(Mb1Error::ChecksumMismatch { received, computed }) => {
                    debug!(
                        offset = pos,
                        received = format_args!("{:#010x}", received),
                        computed = format_args!("{:#010x}", computed),
                        "Dropping MB1 candidate with bad checksum"
                    );
                    self.stats.checksum_failures += 1;
                    pos += 1;
                }
                Err(e) => {
                    trace!(offset = pos, error = %e, "Dropping MB1 candidate");
                    self.stats.false_syncs += 1;
                    pos += 1;
                }
            }
        }
    }

    /// Pull the next sounding out of `buf`, consuming it and any noise before it.
    pub fn next_frame(&mut self, buf: &mut BytesMut) -> Option<SyncedFrame> {
        match self.scan(&buf[..]) {
            Scan::Frame { offset, decoded } => Some(self.take_frame(buf, offset, decoded)),
            Scan::Incomplete { discard } => {
                buf.advance(discard);
                self.pending_lost += discard as u64;
                if buf.len() < BEAMS_OFFSET {
                    buf.reserve(BEAMS_OFFSET - buf.len());
                } else if let Some(header) = WireHeader::peek(buf, self.codec.byte_order()) {
                    buf.reserve(header.expected_len().saturating_sub(buf.len()));
                }
                None
            }
        }
    }

    /// End-of-stream counterpart of [`next_frame`](Self::next_frame).
    ///
    /// Returns `None` once `buf` holds no further sounding; by then `buf` is
    /// empty and its bytes are counted as lost.
    pub fn next_final_frame(&mut self, buf: &mut BytesMut) -> Option<SyncedFrame> {
        match self.scan_final(&buf[..]) {
            Scan::Frame { offset, decoded } => Some(self.take_frame(buf, offset, decoded)),
            Scan::Incomplete { discard } => {
                if discard > 0 {
                    debug!(bytes = discard, "Discarding trailing bytes without a complete MB1 packet");
                }
                buf.advance(discard);
                self.pending_lost += discard as u64;
                None
            }
        }
    }

    fn take_frame(&mut self, buf: &mut BytesMut, offset: usize, decoded: Decoded) -> SyncedFrame {
        buf.advance(offset + decoded.bytes_consumed);
        let lost_bytes = self.pending_lost + offset as u64;
        self.pending_lost = 0;
        SyncedFrame { decoded, lost_bytes }
    }
}

/// Push-based accumulator for callers that receive arbitrary chunks.
///
/// ```rust
/// use mb1wire::framing::FrameBuffer;
/// use mb1wire::{Mb1Codec, SoundingRecord};
///
/// let wire = Mb1Codec::default()
///     .encode_to_vec(&SoundingRecord::new(1.0e9, 36.8, -121.9, 1500.0, 0.0))?;
///
/// let mut buffer = FrameBuffer::default();
/// assert!(buffer.push(&wire[..30]).is_empty());
/// let frames = buffer.push(&wire[30..]);
/// assert_eq!(frames.len(), 1);
/// # Ok::<(), mb1wire::Mb1Error>(())
/// ```
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: BytesMut,
    sync: FrameSync,
}

impl FrameBuffer {
    pub fn new(codec: Mb1Codec) -> Self {
        Self { buffer: BytesMut::with_capacity(16 * 1024), sync: FrameSync::new(codec) }
    }

    /// Append `data` and return every sounding now complete.
    pub fn push(&mut self, data: &[u8]) -> Vec<SyncedFrame> {
        self.buffer.extend_from_slice(data);
        let mut frames = Vec::new();
        while let Some(frame) = self.sync.next_frame(&mut self.buffer) {
            frames.push(frame);
        }
        frames
    }

    /// Number of bytes held waiting for the rest of a packet.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn stats(&self) -> SyncStats {
        self.sync.stats()
    }

    /// Flush at end of stream: recover any sounding still buffered, then
    /// drop the remaining bytes as lost.
    pub fn finish(&mut self) -> Vec<SyncedFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.sync.next_final_frame(&mut self.buffer) {
            frames.push(frame);
        }
        frames
    }
}

fn find_tag(data: &[u8]) -> Option<usize> {
    data.windows(TypeTag::SOUNDING_PREFIX.len()).position(|w| w == TypeTag::SOUNDING_PREFIX)
}

/// Length of a trailing partial tag ("M" or "MB") that may complete later.
fn partial_tag_len(data: &[u8]) -> usize {
    let prefix = &TypeTag::SOUNDING_PREFIX;
    (1..prefix.len()).rev().find(|&n| data.ends_with(&prefix[..n])).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{encode_all, sample_sounding};

    #[test]
    fn single_packet() {
        let wire = encode_all(&[sample_sounding(1, 4)]);
        let mut buffer = FrameBuffer::default();
        let frames = buffer.push(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].decoded.record, sample_sounding(1, 4));
        assert_eq!(frames[0].lost_bytes, 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn back_to_back_packets() {
        let records: Vec<_> = (0..5).map(|i| sample_sounding(i, i as usize)).collect();
        let wire = encode_all(&records);
        let frames = FrameBuffer::default().push(&wire);
        let decoded: Vec<_> = frames.into_iter().map(|f| f.decoded.record).collect();
        assert_eq!(decoded, records);
    }

    #[test]
    fn byte_at_a_time() {
        let records = [sample_sounding(1, 3), sample_sounding(2, 0)];
        let wire = encode_all(&records);
        let mut buffer = FrameBuffer::default();
        let mut frames = Vec::new();
        for byte in &wire {
            frames.extend(buffer.push(&[*byte]));
        }
        assert_eq!(frames.len(), 2);
        assert_eq!(buffer.stats().lost_bytes, 0);
    }

    #[test]
    fn leading_noise_is_counted_as_lost() {
        let mut data = b"garbage bytes".to_vec();
        data.extend(encode_all(&[sample_sounding(7, 2)]));
        let mut buffer = FrameBuffer::default();
        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].lost_bytes, 13);
        assert_eq!(buffer.stats().lost_bytes, 13);
    }

    #[test]
    fn partial_tag_is_kept_across_pushes() {
        let wire = encode_all(&[sample_sounding(3, 1)]);
        let mut buffer = FrameBuffer::default();
        assert!(buffer.push(b"xxM").is_empty());
        assert_eq!(buffer.len(), 1);
        let frames = buffer.push(&wire[1..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].lost_bytes, 2);
    }

    #[test]
    fn corrupted_packet_is_skipped() {
        let mut wire = encode_all(&[sample_sounding(1, 2), sample_sounding(2, 2)]);
        wire[60] ^= 0x40;
        let mut buffer = FrameBuffer::default();
        let frames = buffer.push(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].decoded.record, sample_sounding(2, 2));
        assert_eq!(frames[0].lost_bytes, 112);
        assert_eq!(buffer.stats().checksum_failures, 1);
    }

    #[test]
    fn false_tag_in_noise_is_rejected() {
        let mut data = b"MB1\0".to_vec();
        data.extend_from_slice(&[0xFF; 60]);
        data.extend(encode_all(&[sample_sounding(9, 1)]));
        let mut buffer = FrameBuffer::default();
        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].lost_bytes, 64);
        assert!(buffer.stats().false_syncs >= 1);
    }

    #[test]
    fn finish_discards_truncated_tail() {
        let wire = encode_all(&[sample_sounding(1, 2)]);
        let mut buffer = FrameBuffer::default();
        assert!(buffer.push(&wire[..100]).is_empty());
        assert!(buffer.finish().is_empty());
        assert!(buffer.is_empty());
        assert_eq!(buffer.stats().lost_bytes, 100);
    }

    #[test]
    fn finish_recovers_packet_inside_truncated_candidate() {
        let big = encode_all(&[sample_sounding(1, 400)]);
        let small = encode_all(&[sample_sounding(2, 2)]);
        let mut data = big[..200].to_vec();
        data.extend_from_slice(&small);

        let mut buffer = FrameBuffer::default();
        assert!(buffer.push(&data).is_empty());
        assert_eq!(buffer.len(), data.len());

        let frames = buffer.finish();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].decoded.record, sample_sounding(2, 2));
        assert_eq!(frames[0].lost_bytes, 200);
        assert!(buffer.is_empty());
        assert_eq!(buffer.stats().lost_bytes, 200);
    }

    #[test]
    fn scan_final_drops_partial_tag() {
        let mut sync = FrameSync::default();
        match sync.scan_final(b"xxMB") {
            Scan::Incomplete { discard } => assert_eq!(discard, 4),
            other => panic!("Expected incomplete, got {:?}", other),
        }
        match sync.scan(b"xxMB") {
            Scan::Incomplete { discard } => assert_eq!(discard, 2),
            other => panic!("Expected incomplete, got {:?}", other),
        }
    }

    #[test]
    fn header_check_follows_payload_size_policy() {
        use crate::config::{CodecConfig, PayloadSizePolicy};
        use crate::wire::checksum;

        let mut wire = encode_all(&[sample_sounding(4, 2)]);
        wire[4..8].copy_from_slice(&104u32.to_ne_bytes());
        let sum = checksum(&wire[..108]);
        wire[108..112].copy_from_slice(&sum.to_ne_bytes());

        let mut flagging = FrameBuffer::default();
        assert!(flagging.push(&wire).is_empty());
        assert!(flagging.finish().is_empty());
        assert!(flagging.stats().false_syncs >= 1);

        let ignore = Mb1Codec::new(CodecConfig {
            payload_size_policy: PayloadSizePolicy::Ignore,
            ..CodecConfig::default()
        })
        .unwrap();
        let frames = FrameBuffer::new(ignore).push(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].decoded.record, sample_sounding(4, 2));
    }

    #[test]
    fn scan_reports_offsets_without_consuming() {
        let mut data = vec![0u8; 5];
        data.extend(encode_all(&[sample_sounding(1, 1)]));
        let mut sync = FrameSync::default();
        match sync.scan(&data) {
            Scan::Frame { offset, decoded } => {
                assert_eq!(offset, 5);
                assert_eq!(decoded.bytes_consumed, 84);
            }
            other => panic!("Expected frame, got {:?}", other),
        }
    }

    #[test]
    fn partial_tag_len_matches_prefixes() {
        assert_eq!(partial_tag_len(b"abcM"), 1);
        assert_eq!(partial_tag_len(b"abMB"), 2);
        assert_eq!(partial_tag_len(b"abMB1"), 0);
        assert_eq!(partial_tag_len(b""), 0);
    }
}
