//! MB1 sounding wire format.
//!
//! ## Packet Layout
//!
//! ```text
//! offset  size  field
//! 0       4     type tag ("MB1\0")
//! 4       4     payload size (u32, total packet length)
//! 8       8     timestamp (f64)
//! 16      8     latitude (f64)
//! 24      8     longitude (f64)
//! 32      8     depth (f64)
//! 40      8     heading (f64)
//! 48      4     beam count (u32)
//! 52      28*N  beams: [number u32, along f64, across f64, vertical f64] * N
//! 52+28N  4     checksum (u32, byte sum of [0, 52+28N))
//! ```
//!
//! Fields are packed with no padding. Byte order is the host's unless the
//! codec is configured otherwise (see [`ByteOrder`](crate::ByteOrder)).
//!
//! ## Streaming
//!
//! The first [`BEAMS_OFFSET`] bytes are enough to learn the beam count and
//! therefore the full packet length, so a transport can read a fixed-size
//! prefix, call [`WireHeader::peek`], and then read exactly the remainder.

mod checksum;
mod codec;

pub use checksum::checksum;
pub use codec::{Decoded, Mb1Codec};

use crate::config::PayloadSizePolicy;
use crate::types::{ByteOrder, SoundingRecord, TypeTag};
use crate::{Mb1Error, Result};

/// Type tag plus payload size.
pub const HEADER_BYTES: usize = 8;
/// Timestamp, latitude, longitude, depth, heading and beam count.
pub const FIXED_FIELDS_BYTES: usize = 5 * 8 + 4;
/// Offset of the first beam; also the minimum decodable prefix.
pub const BEAMS_OFFSET: usize = HEADER_BYTES + FIXED_FIELDS_BYTES;
/// One packed beam.
pub const BEAM_BYTES: usize = 4 + 3 * 8;
pub const CHECKSUM_BYTES: usize = 4;
/// Wire length of a sounding with no beams.
pub const EMPTY_SOUNDING_BYTES: usize = BEAMS_OFFSET + CHECKSUM_BYTES;
/// Beam capacity of the reference fixed-size record.
pub const DEFAULT_MAX_BEAMS: usize = 512;

pub(crate) const SIZE_OFFSET: usize = 4;
pub(crate) const BEAM_COUNT_OFFSET: usize = 48;

/// Total wire length of a sounding with `beam_count` beams.
#[inline]
pub const fn sounding_bytes(beam_count: usize) -> usize {
    EMPTY_SOUNDING_BYTES + beam_count * BEAM_BYTES
}

/// Framing fields read from a packet prefix without decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub type_tag: TypeTag,
    pub declared_size: u32,
    pub beam_count: u32,
}

impl WireHeader {
    /// Read framing fields from the first [`BEAMS_OFFSET`] bytes of `src`.
    ///
    /// Returns `None` when fewer bytes are available.
    pub fn peek(src: &[u8], order: ByteOrder) -> Option<Self> {
        if src.len() < BEAMS_OFFSET {
            return None;
        }
        let tag: [u8; 4] = src[0..4].try_into().ok()?;
        let size: [u8; 4] = src[SIZE_OFFSET..SIZE_OFFSET + 4].try_into().ok()?;
        let count: [u8; 4] = src[BEAM_COUNT_OFFSET..BEAM_COUNT_OFFSET + 4].try_into().ok()?;
        Some(Self {
            type_tag: TypeTag::from_bytes(tag),
            declared_size: order.u32_from_bytes(size),
            beam_count: order.u32_from_bytes(count),
        })
    }

    /// Packet length implied by the beam count.
    pub fn expected_len(&self) -> usize {
        sounding_bytes(self.beam_count as usize)
    }

    /// Whether this prefix looks like the start of a real sounding.
    ///
    /// The resync scanner uses this to reject false sync matches. The tag must
    /// be MB1 and the beam count within `max_beams`. The declared size must
    /// equal the implied length unless `policy` is
    /// [`PayloadSizePolicy::Ignore`].
    pub fn is_consistent(&self, max_beams: usize, policy: PayloadSizePolicy) -> bool {
        let size_ok = policy == PayloadSizePolicy::Ignore
            || self.declared_size as usize == self.expected_len();
        self.type_tag.is_sounding() && (self.beam_count as usize) <= max_beams && size_ok
    }
}

/// Encode `record` into `dst` with the default codec.
///
/// Accepts an optional record for producers that stage pings and may have
/// nothing to send; `None` fails with [`Mb1Error::MissingRecord`].
pub fn deflate(record: Option<&SoundingRecord>, dst: &mut [u8]) -> Result<usize> {
    let record = record.ok_or(Mb1Error::MissingRecord)?;
    Mb1Codec::default().encode(record, dst)
}

/// Decode one sounding from the start of `src` with the default codec.
pub fn inflate(src: &[u8]) -> Result<Decoded> {
    Mb1Codec::default().decode(src)
}
