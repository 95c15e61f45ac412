//! Sounding encoder and decoder

use super::{BEAMS_OFFSET, CHECKSUM_BYTES, HEADER_BYTES, WireHeader, checksum, sounding_bytes};
use crate::config::{CodecConfig, PayloadSizePolicy};
use crate::types::{BeamSample, ByteOrder, SoundingRecord};
use crate::{Mb1Error, Result};

/// A successfully decoded sounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub record: SoundingRecord,
    /// Wire length of the packet; equals `sounding_bytes(beam_count)`.
    pub bytes_consumed: usize,
    /// Verified checksum value.
    pub checksum: u32,
    /// Payload size field as received.
    pub declared_size: u32,
    size_mismatch: bool,
}

impl Decoded {
    /// Whether the payload size field equals the packet's wire length.
    pub fn payload_size_matches(&self) -> bool {
        self.declared_size as usize == self.bytes_consumed
    }

    /// Declared and computed sizes when they disagreed under the `Flag` policy.
    pub fn payload_size_mismatch(&self) -> Option<(u32, usize)> {
        self.size_mismatch.then_some((self.declared_size, self.bytes_consumed))
    }
}

/// Bidirectional converter between [`SoundingRecord`] and wire bytes.
///
/// The codec is a pure transformation: no I/O, no logging, no shared state.
/// One instance can be used from many threads at once.
#[derive(Debug, Clone)]
pub struct Mb1Codec {
    config: CodecConfig,
}

impl Default for Mb1Codec {
    fn default() -> Self {
        Self { config: CodecConfig::default() }
    }
}

impl Mb1Codec {
    /// Create a codec from validated settings.
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.config.byte_order
    }

    pub fn max_beams(&self) -> usize {
        self.config.max_beams
    }

    /// Wire length `encode` would produce for `record`, without writing.
    pub fn required_size(&self, record: &SoundingRecord) -> Result<usize> {
        if !record.type_tag.is_sounding() {
            return Err(Mb1Error::InvalidRecordKind { found: *record.type_tag.as_bytes() });
        }
        let beam_count = record.beam_count();
        if beam_count > self.config.max_beams {
            return Err(Mb1Error::TooManyBeams { beam_count, max_beams: self.config.max_beams });
        }
        Ok(sounding_bytes(beam_count))
    }

    /// Serialize `record` into the start of `dst` and return the bytes written.
    ///
    /// On success the whole of `dst` is zeroed before the packet is written,
    /// so bytes past the returned length are always zero. On failure `dst`
    /// is left untouched.
    ///
    /// ```rust
    /// use mb1wire::{BeamSample, Mb1Codec, Mb1Error, SoundingRecord};
    ///
    /// let codec = Mb1Codec::default();
    /// let ping = SoundingRecord::new(1.0e9, 36.8, -121.9, 1500.0, 1.57)
    ///     .with_beams([BeamSample::new(0, 1.0, 2.0, 1500.5)]);
    ///
    /// let mut small = [0u8; 64];
    /// assert!(matches!(
    ///     codec.encode(&ping, &mut small),
    ///     Err(Mb1Error::BufferTooSmall { required: 84, capacity: 64 })
    /// ));
    ///
    /// let mut buf = [0u8; 128];
    /// assert_eq!(codec.encode(&ping, &mut buf)?, 84);
    /// # Ok::<(), Mb1Error>(())
    /// ```
    pub fn encode(&self, record: &SoundingRecord, dst: &mut [u8]) -> Result<usize> {
        let required = self.required_size(record)?;
        if required > dst.len() {
            return Err(Mb1Error::BufferTooSmall { required, capacity: dst.len() });
        }

        dst.fill(0);
        let order = self.config.byte_order;
        let body_len = required - CHECKSUM_BYTES;
        {
            let mut w = FieldWriter::new(&mut dst[..body_len], order);
            w.put_bytes(record.type_tag.as_bytes());
            w.put_u32(required as u32);
            w.put_f64(record.timestamp);
            w.put_f64(record.latitude);
            w.put_f64(record.longitude);
            w.put_f64(record.depth);
            w.put_f64(record.heading);
            w.put_u32(record.beam_count() as u32);
            for beam in &record.beams {
                w.put_u32(beam.beam_number);
                w.put_f64(beam.along_track);
                w.put_f64(beam.across_track);
                w.put_f64(beam.vertical);
            }
            debug_assert_eq!(w.position(), body_len);
        }

        let sum = checksum(&dst[..body_len]);
        dst[body_len..required].copy_from_slice(&order.u32_to_bytes(sum));
        Ok(required)
    }

    /// Serialize `record` into a freshly allocated, exactly sized buffer.
    pub fn encode_to_vec(&self, record: &SoundingRecord) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.required_size(record)?];
        let written = self.encode(record, &mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Parse one sounding from the start of `src`.
    ///
    /// Validation order: minimum prefix, type tag, beam limit, full length,
    /// checksum, and finally the payload size field according to the
    /// configured [`PayloadSizePolicy`]. Trailing bytes past the packet are
    /// ignored; `bytes_consumed` says where the next packet starts.
    pub fn decode(&self, src: &[u8]) -> Result<Decoded> {
        let order = self.config.byte_order;

        let header = WireHeader::peek(src, order).ok_or(Mb1Error::PacketTooShort {
            available: src.len(),
            minimum: BEAMS_OFFSET,
        })?;

        if !header.type_tag.is_sounding() {
            return Err(Mb1Error::WrongRecordKind { found: *header.type_tag.as_bytes() });
        }

        let mut r = FieldReader::new(src, order);
        r.skip(HEADER_BYTES);
        let timestamp = r.f64();
        let latitude = r.f64();
        let longitude = r.f64();
        let depth = r.f64();
        let heading = r.f64();
        let beam_count = r.u32();

        let beams_len = beam_count as usize;
        if beams_len > self.config.max_beams {
            return Err(Mb1Error::TooManyBeams {
                beam_count: beams_len,
                max_beams: self.config.max_beams,
            });
        }

        let required = sounding_bytes(beams_len);
        if src.len() < required {
            return Err(Mb1Error::PacketIncomplete {
                beam_count,
                required,
                available: src.len(),
            });
        }

        let mut beams = Vec::with_capacity(beams_len);
        for _ in 0..beams_len {
            beams.push(BeamSample {
                beam_number: r.u32(),
                along_track: r.f64(),
                across_track: r.f64(),
                vertical: r.f64(),
            });
        }

        let body_len = required - CHECKSUM_BYTES;
        debug_assert_eq!(r.position(), body_len);
        let received = r.u32();
        let computed = checksum(&src[..body_len]);
        if received != computed {
            return Err(Mb1Error::ChecksumMismatch { received, computed });
        }

        let size_mismatch = header.declared_size as usize != required;
        let size_mismatch = match self.config.payload_size_policy {
            PayloadSizePolicy::Ignore => false,
            PayloadSizePolicy::Flag => size_mismatch,
            PayloadSizePolicy::Reject if size_mismatch => {
                return Err(Mb1Error::PayloadSizeMismatch {
                    declared: header.declared_size,
                    computed: required,
                });
            }
            PayloadSizePolicy::Reject => false,
        };

        Ok(Decoded {
            record: SoundingRecord {
                type_tag: header.type_tag,
                timestamp,
                latitude,
                longitude,
                depth,
                heading,
                beams,
            },
            bytes_consumed: required,
            checksum: computed,
            declared_size: header.declared_size,
            size_mismatch,
        })
    }

    /// Decode into an existing record, replacing it only on success.
    ///
    /// Returns the number of bytes consumed. On any error `out` is unchanged.
    pub fn decode_into(&self, src: &[u8], out: &mut SoundingRecord) -> Result<usize> {
        let decoded = self.decode(src)?;
        *out = decoded.record;
        Ok(decoded.bytes_consumed)
    }
}

impl From<CodecConfig> for Mb1Codec {
    /// Builds a codec without validation; encode and decode still bound-check
    /// every beam count against `max_beams`.
    fn from(config: CodecConfig) -> Self {
        Self { config }
    }
}

/// Sequential field writer over a buffer already checked to be large enough.
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u32(&mut self, v: u32) {
        let bytes = self.order.u32_to_bytes(v);
        self.put_bytes(&bytes);
    }

    fn put_f64(&mut self, v: f64) {
        let bytes = self.order.f64_to_bytes(v);
        self.put_bytes(&bytes);
    }
}

/// Sequential field reader over a buffer already checked to be large enough.
struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u32(&mut self) -> u32 {
        let bytes = self.take::<4>();
        self.order.u32_from_bytes(bytes)
    }

    fn f64(&mut self) -> f64 {
        let bytes = self.take::<8>();
        self.order.f64_from_bytes(bytes)
    }
}
