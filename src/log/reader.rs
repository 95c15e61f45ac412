//! MB1 log file reader for sounding replay
//!
//! A log is a bare concatenation of MB1 packets, usually captured from the
//! sonar's TCP stream, so it may start mid-packet or contain corrupted
//! stretches. The reader indexes every valid sounding at open time and then
//! serves them sequentially or by index.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mb1wire::log::Mb1LogReader;
//!
//! fn dump() -> mb1wire::Result<()> {
//!     let mut reader = Mb1LogReader::open("survey.mb1")?;
//!     println!("{} soundings, {} bytes lost", reader.total_records(), reader.lost_bytes());
//!
//!     while let Some(packet) = reader.read_next_record()? {
//!         println!("{:.3} {} beams", packet.timestamp(), packet.record.beam_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Performance Notes
//!
//! - The file is loaded into memory once; seeking is O(1)
//! - Records are decoded on read, so indexing cost is one validation pass

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::framing::{FrameSync, Scan, SyncStats};
use crate::types::SoundingPacket;
use crate::wire::Mb1Codec;
use crate::{Mb1Error, Result};

/// Location of one valid sounding inside the log.
#[derive(Debug, Clone, Copy)]
struct RecordIndex {
    offset: usize,
    len: usize,
    lost_before: u64,
}

/// In-memory reader over an MB1 log.
pub struct Mb1LogReader {
    data: Vec<u8>,
    path: PathBuf,
    codec: Mb1Codec,
    index: Vec<RecordIndex>,
    stats: SyncStats,
    current_record: usize,
}

impl Mb1LogReader {
    /// Open a log with the default codec.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_codec(path, Mb1Codec::default())
    }

    /// Open a log with explicit codec settings.
    pub fn open_with_codec<P: AsRef<Path>>(path: P, codec: Mb1Codec) -> Result<Self> {
        let path = path.as_ref();
        let mut file =
            File::open(path).map_err(|e| Mb1Error::file_error(path.to_path_buf(), e))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| Mb1Error::file_error(path.to_path_buf(), e))?;

        Ok(Self::index(data, path.to_path_buf(), codec))
    }

    /// Create a reader over in-memory bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::index(data.to_vec(), PathBuf::from("<memory>"), Mb1Codec::default())
    }

    fn index(data: Vec<u8>, path: PathBuf, codec: Mb1Codec) -> Self {
        let mut sync = FrameSync::new(codec.clone());
        let mut index = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            match sync.scan_final(&data[pos..]) {
                Scan::Frame { offset, decoded } => {
                    index.push(RecordIndex {
                        offset: pos + offset,
                        len: decoded.bytes_consumed,
                        lost_before: offset as u64,
                    });
                    pos += offset + decoded.bytes_consumed;
                }
                Scan::Incomplete { .. } => break,
            }
        }

        let stats = sync.stats();
        let tail = (data.len() - pos) as u64;
        if tail > 0 {
            warn!(bytes = tail, path = %path.display(), "MB1 log ends without a complete packet");
        }
        if stats.checksum_failures > 0 {
            warn!(
                failures = stats.checksum_failures,
                path = %path.display(),
                "MB1 log contains packets with bad checksums"
            );
        }
        debug!(
            records = index.len(),
            lost_bytes = stats.lost_bytes,
            path = %path.display(),
            "Indexed MB1 log"
        );

        Self { data, path, codec, index, stats, current_record: 0 }
    }

    /// Number of valid soundings in the log.
    pub fn total_records(&self) -> usize {
        self.index.len()
    }

    /// Index of the record the next read returns.
    pub fn current_record(&self) -> usize {
        self.current_record
    }

    /// Bytes in the log that belong to no valid sounding.
    pub fn lost_bytes(&self) -> u64 {
        self.stats.lost_bytes
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> &Mb1Codec {
        &self.codec
    }

    /// Timestamps of the first and last soundings, if any.
    pub fn time_span(&self) -> Result<Option<(f64, f64)>> {
        if self.index.is_empty() {
            return Ok(None);
        }
        let first = self.decode_at(0)?.timestamp();
        let last = self.decode_at(self.index.len() - 1)?.timestamp();
        Ok(Some((first, last)))
    }

    /// Seek to a record (for random access).
    pub fn seek_to_record(&mut self, record: usize) -> Result<()> {
        if record >= self.index.len() {
            return Err(Mb1Error::RecordOutOfRange { record, total: self.index.len() });
        }
        self.current_record = record;
        Ok(())
    }

    /// Rewind to the first record.
    pub fn rewind(&mut self) {
        self.current_record = 0;
    }

    /// Read the next sounding, or `None` at end of log.
    ///
    /// The packet sequence is the record index.
    pub fn read_next_record(&mut self) -> Result<Option<SoundingPacket>> {
        if self.current_record >= self.index.len() {
            return Ok(None);
        }
        let packet = self.decode_at(self.current_record)?;
        self.current_record += 1;
        Ok(Some(packet))
    }

    fn decode_at(&self, position: usize) -> Result<SoundingPacket> {
        let entry = self.index[position];
        let decoded = self.codec.decode(&self.data[entry.offset..entry.offset + entry.len])?;
        Ok(SoundingPacket::new(
            decoded.record,
            position as u64,
            decoded.bytes_consumed,
            decoded.checksum,
            entry.lost_before,
        ))
    }
}

impl std::fmt::Debug for Mb1LogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mb1LogReader")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .field("records", &self.index.len())
            .field("current_record", &self.current_record)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TempLog, encode_all, sample_sounding};
    use anyhow::{Context, Result, ensure};

    #[test]
    fn reads_records_in_order() -> Result<()> {
        let records: Vec<_> = (1..=4).map(|i| sample_sounding(i, 2)).collect();
        let mut reader = Mb1LogReader::from_bytes(&encode_all(&records));

        ensure!(reader.total_records() == 4, "expected 4 records");
        for (i, expected) in records.iter().enumerate() {
            let packet = reader.read_next_record()?.context("record missing")?;
            assert_eq!(packet.sequence, i as u64);
            assert_eq!(*packet.record, *expected);
        }
        assert!(reader.read_next_record()?.is_none());
        assert_eq!(reader.lost_bytes(), 0);
        Ok(())
    }

    #[test]
    fn seek_and_rewind() -> Result<()> {
        let records: Vec<_> = (1..=3).map(|i| sample_sounding(i, 1)).collect();
        let mut reader = Mb1LogReader::from_bytes(&encode_all(&records));

        reader.seek_to_record(2)?;
        let packet = reader.read_next_record()?.context("record missing")?;
        assert_eq!(packet.sequence, 2);
        assert_eq!(*packet.record, records[2]);

        assert!(matches!(
            reader.seek_to_record(3),
            Err(Mb1Error::RecordOutOfRange { record: 3, total: 3 })
        ));
        reader.rewind();
        assert_eq!(reader.current_record(), 0);
        Ok(())
    }

    #[test]
    fn noisy_log_reports_lost_bytes() -> Result<()> {
        let mut data = vec![0xAAu8; 7];
        data.extend(encode_all(&[sample_sounding(1, 2)]));
        data.extend_from_slice(b"junk");
        data.extend(encode_all(&[sample_sounding(2, 2)]));
        data.extend_from_slice(&encode_all(&[sample_sounding(3, 2)])[..40]);

        let mut reader = Mb1LogReader::from_bytes(&data);
        assert_eq!(reader.total_records(), 2);
        assert_eq!(reader.lost_bytes(), 7 + 4 + 40);

        let first = reader.read_next_record()?.context("first")?;
        assert_eq!(first.lost_bytes, 7);
        let second = reader.read_next_record()?.context("second")?;
        assert_eq!(second.lost_bytes, 4);
        Ok(())
    }

    #[test]
    fn truncated_packet_does_not_hide_the_next_one() -> Result<()> {
        let big = encode_all(&[sample_sounding(1, 400)]);
        let mut data = big[..200].to_vec();
        data.extend(encode_all(&[sample_sounding(2, 2)]));

        let mut reader = Mb1LogReader::from_bytes(&data);
        ensure!(reader.total_records() == 1, "expected the 2-beam record to be indexed");
        assert_eq!(reader.lost_bytes(), 200);

        let packet = reader.read_next_record()?.context("record missing")?;
        assert_eq!(*packet.record, sample_sounding(2, 2));
        assert_eq!(packet.lost_bytes, 200);
        Ok(())
    }

    #[test]
    fn time_span_covers_first_and_last() -> Result<()> {
        let records: Vec<_> = (1..=3).map(|i| sample_sounding(i, 1)).collect();
        let reader = Mb1LogReader::from_bytes(&encode_all(&records));
        let (start, end) = reader.time_span()?.context("empty log")?;
        assert_eq!(start, records[0].timestamp);
        assert_eq!(end, records[2].timestamp);
        assert!(Mb1LogReader::from_bytes(&[]).time_span()?.is_none());
        Ok(())
    }

    #[test]
    fn open_reads_from_disk() -> Result<()> {
        let log = TempLog::new("reader_open", &encode_all(&[sample_sounding(5, 3)]))?;
        let mut reader = Mb1LogReader::open(log.path())?;
        assert_eq!(reader.file_path(), log.path());
        let packet = reader.read_next_record()?.context("record missing")?;
        assert_eq!(packet.record.beam_count(), 3);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = Mb1LogReader::open("/nonexistent/survey.mb1").unwrap_err();
        assert!(matches!(err, Mb1Error::File { .. }));
    }
}
