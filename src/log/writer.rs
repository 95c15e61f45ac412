//! MB1 log file writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::SoundingRecord;
use crate::wire::Mb1Codec;
use crate::{Mb1Error, Result};

/// Appends encoded soundings to any `Write` sink.
///
/// Packets are written back to back with no extra framing, which is the
/// layout [`Mb1LogReader`](super::Mb1LogReader) and MB1 stream consumers expect.
#[derive(Debug)]
pub struct Mb1LogWriter<W: Write> {
    sink: W,
    codec: Mb1Codec,
    scratch: Vec<u8>,
    records_written: u64,
    bytes_written: u64,
}

impl Mb1LogWriter<BufWriter<File>> {
    /// Create (or truncate) a log file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Mb1Error::file_error(path.to_path_buf(), e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Mb1LogWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_codec(sink, Mb1Codec::default())
    }

    pub fn with_codec(sink: W, codec: Mb1Codec) -> Self {
        Self { sink, codec, scratch: Vec::new(), records_written: 0, bytes_written: 0 }
    }

    /// Encode and append one sounding; returns its wire length.
    pub fn write_record(&mut self, record: &SoundingRecord) -> Result<usize> {
        let len = self.codec.required_size(record)?;
        self.scratch.resize(len, 0);
        let written = self.codec.encode(record, &mut self.scratch)?;
        self.sink
            .write_all(&self.scratch[..written])
            .map_err(|e| Mb1Error::io_error("writing MB1 log record", e))?;
        self.records_written += 1;
        self.bytes_written += written as u64;
        Ok(written)
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(|e| Mb1Error::io_error("flushing MB1 log", e))
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Mb1LogReader;
    use crate::test_utils::{encode_all, sample_sounding};
    use crate::types::TypeTag;

    #[test]
    fn writes_back_to_back_packets() {
        let records = [sample_sounding(1, 2), sample_sounding(2, 0), sample_sounding(3, 5)];
        let mut writer = Mb1LogWriter::new(Vec::new());
        for record in &records {
            writer.write_record(record).unwrap();
        }
        assert_eq!(writer.records_written(), 3);
        assert_eq!(writer.bytes_written(), (112 + 56 + 196) as u64);

        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes, encode_all(&records));
    }

    #[test]
    fn rejected_record_writes_nothing() {
        let mut writer = Mb1LogWriter::new(Vec::new());
        let mut foreign = sample_sounding(1, 1);
        foreign.type_tag = TypeTag(*b"GPS\0");
        assert!(matches!(
            writer.write_record(&foreign),
            Err(Mb1Error::InvalidRecordKind { .. })
        ));
        assert_eq!(writer.records_written(), 0);
        assert!(writer.into_inner().unwrap().is_empty());
    }

    #[test]
    fn written_log_reads_back() {
        let mut writer = Mb1LogWriter::new(Vec::new());
        for i in 0..10 {
            writer.write_record(&sample_sounding(i, (i % 4) as usize)).unwrap();
        }
        let reader = Mb1LogReader::from_bytes(&writer.into_inner().unwrap());
        assert_eq!(reader.total_records(), 10);
        assert_eq!(reader.lost_bytes(), 0);
    }
}
