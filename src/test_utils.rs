//! Test utilities: sample soundings and temporary log files
//!
//! Shared by unit tests and, through the `benchmark` feature, by the
//! criterion benches.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::{BeamSample, SoundingRecord};
use crate::wire::Mb1Codec;

/// The two-beam Monterey Bay ping used throughout the wire tests.
pub fn monterey_ping() -> SoundingRecord {
    SoundingRecord::new(1_000_000_000.0, 36.8, -121.9, 1500.0, 1.57).with_beams([
        BeamSample::new(0, 1.0, 2.0, 1500.5),
        BeamSample::new(1, 1.1, 2.1, 1501.0),
    ])
}

/// A plausible sounding whose fields all vary with `seq`.
///
/// Pings are 0.2 s apart, matching a 5 Hz sonar.
pub fn sample_sounding(seq: u32, beam_count: usize) -> SoundingRecord {
    let s = seq as f64;
    let beams = (0..beam_count).map(|j| {
        let j = j as f64;
        BeamSample::new(j as u32, 0.1 * j, -64.0 + 0.5 * j, 1490.0 + s + 0.25 * j)
    });
    SoundingRecord::new(1_600_000_000.0 + 0.2 * s, 36.8 + 1e-5 * s, -121.9, 1500.0 + s, 0.01 * s)
        .with_beams(beams)
}

/// Concatenate `records` as they would appear on an MB1 stream.
///
/// # Panics
///
/// Panics if a record cannot be encoded with the default codec.
pub fn encode_all(records: &[SoundingRecord]) -> Vec<u8> {
    let codec = Mb1Codec::default();
    records
        .iter()
        .flat_map(|r| codec.encode_to_vec(r).expect("sample records encode"))
        .collect()
}

/// A log file in the system temp directory, removed on drop.
///
/// Unit tests only.
#[cfg(test)]
#[derive(Debug)]
pub struct TempLog {
    file: tempfile::NamedTempFile,
}

#[cfg(test)]
impl TempLog {
    /// Write `bytes` to a fresh file whose name starts with `name`.
    pub fn new(name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .prefix(&format!("mb1wire-{name}-"))
            .suffix(".mb1")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}
