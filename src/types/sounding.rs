//! In-memory sounding record model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Mb1Error, Result};

/// Four-byte record type tag carried at the start of every packet.
///
/// Sounding packets use `"MB1"` followed by a fourth byte that is normally NUL.
/// Only the first three bytes identify the kind; the fourth is carried through
/// encode and decode unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTag(pub [u8; 4]);

impl TypeTag {
    /// The MB1 sounding tag, `"MB1\0"`.
    pub const MB1: TypeTag = TypeTag(*b"MB1\0");

    /// Significant prefix that identifies a sounding.
    pub const SOUNDING_PREFIX: [u8; 3] = *b"MB1";

    /// Build a tag from the first four bytes of a packet.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        TypeTag(bytes)
    }

    /// Raw tag bytes as written on the wire.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether this tag identifies an MB1 sounding.
    pub fn is_sounding(&self) -> bool {
        self.0[..3] == Self::SOUNDING_PREFIX
    }
}

impl Default for TypeTag {
    fn default() -> Self {
        TypeTag::MB1
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// One beam's position relative to the sonar mount point, in meters.
///
/// `vertical` is positive down. Beam 0 is the port-most beam.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamSample {
    pub beam_number: u32,
    pub along_track: f64,
    pub across_track: f64,
    pub vertical: f64,
}

impl BeamSample {
    pub fn new(beam_number: u32, along_track: f64, across_track: f64, vertical: f64) -> Self {
        Self { beam_number, along_track, across_track, vertical }
    }
}

/// One ping: navigation context plus its beams.
///
/// The beam count is always the length of `beams`, so the count written to
/// the wire can never disagree with the beams that follow it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoundingRecord {
    pub type_tag: TypeTag,
    /// Epoch seconds.
    pub timestamp: f64,
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Vehicle depth in meters.
    pub depth: f64,
    /// Radians.
    pub heading: f64,
    pub beams: Vec<BeamSample>,
}

impl SoundingRecord {
    /// Create an MB1 sounding with no beams.
    pub fn new(timestamp: f64, latitude: f64, longitude: f64, depth: f64, heading: f64) -> Self {
        Self {
            type_tag: TypeTag::MB1,
            timestamp,
            latitude,
            longitude,
            depth,
            heading,
            beams: Vec::new(),
        }
    }

    /// Replace the beam array.
    pub fn with_beams(mut self, beams: impl IntoIterator<Item = BeamSample>) -> Self {
        self.beams = beams.into_iter().collect();
        self
    }

    /// Append one beam.
    pub fn push_beam(&mut self, beam: BeamSample) {
        self.beams.push(beam);
    }

    /// Number of beams in this ping.
    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    /// Reject navigation that a log player would refuse to hand to TRN.
    ///
    /// A sounding is implausible when it has no beams, a non-positive
    /// timestamp, or any of latitude, longitude and depth inside (-1, 1).
    pub fn check_plausible(&self) -> Result<()> {
        let near_zero = |v: f64| v > -1.0 && v < 1.0;

        if self.beams.is_empty() {
            return Err(Mb1Error::implausible("sounding has no beams"));
        }
        if self.timestamp <= 0.0 {
            return Err(Mb1Error::implausible(format!(
                "timestamp {:.3} is not positive",
                self.timestamp
            )));
        }
        if near_zero(self.latitude) || near_zero(self.longitude) || near_zero(self.depth) {
            return Err(Mb1Error::implausible(format!(
                "lat/lon/depth [{:.3}, {:.3}, {:.3}] near zero",
                self.latitude, self.longitude, self.depth
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SoundingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type      {}", self.type_tag)?;
        writeln!(f, "timestamp {:.3}", self.timestamp)?;
        writeln!(f, "lat       {:.6}", self.latitude)?;
        writeln!(f, "lon       {:.6}", self.longitude)?;
        writeln!(f, "depth     {:.3}", self.depth)?;
        writeln!(f, "heading   {:.4}", self.heading)?;
        write!(f, "beams     {}", self.beam_count())?;
        if f.alternate() {
            for beam in &self.beams {
                write!(
                    f,
                    "\n  n[{:03}] atrk[{:+10.3}] ctrk[{:+10.3}] vert[{:+10.3}]",
                    beam.beam_number, beam.along_track, beam.across_track, beam.vertical
                )?;
            }
        }
        Ok(())
    }
}
