//! Helpers shared by the integration suites

#![allow(dead_code)]

use mb1wire::{BeamSample, Mb1Codec, SoundingRecord};
use proptest::prelude::*;

/// A plausible ping whose fields vary with `seq`.
pub fn ping(seq: u32, beams: usize) -> SoundingRecord {
    let s = seq as f64;
    SoundingRecord::new(1_700_000_000.0 + 0.2 * s, 36.79, -121.85, 820.0 + s, 0.3).with_beams(
        (0..beams).map(|j| BeamSample::new(j as u32, 0.05 * j as f64, -30.0 + j as f64, 812.0)),
    )
}

pub fn encode(records: &[SoundingRecord]) -> Vec<u8> {
    let codec = Mb1Codec::default();
    records.iter().flat_map(|r| codec.encode_to_vec(r).unwrap()).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

prop_compose! {
    pub fn arb_beam()(
        beam_number in any::<u32>(),
        along_track in -1.0e4f64..1.0e4,
        across_track in -1.0e4f64..1.0e4,
        vertical in -1.0e4f64..1.1e4,
    ) -> BeamSample {
        BeamSample::new(beam_number, along_track, across_track, vertical)
    }
}

prop_compose! {
    pub fn arb_record(max_beams: usize)(
        timestamp in 0.0f64..4.0e9,
        latitude in -90.0f64..90.0,
        longitude in -180.0f64..180.0,
        depth in -10.0f64..11_000.0,
        heading in 0.0f64..std::f64::consts::TAU,
        beams in prop::collection::vec(arb_beam(), 0..=max_beams),
    ) -> SoundingRecord {
        SoundingRecord::new(timestamp, latitude, longitude, depth, heading).with_beams(beams)
    }
}
