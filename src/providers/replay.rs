//! Replay provider for MB1 log files

use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace, warn};

use crate::Result;
use crate::config::ReplayConfig;
use crate::log::Mb1LogReader;
use crate::provider::Provider;
use crate::types::SoundingPacket;
use crate::wire::Mb1Codec;

const MIN_SPEED: f64 = 0.1;
const MAX_SPEED: f64 = 10.0;

/// Replay provider that plays back an MB1 log at a fixed ping rate
pub struct ReplayProvider {
    reader: Mb1LogReader,

    /// Recorded ping rate in Hz
    rate_hz: f64,

    /// Playback speed multiplier (1.0 = recorded rate)
    speed: f64,

    /// Packet pacing interval
    interval: Interval,

    skip_implausible: bool,

    /// Records dropped by the plausibility filter
    skipped: u64,
}

impl ReplayProvider {
    /// Open a log file for replay
    pub fn new<P: AsRef<Path>>(path: P, config: ReplayConfig) -> Result<Self> {
        config.validate()?;
        let codec = Mb1Codec::new(config.codec.clone())?;
        let reader = Mb1LogReader::open_with_codec(path, codec)?;
        Ok(Self::from_reader(reader, &config))
    }

    /// Replay an already indexed log
    pub fn from_reader(reader: Mb1LogReader, config: &ReplayConfig) -> Self {
        info!(
            records = reader.total_records(),
            lost_bytes = reader.lost_bytes(),
            rate_hz = config.rate_hz,
            "Opened MB1 log: {}",
            reader.file_path().display()
        );

        let speed = config.speed.clamp(MIN_SPEED, MAX_SPEED);
        Self {
            reader,
            rate_hz: config.rate_hz,
            speed,
            interval: pacing(config.rate_hz, speed),
            skip_implausible: config.skip_implausible,
            skipped: 0,
        }
    }

    /// Set playback speed, clamped to [0.1, 10]
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.interval = pacing(self.rate_hz, self.speed);
        debug!("Playback speed set to {}x", self.speed);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Seek to a specific record
    pub fn seek_to_record(&mut self, record: usize) -> Result<()> {
        self.reader.seek_to_record(record)?;
        debug!("Seeking to record {}", record);
        Ok(())
    }

    /// Current playback position in seconds of recorded time
    pub fn current_time(&self) -> f64 {
        self.reader.current_record() as f64 / self.rate_hz
    }

    /// Total duration in seconds at the recorded rate
    pub fn duration(&self) -> f64 {
        self.reader.total_records() as f64 / self.rate_hz
    }

    /// Records dropped as implausible so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn reader(&self) -> &Mb1LogReader {
        &self.reader
    }
}

fn pacing(rate_hz: f64, speed: f64) -> Interval {
    let mut interval = interval(Duration::from_secs_f64(1.0 / (rate_hz * speed)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn next_packet(&mut self) -> Result<Option<SoundingPacket>> {
        loop {
            let Some(packet) = self.reader.read_next_record()? else {
                debug!("Reached end of replay");
                return Ok(None);
            };

            if self.skip_implausible {
                if let Err(e) = packet.record.check_plausible() {
                    self.skipped += 1;
                    warn!(sequence = packet.sequence, "Skipping record: {}", e);
                    continue;
                }
            }

            self.interval.tick().await;

            trace!(
                "Record {}/{}: t={:.3} beams={}",
                packet.sequence + 1,
                self.reader.total_records(),
                packet.timestamp(),
                packet.record.beam_count()
            );
            return Ok(Some(packet));
        }
    }

    fn nominal_rate(&self) -> f64 {
        self.rate_hz
    }
}
