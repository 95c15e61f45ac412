//! Configuration for the codec, replay and logging layers.
//!
//! All settings have defaults that match deployed MB1 producers, so an empty
//! document is a valid configuration:
//!
//! ```rust
//! use mb1wire::config::{Mb1Config, PayloadSizePolicy};
//! use mb1wire::ByteOrder;
//!
//! let config = Mb1Config::from_yaml_str(
//!     "codec:\n  max_beams: 1024\n  byte_order: little\nreplay:\n  rate_hz: 2.5\n",
//! )?;
//! assert_eq!(config.codec.max_beams, 1024);
//! assert_eq!(config.codec.byte_order, ByteOrder::Little);
//! assert_eq!(config.codec.payload_size_policy, PayloadSizePolicy::Flag);
//! # Ok::<(), mb1wire::Mb1Error>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::ByteOrder;
use crate::wire::DEFAULT_MAX_BEAMS;
use crate::{Mb1Error, Result};

/// How the decoder treats a `payload_size` header that disagrees with the
/// size implied by the beam count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSizePolicy {
    /// Do not compare.
    Ignore,
    /// Compare and report the result on the decoded packet; never fail.
    #[default]
    Flag,
    /// Fail decoding with `PayloadSizeMismatch`.
    Reject,
}

/// Wire codec settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub byte_order: ByteOrder,
    /// Largest beam count accepted by encode and decode.
    pub max_beams: usize,
    pub payload_size_policy: PayloadSizePolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Native,
            max_beams: DEFAULT_MAX_BEAMS,
            payload_size_policy: PayloadSizePolicy::Flag,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_beams == 0 {
            return Err(Mb1Error::config_error("codec", "max_beams must be positive"));
        }
        // beam_count is a u32 on the wire and the total length must fit the u32 size field
        let max_wire_beams = (u32::MAX as usize - crate::wire::EMPTY_SOUNDING_BYTES)
            / crate::wire::BEAM_BYTES;
        if self.max_beams > max_wire_beams {
            return Err(Mb1Error::config_error(
                "codec",
                format!("max_beams {} exceeds wire limit {}", self.max_beams, max_wire_beams),
            ));
        }
        Ok(())
    }
}

/// Log file replay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Nominal ping rate of the recording, in Hz.
    pub rate_hz: f64,
    /// Playback speed multiplier, clamped to [0.1, 10].
    pub speed: f64,
    /// Drop soundings that fail `SoundingRecord::check_plausible`.
    pub skip_implausible: bool,
    pub codec: CodecConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { rate_hz: 5.0, speed: 1.0, skip_implausible: false, codec: CodecConfig::default() }
    }
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0) {
            return Err(Mb1Error::config_error(
                "replay",
                format!("rate_hz must be positive, got {}", self.rate_hz),
            ));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(Mb1Error::config_error(
                "replay",
                format!("speed must be positive, got {}", self.speed),
            ));
        }
        self.codec.validate()
    }
}

/// Logging subscriber settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), ansi: true }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mb1Config {
    pub codec: CodecConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

impl Mb1Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Mb1Config = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Mb1Error::config_error("YAML parsing", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Mb1Error::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        self.codec.validate()?;
        self.replay.validate()
    }
}
