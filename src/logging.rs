//! Tracing subscriber setup for binaries and tools built on this crate.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the application's choice. `RUST_LOG` overrides the configured level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::LoggingConfig;
use crate::{Mb1Error, Result};

/// Install a global fmt subscriber.
///
/// Fails with [`Mb1Error::LoggingInit`] if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Mb1Error::LoggingInit(format!("invalid level {:?}: {}", config.level, e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(config.ansi).with_target(true))
        .try_init()
        .map_err(|e| Mb1Error::LoggingInit(e.to_string()))
}
