//! MB1 multibeam sounding codec and stream toolkit.
//!
//! MB1 is the compact binary record a sonar pipeline emits once per ping:
//! vehicle navigation (time, position, depth, heading) plus the seafloor
//! returns of every beam. This crate converts between [`SoundingRecord`]s and
//! their wire bytes, and provides the plumbing around that conversion.
//!
//! # Features
//!
//! - **Wire codec**: [`Mb1Codec`] encode/decode with checksum verification and
//!   distinct errors for every failure mode
//! - **Resynchronizing framer**: recover packets from noisy byte streams
//!   ([`framing`])
//! - **Log files**: index, replay and write MB1 logs ([`log`])
//! - **Async streaming**: subscribe to soundings from a log or a socket with
//!   rate control ([`SoundingConnection`])
//!
//! ## Example (encode and decode)
//!
//! ```rust
//! use mb1wire::{BeamSample, Mb1Codec, SoundingRecord};
//!
//! let ping = SoundingRecord::new(1.0e9, 36.8, -121.9, 1500.0, 1.57)
//!     .with_beams([BeamSample::new(0, 1.0, 2.0, 1500.5)]);
//!
//! let codec = Mb1Codec::default();
//! let mut buf = vec![0u8; codec.required_size(&ping)?];
//! let written = codec.encode(&ping, &mut buf)?;
//!
//! let decoded = codec.decode(&buf[..written])?;
//! assert_eq!(decoded.record, ping);
//! # Ok::<(), mb1wire::Mb1Error>(())
//! ```
//!
//! ## Example (log replay)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use mb1wire::{Mb1, UpdateRate};
//!
//! #[tokio::main]
//! async fn main() -> mb1wire::Result<()> {
//!     let connection = Mb1::open("survey.mb1").await?;
//!     let mut soundings = connection.subscribe(UpdateRate::Max(1));
//!
//!     while let Some(packet) = soundings.next().await {
//!         println!("{}", packet.record);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod logging;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;
pub mod wire;

// Stream framing and files
pub mod framing;
pub mod log;

// Stream-based sounding architecture
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;
pub use wire::{Decoded, Mb1Codec, WireHeader, checksum, deflate, inflate};

pub use config::{CodecConfig, Mb1Config, PayloadSizePolicy, ReplayConfig};
pub use connection::SoundingConnection;
pub use framing::{FrameBuffer, FrameSync, Mb1FrameCodec};
pub use log::{Mb1LogReader, Mb1LogWriter};

use std::path::Path;
use tokio::io::AsyncRead;

/// Unified entry point for sounding connections.
///
/// ## Log Replay
/// ```rust,no_run
/// use mb1wire::Mb1;
///
/// #[tokio::main]
/// async fn main() -> mb1wire::Result<()> {
///     let connection = Mb1::open("survey.mb1").await?;
///     println!("replaying at {}Hz", connection.source_hz());
///     Ok(())
/// }
/// ```
///
/// ## Live Stream
/// ```rust,no_run
/// use mb1wire::Mb1;
/// use tokio::net::TcpStream;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let socket = TcpStream::connect("192.168.1.50:8000").await?;
///     let connection = Mb1::attach(socket)?;
///     Ok(())
/// }
/// ```
pub struct Mb1;

impl Mb1 {
    /// Open an MB1 log for replay with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not readable.
    /// Logs with no valid soundings open successfully and end immediately.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<SoundingConnection> {
        SoundingConnection::open(path, ReplayConfig::default()).await
    }

    /// Open an MB1 log for replay with explicit settings.
    pub async fn open_with<P: AsRef<Path>>(
        path: P,
        config: ReplayConfig,
    ) -> Result<SoundingConnection> {
        SoundingConnection::open(path, config).await
    }

    /// Decode soundings from an already connected byte stream.
    ///
    /// Must be called within a tokio runtime.
    pub fn attach<R>(reader: R) -> Result<SoundingConnection>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        SoundingConnection::from_reader(reader, CodecConfig::default())
    }
}
