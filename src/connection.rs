//! Subscribable sounding connections

use futures::{Stream, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::{CodecConfig, ReplayConfig};
use crate::driver::{Driver, DriverStats};
use crate::provider::Provider;
use crate::providers::{ReplayProvider, StreamProvider};
use crate::stream::ThrottleExt;
use crate::types::{SoundingPacket, UpdateRate};
use crate::wire::Mb1Codec;

const FIRST_PACKET_TIMEOUT: Duration = Duration::from_secs(5);

/// A running sounding source that any number of subscribers can read.
///
/// Dropping the connection stops the background reader.
pub struct SoundingConnection {
    packets: watch::Receiver<Option<Arc<SoundingPacket>>>,
    stats: watch::Receiver<DriverStats>,
    source_hz: f64,
    cancel: CancellationToken,
}

impl SoundingConnection {
    /// Open an MB1 log for paced replay.
    ///
    /// Waits for the first sounding before returning so subscribers start
    /// with data available.
    pub async fn open<P: AsRef<Path>>(path: P, config: ReplayConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening MB1 log: {}", path.display());

        let provider = ReplayProvider::new(path, config)?;
        let connection = Self::from_provider(provider);

        let mut packets = connection.packets.clone();
        match tokio::time::timeout(FIRST_PACKET_TIMEOUT, packets.wait_for(Option::is_some)).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => warn!("MB1 log produced no soundings"),
            Err(_) => warn!("Timeout waiting for first sounding from replay"),
        }

        info!("Replay connection opened ({}Hz)", connection.source_hz);
        Ok(connection)
    }

    /// Decode soundings from a pipe, socket or other byte stream.
    ///
    /// Must be called within a tokio runtime.
    pub fn from_reader<R>(reader: R, config: CodecConfig) -> Result<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let codec = Mb1Codec::new(config)?;
        Ok(Self::from_provider(StreamProvider::new(reader, codec)))
    }

    /// Drive any provider.
    pub fn from_provider<P: Provider>(provider: P) -> Self {
        let source_hz = provider.nominal_rate();
        let channels = Driver::spawn(provider);
        Self {
            packets: channels.packets,
            stats: channels.stats,
            source_hz,
            cancel: channels.cancel,
        }
    }

    /// Subscribe to soundings.
    ///
    /// The stream ends when the source does. Subscribers that fall behind
    /// skip to the newest sounding.
    pub fn subscribe(
        &self,
        rate: UpdateRate,
    ) -> impl Stream<Item = Arc<SoundingPacket>> + 'static {
        let packets = WatchStream::new(self.packets.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.source_hz) {
            None => packets.boxed(),
            Some(interval) => {
                debug!(?interval, "Throttled sounding subscription");
                packets.throttle(interval).boxed()
            }
        }
    }

    /// Most recent sounding, if any has arrived.
    pub fn latest(&self) -> Option<Arc<SoundingPacket>> {
        self.packets.borrow().clone()
    }

    pub fn stats(&self) -> DriverStats {
        *self.stats.borrow()
    }

    /// Whether the reader has stopped.
    pub fn is_finished(&self) -> bool {
        self.stats.borrow().finished
    }

    /// Nominal ping rate of the source in Hz (0.0 when unknown)
    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }

    /// Stop the background reader; open subscriptions end.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SoundingConnection {
    fn drop(&mut self) {
        debug!("Dropping sounding connection");
        self.cancel.cancel();
    }
}
