//! Driver spawns and manages the sounding reader task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use super::provider::Provider;
use super::types::SoundingPacket;

/// Consecutive provider errors tolerated before the driver gives up
pub const MAX_ERRORS: u32 = 10;

/// Running totals published by the reader task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub packets: u64,
    /// Bytes skipped by the source while resynchronizing
    pub lost_bytes: u64,
    /// Provider errors since the task started
    pub errors: u64,
    /// Set once the task has stopped
    pub finished: bool,
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest sounding; `None` until the first one arrives. The sender is
    /// dropped when the source ends, which closes every subscriber stream.
    pub packets: watch::Receiver<Option<Arc<SoundingPacket>>>,
    pub stats: watch::Receiver<DriverStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the sounding reader task
///
/// The task owns the provider and publishes each sounding to a watch channel.
/// Subscribers always see the most recent sounding; a slow subscriber skips
/// intermediate ones rather than back-pressuring the source.
pub struct Driver;

impl Driver {
    /// Spawn the reader task for the given provider
    pub fn spawn<P>(provider: P) -> DriverChannels
    where
        P: Provider,
    {
        let (packet_tx, packet_rx) = watch::channel(None);
        let (stats_tx, stats_rx) = watch::channel(DriverStats::default());
        let cancel = CancellationToken::new();
        let cancel_reader = cancel.clone();

        tokio::spawn(async move {
            Self::reader_task(provider, packet_tx, stats_tx, cancel_reader).await;
        });

        DriverChannels { packets: packet_rx, stats: stats_rx, cancel }
    }

    async fn reader_task<P>(
        mut provider: P,
        packet_tx: watch::Sender<Option<Arc<SoundingPacket>>>,
        stats_tx: watch::Sender<DriverStats>,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        info!("Sounding reader task started");
        let mut stats = DriverStats::default();
        let mut error_count = 0u32;

        loop {
            if cancel.is_cancelled() {
                info!("Sounding reader cancelled");
                break;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Sounding reader cancelled during read");
                    break;
                }
                result = provider.next_packet() => result,
            };

            match result {
                Ok(Some(packet)) => {
                    error_count = 0;
                    stats.packets += 1;
                    stats.lost_bytes += packet.lost_bytes;

                    trace!(
                        "Sounding {}: t={:.3} beams={}",
                        packet.sequence,
                        packet.timestamp(),
                        packet.record.beam_count()
                    );

                    if packet_tx.send(Some(Arc::new(packet))).is_err() {
                        debug!("Sounding receiver dropped, shutting down");
                        break;
                    }
                    let _ = stats_tx.send(stats);
                }
                Ok(None) => {
                    info!("Provider ended after {} soundings", stats.packets);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    stats.errors += 1;
                    let _ = stats_tx.send(stats);
                    error!("Provider error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if error_count >= MAX_ERRORS {
                        error!("Too many provider errors, shutting down");
                        break;
                    }

                    tokio::time::sleep(backoff(error_count)).await;
                }
            }
        }

        stats.finished = true;
        let _ = stats_tx.send(stats);
        info!("Sounding reader task ended (processed {} soundings)", stats.packets);
    }
}

/// Exponential backoff: 100ms, 200ms, 400ms, ... capped at 1.6s
fn backoff(error_count: u32) -> Duration {
    Duration::from_millis(50 * (1 << error_count.min(5)))
}
