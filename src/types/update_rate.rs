//! Update rate control for sounding subscriptions

use serde::{Deserialize, Serialize};

/// Delivery rate for sounding subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every packet as it arrives from the source
    Native,

    /// Throttled to at most this many packets per second.
    /// A cap at or above the source ping rate behaves like Native.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the source ping rate
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if source_hz > 0.0 && hz as f64 >= source_hz => {
                UpdateRate::Native
            }
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Throttle interval, if any, for the given source rate
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
