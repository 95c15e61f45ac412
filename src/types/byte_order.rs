//! Wire byte order selection

use serde::{Deserialize, Serialize};

/// Byte order used for multi-byte wire fields.
///
/// Deployed MB1 producers write host order, so `Native` is the default.
/// Heterogeneous deployments can pin both ends to `Little` or `Big`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    /// Resolve `Native` to the concrete order of this host.
    pub fn resolve(self) -> Self {
        match self {
            ByteOrder::Native if cfg!(target_endian = "big") => ByteOrder::Big,
            ByteOrder::Native => ByteOrder::Little,
            other => other,
        }
    }

    #[inline]
    pub fn u32_to_bytes(self, v: u32) -> [u8; 4] {
        match self.resolve() {
            ByteOrder::Big => v.to_be_bytes(),
            _ => v.to_le_bytes(),
        }
    }

    #[inline]
    pub fn u32_from_bytes(self, b: [u8; 4]) -> u32 {
        match self.resolve() {
            ByteOrder::Big => u32::from_be_bytes(b),
            _ => u32::from_le_bytes(b),
        }
    }

    #[inline]
    pub fn f64_to_bytes(self, v: f64) -> [u8; 8] {
        match self.resolve() {
            ByteOrder::Big => v.to_be_bytes(),
            _ => v.to_le_bytes(),
        }
    }

    #[inline]
    pub fn f64_from_bytes(self, b: [u8; 8]) -> f64 {
        match self.resolve() {
            ByteOrder::Big => f64::from_be_bytes(b),
            _ => f64::from_le_bytes(b),
        }
    }
}
