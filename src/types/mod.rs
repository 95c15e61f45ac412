//! Core types for sounding representation.
//!
//! - [`SoundingRecord`] holds one ping's navigation block and its beams
//! - [`BeamSample`] is one beam's along/across/vertical position
//! - [`TypeTag`] identifies the packet kind on the wire
//! - [`ByteOrder`] selects how multi-byte fields are laid out
//! - [`SoundingPacket`] wraps a decoded record with its wire metadata
//! - [`UpdateRate`] controls subscription delivery rate
//!
//! ## Usage Example
//!
//! ```rust
//! use mb1wire::types::{BeamSample, SoundingRecord};
//!
//! let ping = SoundingRecord::new(1_000_000_000.0, 36.8, -121.9, 1500.0, 1.57)
//!     .with_beams([
//!         BeamSample::new(0, 1.0, 2.0, 1500.5),
//!         BeamSample::new(1, 1.1, 2.1, 1501.0),
//!     ]);
//!
//! assert_eq!(ping.beam_count(), 2);
//! assert!(ping.type_tag.is_sounding());
//! ```

mod byte_order;
mod packet;
mod sounding;
mod update_rate;

pub use byte_order::ByteOrder;
pub use packet::SoundingPacket;
pub use sounding::{BeamSample, SoundingRecord, TypeTag};
pub use update_rate::UpdateRate;
