//! Sounding providers
//!
//! - [`ReplayProvider`] - paced playback of an MB1 log file
//! - [`StreamProvider`] - soundings decoded from any `AsyncRead`

pub mod replay;
pub mod stream;

pub use replay::ReplayProvider;
pub use stream::StreamProvider;
