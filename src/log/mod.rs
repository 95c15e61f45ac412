//! MB1 log files
//!
//! Logs are raw concatenations of MB1 packets as captured from a sonar
//! stream. [`Mb1LogReader`] indexes and replays them, skipping noise;
//! [`Mb1LogWriter`] produces them.

mod reader;
mod writer;

pub use reader::Mb1LogReader;
pub use writer::Mb1LogWriter;
