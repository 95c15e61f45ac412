//! Error types for MB1 sounding processing.
//!
//! Every failure of the wire codec is a distinct variant so callers can tell
//! "the buffer was too small" apart from "this is not a sounding" and decide
//! whether retrying with more room or more bytes would help.
//!
//! ## Error Categories
//!
//! - **Encode Errors**: missing record, wrong record kind, insufficient capacity
//! - **Decode Errors**: short or incomplete packets, wrong kind, checksum mismatch
//! - **Stream Errors**: framing and I/O failures from files, pipes and sockets
//! - **Configuration Errors**: invalid or unreadable codec/replay settings
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use mb1wire::Mb1Error;
//!
//! let error = Mb1Error::BufferTooSmall { required: 112, capacity: 64 };
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for MB1 operations.
pub type Result<T, E = Mb1Error> = std::result::Result<T, E>;

/// Main error type for MB1 operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Mb1Error {
    #[error("No sounding record supplied to the encoder")]
    MissingRecord,

    #[error("Record kind {found:?} is not an MB1 sounding")]
    InvalidRecordKind { found: [u8; 4] },

    #[error("Packet type {found:?} is not an MB1 sounding")]
    WrongRecordKind { found: [u8; 4] },

    #[error("Buffer too small: need {required} bytes, capacity is {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },

    #[error("Packet too short: {available} bytes, need at least {minimum}")]
    PacketTooShort { available: usize, minimum: usize },

    #[error(
        "Packet incomplete: beam_count {beam_count} needs {required} bytes, {available} available"
    )]
    PacketIncomplete { beam_count: u32, required: usize, available: usize },

    #[error("Checksum mismatch: received {received:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { received: u32, computed: u32 },

    #[error("Beam count {beam_count} exceeds maximum {max_beams}")]
    TooManyBeams { beam_count: usize, max_beams: usize },

    #[error("Declared packet size {declared} does not match computed size {computed}")]
    PayloadSizeMismatch { declared: u32, computed: usize },

    #[error("Implausible sounding: {reason}")]
    Implausible { reason: String },

    #[error("Record {record} out of range (log has {total} records)")]
    RecordOutOfRange { record: usize, total: usize },

    #[error("MB1 log file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

impl Mb1Error {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Capacity and length failures can be retried with a larger buffer or
    /// once more bytes have arrived. Corruption and kind errors cannot.
    pub fn is_retryable(&self) -> bool {
        match self {
            Mb1Error::BufferTooSmall { .. } => true,
            Mb1Error::PacketTooShort { .. } => true,
            Mb1Error::PacketIncomplete { .. } => true,
            Mb1Error::Io { .. } => true,
            Mb1Error::MissingRecord => false,
            Mb1Error::InvalidRecordKind { .. } => false,
            Mb1Error::WrongRecordKind { .. } => false,
            Mb1Error::ChecksumMismatch { .. } => false,
            Mb1Error::TooManyBeams { .. } => false,
            Mb1Error::PayloadSizeMismatch { .. } => false,
            Mb1Error::Implausible { .. } => false,
            Mb1Error::RecordOutOfRange { .. } => false,
            Mb1Error::File { .. } => false,
            Mb1Error::Config { .. } => false,
            Mb1Error::LoggingInit(_) => false,
        }
    }

    /// Returns whether this error indicates a corrupt or truncated packet
    /// that should be dropped or retransmitted by the transport.
    pub fn is_corrupt_packet(&self) -> bool {
        matches!(
            self,
            Mb1Error::ChecksumMismatch { .. }
                | Mb1Error::PacketIncomplete { .. }
                | Mb1Error::PacketTooShort { .. }
                | Mb1Error::WrongRecordKind { .. }
                | Mb1Error::TooManyBeams { .. }
                | Mb1Error::PayloadSizeMismatch { .. }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Mb1Error::MissingRecord => vec![
                "Populate a sounding record before encoding",
                "Check the producer pipeline emitted a ping",
            ],
            Mb1Error::InvalidRecordKind { .. } => vec![
                "Set the record type tag to MB1",
                "Route non-sounding messages through their own encoder",
            ],
            Mb1Error::WrongRecordKind { .. } => vec![
                "Verify the sender emits MB1 soundings",
                "Resynchronize the stream on the next MB1 type tag",
            ],
            Mb1Error::BufferTooSmall { .. } => vec![
                "Resize the destination buffer to the required size",
                "Use required_size() to size buffers before encoding",
            ],
            Mb1Error::PacketTooShort { .. } => vec![
                "Read at least the fixed header region before decoding",
                "Wait for more bytes from the transport",
            ],
            Mb1Error::PacketIncomplete { .. } => vec![
                "Read the remaining beam bytes and retry",
                "Check the beam count for corruption if the stream ended",
            ],
            Mb1Error::ChecksumMismatch { .. } => vec![
                "Drop the packet or request retransmission",
                "Check both ends use the same byte order",
            ],
            Mb1Error::TooManyBeams { .. } => vec![
                "Raise max_beams in the codec configuration",
                "Filter beams before encoding",
            ],
            Mb1Error::PayloadSizeMismatch { .. } => vec![
                "Use the Flag payload size policy to accept mismatched producers",
                "Verify the producer writes the total packet size",
            ],
            Mb1Error::Implausible { .. } => vec![
                "Check the navigation source feeding the producer",
                "Disable skip_implausible to replay raw records",
            ],
            Mb1Error::RecordOutOfRange { .. } => vec![
                "Check total_records() before seeking",
                "Verify the log was fully indexed",
            ],
            Mb1Error::File { .. } => vec![
                "Check file exists and is readable",
                "Verify the file contains MB1 packets",
                "Check file permissions",
            ],
            Mb1Error::Io { .. } => vec![
                "Check the transport is still connected",
                "Reopen the stream and resynchronize",
            ],
            Mb1Error::Config { .. } => vec![
                "Check configuration values are in range",
                "Verify the YAML document structure",
            ],
            Mb1Error::LoggingInit(_) => vec![
                "Initialize logging only once per process",
                "Check the log filter directive syntax",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        Mb1Error::File { path, source }
    }

    /// Helper constructor for stream I/O errors.
    pub fn io_error(context: impl Into<String>, source: std::io::Error) -> Self {
        Mb1Error::Io { context: context.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        Mb1Error::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for implausible navigation.
    pub fn implausible(reason: impl Into<String>) -> Self {
        Mb1Error::Implausible { reason: reason.into() }
    }
}

impl From<std::io::Error> for Mb1Error {
    fn from(err: std::io::Error) -> Self {
        Mb1Error::Io { context: "<unknown>".to_string(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn size_errors_report_their_numbers(
                required in 0usize..1_000_000,
                capacity in 0usize..1_000_000,
                beam_count in 0u32..10_000,
            ) {
                let too_small = Mb1Error::BufferTooSmall { required, capacity };
                let msg = too_small.to_string();
                prop_assert!(msg.contains(&required.to_string()));
                prop_assert!(msg.contains(&capacity.to_string()));

                let incomplete = Mb1Error::PacketIncomplete {
                    beam_count,
                    required,
                    available: capacity,
                };
                prop_assert!(incomplete.to_string().contains(&beam_count.to_string()));
            }

            #[test]
            fn checksum_error_shows_both_values(received: u32, computed: u32) {
                let err = Mb1Error::ChecksumMismatch { received, computed };
                let msg = err.to_string();
                let received_hex = format!("{:#010x}", received);
                let computed_hex = format!("{:#010x}", computed);
                prop_assert!(msg.contains(&received_hex));
                prop_assert!(msg.contains(&computed_hex));
            }
        }
    }

    #[test]
    fn encode_failures_are_distinguishable() {
        let too_small = Mb1Error::BufferTooSmall { required: 112, capacity: 56 };
        let wrong_kind = Mb1Error::InvalidRecordKind { found: *b"ACK\0" };

        assert!(too_small.is_retryable());
        assert!(!wrong_kind.is_retryable());
        assert!(!Mb1Error::MissingRecord.is_retryable());
    }

    #[test]
    fn corrupt_packet_classification() {
        assert!(Mb1Error::ChecksumMismatch { received: 1, computed: 2 }.is_corrupt_packet());
        assert!(
            Mb1Error::PacketIncomplete { beam_count: 3, required: 140, available: 100 }
                .is_corrupt_packet()
        );
        assert!(!Mb1Error::BufferTooSmall { required: 1, capacity: 0 }.is_corrupt_packet());
        assert!(!Mb1Error::MissingRecord.is_corrupt_packet());
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<Mb1Error>();

        let error = Mb1Error::MissingRecord;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            Mb1Error::MissingRecord,
            Mb1Error::ChecksumMismatch { received: 0, computed: 1 },
            Mb1Error::PacketTooShort { available: 10, minimum: 52 },
            Mb1Error::config_error("codec", "max_beams must be positive"),
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn io_conversion_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "pipe closed");
        let err: Mb1Error = io_err.into();
        match err {
            Mb1Error::Io { source, .. } => assert_eq!(source.to_string(), "pipe closed"),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
