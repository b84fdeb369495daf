//! Error types for Setu

use std::time::Duration;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Setu error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Byte source closed, disconnected or failed mid-read
    #[error("Byte source exhausted: {0}")]
    SourceExhausted(String),

    /// Sliding window lost its fixed length (byte source broke its contract)
    #[error("Frame invariant violated: window holds {actual} bytes, expected {expected}")]
    FrameInvariantViolation {
        /// Required window length
        expected: usize,
        /// Length observed after the read
        actual: usize,
    },

    /// Too many bytes discarded while searching for alignment
    #[error("Re-sync limit exceeded after discarding {discarded} byte(s)")]
    ResyncLimitExceeded {
        /// Bytes discarded in the failed call
        discarded: u64,
    },

    /// Byte source produced no data within the configured read timeout
    #[error("Byte source stalled for {0:?}")]
    SourceStalled(Duration),

    /// Shutdown was requested while waiting for input
    #[error("Interrupted by shutdown request")]
    Interrupted,

    /// Datagram sink rejected a send
    #[error("Send error: {0}")]
    Send(std::io::Error),

    /// Datagram left the socket truncated
    #[error("Short send: {sent} of {expected} bytes")]
    ShortSend {
        /// Bytes the socket accepted
        sent: usize,
        /// Frame length
        expected: usize,
    },

    /// Byte slice is not exactly one frame long
    #[error("Invalid frame length: {0}")]
    InvalidFrame(usize),

    /// Source URL could not be opened
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
