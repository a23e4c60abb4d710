//! Error types for Keyrack
//!
//! Provides a unified error type for all operations, plus the packet
//! validation errors raised by the codec.

use thiserror::Error;

/// Result type alias using KeyrackError
pub type Result<T> = std::result::Result<T, KeyrackError>;

/// Unified error type for Keyrack operations
#[derive(Debug, Error)]
pub enum KeyrackError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons a frame payload does not decode into a valid packet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty packet")]
    Empty,

    #[error("unexpected packet kind: 0x{0:02x}")]
    UnexpectedKind(u8),

    #[error("malformed packet body: {0}")]
    Malformed(String),

    #[error("unrecognized action: {0:?}")]
    UnknownAction(String),

    #[error("unrecognized status: {0:?}")]
    UnknownStatus(String),

    #[error("empty key")]
    EmptyKey,

    #[error("set request without a value")]
    MissingValue,

    #[error("value present on a {0} response")]
    UnexpectedValue(&'static str),
}

impl From<bincode::Error> for DecodeError {
    fn from(err: bincode::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}
