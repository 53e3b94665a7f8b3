use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by a MIDI transport backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("MIDI backend initialization failed: {0}")]
    Init(#[from] midir::InitError),

    #[error("MIDI port not found: {0}")]
    PortNotFound(String),

    #[error("failed to connect MIDI port: {0}")]
    Connect(String),

    #[error("failed to send MIDI message: {0}")]
    Send(#[from] midir::SendError),

    #[error("input buffer overflowed, events were dropped")]
    BufferOverflow,

    #[error("stream is closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the Launchpad driver.
#[derive(Debug, Error)]
pub enum LaunchpadError {
    #[error("no device matching \"{pattern}\" with both input and output")]
    DeviceNotFound { pattern: String },

    #[error("failed to enumerate MIDI devices: {0}")]
    Enumerate(#[source] TransportError),

    #[error("failed to open {direction} stream: {source}")]
    StreamOpen {
        direction: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("failed to read from input stream: {0}")]
    TransportRead(#[source] TransportError),

    #[error("failed to write to output stream: {0}")]
    TransportWrite(#[source] TransportError),

    #[error("failed to close {direction} stream: {source}")]
    StreamClose {
        direction: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("input is owned by an active listener")]
    ReadPathBusy,

    #[error("already listening")]
    AlreadyListening,

    #[error("listen requires a running tokio runtime")]
    NoRuntime,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, LaunchpadError>;
