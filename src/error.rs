//! Error handling for HID Console
//!
//! This module defines the error taxonomy used by the session pipeline and a
//! Result alias for use throughout the application.
//!
//! Errors fall into three groups:
//!
//! - **Validation** ([`ValidationError`]) - rejected before any transport call
//! - **Transport** (`Transport`, `Connect`, `Disconnect`, `Send`) - reported by
//!   the HID collaborator and surfaced verbatim
//! - **State** (`NotConnected`, `AlreadyOpen`) - session precondition violations

use thiserror::Error;

/// Why a hex string could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidHexError {
    #[error("Invalid hex data: no digits")]
    Empty,

    #[error("Invalid hex data: odd number of digits ({0})")]
    OddLength(usize),

    #[error("Invalid hex data: unexpected '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },
}

/// Input rejected before reaching the transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Frame size must be between 1-1024, got {0}")]
    FrameSizeOutOfRange(usize),

    #[error("No device selected")]
    EmptyDevicePath,

    #[error("Device {0} is not in the current device list")]
    UnknownDevicePath(String),

    #[error(transparent)]
    InvalidHex(#[from] InvalidHexError),
}

/// Main error type for HID Console operations
#[derive(Error, Debug)]
pub enum HidConsoleError {
    /// Bad frame size, device path or hex payload
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Device enumeration or generic HID failure
    #[error("HID error: {0}")]
    Transport(String),

    /// The device could not be opened
    #[error("Failed to open device: {0}")]
    Connect(String),

    /// The device reported an error while closing
    #[error("Failed to close device: {0}")]
    Disconnect(String),

    /// A frame could not be written
    #[error("Send failed: {0}")]
    Send(String),

    /// Write or close attempted without an open session
    #[error("Please connect device first")]
    NotConnected,

    /// Open attempted while a session is already open
    #[error("A device is already open, close it first")]
    AlreadyOpen,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HidConsoleError>,
    },
}

impl HidConsoleError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        HidConsoleError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Re-tag a transport failure as a failure of a specific session operation.
    ///
    /// Validation and state errors pass through untouched.
    pub fn reclassify(self, wrap: fn(String) -> HidConsoleError) -> Self {
        match self {
            HidConsoleError::Transport(msg)
            | HidConsoleError::Connect(msg)
            | HidConsoleError::Disconnect(msg)
            | HidConsoleError::Send(msg) => wrap(msg),
            HidConsoleError::Io(e) => wrap(e.to_string()),
            other => other,
        }
    }
}

impl From<InvalidHexError> for HidConsoleError {
    fn from(e: InvalidHexError) -> Self {
        HidConsoleError::Validation(ValidationError::InvalidHex(e))
    }
}

impl From<hidapi::HidError> for HidConsoleError {
    fn from(e: hidapi::HidError) -> Self {
        HidConsoleError::Transport(e.to_string())
    }
}

/// Result type alias for HID Console operations
pub type Result<T> = std::result::Result<T, HidConsoleError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
