//! Core data types for HID Console
//!
//! This module contains the fundamental types shared by the backend worker,
//! the session controller and the frontend.
//!
//! # Main Types
//!
//! - [`DeviceDescriptor`] - One enumerable HID device from a registry snapshot
//! - [`SessionConfig`] - User-supplied connection parameters (path + frame size)
//! - [`SessionState`] - `Closed`, or `Open` with the config it was opened with
//! - [`ConnectionStatus`] - Coarse status reported to the UI
//! - [`AppInfo`] - Application name and version

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest frame size a session can be opened with
pub const MIN_FRAME_SIZE: usize = 1;

/// Largest frame size a session can be opened with
pub const MAX_FRAME_SIZE: usize = 1024;

/// Frame size offered by default (64-byte report plus report ID)
pub const DEFAULT_FRAME_SIZE: usize = 65;

/// Snapshot record identifying one enumerable HID device
///
/// Descriptors are created fresh by every scan and replaced wholesale by the
/// next one. The `path` is only guaranteed stable for the lifetime of the
/// snapshot it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// USB vendor ID
    pub vendor_id: u16,
    /// USB product ID
    pub product_id: u16,
    /// Platform path used to open the device
    pub path: String,
    /// Product string reported by the device, if any
    pub product_label: Option<String>,
    /// HID top-level usage page
    pub usage_page: u16,
    /// HID top-level usage
    pub usage: u16,
}

impl DeviceDescriptor {
    /// Create a descriptor with no usage information
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            path: path.into(),
            product_label: None,
            usage_page: 0,
            usage: 0,
        }
    }

    /// Set the product label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.product_label = Some(label.into());
        self
    }

    /// Set the HID usage page and usage
    pub fn with_usage(mut self, usage_page: u16, usage: u16) -> Self {
        self.usage_page = usage_page;
        self.usage = usage;
        self
    }

    /// Whether both USB identifiers are zero (placeholder entries)
    pub fn has_zero_ids(&self) -> bool {
        self.vendor_id == 0 && self.product_id == 0
    }

    /// Label for the device picker
    pub fn display_name(&self) -> String {
        format!(
            "{} ({:X}, {:X})",
            self.product_label.as_deref().unwrap_or("Unknown"),
            self.vendor_id,
            self.product_id
        )
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Connection parameters for opening a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the device to open, taken from the latest scan
    pub device_path: String,
    /// Fixed report length used for reads, in bytes
    pub frame_size: usize,
}

impl SessionConfig {
    pub fn new(device_path: impl Into<String>, frame_size: usize) -> Self {
        Self {
            device_path: device_path.into(),
            frame_size,
        }
    }

    /// Check the frame size range and that a path was given.
    ///
    /// Membership of the path in the current device list is checked by the
    /// session controller, which owns the registry snapshot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&self.frame_size) {
            return Err(ValidationError::FrameSizeOutOfRange(self.frame_size));
        }
        if self.device_path.trim().is_empty() {
            return Err(ValidationError::EmptyDevicePath);
        }
        Ok(())
    }
}

/// State of the single device session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No device open
    #[default]
    Closed,
    /// A device is open with the given configuration
    Open(SessionConfig),
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Open(_))
    }

    /// Configuration of the open session, if any
    pub fn config(&self) -> Option<&SessionConfig> {
        match self {
            SessionState::Open(config) => Some(config),
            SessionState::Closed => None,
        }
    }
}

/// Connection status as shown in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No device open
    #[default]
    Disconnected,
    /// Open request sent to the backend
    Connecting,
    /// Device open and reading frames
    Connected,
    /// The last open attempt failed
    Error,
}

impl From<&SessionState> for ConnectionStatus {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Closed => ConnectionStatus::Disconnected,
            SessionState::Open(_) => ConnectionStatus::Connected,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Application identity shown in the side panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Name and version of this build
pub fn app_info() -> AppInfo {
    AppInfo {
        name: "HIDConsole",
        version: env!("CARGO_PKG_VERSION"),
    }
}
