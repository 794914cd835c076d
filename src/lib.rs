//! # HID Console: raw report terminal for USB HID devices
//!
//! A desktop tool for talking to a USB HID device one report at a time: pick
//! a device, open it with a fixed frame size, type hex payloads to send and
//! watch the device's responses stream into a timestamped log.
//!
//! ## Architecture
//!
//! - **Backend**: owns the device session on its own thread (hidapi reader
//!   threads feed inbound frames to it)
//! - **Frontend**: renders the UI using eframe/egui
//! - **Communication**: crossbeam channels for commands and status, a shared
//!   lock-protected log for received frames
//!
//! ## Configuration
//!
//! Preferences are stored in the platform-appropriate data directory under
//! `dev.hidconsole.hid-console`:
//!
//! - **Linux**: `~/.local/share/dev.hidconsole.hid-console/`
//! - **macOS**: `~/Library/Application Support/dev.hidconsole.hid-console/`
//! - **Windows**: `%APPDATA%\dev.hidconsole.hid-console\`
//!
//! ## Example
//!
//! ```ignore
//! use hid_console::{backend::HidBackend, config::AppConfig, frontend::HidConsoleApp};
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let (backend, frontend) = HidBackend::new(&config);
//!
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "HIDConsole",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(HidConsoleApp::new(cc, frontend, config)))),
//!     )
//! }
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod frontend;
pub mod response_log;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendCommand, BackendMessage, HidBackend, SessionController};
pub use config::AppConfig;
pub use error::{HidConsoleError, Result};
pub use frontend::HidConsoleApp;
pub use response_log::{LogBuffer, LogEntry, SharedLog};
pub use types::{app_info, ConnectionStatus, DeviceDescriptor, SessionConfig, SessionState};
