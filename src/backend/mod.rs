//! Backend module for HID device I/O
//!
//! This module handles all device communication in a separate thread to keep
//! the UI responsive. It uses crossbeam channels for thread-safe communication
//! with the frontend.
//!
//! # Architecture
//!
//! The backend runs in a separate thread from the UI, communicating via channels:
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (scan, open, write, etc.)
//! - [`BackendMessage`] - Messages sent from backend to UI (devices, status, errors)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`HidBackend`] - Main backend entry point, run on its own thread
//!
//! Received frames do not travel as messages. The worker appends them to the
//! [`SharedLog`], which the UI reads directly.
//!
//! # Components
//!
//! - [`HidTransport`] - Trait over the HID layer
//! - [`HidApiTransport`] - Real hardware via hidapi
//! - [`SimulatedTransport`] - Software device for tests and demos
//! - [`DeviceRegistry`] - Filtered device snapshot
//! - [`SessionController`] - The open/close/write state machine
//! - [`BackendWorker`] - Main worker loop that processes commands and frames
//!
//! # Example
//!
//! ```ignore
//! use hid_console::backend::HidBackend;
//! use hid_console::config::AppConfig;
//! use hid_console::types::SessionConfig;
//!
//! let config = AppConfig::default();
//! let (backend, frontend) = HidBackend::new(&config);
//!
//! // Spawn backend thread
//! std::thread::spawn(move || backend.run());
//!
//! // Send commands from UI
//! frontend.refresh_devices();
//! frontend.open(SessionConfig::new("/dev/hidraw3", 65));
//! frontend.write(vec![0x00, 0x01]);
//!
//! // Receive messages
//! for msg in frontend.drain() {
//!     match msg {
//!         BackendMessage::SessionStatus(status) => { /* update status bar */ }
//!         _ => {}
//!     }
//! }
//! ```

pub mod hid_transport;
pub mod inbound;
pub mod registry;
pub mod session;
pub mod simulated;
pub mod transport;
pub mod worker;

pub use hid_transport::HidApiTransport;
pub use inbound::{subscribe, FrameSink, Subscription};
pub use registry::{DeviceFilter, DeviceRegistry};
pub use session::SessionController;
pub use simulated::{SimulatedHandle, SimulatedTransport, SIMULATED_DEVICE_PATH};
pub use transport::HidTransport;
pub use worker::BackendWorker;

use crate::config::AppConfig;
use crate::response_log::{LogBuffer, SharedLog};
use crate::types::{ConnectionStatus, DeviceDescriptor, SessionConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// How long the worker waits for a command or frame before looping
pub const DEFAULT_IDLE_TICK: Duration = Duration::from_millis(50);

/// Message sent from the UI to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Re-enumerate devices
    RefreshDevices,
    /// Open a session
    Open(SessionConfig),
    /// Close the open session
    Close,
    /// Send one frame
    Write(Vec<u8>),
    /// Empty the response log
    ClearLog,
    /// Change which devices are listed (applies from the next scan)
    SetDeviceFilter(DeviceFilter),
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMessage {
    /// Result of a successful scan
    DeviceList(Vec<DeviceDescriptor>),
    /// Enumeration failed; the device list is now empty
    ScanError(String),
    /// Session status changed
    SessionStatus(ConnectionStatus),
    /// Open was rejected or failed
    ConnectError(String),
    /// Close was rejected or reported a failure
    DisconnectError(String),
    /// A frame was handed to the device
    WriteComplete { bytes: usize },
    /// Write was rejected or failed
    WriteError(String),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
    /// Response log filled by the backend
    pub log: SharedLog,
}

impl FrontendReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request a device scan
    pub fn refresh_devices(&self) {
        let _ = self.command_sender.send(BackendCommand::RefreshDevices);
    }

    /// Request a session open
    pub fn open(&self, config: SessionConfig) {
        let _ = self.command_sender.send(BackendCommand::Open(config));
    }

    /// Request the session close
    pub fn close(&self) {
        let _ = self.command_sender.send(BackendCommand::Close);
    }

    /// Send a frame
    pub fn write(&self, data: Vec<u8>) {
        let _ = self.command_sender.send(BackendCommand::Write(data));
    }

    /// Clear the response log
    pub fn clear_log(&self) {
        let _ = self.command_sender.send(BackendCommand::ClearLog);
    }

    /// Change the device list filter
    pub fn set_device_filter(&self, filter: DeviceFilter) {
        let _ = self
            .command_sender
            .send(BackendCommand::SetDeviceFilter(filter));
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The HID backend that runs in a separate thread
pub struct HidBackend {
    /// Transport handed to the session controller
    transport: Box<dyn HidTransport>,
    /// Initial device filter
    filter: DeviceFilter,
    /// Response log shared with the UI
    log: SharedLog,
    /// Receiver for commands from the UI
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    idle_tick: Duration,
}

impl HidBackend {
    /// Create a backend over the default transport
    ///
    /// That is hidapi, or the simulated device when built with the
    /// `simulated-device` feature.
    pub fn new(config: &AppConfig) -> (Self, FrontendReceiver) {
        Self::with_transport(config, default_transport())
    }

    /// Create a backend over `transport`
    pub fn with_transport(
        config: &AppConfig,
        transport: Box<dyn HidTransport>,
    ) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(256);
        let (msg_tx, msg_rx) = bounded(10_000);
        let log = LogBuffer::with_capacity_limit(config.log.max_entries).shared();

        let backend = Self {
            transport,
            filter: config.devices,
            log: log.clone(),
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
            idle_tick: DEFAULT_IDLE_TICK,
        };

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
            log,
        };

        (backend, frontend)
    }

    /// Override how long the worker waits between checks of the running flag
    pub fn with_idle_tick(mut self, idle_tick: Duration) -> Self {
        self.idle_tick = idle_tick;
        self
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = BackendWorker::new(
            self.transport,
            self.filter,
            self.log,
            self.command_receiver,
            self.message_sender,
            self.running,
        )
        .with_idle_tick(self.idle_tick);
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Handle onto the response log
    pub fn log(&self) -> SharedLog {
        self.log.clone()
    }
}

#[cfg(not(feature = "simulated-device"))]
fn default_transport() -> Box<dyn HidTransport> {
    Box::new(HidApiTransport::new())
}

#[cfg(feature = "simulated-device")]
fn default_transport() -> Box<dyn HidTransport> {
    tracing::info!("Using simulated HID device");
    Box::new(SimulatedTransport::echoing())
}
