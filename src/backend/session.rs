//! Session controller
//!
//! Owns the single device session and the response log. All transitions go
//! through this type:
//!
//! ```text
//!            open(config)                write(bytes)
//!  Closed ───────────────▶ Open(config) ◀──────────┐
//!    ▲                        │  └─────────────────┘
//!    └──────── close() ───────┘
//! ```
//!
//! - `open` validates the config and the device path against the latest scan
//!   before touching the transport. A successful open clears the log and
//!   subscribes to a fresh inbound stream.
//! - `close` always ends in `Closed`, but still reports a transport failure.
//! - `write` never changes state; a failed send leaves the session open.
//! - Opening while open is rejected; the caller must close first.

use super::inbound::{self, Subscription};
use super::registry::{DeviceFilter, DeviceRegistry};
use super::transport::HidTransport;
use crate::error::{HidConsoleError, Result, ValidationError};
use crate::response_log::SharedLog;
use crate::types::{DeviceDescriptor, SessionConfig, SessionState};
use crossbeam_channel::Receiver;

/// The state machine around the one active device connection
pub struct SessionController {
    transport: Box<dyn HidTransport>,
    registry: DeviceRegistry,
    state: SessionState,
    subscription: Option<Subscription>,
    log: SharedLog,
    /// Incremented on every successful open
    generation: u64,
}

impl SessionController {
    /// Create a controller in the `Closed` state
    pub fn new(transport: Box<dyn HidTransport>, log: SharedLog) -> Self {
        Self {
            transport,
            registry: DeviceRegistry::new(),
            state: SessionState::Closed,
            subscription: None,
            log,
            generation: 0,
        }
    }

    /// Scan for devices and remember the result as the current snapshot
    pub fn list_devices(&mut self, filter: &DeviceFilter) -> Result<Vec<DeviceDescriptor>> {
        self.registry.scan(self.transport.as_mut(), filter)
    }

    /// Devices from the latest scan
    pub fn devices(&self) -> &[DeviceDescriptor] {
        self.registry.snapshot()
    }

    /// Open the device described by `config`
    pub fn open(&mut self, config: SessionConfig) -> Result<()> {
        if self.state.is_open() {
            return Err(HidConsoleError::AlreadyOpen);
        }

        config.validate()?;
        if self.registry.find(&config.device_path).is_none() {
            return Err(ValidationError::UnknownDevicePath(config.device_path).into());
        }

        let generation = self.generation + 1;
        let (sink, subscription) = inbound::subscribe(generation);

        // On failure the subscription drops here, which cancels the sink
        self.transport
            .open(&config.device_path, config.frame_size, sink)
            .map_err(|e| e.reclassify(HidConsoleError::Connect))?;

        self.generation = generation;
        self.log.write().clear();
        self.subscription = Some(subscription);
        tracing::info!(
            "Session {} opened: {} ({} byte frames)",
            generation,
            config.device_path,
            config.frame_size
        );
        self.state = SessionState::Open(config);
        Ok(())
    }

    /// Close the open session.
    ///
    /// The state is `Closed` afterwards even if the transport reports an error.
    pub fn close(&mut self) -> Result<()> {
        if !self.state.is_open() {
            return Err(HidConsoleError::NotConnected);
        }

        // Keep whatever already arrived, then stop the stream
        self.pump();
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }

        let result = self.transport.close();
        self.state = SessionState::Closed;

        match result {
            Ok(()) => {
                tracing::info!("Session {} closed", self.generation);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Session {} closed with error: {}", self.generation, e);
                Err(e.reclassify(HidConsoleError::Disconnect))
            }
        }
    }

    /// Send one frame to the open device
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if !self.state.is_open() {
            return Err(HidConsoleError::NotConnected);
        }

        self.transport
            .write(data)
            .map_err(|e| e.reclassify(HidConsoleError::Send))?;
        tracing::debug!("Sent {} bytes", data.len());
        Ok(())
    }

    /// Move every pending inbound frame into the log, in arrival order.
    ///
    /// Returns the number of frames appended.
    pub fn pump(&mut self) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };

        let frames = subscription.drain();
        if frames.is_empty() {
            return 0;
        }

        let count = frames.len();
        let mut log = self.log.write();
        for frame in frames {
            tracing::trace!("Received {} bytes", frame.len());
            log.append(frame);
        }
        count
    }

    /// Empty the response log
    pub fn clear_log(&mut self) {
        self.log.write().clear();
    }

    /// Close any open session, logging instead of returning a failure
    pub fn shutdown(&mut self) {
        if self.state.is_open() {
            if let Err(e) = self.close() {
                tracing::warn!("Error closing device during shutdown: {}", e);
            }
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Generation number of the latest successful open (0 before the first)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle onto the response log
    pub fn log(&self) -> SharedLog {
        self.log.clone()
    }

    /// Receiver of the current inbound stream, for blocking on new frames
    pub fn inbound_receiver(&self) -> Option<Receiver<Vec<u8>>> {
        self.subscription.as_ref().map(|s| s.receiver().clone())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
