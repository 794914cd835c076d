//! Simulated HID transport
//!
//! A software stand-in for the HID layer, used by the test suite and by the
//! `simulated-device` feature to run the console without hardware.
//!
//! # Features
//!
//! - **Configurable device list**: enumeration returns whatever was set
//! - **Frame injection**: push inbound frames from any thread through a
//!   [`SimulatedHandle`]
//! - **Echo mode**: every written frame comes back as a response, padded to
//!   the session's frame size
//! - **Failure injection**: make enumeration, open, write or close fail
//! - **Call recording**: count transport calls and keep written payloads
//!
//! # Example
//!
//! ```ignore
//! use hid_console::backend::simulated::SimulatedTransport;
//!
//! let transport = SimulatedTransport::new();
//! let device = transport.handle();
//!
//! let (backend, frontend) = HidBackend::with_transport(config, Box::new(transport));
//! std::thread::spawn(move || backend.run());
//!
//! // ...after opening the simulated device:
//! device.push_frame(vec![0x01, 0x02]);
//! ```

use super::inbound::FrameSink;
use super::transport::HidTransport;
use crate::error::{HidConsoleError, Result};
use crate::types::DeviceDescriptor;
use parking_lot::Mutex;
use std::sync::Arc;

/// Path of the device listed by default
pub const SIMULATED_DEVICE_PATH: &str = "sim://hid-console/0";

/// Counters of transport calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub open: usize,
    pub close: usize,
    pub write: usize,
}

#[derive(Debug)]
struct SimulatedState {
    devices: Vec<DeviceDescriptor>,
    echo: bool,
    fail_enumeration: Option<String>,
    fail_open: Option<String>,
    fail_close: Option<String>,
    fail_write: Option<String>,
    sink: Option<FrameSink>,
    frame_size: Option<usize>,
    written: Vec<Vec<u8>>,
    calls: CallCounts,
}

impl Default for SimulatedState {
    fn default() -> Self {
        Self {
            devices: vec![default_device()],
            echo: false,
            fail_enumeration: None,
            fail_open: None,
            fail_close: None,
            fail_write: None,
            sink: None,
            frame_size: None,
            written: Vec::new(),
            calls: CallCounts::default(),
        }
    }
}

fn default_device() -> DeviceDescriptor {
    DeviceDescriptor::new(0x1209, 0x0001, SIMULATED_DEVICE_PATH)
        .with_label("Simulated HID Device")
        .with_usage(0xFF00, 0x01)
}

/// Control handle onto a [`SimulatedTransport`], usable from any thread
#[derive(Debug, Clone, Default)]
pub struct SimulatedHandle {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedHandle {
    /// Replace the list returned by enumeration
    pub fn set_devices(&self, devices: Vec<DeviceDescriptor>) {
        self.state.lock().devices = devices;
    }

    /// Echo written frames back as responses
    pub fn set_echo(&self, echo: bool) {
        self.state.lock().echo = echo;
    }

    /// Make enumeration fail with `message` (`None` to recover)
    pub fn fail_enumeration(&self, message: Option<&str>) {
        self.state.lock().fail_enumeration = message.map(str::to_string);
    }

    /// Make open fail with `message` (`None` to recover)
    pub fn fail_open(&self, message: Option<&str>) {
        self.state.lock().fail_open = message.map(str::to_string);
    }

    /// Make close report `message` (`None` to recover)
    pub fn fail_close(&self, message: Option<&str>) {
        self.state.lock().fail_close = message.map(str::to_string);
    }

    /// Make writes fail with `message` (`None` to recover)
    pub fn fail_write(&self, message: Option<&str>) {
        self.state.lock().fail_write = message.map(str::to_string);
    }

    /// Deliver an inbound frame as if the device had sent it.
    ///
    /// Returns `false` when no session is reading.
    pub fn push_frame(&self, frame: Vec<u8>) -> bool {
        let state = self.state.lock();
        match &state.sink {
            Some(sink) => sink.push(frame),
            None => false,
        }
    }

    /// Payloads written so far, oldest first
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// Whether the simulated device is currently open
    pub fn is_open(&self) -> bool {
        self.state.lock().sink.is_some()
    }

    /// Frame size of the current open, if any
    pub fn frame_size(&self) -> Option<usize> {
        self.state.lock().frame_size
    }
}

/// HID transport backed by a simulated device
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    handle: SimulatedHandle,
}

impl SimulatedTransport {
    /// Create a transport listing one simulated vendor-defined device
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that echoes every write
    pub fn echoing() -> Self {
        let transport = Self::new();
        transport.handle.set_echo(true);
        transport
    }

    /// Control handle sharing this transport's state
    pub fn handle(&self) -> SimulatedHandle {
        self.handle.clone()
    }
}

impl HidTransport for SimulatedTransport {
    fn list_devices(&mut self) -> Result<Vec<DeviceDescriptor>> {
        let mut state = self.handle.state.lock();
        state.calls.list += 1;
        if let Some(msg) = &state.fail_enumeration {
            return Err(HidConsoleError::Transport(msg.clone()));
        }
        Ok(state.devices.clone())
    }

    fn open(&mut self, path: &str, frame_size: usize, sink: FrameSink) -> Result<()> {
        let mut state = self.handle.state.lock();
        state.calls.open += 1;
        if let Some(msg) = &state.fail_open {
            return Err(HidConsoleError::Connect(msg.clone()));
        }
        if !state.devices.iter().any(|d| d.path == path) {
            return Err(HidConsoleError::Connect(format!("No such device: {}", path)));
        }
        state.sink = Some(sink);
        state.frame_size = Some(frame_size);
        tracing::debug!("Simulated device {} opened ({} byte frames)", path, frame_size);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.handle.state.lock();
        state.calls.close += 1;
        state.sink = None;
        state.frame_size = None;
        match &state.fail_close {
            Some(msg) => Err(HidConsoleError::Disconnect(msg.clone())),
            None => Ok(()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.handle.state.lock();
        state.calls.write += 1;
        if let Some(msg) = &state.fail_write {
            return Err(HidConsoleError::Send(msg.clone()));
        }
        state.written.push(data.to_vec());

        if state.echo {
            if let (Some(sink), Some(frame_size)) = (&state.sink, state.frame_size) {
                let mut response = data.to_vec();
                response.resize(frame_size, 0);
                sink.push(response);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
