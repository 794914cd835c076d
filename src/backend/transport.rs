//! HidTransport trait for a unified device interface
//!
//! This module provides a common trait for the HID collaborator, enabling
//! both real hardware access (via hidapi) and a simulated device for testing.

use super::inbound::FrameSink;
use crate::error::Result;
use crate::types::DeviceDescriptor;

/// Unified interface to the HID layer
///
/// The session controller is the only caller. It guarantees that `open` is
/// never called twice without a `close` in between and that `write` and
/// `close` are only called while a device is open. Implementations must be
/// `Send` to live on the backend worker thread.
///
/// # Example
///
/// ```ignore
/// fn ping(transport: &mut dyn HidTransport, sink: FrameSink) -> Result<()> {
///     transport.open("/dev/hidraw3", 65, sink)?;
///     transport.write(&[0x00, 0x01])?;
///     transport.close()
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait HidTransport: Send {
    /// Enumerate every HID device currently visible, unfiltered
    fn list_devices(&mut self) -> Result<Vec<DeviceDescriptor>>;

    /// Open the device at `path` and start reading `frame_size`-byte reports
    /// into `sink` until closed
    fn open(&mut self, path: &str, frame_size: usize, sink: FrameSink) -> Result<()>;

    /// Stop reading and release the device
    fn close(&mut self) -> Result<()>;

    /// Write one output report
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Short name for logs and the status bar
    fn name(&self) -> &'static str {
        "hid"
    }
}
