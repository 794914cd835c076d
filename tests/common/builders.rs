//! Test data builders

use hid_console::backend::SIMULATED_DEVICE_PATH;
use hid_console::types::{DeviceDescriptor, SessionConfig};

/// A vendor-defined device that passes every filter
pub fn vendor_device(path: &str) -> DeviceDescriptor {
    DeviceDescriptor::new(0x1234, 0x5678, path)
        .with_label("Test Device")
        .with_usage(0xFF00, 0x01)
}

/// A placeholder entry with both IDs zero
pub fn placeholder_device(path: &str) -> DeviceDescriptor {
    DeviceDescriptor::new(0, 0, path)
}

/// A system keyboard
pub fn keyboard(path: &str) -> DeviceDescriptor {
    DeviceDescriptor::new(0x046d, 0xc31c, path)
        .with_label("USB Keyboard")
        .with_usage(0x01, 0x06)
}

/// Config for the default simulated device
pub fn simulated_session(frame_size: usize) -> SessionConfig {
    SessionConfig::new(SIMULATED_DEVICE_PATH, frame_size)
}
