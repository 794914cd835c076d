//! Device registry
//!
//! Turns the transport's raw enumeration into the list shown in the device
//! picker and remembers the latest snapshot, which is what a session may be
//! opened against.

use super::transport::HidTransport;
use crate::error::Result;
use crate::types::DeviceDescriptor;
use serde::{Deserialize, Serialize};

/// HID usage page for Generic Desktop controls
const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;

/// Generic Desktop usages claimed by the OS input stack
const SYSTEM_INPUT_USAGES: [u16; 3] = [0x01, 0x02, 0x06];

/// Which enumerated devices to hide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFilter {
    /// Hide placeholder entries whose vendor and product IDs are both zero
    #[serde(default = "default_true")]
    pub filter_zero_ids: bool,
    /// Hide system keyboards and mice
    #[serde(default = "default_true")]
    pub hide_system_input: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            filter_zero_ids: true,
            hide_system_input: true,
        }
    }
}

impl DeviceFilter {
    /// Filter that only applies the zero-ID rule
    pub fn zero_ids(filter_zero_ids: bool) -> Self {
        Self {
            filter_zero_ids,
            hide_system_input: false,
        }
    }

    /// Whether `device` should appear in the list
    pub fn accepts(&self, device: &DeviceDescriptor) -> bool {
        if self.filter_zero_ids && device.has_zero_ids() {
            return false;
        }
        if self.hide_system_input
            && device.usage_page == USAGE_PAGE_GENERIC_DESKTOP
            && SYSTEM_INPUT_USAGES.contains(&device.usage)
        {
            return false;
        }
        true
    }
}

/// Latest device snapshot
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    snapshot: Vec<DeviceDescriptor>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate through `transport` and replace the snapshot.
    ///
    /// On failure the snapshot is emptied and the error returned.
    pub fn scan(
        &mut self,
        transport: &mut dyn HidTransport,
        filter: &DeviceFilter,
    ) -> Result<Vec<DeviceDescriptor>> {
        match transport.list_devices() {
            Ok(devices) => {
                let total = devices.len();
                self.snapshot = devices.into_iter().filter(|d| filter.accepts(d)).collect();
                tracing::debug!(
                    "Device scan found {} devices ({} after filtering)",
                    total,
                    self.snapshot.len()
                );
                Ok(self.snapshot.clone())
            }
            Err(e) => {
                self.snapshot.clear();
                tracing::warn!("Device scan failed: {}", e);
                Err(e)
            }
        }
    }

    /// Devices from the latest scan
    pub fn snapshot(&self) -> &[DeviceDescriptor] {
        &self.snapshot
    }

    /// Look up a device of the latest scan by path
    pub fn find(&self, path: &str) -> Option<&DeviceDescriptor> {
        self.snapshot.iter().find(|d| d.path == path)
    }
}
