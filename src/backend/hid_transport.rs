//! hidapi backend for USB HID communication
//!
//! This module provides the real hardware implementation of [`HidTransport`]
//! on top of the `hidapi` crate.
//!
//! # Features
//!
//! - **Device discovery**: refresh and list every HID interface the OS exposes
//! - **Connection management**: open by platform path, close on request
//! - **Reader thread**: one per open device, polling input reports with a
//!   short timeout and pushing them into the session's [`FrameSink`]
//!
//! The device handle sits behind a mutex shared by the reader thread and the
//! backend worker, so writes interleave with the 5 ms reads.

use super::inbound::FrameSink;
use super::transport::HidTransport;
use crate::error::{HidConsoleError, Result};
use crate::types::DeviceDescriptor;
use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Read timeout per poll of the input endpoint
const READ_TIMEOUT_MS: i32 = 5;

/// An open device and its reader thread
struct OpenDevice {
    path: String,
    device: Arc<Mutex<HidDevice>>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

/// HID transport backed by hidapi
#[derive(Default)]
pub struct HidApiTransport {
    /// Created on first use so a missing HID stack surfaces as an error
    api: Option<HidApi>,
    open: Option<OpenDevice>,
}

impl HidApiTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn api(&mut self) -> Result<&mut HidApi> {
        if self.api.is_none() {
            let api = HidApi::new()
                .map_err(|e| HidConsoleError::Transport(format!("HID init failed: {}", e)))?;
            self.api = Some(api);
        }
        self.api
            .as_mut()
            .ok_or_else(|| HidConsoleError::Transport("HID API unavailable".into()))
    }
}

impl HidTransport for HidApiTransport {
    fn list_devices(&mut self) -> Result<Vec<DeviceDescriptor>> {
        let api = self.api()?;
        api.refresh_devices()?;

        Ok(api
            .device_list()
            .map(|info| DeviceDescriptor {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                path: info.path().to_string_lossy().into_owned(),
                product_label: info.product_string().map(str::to_string),
                usage_page: info.usage_page(),
                usage: info.usage(),
            })
            .collect())
    }

    fn open(&mut self, path: &str, frame_size: usize, sink: FrameSink) -> Result<()> {
        if let Some(previous) = self.open.take() {
            tracing::warn!("Device {} still open, closing it first", previous.path);
            stop_reader(previous);
        }

        let c_path = CString::new(path)
            .map_err(|_| HidConsoleError::Connect(format!("Invalid device path: {:?}", path)))?;
        let device = self
            .api()?
            .open_path(&c_path)
            .map_err(|e| HidConsoleError::Connect(e.to_string()))?;

        let device = Arc::new(Mutex::new(device));
        let stop = Arc::new(AtomicBool::new(false));

        let reader = {
            let device = device.clone();
            let stop = stop.clone();
            std::thread::Builder::new()
                .name("hid-reader".into())
                .spawn(move || run_reader_loop(device, frame_size, sink, stop))
                .map_err(|e| {
                    HidConsoleError::Connect(format!("Failed to start reader thread: {}", e))
                })?
        };

        tracing::info!("Opened {} ({} byte frames)", path, frame_size);
        self.open = Some(OpenDevice {
            path: path.to_string(),
            device,
            stop,
            reader: Some(reader),
        });
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.open.take() {
            Some(open) => {
                let path = open.path.clone();
                if stop_reader(open) {
                    tracing::info!("Closed {}", path);
                    Ok(())
                } else {
                    Err(HidConsoleError::Disconnect(format!(
                        "Reader thread for {} panicked",
                        path
                    )))
                }
            }
            None => Ok(()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let open = self
            .open
            .as_ref()
            .ok_or(HidConsoleError::NotConnected)?;
        let written = open
            .device
            .lock()
            .write(data)
            .map_err(|e| HidConsoleError::Send(e.to_string()))?;
        tracing::trace!("Wrote {} of {} bytes to {}", written, data.len(), open.path);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "hidapi"
    }
}

impl Drop for HidApiTransport {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            stop_reader(open);
        }
    }
}

/// Signal the reader to stop and wait for it. Returns `false` if it panicked.
fn stop_reader(mut open: OpenDevice) -> bool {
    open.stop.store(true, Ordering::SeqCst);
    match open.reader.take() {
        Some(handle) => handle.join().is_ok(),
        None => true,
    }
}

/// Poll input reports until stopped, the sink is cancelled, or the device fails
fn run_reader_loop(
    device: Arc<Mutex<HidDevice>>,
    frame_size: usize,
    sink: FrameSink,
    stop: Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; frame_size];
    tracing::debug!("HID reader started (session {})", sink.generation());

    while !stop.load(Ordering::Relaxed) && !sink.is_cancelled() {
        // Hold the lock only for the read so writes can get in between
        let res = device.lock().read_timeout(&mut buf, READ_TIMEOUT_MS);

        match res {
            Ok(n) if n > 0 => {
                if !sink.push(buf[..n].to_vec()) {
                    break;
                }
            }
            Ok(_) => std::thread::yield_now(),
            Err(e) => {
                tracing::warn!("HID read failed, reader stopping: {}", e);
                break;
            }
        }
    }

    tracing::debug!("HID reader stopped (session {})", sink.generation());
}
