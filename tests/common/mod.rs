//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use crossbeam_channel::RecvTimeoutError;
use hid_console::backend::{
    BackendMessage, FrontendReceiver, HidBackend, SimulatedHandle, SimulatedTransport,
};
use hid_console::config::AppConfig;
use hid_console::response_log::LogBuffer;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}

/// A backend running on its own thread over a simulated device
pub struct RunningBackend {
    pub frontend: FrontendReceiver,
    pub device: SimulatedHandle,
    handle: Option<JoinHandle<()>>,
}

impl RunningBackend {
    /// Spawn a backend with default config over `transport`
    pub fn spawn(transport: SimulatedTransport) -> Self {
        Self::spawn_with_config(transport, &AppConfig::default())
    }

    pub fn spawn_with_config(transport: SimulatedTransport, config: &AppConfig) -> Self {
        let device = transport.handle();
        let (backend, frontend) = HidBackend::with_transport(config, Box::new(transport));
        let backend = backend.with_idle_tick(Duration::from_millis(5));
        let handle = std::thread::spawn(move || backend.run());

        Self {
            frontend,
            device,
            handle: Some(handle),
        }
    }

    /// Collect messages until one matches `pred`, failing after the test timeout
    pub fn wait_for(&self, pred: impl Fn(&BackendMessage) -> bool) -> Vec<BackendMessage> {
        let deadline = Instant::now() + test_timeout();
        let mut seen = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.frontend.receiver.recv_timeout(remaining) {
                Ok(msg) => {
                    let done = pred(&msg);
                    seen.push(msg);
                    if done {
                        return seen;
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    panic!("Timed out waiting for message, got {:?}", seen)
                }
            }
        }
    }

    /// Poll until the shared log satisfies `pred`
    pub fn wait_for_log(&self, pred: impl Fn(&LogBuffer) -> bool) {
        let deadline = Instant::now() + test_timeout();
        while !pred(&self.frontend.log.read()) {
            assert!(
                Instant::now() < deadline,
                "Log never reached the expected state ({} entries)",
                self.frontend.log.read().len()
            );
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    /// Poll until the shared log holds at least `count` entries
    pub fn wait_for_log_len(&self, count: usize) {
        self.wait_for_log(|log| log.len() >= count);
    }

    /// Request shutdown and join the backend thread
    pub fn shutdown(mut self) -> Vec<BackendMessage> {
        self.frontend.shutdown();
        if let Some(handle) = self.handle.take() {
            handle.join().expect("Backend thread should exit cleanly");
        }
        self.frontend.drain()
    }
}

impl Drop for RunningBackend {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.frontend.shutdown();
            let _ = handle.join();
        }
    }
}
