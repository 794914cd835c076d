//! Backend Worker Thread Implementation
//!
//! This module contains the main worker loop that runs in a separate thread
//! and owns the [`SessionController`]. It communicates with the UI thread
//! through crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: runs UI intents (scan, open, close, write) one at
//!   a time, in the order they were sent
//! - **Frame intake**: moves inbound frames into the response log as soon as
//!   they arrive
//! - **Status reporting**: tells the UI about every session transition and
//!   every failure
//!
//! # Waiting
//!
//! The worker blocks until either a command or a frame is ready, waking at
//! least once per idle tick to check the running flag.

use crate::backend::registry::DeviceFilter;
use crate::backend::session::SessionController;
use crate::backend::transport::HidTransport;
use crate::backend::{BackendCommand, BackendMessage, DEFAULT_IDLE_TICK};
use crate::error::HidConsoleError;
use crate::response_log::SharedLog;
use crate::types::{ConnectionStatus, SessionConfig};
use crossbeam_channel::{Receiver, Select, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Backend worker that owns the device session
pub struct BackendWorker {
    /// The one session and its transport
    session: SessionController,
    /// Filter applied on every scan
    filter: DeviceFilter,
    /// Receiver for commands from the UI
    command_rx: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_tx: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Longest wait before re-checking the running flag
    idle_tick: Duration,
    /// Transport name for logs
    transport_name: &'static str,
    /// Session whose inbound stream has ended (the reader stopped)
    ended_generation: Option<u64>,
}

impl BackendWorker {
    /// Create a new backend worker
    pub fn new(
        transport: Box<dyn HidTransport>,
        filter: DeviceFilter,
        log: SharedLog,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let transport_name = transport.name();
        Self {
            session: SessionController::new(transport, log),
            filter,
            command_rx,
            message_tx,
            running,
            idle_tick: DEFAULT_IDLE_TICK,
            transport_name,
            ended_generation: None,
        }
    }

    pub fn with_idle_tick(mut self, idle_tick: Duration) -> Self {
        self.idle_tick = idle_tick;
        self
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Backend worker started ({} transport)", self.transport_name);

        while self.running.load(Ordering::SeqCst) {
            self.wait_for_work();
            self.process_commands();
            self.process_frames();
        }

        // Cleanup
        self.session.shutdown();

        let _ = self.message_tx.send(BackendMessage::Shutdown);
        tracing::info!("Backend worker stopped");
    }

    /// Block until a command or frame is ready, or the idle tick passes
    fn wait_for_work(&self) {
        let frames = self
            .session
            .inbound_receiver()
            .filter(|_| self.ended_generation != Some(self.session.generation()));

        let mut select = Select::new();
        select.recv(&self.command_rx);
        if let Some(frames) = &frames {
            select.recv(frames);
        }
        let _ = select.ready_timeout(self.idle_tick);
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Append pending frames to the log and notice a stream that has ended
    fn process_frames(&mut self) {
        let appended = self.session.pump();
        if appended > 0 || !self.session.is_open() {
            return;
        }

        let generation = self.session.generation();
        if self.ended_generation == Some(generation) {
            return;
        }

        let Some(frames) = self.session.inbound_receiver() else {
            return;
        };
        match frames.try_recv() {
            // Arrived just after the pump
            Ok(frame) => self.session.log().write().append(frame),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("Inbound stream of session {} ended", generation);
                self.ended_generation = Some(generation);
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::RefreshDevices => self.refresh_devices(),
            BackendCommand::Open(config) => self.handle_open(config),
            BackendCommand::Close => self.handle_close(),
            BackendCommand::Write(data) => self.handle_write(data),
            BackendCommand::ClearLog => self.session.clear_log(),
            BackendCommand::SetDeviceFilter(filter) => {
                tracing::debug!("Device filter changed: {:?}", filter);
                self.filter = filter;
            }
            BackendCommand::Shutdown => {
                tracing::info!("Shutdown requested");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn refresh_devices(&mut self) {
        match self.session.list_devices(&self.filter) {
            Ok(devices) => {
                let _ = self.message_tx.send(BackendMessage::DeviceList(devices));
            }
            Err(e) => {
                let _ = self.message_tx.send(BackendMessage::ScanError(e.to_string()));
            }
        }
    }

    fn handle_open(&mut self, config: SessionConfig) {
        if !self.session.is_open() {
            self.send_status(ConnectionStatus::Connecting);
        }

        match self.session.open(config) {
            Ok(()) => self.send_status(ConnectionStatus::Connected),
            Err(e) => {
                tracing::warn!("Open failed: {}", e);
                let status = match e {
                    HidConsoleError::AlreadyOpen => ConnectionStatus::Connected,
                    _ => ConnectionStatus::Error,
                };
                self.send_status(status);
                let _ = self
                    .message_tx
                    .send(BackendMessage::ConnectError(e.to_string()));
            }
        }
    }

    fn handle_close(&mut self) {
        let result = self.session.close();
        if let Err(e) = &result {
            let _ = self
                .message_tx
                .send(BackendMessage::DisconnectError(e.to_string()));
        }
        if !matches!(result, Err(HidConsoleError::NotConnected)) {
            self.send_status(ConnectionStatus::Disconnected);
        }
    }

    fn handle_write(&mut self, data: Vec<u8>) {
        match self.session.write(&data) {
            Ok(()) => {
                let _ = self
                    .message_tx
                    .try_send(BackendMessage::WriteComplete { bytes: data.len() });
            }
            Err(e) => {
                tracing::warn!("Write failed: {}", e);
                let _ = self.message_tx.send(BackendMessage::WriteError(e.to_string()));
            }
        }
    }

    /// Notify UI of a connection status
    fn send_status(&self, status: ConnectionStatus) {
        let _ = self.message_tx.send(BackendMessage::SessionStatus(status));
    }
}
