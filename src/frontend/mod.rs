//! Frontend module for egui UI
//!
//! This module provides the main window using eframe/egui. It sends user
//! intents to the backend through crossbeam channels and renders the shared
//! response log the backend fills.
//!
//! # Layout
//!
//! - Left panel: app identity, device picker, frame size, open/close
//! - Center: the response log
//! - Bottom: hex input with send/clear, then the status bar
//!
//! # Main Types
//!
//! - [`HidConsoleApp`] - Main application state implementing [`eframe::App`]
//! - [`UiState`] - Plain state the panels render from
//! - [`AppAction`] - What the panels ask for

mod panels;
pub mod state;
pub mod status_bar;

pub use state::{AppAction, UiState};

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::codec;
use crate::config::AppConfig;
use crate::error::HidConsoleError;
use crate::types::{app_info, AppInfo, ConnectionStatus};
use panels::{ConnectionPanel, LogPanel, SendPanel};
use status_bar::{render_status_bar, StatusBarContext};
use std::time::Duration;

/// Repaint interval while frames may arrive
const LIVE_REPAINT: Duration = Duration::from_millis(50);

/// Main application
pub struct HidConsoleApp {
    frontend: FrontendReceiver,
    config: AppConfig,
    state: UiState,
    info: AppInfo,
}

impl HidConsoleApp {
    /// Create a new application instance and kick off the first scan
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        frontend: FrontendReceiver,
        config: AppConfig,
    ) -> Self {
        let mut state = UiState::from_config(&config);
        if state.begin_scan() {
            frontend.refresh_devices();
        }

        Self {
            frontend,
            config,
            state,
            info: app_info(),
        }
    }

    /// Apply all pending backend messages. Returns `true` if any arrived.
    fn process_backend_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();
        for msg in messages {
            if let BackendMessage::SessionStatus(ConnectionStatus::Connected) = &msg {
                self.config.session.last_device_path = self.state.selected_device.clone();
            }
            self.state.apply_message(msg);
        }
        had_messages
    }

    fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::RefreshDevices => {
                if self.state.begin_scan() {
                    self.frontend.refresh_devices();
                }
            }
            AppAction::Open => {
                if let Some(config) = self.state.session_config() {
                    self.state.status = ConnectionStatus::Connecting;
                    self.frontend.open(config);
                }
            }
            AppAction::Close => self.frontend.close(),
            AppAction::Send if !self.state.can_send() => {}
            AppAction::Send => match codec::decode(&self.state.pending_input) {
                Ok(bytes) => {
                    self.state.send_error = None;
                    self.frontend.write(bytes);
                }
                Err(e) => {
                    self.state.send_error = Some(HidConsoleError::from(e).to_string());
                }
            },
            AppAction::ClearLog => self.frontend.clear_log(),
        }
    }

    fn render_error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.error_window.clone() else {
            return;
        };

        let mut open = true;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(message);
            });
        if !open {
            self.state.error_window = None;
        }
    }

    /// Copy UI choices back into the persisted config
    fn sync_config(&mut self) {
        self.config.session.frame_size = self.state.frame_size;
        if self.state.selected_device.is_some() {
            self.config.session.last_device_path = self.state.selected_device.clone();
        }
        self.config.log.show_timestamp = self.state.show_timestamp;
    }
}

impl eframe::App for HidConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.process_backend_messages();

        if had_messages {
            ctx.request_repaint();
        }
        if self.state.is_connected() || self.state.scan_in_flight {
            ctx.request_repaint_after(LIVE_REPAINT);
        }

        let mut actions = Vec::new();

        egui::SidePanel::left("connection_panel")
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| {
                actions.extend(ConnectionPanel::render(ui, &mut self.state, &self.info));
            });

        let received = self.frontend.log.read().len();
        let selected_label = self
            .state
            .selected_device
            .as_ref()
            .and_then(|path| self.state.devices.iter().find(|d| &d.path == path))
            .map(|d| d.display_name());

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    status: self.state.status,
                    device: selected_label.as_deref(),
                    frame_size: self.state.frame_size,
                    received,
                    sent: self.state.frames_sent,
                    last_error: self.state.last_error.as_deref(),
                },
            );
        });

        egui::TopBottomPanel::bottom("send_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            actions.extend(SendPanel::render(ui, &mut self.state));
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let log = self.frontend.log.read();
            LogPanel::render(ui, &log, self.state.show_timestamp);
        });

        self.render_error_window(ctx);

        for action in actions {
            self.handle_action(action);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frontend.shutdown();

        self.sync_config();
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }
}
