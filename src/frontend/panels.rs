//! Panel components for the frontend UI
//!
//! Each panel renders one area of the window from [`UiState`] and returns the
//! [`AppAction`]s the user triggered.
//!
//! # Panels
//!
//! - [`ConnectionPanel`] - Device picker, frame size and open/close controls
//! - [`LogPanel`] - The response log
//! - [`SendPanel`] - Hex input with send and clear buttons

use super::state::{AppAction, UiState};
use crate::codec;
use crate::response_log::LogBuffer;
use crate::types::{AppInfo, ConnectionStatus, MAX_FRAME_SIZE, MIN_FRAME_SIZE};
use egui::{Color32, RichText, Ui};

/// Renders the device and session controls
pub struct ConnectionPanel;

impl ConnectionPanel {
    pub fn render(ui: &mut Ui, state: &mut UiState, info: &AppInfo) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let connected = state.is_connected();
        let idle = matches!(
            state.status,
            ConnectionStatus::Disconnected | ConnectionStatus::Error
        );

        ui.heading(info.name);
        ui.label(RichText::new(format!("v{}", info.version)).small().weak());
        ui.separator();

        ui.label("Device");
        ui.horizontal(|ui| {
            let selected_text = state
                .selected_device
                .as_ref()
                .and_then(|path| state.devices.iter().find(|d| &d.path == path))
                .map(|d| d.display_name())
                .unwrap_or_else(|| "No device".to_string());

            ui.add_enabled_ui(idle, |ui| {
                egui::ComboBox::from_id_salt("device_picker")
                    .selected_text(selected_text)
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        for device in &state.devices {
                            ui.selectable_value(
                                &mut state.selected_device,
                                Some(device.path.clone()),
                                device.display_name(),
                            )
                            .on_hover_text(&device.path);
                        }
                    });
            });

            let scan_label = if state.scan_in_flight { "⏳" } else { "🔄" };
            if ui
                .add_enabled(state.can_scan(), egui::Button::new(scan_label))
                .on_hover_text("Rescan devices")
                .clicked()
            {
                actions.push(AppAction::RefreshDevices);
            }
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Frame size:");
            ui.add_enabled(
                idle,
                egui::DragValue::new(&mut state.frame_size)
                    .range(MIN_FRAME_SIZE..=MAX_FRAME_SIZE)
                    .suffix(" B"),
            );
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| match state.status {
            ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                let can_open = state.selected_device.is_some();
                if ui
                    .add_enabled(can_open, egui::Button::new("🔌 Open"))
                    .clicked()
                {
                    actions.push(AppAction::Open);
                }
            }
            ConnectionStatus::Connecting => {
                ui.add_enabled(false, egui::Button::new("⏳ Opening..."));
            }
            ConnectionStatus::Connected => {
                if ui.button("⏏ Close").clicked() {
                    actions.push(AppAction::Close);
                }
            }
        });

        ui.separator();
        ui.checkbox(&mut state.show_timestamp, "Show timestamps");

        if connected {
            ui.label(RichText::new(format!("Sent: {}", state.frames_sent)).small());
        }

        actions
    }
}

/// Renders the response log
pub struct LogPanel;

impl LogPanel {
    pub fn render(ui: &mut Ui, log: &LogBuffer, show_timestamp: bool) {
        ui.horizontal(|ui| {
            ui.strong("Responses");
            ui.label(RichText::new(format!("({})", log.len())).weak());
        });
        ui.separator();

        let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show_rows(ui, row_height, log.len(), |ui, range| {
                for index in range {
                    if let Some(entry) = log.get(index) {
                        ui.label(RichText::new(entry.format(show_timestamp)).monospace());
                    }
                }
            });
    }
}

/// Renders the hex input area
pub struct SendPanel;

impl SendPanel {
    pub fn render(ui: &mut Ui, state: &mut UiState) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let can_send = state.can_send();

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.pending_input)
                    .font(egui::TextStyle::Monospace)
                    .hint_text("e.g. 0102AB")
                    .desired_width(ui.available_width() - 140.0),
            );
            if response.changed() {
                state.pending_input = codec::sanitize_input(&state.pending_input);
                state.send_error = None;
            }
            let submitted = can_send
                && response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let send = ui
                .add_enabled(can_send, egui::Button::new("Send"))
                .on_disabled_hover_text("Open a device first");
            if send.clicked() || submitted {
                actions.push(AppAction::Send);
            }
            if ui.button("Clear").clicked() {
                actions.push(AppAction::ClearLog);
            }
        });

        if let Some(error) = &state.send_error {
            ui.colored_label(Color32::RED, RichText::new(format!("⚠ {}", error)).small());
        }

        actions
    }
}
