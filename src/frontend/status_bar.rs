//! Status bar panel: bottom bar showing connection, counters and error info.

use egui::{Color32, RichText, Ui};

use crate::types::ConnectionStatus;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: ConnectionStatus,
    /// Label of the open (or selected) device
    pub device: Option<&'a str>,
    pub frame_size: usize,
    pub received: usize,
    pub sent: usize,
    pub last_error: Option<&'a str>,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // === Connection status dot + device ===
        let status_color = match ctx.status {
            ConnectionStatus::Connected => Color32::GREEN,
            ConnectionStatus::Connecting => Color32::YELLOW,
            ConnectionStatus::Disconnected => Color32::GRAY,
            ConnectionStatus::Error => Color32::RED,
        };
        ui.colored_label(status_color, "●");
        let device_display = match (ctx.status, ctx.device) {
            (ConnectionStatus::Connected, Some(device)) => {
                format!("{}: {}", ctx.status, device)
            }
            _ => ctx.status.to_string(),
        };
        ui.label(RichText::new(device_display).small());

        ui.separator();
        ui.label(RichText::new(format!("Frame: {} B", ctx.frame_size)).small());

        ui.separator();
        ui.label(RichText::new(format!("RX: {}", ctx.received)).small());

        ui.separator();
        ui.label(RichText::new(format!("TX: {}", ctx.sent)).small());

        // === Error message (right-aligned) ===
        if let Some(error) = ctx.last_error {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
