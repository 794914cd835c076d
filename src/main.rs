//! HID Console - Main Entry Point
//!
//! Raw report terminal for USB HID devices.

use hid_console::{backend::HidBackend, config::AppConfig, frontend::HidConsoleApp, types::app_info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hid_console=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let info = app_info();
    tracing::info!("Starting {} v{}", info.name, info.version);

    let config = AppConfig::load_or_default();

    let (backend, frontend) = HidBackend::new(&config);
    let running = backend.stop_handle();
    let backend_handle = std::thread::Builder::new()
        .name("hid-backend".into())
        .spawn(move || backend.run());
    let backend_handle = match backend_handle {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to start backend thread: {}", e);
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };

    // Configure eframe options
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 600.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title(info.name),
        ..Default::default()
    };

    let dark_mode = config.ui.dark_mode;
    let result = eframe::run_native(
        info.name,
        native_options,
        Box::new(move |cc| {
            if dark_mode {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
            } else {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            }

            Ok(Box::new(HidConsoleApp::new(cc, frontend, config)))
        }),
    );

    // Signal backend to stop and wait for it
    tracing::info!("Shutting down...");
    running.store(false, std::sync::atomic::Ordering::SeqCst);
    if backend_handle.join().is_err() {
        tracing::warn!("Backend thread panicked");
    }

    result
}
