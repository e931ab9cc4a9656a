use eframe::egui;
use quant_dashboard::gui::DashboardApp;
use quant_dashboard::settings::Settings;
use quant_dashboard::{logging, storage};

const SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.clone());

    let storage_file = settings.storage_file();
    tracing::info!(path = %storage_file.display(), "opening storage");
    let store = storage::open_or_memory(&storage_file);

    let (w, h) = settings.window_size.unwrap_or((1280, 800));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w as f32, h as f32])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Quant Dashboard",
        native_options,
        Box::new(move |_cc| Box::new(DashboardApp::new(store, settings, SETTINGS_FILE))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start ui: {e}"))?;
    Ok(())
}
