use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::app::ShelfGuiApp;

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    let settings = shelf_core::config::load_settings();
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rematch Shelf")
            .with_inner_size([1080.0, 800.0])
            .with_min_inner_size([760.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rematch Shelf",
        options,
        Box::new(move |_cc| Ok(Box::new(ShelfGuiApp::new(cmd_tx, ui_rx, settings)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_overrides_the_info_default() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().to_string(), "info");

        std::env::set_var("RUST_LOG", "shelf_gui=debug");
        assert_eq!(log_filter().to_string(), "shelf_gui=debug");
        std::env::remove_var("RUST_LOG");
    }
}
