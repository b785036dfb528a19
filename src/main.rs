mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::TourismDashboardApp;
use config::DashboardConfig;
use data::loader::DataSource;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::default();

    // Read once, up front; a failure leaves the dashboard showing the error.
    let source = DataSource::new(&config.dataset_path);
    let mut state = AppState::new(config.clone());
    state.load(&source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |_cc| Ok(Box::new(TourismDashboardApp::new(state)))),
    )
}
