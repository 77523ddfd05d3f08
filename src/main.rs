mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use clap::Parser;
use eframe::egui;

use app::VaxDashboardApp;
use config::Config;
use data::store::DatasetStore;
use state::AppState;

fn main() -> eframe::Result {
    let config = Config::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // One store per process; every window/session borrows the same dataset.
    let store = DatasetStore::new(&config.data);
    let state = AppState::new(&store, config.default_regions);
    log::debug!(
        "{} read {} time(s) at start-up",
        store.path().display(),
        store.read_count()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vaccination Coverage Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(VaxDashboardApp { state }))),
    )
}
