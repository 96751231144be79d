mod app;
mod color;
mod config;
mod data;
mod scoring;
mod state;
mod ui;

use app::CreditScorerApp;
use config::{AppConfig, APP_TITLE};
use eframe::egui;
use scoring::ArtifactStore;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_current_dir().unwrap_or_else(|e| {
        log::warn!("{e:#}; falling back to '.'");
        AppConfig::from_root(".")
    });
    log::info!("Application root: {}", config.root.display());

    // Built once; every session borrows it and shares the loaded bundle.
    let store = ArtifactStore::new(config.artifacts);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(CreditScorerApp::new(&store)))),
    )
}
