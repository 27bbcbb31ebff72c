mod app;
mod color;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use app::CatalogLensApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

/// Interactive analytics dashboard for a title catalog.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Catalog file to open at start-up (.csv, .tsv or .json).
    #[arg(short, long, default_value = "netflix_titles.csv")]
    data: PathBuf,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let mut state = AppState::default();
    state.load_path(&args.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Catalog Lens – Analytics Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CatalogLensApp::new(state)))),
    )
}
