//! Heritage Dashboard - Historic Places Data & Attendance Viewer
//!
//! Loads the historic-sites and attendance datasets, derives the report
//! tables and displays them as interactive maps and charts.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use eframe::egui;
use gui::HeritageApp;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Heritage Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Heritage Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(HeritageApp::new(cc)))),
    )
}
