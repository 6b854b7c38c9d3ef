//! Hospital Dashboard - interactive population per hospital viewer

use anyhow::Context;
use eframe::egui;
use hospital_dashboard::config::DashboardConfig;
use hospital_dashboard::gui::DashboardApp;
use hospital_dashboard::logging;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    logging::init(&config.log_filter);

    info!(
        hospitals = %config.hospital_csv.display(),
        population = %config.population_csv.display(),
        join_policy = %config.join_policy,
        "starting dashboard"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Hospital Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Hospital Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
