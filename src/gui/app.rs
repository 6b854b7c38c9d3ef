//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{build_views, StaticChartRenderer};
use crate::config::DashboardConfig;
use crate::data::{self, filter_by_states, LoadError, StateSummary};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

/// Summary loading result from background thread
enum LoadResult {
    Complete(Arc<StateSummary>),
    Error(LoadError),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    summary: Option<Arc<StateSummary>>,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self::with_config(config);
        app.start_load();
        app
    }

    /// App state for `config` with nothing loaded yet.
    fn with_config(config: DashboardConfig) -> Self {
        Self {
            control_panel: ControlPanel::new(
                &file_name(&config.hospital_csv),
                &file_name(&config.population_csv),
            ),
            chart_viewer: ChartViewer::new(),
            summary: None,
            load_rx: None,
            is_loading: false,
            config,
        }
    }

    /// Load the summary through the process-wide cache in a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.set_progress(10.0, "Loading data...");

        let config = self.config.clone();
        thread::spawn(move || {
            let result = match data::get_or_load(&config) {
                Ok(summary) => LoadResult::Complete(summary),
                Err(e) => LoadResult::Error(e),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(summary)) => {
                self.control_panel.update_states(summary.state_codes());
                self.control_panel.set_progress(
                    100.0,
                    &format!(
                        "Complete! {} states, {} hospitals",
                        summary.len(),
                        summary.total_hospitals()
                    ),
                );
                self.chart_viewer.set_summary(Arc::clone(&summary));
                self.summary = Some(summary);
                self.is_loading = false;
                self.refresh_views();
            }
            Ok(LoadResult::Error(e)) => {
                error!(error = %e, "failed to load dashboard data");
                self.control_panel.set_progress(0.0, &format!("Error: {}", e));
                self.control_panel.export_enabled = false;
                self.chart_viewer.set_error(e.to_string());
                self.summary = None;
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                error!("loader thread exited without a result");
                self.control_panel
                    .set_progress(0.0, "Error: loading stopped unexpectedly");
                self.control_panel.export_enabled = false;
                self.chart_viewer
                    .set_error("Loading stopped before the data was ready".to_string());
                self.summary = None;
                self.is_loading = false;
            }
        }
    }

    /// Rebuild the views for the current selection. The summary itself is reused.
    fn refresh_views(&mut self) {
        let Some(summary) = &self.summary else {
            return;
        };

        let codes = self.control_panel.selected_codes();
        debug!(selected = codes.len(), "selection changed");

        let filtered = filter_by_states(summary, &codes);
        let views = build_views(&filtered);

        self.control_panel.export_enabled = true;
        self.chart_viewer.set_views(views);
    }

    /// Export the current charts to a user-chosen folder and open it.
    fn handle_export(&mut self) {
        let Some(views) = self.chart_viewer.views.as_ref() else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_title("Choose export folder")
            .pick_folder()
        else {
            return; // User cancelled
        };

        match StaticChartRenderer::export_dir(views, &dir) {
            Ok(files) => {
                info!(files = files.len(), dir = %dir.display(), "export finished");
                self.control_panel
                    .set_progress(100.0, &format!("Exported {} files", files.len()));
                if let Err(e) = open::that(&dir) {
                    debug!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::Reload => self.start_load(),
                        ControlPanelAction::SelectionChanged => self.refresh_views(),
                        ControlPanelAction::Export => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn app() -> DashboardApp {
        DashboardApp::with_config(DashboardConfig {
            hospital_csv: PathBuf::from("missing_hospitals.csv"),
            population_csv: PathBuf::from("missing_population.csv"),
            ..DashboardConfig::default()
        })
    }

    #[test]
    fn dead_loader_thread_shows_an_error() {
        let mut app = app();
        let (tx, rx) = channel::<LoadResult>();
        drop(tx);
        app.load_rx = Some(rx);
        app.is_loading = true;

        app.check_load_results();

        assert!(!app.is_loading);
        assert!(app.load_rx.is_none());
        assert!(app.chart_viewer.error.is_some());
        assert!(app.control_panel.status.starts_with("Error"));
    }

    #[test]
    fn pending_load_keeps_waiting() {
        let mut app = app();
        let (_tx, rx) = channel::<LoadResult>();
        app.load_rx = Some(rx);
        app.is_loading = true;

        app.check_load_results();

        assert!(app.is_loading);
        assert!(app.load_rx.is_some());
        assert!(app.chart_viewer.error.is_none());
    }

    #[test]
    fn completed_load_selects_every_state() {
        let mut app = app();
        let summary = StateSummary::from_rows(
            vec![
                crate::data::StateRow::new("California", "CA", 2, 39_000_000),
                crate::data::StateRow::new("Texas", "TX", 1, 29_000_000),
            ],
            Vec::new(),
        )
        .unwrap();
        let (tx, rx) = channel();
        tx.send(LoadResult::Complete(Arc::new(summary))).unwrap();
        app.load_rx = Some(rx);
        app.is_loading = true;

        app.check_load_results();

        assert!(!app.is_loading);
        assert_eq!(app.control_panel.selected_codes(), vec!["CA", "TX"]);
        assert_eq!(app.chart_viewer.views.as_ref().unwrap().selected, 2);
        assert!(app.control_panel.export_enabled);
    }
}
