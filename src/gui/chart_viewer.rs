//! Chart Viewer Widget
//! Central scrollable panel: summary table preview followed by the three charts.

use crate::charts::{ChartPlotter, DashboardViews};
use crate::data::StateSummary;
use egui::{Color32, RichText, ScrollArea};
use std::sync::Arc;

const SECTION_SPACING: f32 = 15.0;
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const WARNING_COLOR: Color32 = Color32::from_rgb(243, 156, 18);

#[derive(Default)]
pub struct ChartViewer {
    pub summary: Option<Arc<StateSummary>>,
    pub views: Option<DashboardViews>,
    pub error: Option<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_summary(&mut self, summary: Arc<StateSummary>) {
        self.summary = Some(summary);
        self.error = None;
    }

    pub fn set_views(&mut self, views: DashboardViews) {
        self.views = Some(views);
    }

    /// Show a load failure instead of the dashboard.
    pub fn set_error(&mut self, message: String) {
        self.summary = None;
        self.views = None;
        self.error = Some(message);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = &self.error {
            Self::draw_error(ui, error);
            return;
        }

        let Some(summary) = self.summary.clone() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Loading data...").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Data Processing");
                ui.label(
                    "We merge the hospital and population files into one table \
                     of hospitals and population per state.",
                );
                ui.add_space(5.0);
                ChartPlotter::draw_summary_table(ui, &summary);
                Self::draw_unmatched(ui, &summary);

                ui.add_space(SECTION_SPACING);
                ui.heading("Visualizations");

                let Some(views) = &self.views else {
                    return;
                };

                Self::card(ui, "Population per Hospital", |ui| {
                    ui.label("Map of the USA showing Population / Hospital by State");
                    ChartPlotter::draw_choropleth(ui, &views.map);
                });

                Self::card(ui, "Population v/s Hospital Count", |ui| {
                    ui.label(
                        "Scatter plot with trendline. The correlation coefficient \
                         is shown when more than one state is selected.",
                    );
                    ChartPlotter::draw_scatter(ui, &views.scatter);
                    if let Some(text) = views.correlation_text() {
                        ui.label(RichText::new(text).strong());
                    }
                });

                Self::card(ui, "Hospital Count by State", |ui| {
                    ui.label("Bar chart showing number of Hospitals by State");
                    ChartPlotter::draw_bar_chart(ui, &views.bar);
                });
            });
    }

    fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(18.0).strong());
                ui.add_space(6.0);
                add_contents(ui);
            });
        ui.add_space(SECTION_SPACING);
    }

    fn draw_unmatched(ui: &mut egui::Ui, summary: &StateSummary) {
        if summary.unmatched().is_empty() {
            return;
        }
        let listed: Vec<String> = summary
            .unmatched()
            .iter()
            .map(|u| format!("{} ({})", u.state_code, u.hospital_count))
            .collect();
        ui.add_space(5.0);
        ui.label(
            RichText::new(format!(
                "⚠ Hospitals with no population row were left out: {}",
                listed.join(", ")
            ))
            .size(12.0)
            .color(WARNING_COLOR),
        );
    }

    fn draw_error(ui: &mut egui::Ui, error: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            egui::Frame::none()
                .rounding(8.0)
                .stroke(egui::Stroke::new(2.0, ERROR_COLOR))
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new("⚠ Could not load the dashboard data")
                            .size(18.0)
                            .strong()
                            .color(ERROR_COLOR),
                    );
                    ui.add_space(8.0);
                    ui.label(RichText::new(error).size(13.0));
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(
                            "Check DASHBOARD_DATA_DIR, DASHBOARD_HOSPITAL_CSV and \
                             DASHBOARD_POPULATION_CSV, then press Reload.",
                        )
                        .size(11.0)
                        .color(Color32::GRAY),
                    );
                });
        });
    }
}
