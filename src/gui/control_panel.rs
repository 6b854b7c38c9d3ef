//! Control Panel Widget
//! Left side panel with the data source, state filter and export controls.

use egui::{Color32, RichText, ScrollArea};

const FILTER_COLUMNS: usize = 4;

/// Left side control panel with the state multi-selection.
pub struct ControlPanel {
    pub hospital_file: String,
    pub population_file: String,
    pub codes: Vec<String>,
    pub selected: Vec<bool>,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            hospital_file: String::new(),
            population_file: String::new(),
            codes: Vec::new(),
            selected: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new(hospital_file: &str, population_file: &str) -> Self {
        Self {
            hospital_file: hospital_file.to_string(),
            population_file: population_file.to_string(),
            ..Self::default()
        }
    }

    /// Replace the selectable states; every state starts selected.
    pub fn update_states(&mut self, codes: Vec<String>) {
        self.selected = vec![true; codes.len()];
        self.codes = codes;
    }

    /// Selected state codes in table order.
    pub fn selected_codes(&self) -> Vec<String> {
        self.codes
            .iter()
            .zip(self.selected.iter())
            .filter(|(_, &selected)| selected)
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    /// Set every checkbox to `value`. Returns true when anything changed.
    pub fn set_all(&mut self, value: bool) -> bool {
        let changed = self.selected.iter().any(|&s| s != value);
        self.selected.iter_mut().for_each(|s| *s = value);
        changed
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏥 DS-620 Activity 6")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("By Nishil Asnani and Mohammad Shuaib Jewon")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.hospital_file).size(12.0));
                ui.label(RichText::new("Hospital information by state").size(10.0).color(Color32::GRAY));
                ui.add_space(4.0);
                ui.label(RichText::new(&self.population_file).size(12.0));
                ui.label(RichText::new("Population count by state").size(10.0).color(Color32::GRAY));
                ui.add_space(6.0);
                if ui.button("🔄 Reload").clicked() {
                    action = ControlPanelAction::Reload;
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.label(
            RichText::new("By default, all states are included in the visualizations")
                .size(10.0)
                .color(Color32::GRAY),
        );
        ui.add_space(5.0);

        ui.label(RichText::new(format!(
            "State Selection ({} of {})",
            self.selected_count(),
            self.codes.len()
        )))
        .on_hover_text("Select which states to use in Visualizations below");

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    egui::Grid::new("state_selection")
                        .num_columns(FILTER_COLUMNS)
                        .spacing([6.0, 2.0])
                        .show(ui, |ui| {
                            for (i, code) in self.codes.iter().enumerate() {
                                if ui.checkbox(&mut self.selected[i], code).changed() {
                                    action = ControlPanelAction::SelectionChanged;
                                }
                                if (i + 1) % FILTER_COLUMNS == 0 {
                                    ui.end_row();
                                }
                            }
                        });
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() && self.set_all(true) {
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("Clear All").clicked() && self.set_all(false) {
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    SelectionChanged,
    Export,
}
