//! Chart Plotter Module
//! Draws the dashboard views interactively using egui_plot.

use crate::charts::tile_grid::TILE_GRID;
use crate::charts::views::{BarSpec, ChoroplethSpec, Rgb, ScatterSpec, NO_DATA_COLOR, PLASMA};
use crate::data::StateSummary;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

pub const CHART_HEIGHT: f32 = 320.0;
pub const MAP_HEIGHT: f32 = 380.0;

pub const POINT_COLOR: Color32 = Color32::from_rgb(99, 110, 250);
pub const TREND_COLOR: Color32 = Color32::from_rgb(239, 85, 59);
pub const EMPTY_TILE_COLOR: Color32 = Color32::from_rgb(235, 235, 235);

const TILE_HALF: f64 = 0.45;

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Short axis labels for population values (e.g. 39M, 580k).
pub fn format_population(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e6 {
        format!("{:.0}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.0}k", value / 1e3)
    } else {
        format!("{:.0}", value)
    }
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    fn empty_note(ui: &mut egui::Ui, is_empty: bool) {
        if is_empty {
            ui.label(RichText::new("No states selected").italics().color(Color32::GRAY));
        }
    }

    /// Draw the tile-grid heat map. Unselected states are drawn as blank tiles.
    pub fn draw_choropleth(ui: &mut egui::Ui, spec: &ChoroplethSpec) {
        Self::empty_note(ui, spec.is_empty());

        let plot = Plot::new("choropleth")
            .height(MAP_HEIGHT)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .include_x(0.0)
            .include_x(12.0)
            .include_y(0.0)
            .include_y(-8.0);

        let response = plot.show(ui, |plot_ui| {
            for &(code, column, row) in TILE_GRID.iter() {
                let tile = spec.tile_at(column, row);
                let fill = match tile {
                    Some(t) => to_color32(t.fill.unwrap_or(NO_DATA_COLOR)),
                    None => EMPTY_TILE_COLOR,
                };

                let (cx, cy) = Self::tile_center(column, row);
                let square = PlotPoints::from(vec![
                    [cx - TILE_HALF, cy - TILE_HALF],
                    [cx + TILE_HALF, cy - TILE_HALF],
                    [cx + TILE_HALF, cy + TILE_HALF],
                    [cx - TILE_HALF, cy + TILE_HALF],
                ]);
                plot_ui.polygon(
                    Polygon::new(square)
                        .fill_color(fill)
                        .stroke(egui::Stroke::new(1.0, Color32::WHITE)),
                );

                let text_color = match tile {
                    Some(t) if t.fill.is_some() => Color32::WHITE,
                    _ => Color32::DARK_GRAY,
                };
                plot_ui.text(
                    Text::new(PlotPoint::new(cx, cy), RichText::new(code).size(11.0))
                        .color(text_color),
                );
            }

            // Hovered tile
            plot_ui.pointer_coordinate().and_then(|p| {
                let column = p.x.floor();
                let row = (-p.y).floor();
                if column < 0.0 || row < 0.0 {
                    return None;
                }
                spec.tile_at(column as u8, row as u8).map(|t| t.hover_text())
            })
        });

        if let Some(text) = response.inner {
            response.response.on_hover_text(text);
        }

        Self::draw_color_legend(ui, spec);

        if !spec.unplaced.is_empty() {
            ui.label(
                RichText::new(format!("Not on map: {}", spec.unplaced.join(", ")))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
    }

    fn tile_center(column: u8, row: u8) -> (f64, f64) {
        (column as f64 + 0.5, -(row as f64 + 0.5))
    }

    fn draw_color_legend(ui: &mut egui::Ui, spec: &ChoroplethSpec) {
        let Some((min, max)) = spec.value_range else {
            return;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new(&spec.color_label).size(11.0));
            ui.label(RichText::new(format!("{:.0}", min)).size(11.0));
            for rgb in PLASMA {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(18.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 0.0, to_color32(rgb));
            }
            ui.label(RichText::new(format!("{:.0}", max)).size(11.0));

            ui.add_space(12.0);
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 0.0, to_color32(NO_DATA_COLOR));
            ui.label(RichText::new("no hospitals").size(11.0));
        });
    }

    /// Scatter of population vs hospital count with state labels and trendline.
    pub fn draw_scatter(ui: &mut egui::Ui, spec: &ScatterSpec) {
        Self::empty_note(ui, spec.is_empty());

        Plot::new("scatter")
            .height(CHART_HEIGHT)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(|mark, _range| format_population(mark.value))
            .label_formatter(|name, value| {
                let prefix = if name.is_empty() {
                    String::new()
                } else {
                    format!("{}\n", name)
                };
                format!(
                    "{}Population: {:.0}\nHospital Count: {:.1}",
                    prefix, value.x, value.y
                )
            })
            .show(ui, |plot_ui| {
                if spec.points.is_empty() {
                    return;
                }

                let points: PlotPoints = spec
                    .points
                    .iter()
                    .map(|p| [p.population, p.hospital_count])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(4.0)
                        .color(POINT_COLOR)
                        .name("States"),
                );

                for p in &spec.points {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(p.population, p.hospital_count),
                            RichText::new(&p.state_code).size(10.0),
                        )
                        .anchor(egui::Align2::LEFT_BOTTOM),
                    );
                }

                if let Some(segment) = spec.trend_segment {
                    plot_ui.line(
                        Line::new(PlotPoints::from(segment.to_vec()))
                            .color(TREND_COLOR)
                            .width(2.0)
                            .name("OLS trendline"),
                    );
                }
            });
    }

    /// Bar chart of hospital count per state, labelled by code.
    pub fn draw_bar_chart(ui: &mut egui::Ui, spec: &BarSpec) {
        Self::empty_note(ui, spec.is_empty());

        let x_labels: Vec<String> = spec.bars.iter().map(|b| b.state_code.clone()).collect();

        Plot::new("bar_chart")
            .height(CHART_HEIGHT)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let rounded = mark.value.round();
                if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
                    return String::new();
                }
                x_labels.get(rounded as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                if spec.bars.is_empty() {
                    return;
                }

                let bars: Vec<Bar> = spec
                    .bars
                    .iter()
                    .enumerate()
                    .map(|(i, b)| {
                        Bar::new(i as f64, b.hospital_count as f64)
                            .name(&b.state_code)
                            .fill(POINT_COLOR)
                            .width(0.7)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name("Hospital Count"));

                for (i, b) in spec.bars.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, b.hospital_count as f64),
                            RichText::new(b.hospital_count.to_string()).size(10.0),
                        )
                        .anchor(egui::Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    /// Read-only preview of the merged table.
    pub fn draw_summary_table(ui: &mut egui::Ui, summary: &StateSummary) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("summary_table_scroll")
                    .max_height(260.0)
                    .show(ui, |ui| {
                        egui::Grid::new("summary_table")
                            .striped(true)
                            .min_col_width(70.0)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                for header in [
                                    "State",
                                    "ST",
                                    "Hospital Count",
                                    "Population",
                                    "Population / Hospital Count",
                                ] {
                                    ui.label(RichText::new(header).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in summary.rows() {
                                    ui.label(RichText::new(&row.state_name).size(11.0));
                                    ui.label(RichText::new(&row.state_code).size(11.0));
                                    ui.label(RichText::new(row.hospital_count.to_string()).size(11.0));
                                    ui.label(RichText::new(row.population.to_string()).size(11.0));
                                    match row.population_per_hospital {
                                        Some(v) => ui.label(RichText::new(format!("{:.3}", v)).size(11.0)),
                                        None => ui.label(RichText::new("-").size(11.0).color(Color32::GRAY)),
                                    };
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}
