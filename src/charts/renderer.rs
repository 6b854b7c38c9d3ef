//! Static Chart Renderer
//! Writes the current views to PNG files with plotters, plus a JSON copy of
//! the view data.
//!
//! Output directory layout:
//! - `population_per_hospital_map.png`
//! - `population_vs_hospitals.png`
//! - `hospitals_by_state.png`
//! - `views.json`

use crate::charts::plotter::format_population;
use crate::charts::tile_grid::{TILE_GRID, GRID_COLUMNS, GRID_ROWS};
use crate::charts::views::{BarSpec, ChoroplethSpec, DashboardViews, Rgb, ScatterSpec, NO_DATA_COLOR};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const MAP_FILE: &str = "population_per_hospital_map.png";
pub const SCATTER_FILE: &str = "population_vs_hospitals.png";
pub const BAR_FILE: &str = "hospitals_by_state.png";
pub const VIEWS_FILE: &str = "views.json";

const IMAGE_SIZE: (u32, u32) = (1200, 800);

const POINT: RGBColor = RGBColor(99, 110, 250);
const TREND: RGBColor = RGBColor(239, 85, 59);
const EMPTY_TILE: RGBColor = RGBColor(235, 235, 235);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize views: {0}")]
    Json(#[from] serde_json::Error),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every view into `dir`, creating it if needed. Returns the written files.
    pub fn export_dir(views: &DashboardViews, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let map_path = dir.join(MAP_FILE);
        let scatter_path = dir.join(SCATTER_FILE);
        let bar_path = dir.join(BAR_FILE);
        let json_path = dir.join(VIEWS_FILE);

        Self::render_choropleth(&views.map, &map_path)?;
        Self::render_scatter(&views.scatter, views.correlation_text(), &scatter_path)?;
        Self::render_bar_chart(&views.bar, &bar_path)?;
        Self::write_json(views, &json_path)?;

        info!(dir = %dir.display(), states = views.selected, "views exported");
        Ok(vec![map_path, scatter_path, bar_path, json_path])
    }

    /// Write the view data as pretty JSON.
    pub fn write_json(views: &DashboardViews, path: &Path) -> Result<(), RenderError> {
        let json = serde_json::to_string_pretty(views)?;
        fs::write(path, json).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn render_choropleth(spec: &ChoroplethSpec, path: &Path) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let caption = match spec.value_range {
            Some((min, max)) => format!("{} ({:.0} to {:.0})", spec.title, min, max),
            None => spec.title.clone(),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 28).into_font())
            .margin(20)
            .build_cartesian_2d(0f64..GRID_COLUMNS as f64, -(GRID_ROWS as f64)..0f64)
            .map_err(draw_err)?;

        for &(code, column, row) in TILE_GRID.iter() {
            let color = match spec.tile_at(column, row) {
                Some(tile) => rgb(tile.fill.unwrap_or(NO_DATA_COLOR)),
                None => EMPTY_TILE,
            };
            let x0 = column as f64 + 0.05;
            let y0 = -(row as f64) - 0.05;

            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x0, y0), (x0 + 0.9, y0 - 0.9)],
                    color.filled(),
                )))
                .map_err(draw_err)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    code.to_string(),
                    (x0 + 0.3, y0 - 0.35),
                    ("sans-serif", 16).into_font().color(&BLACK),
                )))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        Ok(())
    }

    pub fn render_scatter(
        spec: &ScatterSpec,
        correlation: Option<String>,
        path: &Path,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let x_max = spec
            .points
            .iter()
            .map(|p| p.population)
            .fold(1.0, f64::max)
            * 1.1;
        let y_max = spec
            .points
            .iter()
            .map(|p| p.hospital_count)
            .fold(1.0, f64::max)
            * 1.1;

        let caption = match correlation {
            Some(text) => format!("{} | {}", spec.title, text),
            None => spec.title.clone(),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 24).into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(draw_err)?;

        let x_formatter = |v: &f64| format_population(*v);
        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&x_formatter)
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(spec.points.iter().map(|p| {
                EmptyElement::at((p.population, p.hospital_count))
                    + Circle::new((0, 0), 5, POINT.filled())
                    + Text::new(
                        p.state_code.clone(),
                        (6, -14),
                        ("sans-serif", 12).into_font(),
                    )
            }))
            .map_err(draw_err)?;

        if let Some([start, end]) = spec.trend_segment {
            chart
                .draw_series(LineSeries::new(
                    vec![(start[0], start[1]), (end[0], end[1])],
                    TREND.stroke_width(2),
                ))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        Ok(())
    }

    pub fn render_bar_chart(spec: &BarSpec, path: &Path) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let n = spec.bars.len().max(1);
        let y_max = (spec.max_count() as f64).max(1.0) * 1.1;
        let labels: Vec<String> = spec.bars.iter().map(|b| b.state_code.clone()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 28).into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(draw_err)?;

        let x_formatter = |v: &f64| {
            let rounded = v.round();
            if (v - rounded).abs() > 1e-6 || rounded < 0.0 {
                return String::new();
            }
            labels.get(rounded as usize).cloned().unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&x_formatter)
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(spec.bars.iter().enumerate().map(|(i, b)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.35, 0.0), (x + 0.35, b.hospital_count as f64)],
                    POINT.filled(),
                )
            }))
            .map_err(draw_err)?;

        chart
            .draw_series(spec.bars.iter().enumerate().map(|(i, b)| {
                Text::new(
                    b.hospital_count.to_string(),
                    (i as f64 - 0.2, b.hospital_count as f64 + y_max * 0.01),
                    ("sans-serif", 12).into_font(),
                )
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::views::build_views;
    use crate::data::{filter_by_states, StateRow, StateSummary};

    #[test]
    fn json_export_round_trips_through_serde() {
        let summary = StateSummary::from_rows(
            vec![
                StateRow::new("California", "CA", 2, 39_000_000),
                StateRow::new("Wyoming", "WY", 0, 580_000),
            ],
            Vec::new(),
        )
        .unwrap();
        let views = build_views(&filter_by_states(&summary, &summary.state_codes()));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VIEWS_FILE);
        StaticChartRenderer::write_json(&views, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["selected"], 2);
        assert_eq!(value["bar"]["bars"][0]["state_code"], "CA");
        assert!(value["map"]["tiles"][1]["fill"].is_null());
        assert!(value["r_squared"].is_number());
    }

    #[test]
    fn export_dir_writes_every_file() {
        let summary = StateSummary::from_rows(
            vec![
                StateRow::new("California", "CA", 2, 39_000_000),
                StateRow::new("Texas", "TX", 1, 29_000_000),
                StateRow::new("Wyoming", "WY", 0, 580_000),
            ],
            Vec::new(),
        )
        .unwrap();
        let views = build_views(&filter_by_states(&summary, &summary.state_codes()));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("export");
        let files = StaticChartRenderer::export_dir(&views, &out).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![MAP_FILE, SCATTER_FILE, BAR_FILE, VIEWS_FILE]);
        for file in &files {
            let len = fs::metadata(file).unwrap().len();
            assert!(len > 0, "{} is empty", file.display());
        }
    }

    #[test]
    fn write_json_reports_the_path() {
        let views = build_views(&filter_by_states(&StateSummary::default(), &["CA"]));
        let err = StaticChartRenderer::write_json(&views, Path::new("/nonexistent/dir/views.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/views.json"));
    }
}
