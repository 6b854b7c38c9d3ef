//! Chart view builders
//! Turn the selected states into plain chart descriptions that both the
//! interactive plotter and the static renderer draw from.

use crate::charts::tile_grid::tile_position;
use crate::data::FilteredSummary;
use crate::stats::{StatsCalculator, TrendlineFit};
use serde::Serialize;

pub type Rgb = [u8; 3];

/// Fill for states whose population per hospital is undefined
pub const NO_DATA_COLOR: Rgb = [200, 200, 200];

/// Plasma continuous colour scale, low to high
pub const PLASMA: [Rgb; 10] = [
    [13, 8, 135],
    [70, 3, 159],
    [114, 1, 168],
    [156, 23, 158],
    [189, 55, 134],
    [216, 87, 107],
    [237, 121, 83],
    [251, 159, 58],
    [253, 202, 38],
    [240, 249, 33],
];

/// Colour at position `t` (clamped to [0, 1]) on the Plasma scale.
pub fn colorscale(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (PLASMA.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(PLASMA.len() - 1);
    let frac = scaled - lower as f64;

    let mut out = [0u8; 3];
    for (i, channel) in out.iter_mut().enumerate() {
        let a = PLASMA[lower][i] as f64;
        let b = PLASMA[upper][i] as f64;
        *channel = (a + (b - a) * frac).round() as u8;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapTile {
    pub state_code: String,
    pub state_name: String,
    pub column: u8,
    pub row: u8,
    pub hospital_count: u64,
    pub population: u64,
    pub population_per_hospital: Option<f64>,
    /// `None` means no data; drawn with `NO_DATA_COLOR`.
    pub fill: Option<Rgb>,
}

impl MapTile {
    pub fn hover_text(&self) -> String {
        let ratio = self
            .population_per_hospital
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "{}\nPopulation / Hospital Count: {}\nHospital Count: {}\nPopulation: {}",
            self.state_code, ratio, self.hospital_count, self.population
        )
    }
}

/// Heat map of population per hospital on the US tile grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethSpec {
    pub title: String,
    pub color_label: String,
    pub tiles: Vec<MapTile>,
    /// Selected codes with no tile on the grid.
    pub unplaced: Vec<String>,
    /// Min and max of the coloured values.
    pub value_range: Option<(f64, f64)>,
}

impl ChoroplethSpec {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile_at(&self, column: u8, row: u8) -> Option<&MapTile> {
        self.tiles
            .iter()
            .find(|t| t.column == column && t.row == row)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub state_code: String,
    pub population: f64,
    pub hospital_count: f64,
}

/// Population against hospital count with an OLS trendline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub trendline: Option<TrendlineFit>,
    /// Trendline drawn from the smallest to the largest population.
    pub trend_segment: Option<[[f64; 2]; 2]>,
}

impl ScatterSpec {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarItem {
    pub state_code: String,
    pub hospital_count: u64,
}

/// Hospital count per state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<BarItem>,
}

impl BarSpec {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn max_count(&self) -> u64 {
        self.bars.iter().map(|b| b.hospital_count).max().unwrap_or(0)
    }
}

/// Everything the chart viewer shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub selected: usize,
    pub map: ChoroplethSpec,
    pub scatter: ScatterSpec,
    pub bar: BarSpec,
    pub r_squared: Option<f64>,
}

impl DashboardViews {
    /// The R² readout, present only when two or more states are selected.
    pub fn correlation_text(&self) -> Option<String> {
        if self.selected < 2 {
            return None;
        }
        self.r_squared
            .map(|r2| format!("Correlation Coefficient (R^2 value): {:.5}", r2))
    }
}

pub fn build_choropleth(filtered: &FilteredSummary<'_>) -> ChoroplethSpec {
    let finite: Vec<f64> = filtered
        .iter()
        .filter_map(|r| r.population_per_hospital)
        .filter(|v| v.is_finite())
        .collect();

    let value_range = if finite.is_empty() {
        None
    } else {
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    };

    let mut tiles = Vec::with_capacity(filtered.len());
    let mut unplaced = Vec::new();

    for row in filtered.iter() {
        let Some((column, grid_row)) = tile_position(&row.state_code) else {
            unplaced.push(row.state_code.clone());
            continue;
        };

        let fill = match (row.population_per_hospital, value_range) {
            (Some(v), Some((min, max))) if v.is_finite() => {
                let t = if max > min { (v - min) / (max - min) } else { 0.5 };
                Some(colorscale(t))
            }
            _ => None,
        };

        tiles.push(MapTile {
            state_code: row.state_code.clone(),
            state_name: row.state_name.clone(),
            column,
            row: grid_row,
            hospital_count: row.hospital_count,
            population: row.population,
            population_per_hospital: row.population_per_hospital,
            fill,
        });
    }

    ChoroplethSpec {
        title: "Population per Hospital".to_string(),
        color_label: "Population / Hospital Count".to_string(),
        tiles,
        unplaced,
        value_range,
    }
}

pub fn build_scatter(filtered: &FilteredSummary<'_>) -> ScatterSpec {
    let points: Vec<ScatterPoint> = filtered
        .iter()
        .map(|r| ScatterPoint {
            state_code: r.state_code.clone(),
            population: r.population as f64,
            hospital_count: r.hospital_count as f64,
        })
        .collect();

    let trendline = StatsCalculator::fit_hospitals_on_population(filtered);

    let trend_segment = trendline.map(|fit| {
        let min_x = points.iter().map(|p| p.population).fold(f64::INFINITY, f64::min);
        let max_x = points
            .iter()
            .map(|p| p.population)
            .fold(f64::NEG_INFINITY, f64::max);
        [[min_x, fit.predict(min_x)], [max_x, fit.predict(max_x)]]
    });

    ScatterSpec {
        title: "Population v/s Hospital Count".to_string(),
        x_label: "Population".to_string(),
        y_label: "Hospital Count".to_string(),
        points,
        trendline,
        trend_segment,
    }
}

pub fn build_bar_chart(filtered: &FilteredSummary<'_>) -> BarSpec {
    BarSpec {
        title: "Hospital Count by State".to_string(),
        x_label: "State".to_string(),
        y_label: "Hospital Count".to_string(),
        bars: filtered
            .iter()
            .map(|r| BarItem {
                state_code: r.state_code.clone(),
                hospital_count: r.hospital_count,
            })
            .collect(),
    }
}

/// Build all three views. They only read `filtered`, so they run in parallel.
pub fn build_views(filtered: &FilteredSummary<'_>) -> DashboardViews {
    let (map, (scatter, bar)) = rayon::join(
        || build_choropleth(filtered),
        || rayon::join(|| build_scatter(filtered), || build_bar_chart(filtered)),
    );

    let r_squared = scatter.trendline.map(|fit| fit.r_squared);

    DashboardViews {
        selected: filtered.len(),
        map,
        scatter,
        bar,
        r_squared,
    }
}
