//! Charts module - view building and rendering

mod plotter;
mod renderer;
mod tile_grid;
mod views;

pub use plotter::{format_population, to_color32, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};
pub use tile_grid::{tile_position, GRID_COLUMNS, GRID_ROWS, TILE_GRID};
pub use views::{
    build_bar_chart, build_choropleth, build_scatter, build_views, colorscale, BarItem, BarSpec,
    ChoroplethSpec, DashboardViews, MapTile, Rgb, ScatterPoint, ScatterSpec, NO_DATA_COLOR,
    PLASMA,
};
