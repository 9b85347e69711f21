//! Charts module - Chart rendering

pub mod palette;
mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{
    chart_size_supported, display_label, RenderError, RenderedChart, StaticChartRenderer,
    MAX_CHART_SIDE, MIN_CHART_HEIGHT, MIN_CHART_WIDTH,
};
