//! Charts module - Chart data, interactive plots and static rendering

mod plotter;
mod renderer;

pub use plotter::{
    arc_points, day_number, format_day, pie_slices, ChartData, ChartKind, ChartPlotter, PieSlice,
    TrendPoint, EMPTY_CHART_MESSAGE,
};
pub use renderer::{RenderError, StaticChartRenderer, CHART_SIZE};
