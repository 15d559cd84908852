//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, MapPoint, ReportData, TopEntry};
pub use renderer::ReportRenderer;
