//! Charts module - Interactive and static chart rendering

pub mod palette;
mod plotter;
mod renderer;

pub use plotter::{to_color32, ChartPlotter};
pub use renderer::StaticChartRenderer;
