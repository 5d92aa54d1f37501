//! Chart pipeline crate.
//!
//! Combines the reference price series with all loaded weight series, and
//! reshapes the result into the plot-ready model the chart widget consumes.

pub mod adapter;
pub mod combine;

pub use adapter::{build_chart, AxisConfig, ChartModel, ChartSeries, SeriesKind};
pub use combine::combine;
