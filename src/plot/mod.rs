//! Chart rendering.
//!
//! Aggregators never draw. Callers hand result rows to a `ChartRenderer`,
//! which owns colors, layout and the output format:
//!
//! - `png`: `plotters` bitmap charts written to disk
//! - `ascii`: terminal plots for `summarize` output

use std::path::Path;

use crate::domain::{BinEdges, HistogramRow, StateTotal, TimeSeriesRow};
use crate::error::AppError;

pub mod ascii;
pub mod png;

pub use png::PngRenderer;

/// Something that can turn result rows into chart files.
pub trait ChartRenderer {
    /// Bar chart of total deaths keyed by state.
    fn render_state_totals(&self, rows: &[StateTotal], path: &Path) -> Result<(), AppError>;

    /// Daily totals as points plus the three trailing means as lines.
    fn render_time_series(&self, rows: &[TimeSeriesRow], path: &Path) -> Result<(), AppError>;

    /// Histogram bars spanning each bin of `edges`.
    fn render_histogram(&self, rows: &[HistogramRow], edges: &BinEdges, path: &Path) -> Result<(), AppError>;
}
