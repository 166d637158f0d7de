//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by CSV ingest
//! - stored in (and reloaded from) the JSON fixture store
//! - converted into comparable tables for golden-file checks

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// State whose death frequency histogram is produced by default.
pub const DEFAULT_HISTOGRAM_KEY: &str = "OR";

/// Trailing window sizes (in rows) for the time-series rolling means.
pub const ROLLING_WINDOWS: [usize; 3] = [7, 30, 90];

/// Chart file name for the state totals bar chart.
pub const STATE_CHART_FILE: &str = "deaths_by_state.png";

/// Chart file name for the time-series chart.
pub const TIME_SERIES_CHART_FILE: &str = "deaths_over_time.png";

/// Chart file name for the frequency histogram of `key`.
pub fn histogram_chart_file(key: &str) -> String {
    format!("{key}_death_freq.png")
}

/// One input observation.
///
/// `delta` is the number of new events (new deaths) reported for `key` on
/// `date`. `None` models an empty cell: it counts as zero in sums and is
/// left out of histograms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub date: NaiveDate,
    pub delta: Option<i64>,
}

impl Record {
    pub fn new(key: impl Into<String>, date: NaiveDate, delta: i64) -> Self {
        Self {
            key: key.into(),
            date,
            delta: Some(delta),
        }
    }

    /// Delta with missing values treated as zero.
    pub fn delta_or_zero(&self) -> i64 {
        self.delta.unwrap_or(0)
    }
}

/// Total deaths for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTotal {
    pub key: String,
    pub total: i64,
}

/// Total deaths for one date plus trailing means over 7, 30 and 90 rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,
    pub total: i64,
    pub avg7: f64,
    pub avg30: f64,
    pub avg90: f64,
}

/// Count of observations whose delta falls in the bin starting at `bin_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramRow {
    pub bin_start: i64,
    pub count: u64,
}

/// Strictly increasing histogram bin edges.
///
/// `n` edges describe `n - 1` bins. Every bin is half-open `[lo, hi)` except
/// the last one, which also includes its right edge. Values outside
/// `[first, last]` belong to no bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct BinEdges(Vec<i64>);

impl BinEdges {
    pub fn new(edges: Vec<i64>) -> Result<Self, AppError> {
        if edges.len() < 2 {
            return Err(AppError::new(3, "Histogram needs at least two bin edges."));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AppError::new(
                3,
                format!("Histogram bin edges must be strictly increasing: {edges:?}"),
            ));
        }
        Ok(Self(edges))
    }

    /// Edges used for daily death counts: `[0, 1, 2, 5, 10, 20, ..., 120]`.
    ///
    /// Three narrow bins at the low end, then width-10 bins up to 120. There
    /// is no overflow bin, so days above 120 deaths are not counted.
    pub fn deaths() -> Self {
        let mut edges = vec![0, 1, 2, 5];
        edges.extend((10..=120).step_by(10));
        Self(edges)
    }

    pub fn edges(&self) -> &[i64] {
        &self.0
    }

    pub fn bin_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Left edge of every bin, in ascending order.
    pub fn bin_starts(&self) -> &[i64] {
        &self.0[..self.0.len() - 1]
    }

    /// Index of the bin containing `value`, if any.
    pub fn bin_of(&self, value: i64) -> Option<usize> {
        let first = self.0[0];
        let last = self.0[self.0.len() - 1];
        if value < first || value > last {
            return None;
        }
        if value == last {
            return Some(self.bin_count() - 1);
        }
        // First edge strictly greater than `value` closes its bin.
        Some(self.0.partition_point(|&edge| edge <= value) - 1)
    }
}

impl TryFrom<Vec<i64>> for BinEdges {
    type Error = AppError;

    fn try_from(edges: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(edges)
    }
}

impl From<BinEdges> for Vec<i64> {
    fn from(edges: BinEdges) -> Self {
        edges.0
    }
}

impl Default for BinEdges {
    fn default() -> Self {
        Self::deaths()
    }
}

/// Resolved settings for a `summarize` run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    pub histogram_key: String,
    /// Directory the PNG charts are written to.
    pub out_dir: PathBuf,
    /// Write PNG charts at all.
    pub charts: bool,
    /// Print an ASCII trend plot after the tables.
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
