//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input observations (`Record`)
//! - the three result row shapes (`StateTotal`, `TimeSeriesRow`, `HistogramRow`)
//! - histogram bin edges (`BinEdges`)
//! - run configuration (`RunConfig`)

pub mod types;

pub use types::*;
