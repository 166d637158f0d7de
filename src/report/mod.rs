//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives in one place so the aggregation code stays free of
//! presentation and output changes stay localized.

pub mod format;

pub use format::*;
