//! The three summary views.
//!
//! Each aggregator is a pure function over a borrowed dataset:
//!
//! - `state`: total deaths per state
//! - `timeseries`: total deaths per date plus 7/30/90-row trailing means
//! - `histogram`: frequency of daily death counts for one state
//!
//! Every module also converts its rows into a `Table` for golden-file checks.

pub mod histogram;
pub mod rolling;
pub mod state;
pub mod timeseries;

pub use histogram::{bin_histogram, bin_histogram_with};
pub use rolling::trailing_mean;
pub use state::aggregate_by_state;
pub use timeseries::aggregate_over_time;
