//! `covid-summary` library crate.
//!
//! The binary (`covid-summary`) is a thin wrapper around this library so that:
//!
//! - aggregation and comparison logic is testable without spawning processes
//! - chart rendering stays behind a trait and can be swapped or skipped
//! - golden-file verification can be reused by other tools

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod compare;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod table;
