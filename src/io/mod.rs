//! Input/output helpers.
//!
//! - CSV ingest (`ingest`)
//! - golden fixture store read/write (`fixture`)

pub mod fixture;
pub mod ingest;

pub use fixture::*;
pub use ingest::*;
