//! JSON fixture store for golden-file verification.
//!
//! The store is a single JSON object mapping keys to tagged `Datum` values:
//!
//! ```text
//! {
//!   "covid_data_frame":        { "kind": "dataset", "value": [...] },
//!   "graph_deaths_by_state":   { "kind": "table",   "value": {...} },
//!   "graph_deaths_over_time":  { "kind": "table",   "value": {...} },
//!   "graph_oregon_death_freq": { "kind": "table",   "value": {...} },
//!   "histogram_state":         { "kind": "scalar",  "value": { "type": "str", "value": "OR" } }
//! }
//! ```
//!
//! Keys are kept in sorted order so recorded fixtures diff cleanly.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::domain::Record;
use crate::error::AppError;
use crate::table::{Datum, Scalar, Table};

/// Key of the reference input dataset.
pub const DATASET_KEY: &str = "covid_data_frame";
/// Key of the expected state totals table.
pub const STATE_KEY: &str = "graph_deaths_by_state";
/// Key of the expected time-series table.
pub const TIME_SERIES_KEY: &str = "graph_deaths_over_time";
/// Key of the expected histogram table.
pub const HISTOGRAM_KEY: &str = "graph_oregon_death_freq";
/// Key of the state the histogram table was built for.
pub const HISTOGRAM_STATE_KEY: &str = "histogram_state";

/// In-memory view of a fixture file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureStore {
    entries: BTreeMap<String, Datum>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a store from disk.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open fixture store '{}': {e}", path.display())))?;
        let entries: BTreeMap<String, Datum> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::new(2, format!("Invalid fixture store '{}': {e}", path.display())))?;
        Ok(Self { entries })
    }

    /// Write the store to disk, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let file = File::create(path)
            .map_err(|e| AppError::new(2, format!("Failed to create fixture store '{}': {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.entries)
            .map_err(|e| AppError::new(2, format!("Failed to write fixture store: {e}")))?;
        writer
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write fixture store: {e}")))?;
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Datum>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Datum> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The dataset stored under `key`.
    pub fn dataset(&self, key: &str) -> Result<&[Record], AppError> {
        match self.require(key)? {
            Datum::Dataset(records) => Ok(records),
            other => Err(wrong_kind(key, "dataset", other)),
        }
    }

    /// The table stored under `key`.
    pub fn table(&self, key: &str) -> Result<&Table, AppError> {
        match self.require(key)? {
            Datum::Table(table) => Ok(table),
            other => Err(wrong_kind(key, "table", other)),
        }
    }

    /// The state recorded for the histogram table, if the store has one.
    ///
    /// Stores written before the state was recorded have no entry.
    pub fn histogram_state(&self) -> Result<Option<&str>, AppError> {
        match self.entries.get(HISTOGRAM_STATE_KEY) {
            None => Ok(None),
            Some(Datum::Scalar(Scalar::Str(state))) => Ok(Some(state)),
            Some(other) => Err(wrong_kind(HISTOGRAM_STATE_KEY, "string scalar", other)),
        }
    }

    fn require(&self, key: &str) -> Result<&Datum, AppError> {
        self.entries
            .get(key)
            .ok_or_else(|| AppError::new(2, format!("Fixture store has no entry '{key}'.")))
    }
}

fn wrong_kind(key: &str, wanted: &str, found: &Datum) -> AppError {
    AppError::new(
        2,
        format!("Fixture entry '{key}' is a {}, expected a {wanted}.", found.kind_name()),
    )
}
