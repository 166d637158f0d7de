//! Shared "summary pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> three aggregations -> optional charts -> tables -> golden checks
//!
//! The subcommands can then focus on presentation (printing vs fixture I/O).

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::aggregate::{self, aggregate_by_state, aggregate_over_time, bin_histogram};
use crate::compare::{Comparison, FloatPolicy, compare_table, explain_table_mismatch};
use crate::domain::{
    BinEdges, DEFAULT_HISTOGRAM_KEY, HistogramRow, Record, STATE_CHART_FILE, StateTotal, TIME_SERIES_CHART_FILE,
    TimeSeriesRow, histogram_chart_file,
};
use crate::error::AppError;
use crate::io::fixture::{
    DATASET_KEY, FixtureStore, HISTOGRAM_KEY, HISTOGRAM_STATE_KEY, STATE_KEY, TIME_SERIES_KEY,
};
use crate::plot::ChartRenderer;
use crate::table::{Datum, Scalar, Table};

/// Where (and how) charts are produced.
#[derive(Clone, Copy)]
pub struct ChartTarget<'a> {
    pub renderer: &'a dyn ChartRenderer,
    pub out_dir: &'a Path,
}

/// All computed outputs of a single summary run.
#[derive(Debug, Clone)]
pub struct SummaryOutput {
    pub histogram_key: String,
    pub by_state: Vec<StateTotal>,
    pub over_time: Vec<TimeSeriesRow>,
    pub histogram: Vec<HistogramRow>,
    /// Chart files written during the run.
    pub charts: Vec<PathBuf>,
}

impl SummaryOutput {
    /// Result tables keyed by their fixture-store entry names.
    pub fn tables(&self) -> Result<[(&'static str, Table); 3], AppError> {
        Ok([
            (STATE_KEY, aggregate::state::to_table(&self.by_state)?),
            (TIME_SERIES_KEY, aggregate::timeseries::to_table(&self.over_time)?),
            (HISTOGRAM_KEY, aggregate::histogram::to_table(&self.histogram)?),
        ])
    }
}

/// Outcome of checking one view against its fixture table.
#[derive(Debug, Clone)]
pub struct ViewCheck {
    pub key: &'static str,
    pub outcome: Comparison,
    /// First difference found, when the tables did not match.
    pub detail: Option<String>,
}

/// Run the three aggregations and, when `charts` is set, render each view.
///
/// The histogram chart is skipped when no record matches `histogram_key`.
pub fn run_summary(
    records: &[Record],
    histogram_key: &str,
    charts: Option<ChartTarget<'_>>,
) -> Result<SummaryOutput, AppError> {
    let by_state = aggregate_by_state(records)?;
    let over_time = aggregate_over_time(records)?;
    let histogram = bin_histogram(records, histogram_key);

    let mut written = Vec::new();
    if let Some(target) = charts {
        std::fs::create_dir_all(target.out_dir).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to create output dir '{}': {e}", target.out_dir.display()),
            )
        })?;

        let path = target.out_dir.join(STATE_CHART_FILE);
        target.renderer.render_state_totals(&by_state, &path)?;
        written.push(path);

        let path = target.out_dir.join(TIME_SERIES_CHART_FILE);
        target.renderer.render_time_series(&over_time, &path)?;
        written.push(path);

        if histogram.is_empty() {
            info!(key = histogram_key, "no records for histogram; chart skipped");
        } else {
            let path = target.out_dir.join(histogram_chart_file(histogram_key));
            target.renderer.render_histogram(&histogram, &BinEdges::deaths(), &path)?;
            written.push(path);
        }
    }

    Ok(SummaryOutput {
        histogram_key: histogram_key.to_string(),
        by_state,
        over_time,
        histogram,
        charts: written,
    })
}

/// Compare every view against the expected tables in `store`.
pub fn verify_summary(store: &FixtureStore, output: &SummaryOutput) -> Result<Vec<ViewCheck>, AppError> {
    let policy = FloatPolicy::default();
    let mut checks = Vec::with_capacity(3);

    for (key, actual) in output.tables()? {
        let (outcome, detail) = match store.get(key) {
            Some(expected) => {
                let outcome = compare_table(expected, &Datum::Table(actual.clone()));
                let detail = match (outcome, expected) {
                    (Comparison::Equal, _) => None,
                    (_, Datum::Table(e)) => explain_table_mismatch(e, &actual, &policy),
                    (_, other) => Some(format!("fixture entry is a {}, not a table", other.kind_name())),
                };
                (outcome, detail)
            }
            None => (Comparison::Incomparable, Some("missing from fixture store".to_string())),
        };

        match outcome {
            Comparison::Equal => info!(view = key, "matches fixture"),
            _ => warn!(view = key, ?outcome, detail = detail.as_deref().unwrap_or(""), "fixture mismatch"),
        }
        checks.push(ViewCheck { key, outcome, detail });
    }

    Ok(checks)
}

/// Run the summary on the fixture's own dataset and check it.
///
/// The histogram state defaults to the one recorded in the store. Asking for
/// a different state than the recorded one is an error.
pub fn verify_store(
    store: &FixtureStore,
    histogram_key: Option<&str>,
    charts: Option<ChartTarget<'_>>,
) -> Result<(SummaryOutput, Vec<ViewCheck>), AppError> {
    let histogram_key = resolve_histogram_key(store, histogram_key)?;
    let records = store.dataset(DATASET_KEY)?;
    let output = run_summary(records, histogram_key, charts)?;
    let checks = verify_summary(store, &output)?;
    Ok((output, checks))
}

fn resolve_histogram_key<'a>(
    store: &'a FixtureStore,
    requested: Option<&'a str>,
) -> Result<&'a str, AppError> {
    match (requested, store.histogram_state()?) {
        (Some(requested), Some(recorded)) if requested != recorded => Err(AppError::new(
            3,
            format!("Fixture histogram was recorded for '{recorded}', not '{requested}'."),
        )),
        (Some(key), _) | (None, Some(key)) => Ok(key),
        (None, None) => Ok(DEFAULT_HISTOGRAM_KEY),
    }
}

/// Build a fixture store holding `records`, the tables computed from them,
/// and the state the histogram was built for.
pub fn record_fixtures(records: &[Record], histogram_key: &str) -> Result<FixtureStore, AppError> {
    let output = run_summary(records, histogram_key, None)?;
    let mut store = FixtureStore::new();
    store.insert(DATASET_KEY, records.to_vec());
    store.insert(HISTOGRAM_STATE_KEY, Scalar::Str(histogram_key.to_string()));
    for (key, table) in output.tables()? {
        store.insert(key, table);
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn scenario() -> Vec<Record> {
        let day = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        vec![
            Record::new("OR", day, 5),
            Record::new("OR", day, 3),
            Record::new("CA", day, 10),
        ]
    }

    #[test]
    fn recorded_fixtures_verify_cleanly() {
        let records = scenario();
        let store = record_fixtures(&records, DEFAULT_HISTOGRAM_KEY).unwrap();
        let (output, checks) = verify_store(&store, None, None).unwrap();

        assert!(output.charts.is_empty());
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.outcome == Comparison::Equal && c.detail.is_none()));
    }

    #[test]
    fn non_default_state_round_trips_through_the_store() {
        let day = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let records = vec![Record::new("WA", day, 5), Record::new("OR", day, 50)];
        let store = record_fixtures(&records, "WA").unwrap();
        assert_eq!(store.histogram_state().unwrap(), Some("WA"));

        let (output, checks) = verify_store(&store, None, None).unwrap();
        assert_eq!(output.histogram_key, "WA");
        assert!(checks.iter().all(|c| c.outcome.is_equal()), "{checks:?}");

        let (_, checks) = verify_store(&store, Some("WA"), None).unwrap();
        assert!(checks.iter().all(|c| c.outcome.is_equal()), "{checks:?}");

        let err = verify_store(&store, Some("OR"), None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("'WA'"), "{err}");
    }

    #[test]
    fn store_without_recorded_state_uses_default_key() {
        let mut store = record_fixtures(&scenario(), DEFAULT_HISTOGRAM_KEY).unwrap();
        let mut legacy = FixtureStore::new();
        for key in store.keys().filter(|k| *k != HISTOGRAM_STATE_KEY) {
            legacy.insert(key, store.get(key).unwrap().clone());
        }
        store = legacy;

        let (output, checks) = verify_store(&store, None, None).unwrap();
        assert_eq!(output.histogram_key, DEFAULT_HISTOGRAM_KEY);
        assert!(checks.iter().all(|c| c.outcome.is_equal()));
    }

    #[test]
    fn tampered_fixture_is_reported() {
        let records = scenario();
        let mut store = record_fixtures(&records, DEFAULT_HISTOGRAM_KEY).unwrap();
        store.insert(
            STATE_KEY,
            aggregate::state::to_table(&[StateTotal { key: "CA".into(), total: 11 }]).unwrap(),
        );
        store.insert(HISTOGRAM_KEY, Datum::from(1.0));

        let output = run_summary(&records, DEFAULT_HISTOGRAM_KEY, None).unwrap();
        let checks = verify_summary(&store, &output).unwrap();

        assert_eq!(checks[0].key, STATE_KEY);
        assert_eq!(checks[0].outcome, Comparison::NotEqual);
        assert!(checks[0].detail.as_deref().unwrap().contains("shape"));
        assert_eq!(checks[1].outcome, Comparison::Equal);
        assert_eq!(checks[2].outcome, Comparison::Incomparable);
    }

    #[test]
    fn missing_fixture_entry_is_incomparable() {
        let output = run_summary(&scenario(), DEFAULT_HISTOGRAM_KEY, None).unwrap();
        let checks = verify_summary(&FixtureStore::new(), &output).unwrap();
        assert!(checks.iter().all(|c| c.outcome == Comparison::Incomparable));
    }

    #[test]
    fn histogram_chart_is_skipped_without_matching_records() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = crate::plot::PngRenderer { width: 200, height: 120 };
        let target = ChartTarget { renderer: &renderer, out_dir: dir.path() };

        let output = run_summary(&scenario(), "WA", Some(target)).unwrap();
        assert!(output.histogram.is_empty());
        assert_eq!(output.charts.len(), 2);
        assert!(!dir.path().join("WA_death_freq.png").exists());
    }
}
