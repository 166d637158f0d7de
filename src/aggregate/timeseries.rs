//! Total deaths over time with trailing means.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::rolling::trailing_mean;
use crate::aggregate::state::add_delta;
use crate::domain::{ROLLING_WINDOWS, Record, TimeSeriesRow};
use crate::error::AppError;
use crate::table::{ColumnData, Table};

/// Sum `delta` per date, in ascending date order, with 7/30/90-row trailing means.
///
/// The windows count rows (dates present in the data), not calendar days.
/// Gaps in the dates are not filled.
pub fn aggregate_over_time(records: &[Record]) -> Result<Vec<TimeSeriesRow>, AppError> {
    // BTreeMap iteration gives the ascending date order the windows rely on.
    let mut daily: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for r in records {
        let total = daily.entry(r.date).or_insert(0);
        *total = add_delta(*total, r)?;
    }

    let totals: Vec<f64> = daily.values().map(|&t| t as f64).collect();
    let [w7, w30, w90] = ROLLING_WINDOWS;
    let avg7 = trailing_mean(&totals, w7)?;
    let avg30 = trailing_mean(&totals, w30)?;
    let avg90 = trailing_mean(&totals, w90)?;

    debug!(records = records.len(), dates = daily.len(), "aggregated deaths over time");

    Ok(daily
        .into_iter()
        .enumerate()
        .map(|(i, (date, total))| TimeSeriesRow {
            date,
            total,
            avg7: avg7[i],
            avg30: avg30[i],
            avg90: avg90[i],
        })
        .collect())
}

/// Columns: `submission_date`, `tot_death`, `7_day_avg`, `30_day_avg`, `90_day_avg`.
pub fn to_table(rows: &[TimeSeriesRow]) -> Result<Table, AppError> {
    Table::from_columns(vec![
        ("submission_date", ColumnData::Date(rows.iter().map(|r| r.date).collect())),
        ("tot_death", ColumnData::Int(rows.iter().map(|r| r.total).collect())),
        ("7_day_avg", ColumnData::Float(rows.iter().map(|r| r.avg7).collect())),
        ("30_day_avg", ColumnData::Float(rows.iter().map(|r| r.avg30).collect())),
        ("90_day_avg", ColumnData::Float(rows.iter().map(|r| r.avg90).collect())),
    ])
}
