//! Total deaths by state.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{Record, StateTotal};
use crate::error::AppError;
use crate::table::{ColumnData, Table};

/// Sum `delta` per `key`.
///
/// Rows come out in ascending key order, so repeated runs (and golden
/// fixtures) always line up. Missing deltas count as zero. A total that
/// does not fit in an `i64` is an error.
pub fn aggregate_by_state(records: &[Record]) -> Result<Vec<StateTotal>, AppError> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for r in records {
        let total = totals.entry(r.key.as_str()).or_insert(0);
        *total = add_delta(*total, r)?;
    }

    debug!(records = records.len(), states = totals.len(), "aggregated deaths by state");

    Ok(totals
        .into_iter()
        .map(|(key, total)| StateTotal {
            key: key.to_string(),
            total,
        })
        .collect())
}

/// `total + delta`, or an invalid-data error when the sum overflows.
pub(crate) fn add_delta(total: i64, record: &Record) -> Result<i64, AppError> {
    total.checked_add(record.delta_or_zero()).ok_or_else(|| {
        AppError::new(
            3,
            format!(
                "Death total overflows at {} {}: {total} + {}.",
                record.key,
                record.date,
                record.delta_or_zero()
            ),
        )
    })
}

/// Columns: `state`, `tot_death`.
pub fn to_table(rows: &[StateTotal]) -> Result<Table, AppError> {
    Table::from_columns(vec![
        ("state", ColumnData::Str(rows.iter().map(|r| r.key.clone()).collect())),
        ("tot_death", ColumnData::Int(rows.iter().map(|r| r.total).collect())),
    ])
}
