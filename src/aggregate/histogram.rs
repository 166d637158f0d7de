//! Frequency of daily death counts for a single state.

use tracing::debug;

use crate::domain::{BinEdges, HistogramRow, Record};
use crate::error::AppError;
use crate::table::{ColumnData, Table};

/// Histogram of `delta` for records whose key is `key_filter`, using
/// `BinEdges::deaths()`.
pub fn bin_histogram(records: &[Record], key_filter: &str) -> Vec<HistogramRow> {
    bin_histogram_with(records, key_filter, &BinEdges::deaths())
}

/// Histogram of `delta` for records whose key is `key_filter`.
///
/// - No matching records: no rows at all (not a zero-filled histogram).
/// - Otherwise one row per bin, ascending, empty bins included.
/// - Values outside the outer edges and missing deltas are not counted.
///   With the default edges that means days above 120 deaths are dropped;
///   there is no overflow bin.
pub fn bin_histogram_with(records: &[Record], key_filter: &str, edges: &BinEdges) -> Vec<HistogramRow> {
    let mut matched = 0usize;
    let mut counts = vec![0u64; edges.bin_count()];
    for r in records.iter().filter(|r| r.key == key_filter) {
        matched += 1;
        if let Some(bin) = r.delta.and_then(|v| edges.bin_of(v)) {
            counts[bin] += 1;
        }
    }

    if matched == 0 {
        debug!(key = key_filter, "no records for histogram");
        return Vec::new();
    }

    let binned: u64 = counts.iter().sum();
    debug!(key = key_filter, records = matched, binned, "binned death frequencies");

    edges
        .bin_starts()
        .iter()
        .zip(counts)
        .map(|(&bin_start, count)| HistogramRow { bin_start, count })
        .collect()
}

/// Columns: `bin` (left edge), `tot_death` (count in that bin).
pub fn to_table(rows: &[HistogramRow]) -> Result<Table, AppError> {
    if rows.is_empty() {
        return Ok(Table::empty(&[
            ("bin", ColumnData::Int(Vec::new())),
            ("tot_death", ColumnData::Int(Vec::new())),
        ]));
    }
    let counts = rows
        .iter()
        .map(|r| {
            i64::try_from(r.count)
                .map_err(|_| AppError::new(3, format!("Histogram count {} does not fit a table cell.", r.count)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Table::from_columns(vec![
        ("bin", ColumnData::Int(rows.iter().map(|r| r.bin_start).collect())),
        ("tot_death", ColumnData::Int(counts)),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn count_at(rows: &[HistogramRow], bin_start: i64) -> u64 {
        rows.iter().find(|r| r.bin_start == bin_start).map(|r| r.count).unwrap()
    }

    #[test]
    fn filters_by_key_and_zero_fills() {
        let records = vec![
            Record::new("OR", day(1), 5),
            Record::new("OR", day(1), 3),
            Record::new("CA", day(1), 10),
        ];

        let rows = bin_histogram(&records, "OR");
        assert_eq!(rows.len(), 15);
        assert_eq!(count_at(&rows, 2), 1);
        assert_eq!(count_at(&rows, 5), 1);
        assert_eq!(rows.iter().map(|r| r.count).sum::<u64>(), 2);
        assert_eq!(count_at(&rows, 10), 0);
    }

    #[test]
    fn no_matching_records_gives_no_rows() {
        let records = vec![Record::new("CA", day(1), 10)];
        assert!(bin_histogram(&records, "OR").is_empty());
        assert!(bin_histogram(&[], "OR").is_empty());
    }

    #[test]
    fn values_past_last_edge_are_dropped() {
        let records = vec![
            Record::new("OR", day(1), 120),
            Record::new("OR", day(2), 121),
            Record::new("OR", day(3), 500),
        ];
        let rows = bin_histogram(&records, "OR");
        assert_eq!(count_at(&rows, 110), 1);
        assert_eq!(rows.iter().map(|r| r.count).sum::<u64>(), 1);
    }

    #[test]
    fn missing_deltas_are_not_counted_but_still_match() {
        let records = vec![Record { key: "OR".into(), date: day(1), delta: None }];
        let rows = bin_histogram(&records, "OR");
        assert_eq!(rows.len(), 15);
        assert!(rows.iter().all(|r| r.count == 0));
    }

    #[test]
    fn custom_edges_are_honored() {
        let edges = BinEdges::new(vec![0, 10, 20]).unwrap();
        let records = vec![
            Record::new("OR", day(1), 0),
            Record::new("OR", day(2), 10),
            Record::new("OR", day(3), 20),
        ];
        let rows = bin_histogram_with(&records, "OR", &edges);
        assert_eq!(
            rows,
            vec![
                HistogramRow { bin_start: 0, count: 1 },
                HistogramRow { bin_start: 10, count: 2 },
            ]
        );
    }

    #[test]
    fn empty_histogram_table_keeps_columns() {
        let table = to_table(&[]).unwrap();
        assert_eq!(table.shape(), (0, 2));
        assert_eq!(table.column_names(), vec!["bin", "tot_death"]);
    }
}
