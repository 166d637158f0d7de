//! Property tests for the aggregation invariants.

use chrono::NaiveDate;
use proptest::prelude::*;

use covid_summary::aggregate::{aggregate_by_state, aggregate_over_time, bin_histogram, trailing_mean};
use covid_summary::aggregate::{histogram, state, timeseries};
use covid_summary::compare::{Comparison, compare_table};
use covid_summary::domain::{BinEdges, Record};
use covid_summary::table::{ColumnData, Datum, Table};

// ---------------------------------------------------------------------------
// Strategy generators
// ---------------------------------------------------------------------------

fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop_oneof![Just("OR"), Just("CA"), Just("WA"), Just("NY")],
        0u32..120,
        prop_oneof![
            8 => (0i64..200).prop_map(Some),
            1 => Just(None::<i64>),
        ],
    )
        .prop_map(|(key, offset, delta)| Record {
            key: key.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 22).unwrap() + chrono::Days::new(offset as u64),
            delta,
        })
}

fn arb_dataset() -> impl Strategy<Value = Vec<Record>> {
    proptest::collection::vec(arb_record(), 0..200)
}

fn total_delta(records: &[Record]) -> i64 {
    records.iter().map(Record::delta_or_zero).sum()
}

proptest! {
    #[test]
    fn state_totals_cover_every_record(records in arb_dataset()) {
        let rows = aggregate_by_state(&records).unwrap();
        prop_assert_eq!(rows.iter().map(|r| r.total).sum::<i64>(), total_delta(&records));
        prop_assert!(rows.windows(2).all(|w| w[0].key < w[1].key));
    }

    #[test]
    fn daily_totals_cover_every_record(records in arb_dataset()) {
        let rows = aggregate_over_time(&records).unwrap();
        prop_assert_eq!(rows.iter().map(|r| r.total).sum::<i64>(), total_delta(&records));
        prop_assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn seven_row_mean_matches_window(records in arb_dataset()) {
        let rows = aggregate_over_time(&records).unwrap();
        if let Some(first) = rows.first() {
            prop_assert_eq!(first.avg7, first.total as f64);
            prop_assert_eq!(first.avg90, first.total as f64);
        }
        for i in 6..rows.len() {
            let expected = rows[i - 6..=i].iter().map(|r| r.total as f64).sum::<f64>() / 7.0;
            prop_assert!((rows[i].avg7 - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn trailing_mean_stays_within_window_bounds(
        values in proptest::collection::vec(0.0f64..1e6, 1..100),
        window in 1usize..100,
    ) {
        let means = trailing_mean(&values, window).unwrap();
        prop_assert_eq!(means.len(), values.len());
        for (i, m) in means.iter().enumerate() {
            let slice = &values[(i + 1).saturating_sub(window)..=i];
            let lo = slice.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = slice.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m.is_finite());
            prop_assert!(*m >= lo - 1e-6 && *m <= hi + 1e-6);
        }
    }

    #[test]
    fn histogram_never_overcounts(records in arb_dataset()) {
        let rows = bin_histogram(&records, "OR");
        let matched: Vec<&Record> = records.iter().filter(|r| r.key == "OR").collect();

        if matched.is_empty() {
            prop_assert!(rows.is_empty());
        } else {
            let edges = BinEdges::deaths();
            prop_assert_eq!(rows.len(), edges.bin_count());
            let starts: Vec<i64> = rows.iter().map(|r| r.bin_start).collect();
            prop_assert_eq!(starts.as_slice(), edges.bin_starts());

            let binned: u64 = rows.iter().map(|r| r.count).sum();
            let in_range = matched
                .iter()
                .filter(|r| r.delta.is_some_and(|v| (0..=120).contains(&v)))
                .count() as u64;
            prop_assert_eq!(binned, in_range);
            prop_assert!(binned <= matched.len() as u64);
        }
    }

    #[test]
    fn result_tables_are_reflexive(records in arb_dataset()) {
        let tables = [
            state::to_table(&aggregate_by_state(&records).unwrap()).unwrap(),
            timeseries::to_table(&aggregate_over_time(&records).unwrap()).unwrap(),
            histogram::to_table(&bin_histogram(&records, "OR")).unwrap(),
        ];
        for t in tables {
            let d = Datum::Table(t);
            prop_assert_eq!(compare_table(&d, &d), Comparison::Equal);
        }
    }

    #[test]
    fn float_tables_with_nan_are_reflexive(
        values in proptest::collection::vec(
            prop_oneof![4 => -1e6f64..1e6, 1 => Just(f64::NAN), 1 => Just(f64::INFINITY)],
            0..50,
        ),
    ) {
        let d = Datum::Table(Table::from_columns(vec![("x", ColumnData::Float(values))]).unwrap());
        prop_assert_eq!(compare_table(&d, &d), Comparison::Equal);
    }
}
