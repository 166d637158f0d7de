//! Plain-text tables for the summary views and verification results.

use crate::app::pipeline::{SummaryOutput, ViewCheck};
use crate::compare::Comparison;
use crate::domain::{BinEdges, HistogramRow, StateTotal, TimeSeriesRow};
use crate::plot::ascii::render_bars;

const BAR_WIDTH: usize = 40;

/// Format the full run summary (all three views).
pub fn format_summary(output: &SummaryOutput) -> String {
    let mut out = String::new();

    out.push_str("=== Total deaths by state ===\n");
    out.push_str(&format_state_totals(&output.by_state));
    out.push('\n');

    out.push_str("=== Deaths over time ===\n");
    out.push_str(&format_time_series(&output.over_time));
    out.push('\n');

    out.push_str(&format!(
        "=== New death frequency (daily): {} ===\n",
        output.histogram_key
    ));
    out.push_str(&format_histogram(&output.histogram, &BinEdges::deaths()));

    if !output.charts.is_empty() {
        out.push_str("\nCharts:\n");
        for path in &output.charts {
            out.push_str(&format!("  {}\n", path.display()));
        }
    }
    out
}

pub fn format_state_totals(rows: &[StateTotal]) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }
    let bars: Vec<(String, u64)> = rows
        .iter()
        .map(|r| (r.key.clone(), r.total.max(0) as u64))
        .collect();
    render_bars(&bars, BAR_WIDTH)
}

pub fn format_time_series(rows: &[TimeSeriesRow]) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }
    let mut out = format!(
        "{:<10}  {:>9}  {:>10}  {:>10}  {:>10}\n",
        "date", "tot_death", "7_day_avg", "30_day_avg", "90_day_avg"
    );
    for r in rows {
        out.push_str(&format!(
            "{:<10}  {:>9}  {:>10.2}  {:>10.2}  {:>10.2}\n",
            r.date.to_string(),
            r.total,
            r.avg7,
            r.avg30,
            r.avg90
        ));
    }
    out
}

/// One bar per bin, labelled with the bin's interval from `edges`.
///
/// The last bin is closed, e.g. `[110, 120]`.
pub fn format_histogram(rows: &[HistogramRow], edges: &BinEdges) -> String {
    if rows.is_empty() {
        return "(no records for this state)\n".to_string();
    }
    let last = edges.bin_count() - 1;
    let bars: Vec<(String, u64)> = rows
        .iter()
        .zip(edges.edges().windows(2))
        .enumerate()
        .map(|(i, (r, bin))| {
            let label = if i == last {
                format!("[{}, {}]", bin[0], bin[1])
            } else {
                format!("[{}, {})", bin[0], bin[1])
            };
            (label, r.count)
        })
        .collect();
    render_bars(&bars, BAR_WIDTH)
}

/// One line per checked view, e.g. `graph_deaths_by_state: ok`.
pub fn format_verification(checks: &[ViewCheck]) -> String {
    let mut out = String::new();
    for check in checks {
        let verdict = match check.outcome {
            Comparison::Equal => "ok",
            Comparison::NotEqual => "MISMATCH",
            Comparison::Incomparable => "INCOMPARABLE",
        };
        out.push_str(&format!("{}: {verdict}", check.key));
        if let Some(detail) = &check.detail {
            out.push_str(&format!(" ({detail})"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn histogram_labels_show_bin_intervals() {
        let rows = vec![
            HistogramRow { bin_start: 0, count: 2 },
            HistogramRow { bin_start: 1, count: 0 },
            HistogramRow { bin_start: 110, count: 1 },
        ];
        let edges = BinEdges::new(vec![0, 1, 110, 120]).unwrap();
        let txt = format_histogram(&rows, &edges);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("[0, 1)"));
        assert!(lines[1].trim_start().starts_with("[1, 110)"));
        assert!(lines[2].trim_start().starts_with("[110, 120]"), "{txt}");
    }

    #[test]
    fn death_histogram_ends_with_closed_bin() {
        let edges = BinEdges::deaths();
        let rows: Vec<HistogramRow> = edges
            .bin_starts()
            .iter()
            .map(|&bin_start| HistogramRow { bin_start, count: 1 })
            .collect();
        let txt = format_histogram(&rows, &edges);
        assert_eq!(txt.lines().count(), 15);
        assert!(txt.lines().last().unwrap().trim_start().starts_with("[110, 120]"), "{txt}");
        assert!(!txt.contains("..."));
    }

    #[test]
    fn time_series_rows_are_aligned() {
        let rows = vec![TimeSeriesRow {
            date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            total: 18,
            avg7: 18.0,
            avg30: 18.0,
            avg90: 18.0,
        }];
        let txt = format_time_series(&rows);
        assert_eq!(
            txt.lines().nth(1).unwrap(),
            "2021-01-01         18       18.00       18.00       18.00"
        );
    }

    #[test]
    fn verification_lines_carry_detail() {
        let checks = vec![
            ViewCheck { key: "a", outcome: Comparison::Equal, detail: None },
            ViewCheck { key: "b", outcome: Comparison::NotEqual, detail: Some("shape mismatch".into()) },
        ];
        assert_eq!(format_verification(&checks), "a: ok\nb: MISMATCH (shape mismatch)\n");
    }
}
