//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily totals: `o`
//! - 7-row trailing mean: `-` line
//! - bar charts: `#` runs scaled to the widest value

use crate::domain::TimeSeriesRow;

/// Render daily totals with the 7-row trailing mean overlaid.
pub fn render_time_series(rows: &[TimeSeriesRow], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((first, last)) = rows.first().zip(rows.last()) else {
        return "Plot: (no data)\n".to_string();
    };

    let x_max = (rows.len() - 1).max(1) as f64;
    let (y_min, y_max) = y_range(rows).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the trend first so points can overlay.
    let trend: Vec<(f64, f64)> = rows.iter().enumerate().map(|(i, r)| (i as f64, r.avg7)).collect();
    draw_curve(&mut grid, &trend, x_max, y_min, y_max);

    for (i, r) in rows.iter().enumerate() {
        let x = map_x(i as f64, x_max, width);
        let y = map_y(r.total as f64, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{}, {}] | deaths=[{y_min:.1}, {y_max:.1}]\n",
        first.date, last.date
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Render labelled horizontal bars, one per line.
///
/// The largest value spans `width` cells; zero values get an empty bar.
pub fn render_bars(bars: &[(String, u64)], width: usize) -> String {
    let width = width.max(1);
    let label_width = bars.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = bars.iter().map(|&(_, v)| v).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in bars {
        let len = if max == 0 {
            0
        } else {
            ((*value as f64 / max as f64) * width as f64).round() as usize
        };
        out.push_str(&format!("{label:>label_width$} |{} {value}\n", "#".repeat(len)));
    }
    out
}

fn y_range(rows: &[TimeSeriesRow]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for r in rows {
        for y in [r.total as f64, r.avg7] {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let px = map_x(x, x_max, width);
        let py = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, px, py, '-');
        } else {
            grid[py][px] = '-';
        }
        prev = Some((px, py));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(d: u32, total: i64, avg7: f64) -> TimeSeriesRow {
        TimeSeriesRow {
            date: NaiveDate::from_ymd_opt(2021, 1, d).unwrap(),
            total,
            avg7,
            avg30: avg7,
            avg90: avg7,
        }
    }

    #[test]
    fn bars_scale_to_widest_value() {
        let txt = render_bars(&[("CA".to_string(), 10), ("OR".to_string(), 5), ("WA".to_string(), 0)], 4);
        assert_eq!(txt, "CA |#### 10\nOR |## 5\nWA | 0\n");
    }

    #[test]
    fn time_series_golden_snapshot_small() {
        let rows = vec![row(1, 0, 0.0), row(2, 10, 5.0)];
        let txt = render_time_series(&rows, 10, 5);
        let expected = concat!(
            "Plot: dates=[2021-01-01, 2021-01-02] | deaths=[-0.5, 10.5]\n",
            "         o\n",
            "          \n",
            "       ---\n",
            "   ----   \n",
            "o--       \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_has_placeholder() {
        assert_eq!(render_time_series(&[], 20, 5), "Plot: (no data)\n");
    }
}
