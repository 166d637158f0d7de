//! PNG charts via Plotters' bitmap backend.
//!
//! Plotters is built without font support (see `Cargo.toml`), so these charts
//! are drawn from shapes only: bars, points, lines and axes. No captions or
//! tick labels.

use std::error::Error;
use std::path::Path;

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::info;

use crate::domain::{BinEdges, HistogramRow, StateTotal, TimeSeriesRow};
use crate::error::AppError;
use crate::plot::ChartRenderer;

type DrawResult = Result<(), Box<dyn Error>>;

const BAR_COLOR: RGBColor = RGBColor(0, 0, 255);
const HISTOGRAM_COLOR: RGBColor = RGBColor(128, 0, 0);
const POINT_COLOR: RGBColor = RGBColor(255, 165, 0);
const AVG7_COLOR: RGBColor = RGBColor(139, 0, 0);
const AVG30_COLOR: RGBColor = RGBColor(0, 0, 255);
const AVG90_COLOR: RGBColor = RGBColor(0, 128, 0);

/// Writes each chart as a PNG of a fixed pixel size.
#[derive(Debug, Clone, Copy)]
pub struct PngRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

impl ChartRenderer for PngRenderer {
    fn render_state_totals(&self, rows: &[StateTotal], path: &Path) -> Result<(), AppError> {
        draw_state_totals(rows, path, (self.width, self.height)).map_err(|e| render_error(path, e))?;
        info!(path = %path.display(), bars = rows.len(), "wrote state totals chart");
        Ok(())
    }

    fn render_time_series(&self, rows: &[TimeSeriesRow], path: &Path) -> Result<(), AppError> {
        draw_time_series(rows, path, (self.width, self.height)).map_err(|e| render_error(path, e))?;
        info!(path = %path.display(), points = rows.len(), "wrote time-series chart");
        Ok(())
    }

    fn render_histogram(&self, rows: &[HistogramRow], edges: &BinEdges, path: &Path) -> Result<(), AppError> {
        draw_histogram(rows, edges, path, (self.width, self.height)).map_err(|e| render_error(path, e))?;
        info!(path = %path.display(), bins = rows.len(), "wrote histogram chart");
        Ok(())
    }
}

fn render_error(path: &Path, err: Box<dyn Error>) -> AppError {
    AppError::new(4, format!("Failed to render chart '{}': {err}", path.display()))
}

fn draw_state_totals(rows: &[StateTotal], path: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = rows.len().max(1) as f64;
    let y_max = upper_bound(rows.iter().map(|r| r.total as f64));

    let mut chart = ChartBuilder::on(&root).margin(20).build_cartesian_2d(0.0..x_max, 0.0..y_max)?;
    draw_axes(&mut chart, (0.0, x_max), (0.0, y_max))?;

    let fill = BAR_COLOR.mix(0.7).filled();
    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let x = i as f64;
        Rectangle::new([(x + 0.1, 0.0), (x + 0.9, r.total.max(0) as f64)], fill)
    }))?;

    root.present()?;
    Ok(())
}

fn draw_time_series(rows: &[TimeSeriesRow], path: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    // Dates become day offsets from the first date so gaps stay visible.
    let origin = rows.first().map(|r| r.date);
    let day_of = |r: &TimeSeriesRow| origin.map(|o| (r.date - o).num_days() as f64).unwrap_or(0.0);

    let x_max = rows.last().map(day_of).unwrap_or(0.0).max(1.0);
    let y_max = upper_bound(rows.iter().map(|r| r.total as f64));

    let mut chart = ChartBuilder::on(&root).margin(20).build_cartesian_2d(0.0..x_max, 0.0..y_max)?;
    draw_axes(&mut chart, (0.0, x_max), (0.0, y_max))?;

    chart.draw_series(
        rows.iter()
            .map(|r| Circle::new((day_of(r), r.total as f64), 3, POINT_COLOR.filled())),
    )?;

    let averages: [(fn(&TimeSeriesRow) -> f64, RGBColor); 3] = [
        (|r| r.avg7, AVG7_COLOR),
        (|r| r.avg30, AVG30_COLOR),
        (|r| r.avg90, AVG90_COLOR),
    ];
    for (value, color) in averages {
        chart.draw_series(LineSeries::new(
            rows.iter().map(|r| (day_of(r), value(r))),
            color.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn draw_histogram(rows: &[HistogramRow], edges: &BinEdges, path: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let bounds = edges.edges();
    let x_min = bounds[0] as f64;
    let x_max = bounds[bounds.len() - 1] as f64;
    let y_max = upper_bound(rows.iter().map(|r| r.count as f64));

    let mut chart = ChartBuilder::on(&root).margin(20).build_cartesian_2d(x_min..x_max, 0.0..y_max)?;
    draw_axes(&mut chart, (x_min, x_max), (0.0, y_max))?;

    // Each row's bar spans its own bin, so the uneven low bins keep their width.
    let fill = HISTOGRAM_COLOR.filled();
    chart.draw_series(rows.iter().zip(bounds.windows(2)).map(|(r, bin)| {
        Rectangle::new([(bin[0] as f64, 0.0), (bin[1] as f64, r.count as f64)], fill)
    }))?;

    root.present()?;
    Ok(())
}

type BitmapChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_axes(chart: &mut BitmapChart<'_, '_>, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> DrawResult {
    chart.draw_series([
        PathElement::new(vec![(x0, y0), (x1, y0)], &BLACK),
        PathElement::new(vec![(x0, y0), (x0, y1)], &BLACK),
    ])?;
    Ok(())
}

/// Top of the y-axis: 10% headroom over the largest value, at least 1.
fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    (max * 1.1).max(1.0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn upper_bound_has_headroom_and_floor() {
        assert!((upper_bound([10.0, 5.0].into_iter()) - 11.0).abs() < 1e-12);
        assert_eq!(upper_bound(std::iter::empty()), 1.0);
        assert_eq!(upper_bound([f64::NAN].into_iter()), 1.0);
    }

    #[test]
    fn writes_all_three_charts() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PngRenderer { width: 200, height: 120 };
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

        let states = dir.path().join("states.png");
        renderer
            .render_state_totals(&[StateTotal { key: "OR".into(), total: 8 }], &states)
            .unwrap();

        let series = dir.path().join("series.png");
        let row = TimeSeriesRow { date, total: 18, avg7: 18.0, avg30: 18.0, avg90: 18.0 };
        renderer.render_time_series(&[row], &series).unwrap();

        let hist = dir.path().join("hist.png");
        let edges = BinEdges::deaths();
        let rows: Vec<HistogramRow> = edges
            .bin_starts()
            .iter()
            .map(|&bin_start| HistogramRow { bin_start, count: 1 })
            .collect();
        renderer.render_histogram(&rows, &edges, &hist).unwrap();

        for path in [states, series, hist] {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[test]
    fn empty_rows_still_produce_a_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        PngRenderer::default().render_state_totals(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_path_is_a_render_error() {
        let err = PngRenderer::default()
            .render_state_totals(&[], Path::new("/nonexistent/dir/chart.png"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
