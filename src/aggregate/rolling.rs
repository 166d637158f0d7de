//! Trailing (causal) moving averages.

use crate::error::AppError;

/// Trailing simple moving average with a minimum of one sample.
///
/// `out[i]` is the mean of `values[max(0, i + 1 - window)..=i]`, so the window
/// grows from one sample at the start of the series until it is full. The
/// output has the same length as the input.
pub fn trailing_mean(values: &[f64], window: usize) -> Result<Vec<f64>, AppError> {
    if window == 0 {
        return Err(AppError::new(3, "Rolling window must be at least 1."));
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        // Each window is summed on its own; no running sum carries error forward.
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    Ok(out)
}
