//! Population-level statistics shared by feature extraction and the
//! anomaly model.

/// Mean and population standard deviation of a series.
///
/// Returns `(0.0, 0.0)` for an empty series. A constant series has exactly
/// zero spread, without the rounding noise of the summed mean.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let Some(&first) = values.first() else {
        return (0.0, 0.0);
    };
    if values.iter().all(|&v| v == first) {
        return (first, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Z-score of `value` against a population. Spread at rounding level relative
/// to the mean counts as zero and yields 0.
pub fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std <= f64::EPSILON * mean.abs().max(1.0) * 16.0 {
        0.0
    } else {
        (value - mean) / std
    }
}

/// Per-dimension `(min, max)` over a set of equally sized rows.
pub fn column_ranges(rows: &[Vec<f64>]) -> Vec<(f64, f64)> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut ranges: Vec<(f64, f64)> = first.iter().map(|&v| (v, v)).collect();
    for row in &rows[1..] {
        for (range, &v) in ranges.iter_mut().zip(row) {
            range.0 = range.0.min(v);
            range.1 = range.1.max(v);
        }
    }
    ranges
}

/// Linear-interpolated percentile of an ascending slice, `p` in [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}
