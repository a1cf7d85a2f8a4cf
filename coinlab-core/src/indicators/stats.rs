//! Small numeric helpers shared by indicators and the cost model.

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). NaN with fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Coefficient of variation: sample std over mean. NaN when undefined.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if !m.is_finite() || m == 0.0 {
        return f64::NAN;
    }
    sample_std(values) / m
}
