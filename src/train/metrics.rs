//! Regression error metrics for held-out evaluation.

/// Root-mean-squared error between targets and predictions.
///
/// Returns 0.0 for empty input.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn rmse(targets: &[f64], predictions: &[f64]) -> f64 {
    assert_eq!(targets.len(), predictions.len());
    if targets.is_empty() {
        return 0.0;
    }
    let n = targets.len() as f64;
    let sq_sum: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(y, p)| {
            let err = y - p;
            err * err
        })
        .sum();
    (sq_sum / n).sqrt()
}

/// Coefficient of determination.
///
/// Defined as 0.0 when the target variance is zero (constant targets) or
/// the input is empty.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn r2(targets: &[f64], predictions: &[f64]) -> f64 {
    assert_eq!(targets.len(), predictions.len());
    if targets.is_empty() {
        return 0.0;
    }
    let n = targets.len() as f64;
    let mean: f64 = targets.iter().sum::<f64>() / n;

    let ss_tot: f64 = targets
        .iter()
        .map(|y| {
            let d = y - mean;
            d * d
        })
        .sum();
    if ss_tot == 0.0 {
        return 0.0;
    }

    let ss_res: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(y, p)| {
            let d = y - p;
            d * d
        })
        .sum();
    1.0 - ss_res / ss_tot
}
