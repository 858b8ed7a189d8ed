//! Goodness-of-fit scores for held-out data

use ndarray::Array2;

use super::estimator::{Classifier, ModelError, Regressor};

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted exactly, otherwise 0.0.
/// Fewer than two samples leave R² undefined; that case scores 0.0.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.len() < 2 || y_true.len() != y_pred.len() {
        return 0.0;
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Fraction of exact label matches
pub fn accuracy(y_true: &[u32], y_pred: &[u32]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

pub fn score_regressor<R: Regressor>(model: &R, x: &Array2<f64>, y: &[f64]) -> Result<f64, ModelError> {
    let predictions = x
        .rows()
        .into_iter()
        .map(|row| model.predict(row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(r2_score(y, &predictions))
}

pub fn score_classifier<C: Classifier>(model: &C, x: &Array2<f64>, y: &[u32]) -> Result<f64, ModelError> {
    let predictions = x
        .rows()
        .into_iter()
        .map(|row| model.predict(row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accuracy(y, &predictions))
}

/// Round to `decimals` places, ties to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
