//! Estimator traits
//!
//! The learning algorithm is a replaceable capability: training and
//! inference only talk to these traits.

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model is not fitted")]
    NotFitted,

    #[error("empty training set")]
    EmptyTrainingSet,

    #[error("{rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}

/// Common surface of every trainable model
pub trait Estimator {
    fn is_fitted(&self) -> bool;

    /// Number of feature columns seen at fit time
    fn n_features(&self) -> usize;

    fn check_row(&self, row: ArrayView1<'_, f64>) -> Result<(), ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        if row.len() != self.n_features() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        Ok(())
    }
}

pub trait Regressor: Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<(), ModelError>;
    fn predict(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError>;
}

pub trait Classifier: Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &[u32]) -> Result<(), ModelError>;

    /// Class probabilities aligned with [`Classifier::classes`]
    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<Vec<f64>, ModelError>;

    /// Sorted distinct labels seen at fit time
    fn classes(&self) -> &[u32];

    /// Most probable class; ties go to the smaller label
    fn predict(&self, row: ArrayView1<'_, f64>) -> Result<u32, ModelError> {
        let proba = self.predict_proba(row)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        self.classes().get(best).copied().ok_or(ModelError::NotFitted)
    }

    /// Probability of `label`, 0 when the label was never seen
    fn probability_of(&self, row: ArrayView1<'_, f64>, label: u32) -> Result<f64, ModelError> {
        let proba = self.predict_proba(row)?;
        Ok(self
            .classes()
            .iter()
            .position(|c| *c == label)
            .and_then(|i| proba.get(i).copied())
            .unwrap_or(0.0))
    }
}

pub(super) fn check_training_set(x: &Array2<f64>, labels: usize) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.nrows() != labels {
        return Err(ModelError::LabelCountMismatch { rows: x.nrows(), labels });
    }
    Ok(())
}
