//! Random Forest Ensemble
//!
//! Bootstrap-aggregated decision trees with a fixed seed, so a given
//! training batch always produces the same forest.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::estimator::{check_training_set, Classifier, Estimator, ModelError, Regressor};
use super::tree::{DecisionTree, Target, TreeParams};
use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_SEED};

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            seed: DEFAULT_RANDOM_SEED,
        }
    }
}

/// Grow `params.n_estimators` trees on bootstrap resamples of `x`
fn grow_forest(
    x: &Array2<f64>,
    target: Target<'_>,
    params: &ForestParams,
    max_features: Option<usize>,
) -> Vec<DecisionTree> {
    let n = x.nrows();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let tree_params = TreeParams {
        max_depth: params.max_depth,
        min_samples_split: params.min_samples_split,
        max_features,
    };

    (0..params.n_estimators.max(1))
        .map(|_| {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            DecisionTree::fit(x, target, bootstrap, tree_params, &mut rng)
        })
        .collect()
}

// ============================================================================
// REGRESSOR
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForestRegressor {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl ForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for ForestRegressor {
    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

impl Regressor for ForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<(), ModelError> {
        check_training_set(x, y.len())?;

        // Regression trees consider every feature at each split
        self.trees = grow_forest(x, Target::Continuous(y), &self.params, None);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        self.check_row(row)?;

        let outputs: Vec<f64> = self
            .trees
            .iter()
            .filter_map(|t| t.predict(row).and_then(|v| v.first().copied()))
            .collect();

        if outputs.is_empty() {
            return Err(ModelError::NotFitted);
        }
        Ok(outputs.iter().sum::<f64>() / outputs.len() as f64)
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForestClassifier {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    classes: Vec<u32>,
    n_features: usize,
}

impl ForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            classes: Vec::new(),
            n_features: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for ForestClassifier {
    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

impl Classifier for ForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u32]) -> Result<(), ModelError> {
        check_training_set(x, y.len())?;

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let labels: Vec<usize> = y
            .iter()
            .map(|v| classes.binary_search(v).unwrap_or_default())
            .collect();

        // sqrt(n_features) candidates per split
        let max_features = (x.ncols() as f64).sqrt().ceil() as usize;
        let target = Target::Classes {
            labels: &labels,
            n_classes: classes.len(),
        };

        self.trees = grow_forest(x, target, &self.params, Some(max_features));
        self.classes = classes;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<Vec<f64>, ModelError> {
        self.check_row(row)?;

        let mut proba = vec![0.0; self.classes.len()];
        let mut voters = 0usize;
        for dist in self.trees.iter().filter_map(|t| t.predict(row)) {
            for (p, d) in proba.iter_mut().zip(dist) {
                *p += d;
            }
            voters += 1;
        }

        if voters == 0 {
            return Err(ModelError::NotFitted);
        }
        proba.iter_mut().for_each(|p| *p /= voters as f64);
        Ok(proba)
    }

    fn classes(&self) -> &[u32] {
        &self.classes
    }
}
