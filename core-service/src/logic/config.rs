use std::path::PathBuf;

use crate::constants::{
    default_models_dir, env_or, DEFAULT_MAX_DEPTH, DEFAULT_MIN_SAMPLES, DEFAULT_N_ESTIMATORS,
    DEFAULT_RANDOM_SEED, DEFAULT_RETRAIN_EVERY, DEFAULT_TEST_FRACTION,
};
use crate::logic::model::ForestParams;

/// Tunables of the prediction core
#[derive(Debug, Clone, PartialEq)]
pub struct MlConfig {
    /// Directory holding model, encoder and metadata artifacts
    pub models_dir: PathBuf,

    /// Buffer length that triggers a retrain cycle
    pub retrain_every: usize,

    /// Minimum rows for a training task
    pub min_samples: usize,

    pub n_estimators: usize,
    pub max_depth: usize,
    pub random_seed: u64,

    /// Held-out share, clamped to (0, 1)
    pub test_fraction: f64,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            retrain_every: DEFAULT_RETRAIN_EVERY,
            min_samples: DEFAULT_MIN_SAMPLES,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_MAX_DEPTH,
            random_seed: DEFAULT_RANDOM_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
        }
    }
}

impl MlConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let models_dir = std::env::var("ML_MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_models_dir());

        Self {
            models_dir,
            retrain_every: env_or("ML_RETRAIN_EVERY", DEFAULT_RETRAIN_EVERY).max(1),
            min_samples: env_or("ML_MIN_SAMPLES", DEFAULT_MIN_SAMPLES).max(1),
            n_estimators: env_or("ML_N_ESTIMATORS", DEFAULT_N_ESTIMATORS).max(1),
            max_depth: env_or("ML_MAX_DEPTH", DEFAULT_MAX_DEPTH).max(1),
            random_seed: env_or("ML_RANDOM_SEED", DEFAULT_RANDOM_SEED),
            test_fraction: env_or("ML_TEST_FRACTION", DEFAULT_TEST_FRACTION).clamp(0.01, 0.99),
        }
    }

    /// Defaults rooted at `models_dir`
    pub fn with_models_dir(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            ..Default::default()
        }
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            seed: self.random_seed,
            ..Default::default()
        }
    }
}
