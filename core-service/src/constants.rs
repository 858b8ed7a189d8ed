//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment, see
//! [`crate::logic::config::MlConfig::from_env`].

/// Buffered records that trigger a retrain cycle
pub const DEFAULT_RETRAIN_EVERY: usize = 5;

/// Minimum usable rows before a training task fits anything
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Trees per forest
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Maximum depth of every tree
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Seed for the train/test split and bagging
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Held-out share of each training batch
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Models directory name under the local data dir
pub const MODELS_DIR_NAME: &str = "saved_models";

/// App name
pub const APP_NAME: &str = "queue-ml";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Parse an environment variable, falling back to `default`
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Default models directory: `<data_local_dir>/queue-ml/saved_models`
pub fn default_models_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_NAME)
        .join(MODELS_DIR_NAME)
}
