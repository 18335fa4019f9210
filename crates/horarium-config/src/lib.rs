//! Configuration for the Horarium timetable generator.
//!
//! Configuration can be built programmatically or loaded from TOML or
//! YAML files.
//!
//! # Examples
//!
//! ```
//! use horarium_config::{GeneratorConfig, ThreadCount};
//!
//! let config = GeneratorConfig::new()
//!     .with_worker_threads(ThreadCount::Specific(4))
//!     .with_branch_factor(3)
//!     .with_random_seed(42);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Number of worker threads the search pool spawns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// One worker per available CPU core.
    #[default]
    Auto,
    /// Exactly this many workers.
    Specific(usize),
}

impl ThreadCount {
    /// Resolves to a concrete worker count, falling back to 1 when the
    /// available parallelism cannot be determined.
    pub fn resolve(&self) -> usize {
        match self {
            ThreadCount::Auto => std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1),
            ThreadCount::Specific(count) => *count,
        }
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "auto"),
            ThreadCount::Specific(count) => write!(f, "{count}"),
        }
    }
}

/// Per-factor weights of the timetable score.
///
/// `placed_session` and `consecutive_pair` reward, `teacher_gap`
/// penalizes. All weights are magnitudes and must not be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub placed_session: i64,
    pub consecutive_pair: i64,
    pub teacher_gap: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            placed_session: 10,
            consecutive_pair: 2,
            teacher_gap: 3,
        }
    }
}

/// Main configuration of a generation run.
///
/// All fields default to sensible values, so an empty document is a
/// valid configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Worker threads of the search pool.
    pub worker_threads: ThreadCount,
    /// Child branches spawned after each successful placement.
    pub branch_factor: usize,
    /// A candidate only counts as a solution when its score exceeds this.
    pub min_solution_score: i64,
    /// A failed board is only kept as a diagnostic when its score
    /// exceeds this.
    pub min_failure_score: i64,
    /// Seed of the master random generator. `None` seeds from entropy.
    pub random_seed: Option<u64>,
    /// Weights of the score factors.
    pub score_weights: ScoreWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            worker_threads: ThreadCount::Auto,
            branch_factor: 3,
            min_solution_score: 0,
            min_failure_score: 0,
            random_seed: None,
            score_weights: ScoreWeights::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        GeneratorConfig::default()
    }

    /// Loads configuration from a file, dispatching on the extension:
    /// `.yaml`/`.yml` is parsed as YAML, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_worker_threads(mut self, worker_threads: ThreadCount) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_branch_factor(mut self, branch_factor: usize) -> Self {
        self.branch_factor = branch_factor;
        self
    }

    pub fn with_min_solution_score(mut self, min_solution_score: i64) -> Self {
        self.min_solution_score = min_solution_score;
        self
    }

    pub fn with_min_failure_score(mut self, min_failure_score: i64) -> Self {
        self.min_failure_score = min_failure_score;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_score_weights(mut self, score_weights: ScoreWeights) -> Self {
        self.score_weights = score_weights;
        self
    }

    /// Checks the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branch_factor == 0 {
            return Err(ConfigError::Invalid(
                "branch_factor must be at least 1".to_string(),
            ));
        }
        if self.worker_threads == ThreadCount::Specific(0) {
            return Err(ConfigError::Invalid(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        let weights = &self.score_weights;
        if weights.placed_session < 0 || weights.consecutive_pair < 0 || weights.teacher_gap < 0 {
            return Err(ConfigError::Invalid(
                "score weights must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
