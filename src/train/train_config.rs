use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::persist;

/// How the query epochs are spread over a run.
///
/// - `Linear`   : every `epochs / queries` epochs.
/// - `NonLinear`: front-loaded, the k-th query lands near
///   `epochs · (k / queries)²`, so early training is sampled densely and the
///   last query is always the final epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    #[default]
    Linear,
    NonLinear,
}

/// Which loss drives the early-stopping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossMonitor {
    #[default]
    Test,
    Train,
}

/// Hyperparameters for a `Trainer` run.
///
/// # Fields
/// - `epochs`                  : total number of passes over the training data
/// - `batch_size`              : samples per mini-batch; the last batch may be shorter
/// - `queries`                 : number of scheduled test-set evaluations
/// - `early_stopping`          : whether stagnating loss may end the run early
/// - `early_stopping_threshold`: consecutive stagnating queries that end the run
/// - `query_mode`              : how query epochs are spread over the run
/// - `monitor`                 : which loss the early-stopping policy watches
/// - `seed`                    : fixes initialization and shuffling when set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub queries: usize,
    pub early_stopping: bool,
    pub early_stopping_threshold: usize,
    pub query_mode: QueryMode,
    pub monitor: LossMonitor,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 100,
            batch_size: 64,
            queries: 10,
            early_stopping: true,
            early_stopping_threshold: 5,
            query_mode: QueryMode::Linear,
            monitor: LossMonitor::Test,
            seed: None,
        }
    }
}

impl QueryMode {
    /// Strictly increasing query epochs in `1..=epochs`, one per query.
    /// Returns an empty schedule when `queries` is zero or exceeds `epochs`.
    pub fn schedule(&self, epochs: usize, queries: usize) -> Vec<usize> {
        if queries == 0 || queries > epochs {
            return Vec::new();
        }
        match self {
            QueryMode::Linear => {
                let step = epochs / queries;
                (1..=queries).map(|k| k * step).collect()
            }
            QueryMode::NonLinear => {
                let mut schedule = Vec::with_capacity(queries);
                let mut previous = 0;
                for k in 1..=queries {
                    let fraction = k as f64 / queries as f64;
                    let target = (epochs as f64 * fraction * fraction).round() as usize;
                    // Leave one epoch for each query still to come.
                    let latest = epochs - (queries - k);
                    let epoch = target.max(previous + 1).min(latest);
                    schedule.push(epoch);
                    previous = epoch;
                }
                schedule
            }
        }
    }
}

impl TrainConfig {
    /// Default hyperparameters for an `epochs`-long run.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            ..TrainConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if self.queries == 0 || self.queries > self.epochs {
            return Err(Error::InvalidConfig(format!(
                "queries must be in 1..={}, got {}",
                self.epochs, self.queries
            )));
        }
        if self.early_stopping_threshold == 0 {
            return Err(Error::InvalidConfig(
                "early_stopping_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn schedule(&self) -> Vec<usize> {
        self.query_mode.schedule(self.epochs, self.queries)
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        persist::save_json(self, path)
    }

    /// Deserializes a `TrainConfig` from a JSON file; missing fields take
    /// their defaults.
    pub fn load_json(path: &str) -> std::io::Result<TrainConfig> {
        persist::load_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_schedule_uses_fixed_step() {
        assert_eq!(QueryMode::Linear.schedule(100, 5), vec![20, 40, 60, 80, 100]);
        assert_eq!(QueryMode::Linear.schedule(10, 3), vec![3, 6, 9]);
        assert_eq!(QueryMode::Linear.schedule(4, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn non_linear_schedule_is_front_loaded() {
        let schedule = QueryMode::NonLinear.schedule(100, 5);
        assert_eq!(schedule, vec![4, 16, 36, 64, 100]);

        for (epochs, queries) in [(10, 10), (7, 3), (50, 20), (3, 1)] {
            let schedule = QueryMode::NonLinear.schedule(epochs, queries);
            assert_eq!(schedule.len(), queries);
            assert!(schedule.windows(2).all(|w| w[0] < w[1]), "{schedule:?}");
            assert!(schedule[0] >= 1);
            assert_eq!(*schedule.last().unwrap(), epochs);
        }
    }

    #[test]
    fn impossible_schedules_are_empty() {
        assert!(QueryMode::Linear.schedule(3, 5).is_empty());
        assert!(QueryMode::NonLinear.schedule(3, 0).is_empty());
    }

    #[test]
    fn validation() {
        assert!(TrainConfig::new(10).validate().is_ok());
        assert!(TrainConfig::new(0).validate().is_err());
        let too_many_queries = TrainConfig {
            queries: 11,
            ..TrainConfig::new(10)
        };
        assert!(too_many_queries.validate().is_err());
        let no_batch = TrainConfig {
            batch_size: 0,
            ..TrainConfig::new(10)
        };
        assert!(no_batch.validate().is_err());
        let no_threshold = TrainConfig {
            early_stopping_threshold: 0,
            ..TrainConfig::new(10)
        };
        assert!(no_threshold.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: TrainConfig =
            serde_json::from_str(r#"{"epochs":40,"query_mode":"non_linear","seed":3}"#).unwrap();
        assert_eq!(config.epochs, 40);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.queries, 10);
        assert!(config.early_stopping);
        assert_eq!(config.early_stopping_threshold, 5);
        assert_eq!(config.query_mode, QueryMode::NonLinear);
        assert_eq!(config.monitor, LossMonitor::Test);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn json_round_trip() {
        let config = TrainConfig {
            batch_size: 16,
            queries: 4,
            early_stopping: false,
            query_mode: QueryMode::NonLinear,
            monitor: LossMonitor::Train,
            seed: Some(9),
            ..TrainConfig::new(40)
        };
        let path = std::env::temp_dir().join(format!("ferrite_fit_config_{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        config.save_json(path).unwrap();
        let loaded = TrainConfig::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();

        assert_eq!(loaded.epochs, 40);
        assert_eq!(loaded.batch_size, 16);
        assert_eq!(loaded.queries, 4);
        assert!(!loaded.early_stopping);
        assert_eq!(loaded.query_mode, QueryMode::NonLinear);
        assert_eq!(loaded.monitor, LossMonitor::Train);
        assert_eq!(loaded.seed, Some(9));
        assert_eq!(loaded.schedule(), config.schedule());
    }
}
