//! Evaluation configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for evaluation runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Maximum number of records mid-execution at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-record task timeout in seconds (no timeout when unset)
    #[serde(default)]
    pub task_timeout_secs: Option<u64>,

    /// Experiment name recorded on the report
    #[serde(default)]
    pub experiment: Option<String>,
}

fn default_concurrency() -> usize {
    8
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            task_timeout_secs: None,
            experiment: None,
        }
    }
}

impl EvalConfig {
    /// Create a config with the given concurrency limit
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Default::default()
        }
    }

    /// Set the concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-record task timeout
    pub fn with_task_timeout(mut self, secs: u64) -> Self {
        self.task_timeout_secs = Some(secs);
        self
    }

    /// Set the experiment name
    pub fn with_experiment(mut self, name: impl Into<String>) -> Self {
        self.experiment = Some(name.into());
        self
    }

    /// Task timeout as a `Duration`, when configured
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }

    /// Effective concurrency limit (never zero)
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EvalConfig::default();
        assert_eq!(config.concurrency, 8);
        assert!(config.task_timeout().is_none());
        assert!(config.experiment.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = EvalConfig::new(4)
            .with_task_timeout(30)
            .with_experiment("smoke");

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.task_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.experiment.as_deref(), Some("smoke"));
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let config = EvalConfig::new(0);
        assert_eq!(config.effective_concurrency(), 1);
    }
}
