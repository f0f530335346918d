//! Configuration for the multi-threaded matchers.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Configuration for [`ParallelMatcher`](crate::matcher::ParallelMatcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelMatcherConfig {
    /// Number of worker threads.
    pub threads: usize,

    /// Number of tasks that may wait in the queue before the coordinator
    /// blocks.
    pub queue_capacity: usize,
}

impl Default for ParallelMatcherConfig {
    fn default() -> Self {
        ParallelMatcherConfig {
            threads: num_cpus::get(),
            queue_capacity: 1024,
        }
    }
}

impl ParallelMatcherConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the task queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(MonitorError::invalid_config(
                "Number of threads must be greater than 0",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(MonitorError::invalid_config(
                "Queue capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Configuration for [`PartitionMatcher`](crate::matcher::PartitionMatcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMatcherConfig {
    /// Number of candidates per package.
    pub package_size: usize,

    /// Upper bound on the pool size. `None` runs one thread per package.
    pub max_threads: Option<usize>,
}

impl Default for PartitionMatcherConfig {
    fn default() -> Self {
        PartitionMatcherConfig {
            package_size: 1000,
            max_threads: None,
        }
    }
}

impl PartitionMatcherConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of candidates per package.
    pub fn with_package_size(mut self, package_size: usize) -> Self {
        self.package_size = package_size;
        self
    }

    /// Cap the number of threads.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = Some(max_threads);
        self
    }

    /// Threads to use for `packages` packages.
    pub fn threads_for(&self, packages: usize) -> usize {
        let threads = self.max_threads.map_or(packages, |max| max.min(packages));
        threads.max(1)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.package_size == 0 {
            return Err(MonitorError::invalid_config(
                "Package size must be greater than 0",
            ));
        }
        if self.max_threads == Some(0) {
            return Err(MonitorError::invalid_config(
                "Number of threads must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_defaults_and_validation() {
        let config = ParallelMatcherConfig::default();
        assert_eq!(config.queue_capacity, 1024);
        assert!(config.threads > 0);
        assert!(config.validate().is_ok());

        assert!(config.clone().with_threads(0).validate().is_err());
        assert!(config.with_queue_capacity(0).validate().is_err());
    }

    #[test]
    fn test_partition_threads() {
        let config = PartitionMatcherConfig::default();
        assert_eq!(config.package_size, 1000);
        assert_eq!(config.threads_for(3), 3);
        assert_eq!(config.threads_for(0), 1);
        assert_eq!(config.clone().with_max_threads(2).threads_for(3), 2);
        assert!(config.with_package_size(0).validate().is_err());
    }

    #[test]
    fn test_config_json() {
        let config = ParallelMatcherConfig::new().with_threads(3);
        let json = serde_json::to_string(&config).unwrap();
        let decoded: ParallelMatcherConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);
    }
}
