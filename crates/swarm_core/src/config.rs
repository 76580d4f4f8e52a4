//! # Runtime Configuration
//!
//! Settings for the worker pool behind the [`Parallel`](crate::Parallel)
//! backend, loadable from a TOML file:
//!
//! ```toml
//! worker_threads = 8
//! thread_name = "swarm-worker"
//! stack_size = 4194304
//! ```
//!
//! Every key is optional. The sequential backend ignores all of this.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Worker pool settings for the parallel backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallelConfig {
    /// Number of worker threads. Zero lets rayon pick one per core.
    pub worker_threads: usize,
    /// Prefix of worker thread names; workers are `{thread_name}-{index}`.
    pub thread_name: String,
    /// Stack size of each worker in bytes, or the platform default.
    pub stack_size: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name: String::from("swarm-worker"),
            stack_size: None,
        }
    }
}

impl ParallelConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn builder(&self) -> rayon::ThreadPoolBuilder {
        let prefix = self.thread_name.clone();
        let mut builder = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads)
            .thread_name(move |index| format!("{prefix}-{index}"));
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }
        builder
    }

    /// Builds a dedicated pool. Run parallel-backend calls inside
    /// `pool.install(|| ...)` to use it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThreadPool`] if the operating system refuses the
    /// threads.
    pub fn build_pool(&self) -> Result<rayon::ThreadPool, ConfigError> {
        let pool = self.builder().build()?;
        tracing::info!(
            "Built worker pool: {} threads ({})",
            pool.current_num_threads(),
            self.thread_name
        );
        Ok(pool)
    }

    /// Configures rayon's global pool. Only the first call in a process can
    /// succeed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThreadPool`] if the global pool already exists.
    pub fn install_global(&self) -> Result<(), ConfigError> {
        self.builder().build_global()?;
        tracing::info!("Installed global worker pool ({})", self.thread_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, Parallel};

    #[test]
    fn test_defaults_from_empty_file() {
        let config = ParallelConfig::from_toml_str("").unwrap();
        assert_eq!(config, ParallelConfig::default());
    }

    #[test]
    fn test_parse_all_keys() {
        let config = ParallelConfig::from_toml_str(
            "worker_threads = 3\nthread_name = \"sim\"\nstack_size = 1048576\n",
        )
        .unwrap();
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.thread_name, "sim");
        assert_eq!(config.stack_size, Some(1 << 20));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ParallelConfig::from_toml_str("workers = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ParallelConfig::load("/nonexistent/swarm.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_pool_runs_parallel_backend() {
        let config = ParallelConfig {
            worker_threads: 2,
            ..ParallelConfig::default()
        };
        let pool = config.build_pool().unwrap();
        assert_eq!(pool.current_num_threads(), 2);

        let input: Vec<u64> = (1..=10_000).collect();
        let total = pool.install(|| Parallel::reduce(&input, 0, |a, b| a + b));
        assert_eq!(total, 50_005_000);
    }
}
