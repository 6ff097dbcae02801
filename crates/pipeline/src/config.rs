use std::time::Duration;

use cfgaudit_core::validation::DEFAULT_MAX_FILE_SIZE;

/// Pipeline configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of concurrent analysis workers (default: `3`).
    pub worker_count: usize,
    /// Bounded queue capacity; submissions past it are dropped with a
    /// warning (default: `100`).
    pub queue_capacity: usize,
    /// Maximum accepted upload size in bytes (default: 10 MiB).
    pub max_file_size: usize,
    /// Per-job wall-clock budget in seconds (default: `300`).
    pub job_timeout_secs: u64,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default    |
    /// |--------------------|------------|
    /// | `WORKER_COUNT`     | `3`        |
    /// | `QUEUE_CAPACITY`   | `100`      |
    /// | `MAX_FILE_SIZE`    | `10485760` |
    /// | `JOB_TIMEOUT_SECS` | `300`      |
    pub fn from_env() -> Self {
        let worker_count: usize = std::env::var("WORKER_COUNT")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("WORKER_COUNT must be a valid usize");

        let queue_capacity: usize = std::env::var("QUEUE_CAPACITY")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("QUEUE_CAPACITY must be a valid usize");

        let max_file_size: usize = std::env::var("MAX_FILE_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE.to_string())
            .parse()
            .expect("MAX_FILE_SIZE must be a valid usize");

        let job_timeout_secs: u64 = std::env::var("JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("JOB_TIMEOUT_SECS must be a valid u64");

        Self {
            worker_count,
            queue_capacity,
            max_file_size,
            job_timeout_secs,
        }
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            queue_capacity: 100,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            job_timeout_secs: 300,
        }
    }
}
