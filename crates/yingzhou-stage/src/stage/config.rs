use std::time::Duration;

use crate::engine::EngineOptions;

/// Stage configuration.
///
/// The defaults never time out and never retry: a hung engine load leaves the
/// stage in `creating` until it resolves or the host unmounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub engine: EngineOptions,

    /// Upper bound for one engine/scene creation attempt.
    ///
    /// On expiry the pending creation future is dropped and the attempt fails
    /// with `EngineError::Timeout`. Requires a tokio runtime with the time
    /// driver enabled.
    pub create_timeout: Option<Duration>,

    /// Total creation attempts per mount, at least 1.
    ///
    /// Only retryable errors are retried, and never after an unmount.
    pub create_attempts: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            create_timeout: None,
            create_attempts: 1,
        }
    }
}

impl StageConfig {
    pub fn with_engine_options(mut self, options: EngineOptions) -> Self {
        self.engine = options;
        self
    }

    pub fn with_create_timeout(mut self, timeout: Duration) -> Self {
        self.create_timeout = Some(timeout);
        self
    }

    pub fn with_create_attempts(mut self, attempts: u32) -> Self {
        self.create_attempts = attempts.max(1);
        self
    }
}
