use std::time::Duration;

use thiserror::Error;

/// Failures of engine/scene creation and scene setup.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The host lacks a required rendering capability (no adapter, no
    /// supported surface format, ...).
    #[error("rendering capability unavailable: {0}")]
    Unsupported(String),

    /// The host refused to create the rendering context.
    #[error("rendering context creation refused: {0:#}")]
    ContextRefused(#[source] anyhow::Error),

    /// The caller's setup routine failed.
    #[error("scene setup failed: {0:#}")]
    Setup(#[source] anyhow::Error),

    /// Creation did not finish within the configured limit.
    #[error("engine creation timed out after {0:?}")]
    Timeout(Duration),

    /// An initialization is already in flight for this stage.
    #[error("engine initialization already in progress")]
    Busy,
}

impl EngineError {
    /// Whether a fresh creation attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ContextRefused(_) | Self::Timeout(_))
    }
}

/// A resource failed to release cleanly.
///
/// Disposal is best-effort: these are logged, never surfaced to the user.
#[derive(Error, Debug)]
#[error("failed to dispose {resource}: {reason}")]
pub struct DisposeError {
    pub resource: &'static str,
    pub reason: String,
}

impl DisposeError {
    pub fn new(resource: &'static str, reason: impl Into<String>) -> Self {
        Self {
            resource,
            reason: reason.into(),
        }
    }
}
