use thiserror::Error;

use crate::engine::EngineError;

use super::LifecycleState;

/// Misuse of the stage API. Engine and setup failures never show up here;
/// they move the stage to `failed` instead.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum StageError {
    #[error("cannot mount while the stage is {0}")]
    MountInProgress(LifecycleState),

    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailureKind {
    EngineCreation,
    Setup,
    Timeout,
}

/// What went wrong during a failed mount, retained for display.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ErrorDescriptor {
    pub kind: FailureKind,
    /// Full cause chain, outermost first.
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn fallback_view(&self) -> FallbackView {
        let mut guidance = vec![FallbackView::RELOAD_HINT];
        if self.kind != FailureKind::Setup {
            guidance.push(FallbackView::ALTERNATE_HOST_HINT);
        }
        FallbackView {
            title: FallbackView::TITLE,
            message: self.message.clone(),
            guidance,
        }
    }
}

impl From<&EngineError> for ErrorDescriptor {
    fn from(err: &EngineError) -> Self {
        let kind = match err {
            EngineError::Setup(_) => FailureKind::Setup,
            EngineError::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::EngineCreation,
        };
        // `{:#}` keeps the whole anyhow chain on one line.
        Self::new(kind, format!("{err:#}"))
    }
}

/// Static presentation shown in place of the drawable surface after a
/// failed mount.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FallbackView {
    pub title: &'static str,
    pub message: String,
    pub guidance: Vec<&'static str>,
}

impl FallbackView {
    pub const TITLE: &'static str = "3D engine failed to load";
    pub const RELOAD_HINT: &'static str = "Reload to try again.";
    pub const ALTERNATE_HOST_HINT: &'static str =
        "If the problem persists, try another graphics adapter or host environment.";

    /// Single-line rendering for window titles and logs.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.title, self.message)
    }

    /// Summary followed by the remediation hints, for hosts that can only
    /// show one line of text.
    pub fn display_line(&self) -> String {
        if self.guidance.is_empty() {
            return self.summary();
        }
        format!("{} ({})", self.summary(), self.guidance.join(" "))
    }
}

/// What the host should draw for the stage.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Presentation {
    Surface,
    Fallback(FallbackView),
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn descriptor_keeps_cause_chain() {
        let err = EngineError::ContextRefused(anyhow!("adapter lost").context("request_device"));
        let d = ErrorDescriptor::from(&err);
        assert_eq!(d.kind, FailureKind::EngineCreation);
        assert!(d.message.contains("request_device"));
        assert!(d.message.contains("adapter lost"));
    }

    #[test]
    fn setup_failure_kind() {
        let err = EngineError::Setup(anyhow!("camera missing"));
        let d = ErrorDescriptor::from(&err);
        assert_eq!(d.kind, FailureKind::Setup);
        assert!(d.message.contains("camera missing"));
    }

    #[test]
    fn fallback_view_offers_guidance() {
        let d = ErrorDescriptor::new(FailureKind::EngineCreation, "no adapter");
        let view = d.fallback_view();
        assert_eq!(view.message, "no adapter");
        assert_eq!(
            view.guidance,
            vec![FallbackView::RELOAD_HINT, FallbackView::ALTERNATE_HOST_HINT]
        );
        assert!(view.summary().ends_with("no adapter"));
    }

    #[test]
    fn setup_failure_does_not_blame_host() {
        let d = ErrorDescriptor::new(FailureKind::Setup, "bad scene");
        assert_eq!(d.fallback_view().guidance, vec![FallbackView::RELOAD_HINT]);
    }

    #[test]
    fn display_line_carries_guidance() {
        let view =
            ErrorDescriptor::new(FailureKind::Timeout, "no context after 5s").fallback_view();
        let line = view.display_line();
        assert!(line.starts_with(&view.summary()));
        assert!(line.contains(FallbackView::RELOAD_HINT));
        assert!(line.contains(FallbackView::ALTERNATE_HOST_HINT));
    }
}
