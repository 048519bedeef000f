use std::fmt;

/// Lifecycle of one mount cycle.
///
/// ```text
/// uninitialized → binding → creating → configuring → running → disposing → disposed
///                    │          │            │
///                    ├──────────┴────────────┴──→ failed
///                    └──────────┴────────────┴──→ disposing   (unmounted mid-setup)
/// ```
///
/// `disposed` and `failed` are terminal; a remount starts a new cycle.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    /// Waiting for the host to bind a surface.
    Binding,
    /// Engine and scene creation in flight.
    Creating,
    /// Caller setup routine running.
    Configuring,
    Running,
    Disposing,
    Disposed,
    Failed,
}

impl LifecycleState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disposed | Self::Failed)
    }

    /// States in which asynchronous setup work may be pending.
    pub const fn is_setup_phase(self) -> bool {
        matches!(self, Self::Binding | Self::Creating | Self::Configuring)
    }

    /// Whether a new mount cycle may begin from this state.
    pub const fn accepts_mount(self) -> bool {
        matches!(self, Self::Uninitialized) || self.is_terminal()
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use LifecycleState::*;
        match (self, next) {
            (Uninitialized, Binding)
            | (Binding, Creating)
            | (Creating, Configuring)
            | (Configuring, Running)
            | (Running, Disposing)
            | (Disposing, Disposed) => true,
            (from, Failed | Disposing) => from.is_setup_phase(),
            _ => false,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Binding => "binding",
            Self::Creating => "creating",
            Self::Configuring => "configuring",
            Self::Running => "running",
            Self::Disposing => "disposing",
            Self::Disposed => "disposed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::LifecycleState::*;
    use super::*;

    const ALL: [LifecycleState; 8] = [
        Uninitialized,
        Binding,
        Creating,
        Configuring,
        Running,
        Disposing,
        Disposed,
        Failed,
    ];

    #[test]
    fn happy_path_is_allowed() {
        let path = [
            Uninitialized,
            Binding,
            Creating,
            Configuring,
            Running,
            Disposing,
            Disposed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn failed_only_from_setup_phase() {
        for from in ALL {
            assert_eq!(
                from.can_transition_to(Failed),
                matches!(from, Binding | Creating | Configuring),
                "{from} -> failed"
            );
        }
    }

    #[test]
    fn terminal_states_go_nowhere() {
        for from in [Disposed, Failed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn cancellation_reaches_disposing_from_setup_phase() {
        assert!(Binding.can_transition_to(Disposing));
        assert!(Creating.can_transition_to(Disposing));
        assert!(Configuring.can_transition_to(Disposing));
        assert!(!Uninitialized.can_transition_to(Disposing));
    }

    #[test]
    fn no_skipping_ahead() {
        assert!(!Uninitialized.can_transition_to(Running));
        assert!(!Creating.can_transition_to(Running));
        assert!(!Running.can_transition_to(Disposed));
        assert!(!Running.can_transition_to(Failed));
    }

    #[test]
    fn mount_accepted_only_when_idle() {
        let accepting: Vec<_> = ALL.into_iter().filter(|s| s.accepts_mount()).collect();
        assert_eq!(accepting, vec![Uninitialized, Disposed, Failed]);
    }
}
