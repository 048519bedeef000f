//! Lifecycle manager for an embedded 3D surface.
//!
//! A [`Stage`] waits for the host to bind a surface, creates engine and scene,
//! runs the caller's setup routine, then drives the scene from the host's frame
//! cadence until it is unmounted. Unmounting at any point leaves nothing
//! behind: pending creations are disposed when they resolve, and a running
//! loop is stopped before the scene and engine are disposed.

mod bootstrap;
mod cancel;
mod config;
mod error;
mod manager;
mod render_loop;
mod state;

#[cfg(test)]
mod testing;

pub use bootstrap::Resources;
pub use config::StageConfig;
pub use error::{ErrorDescriptor, FailureKind, FallbackView, Presentation, StageError};
pub use manager::{MountOutcome, Stage};
pub use render_loop::FrameFn;
pub use state::LifecycleState;
