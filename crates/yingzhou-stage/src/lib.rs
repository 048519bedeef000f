//! Yingzhou stage crate.
//!
//! Lifecycle management for an embedded 3D surface: bind a drawable surface,
//! create a rendering engine and scene for it, run a setup routine, drive a
//! frame loop, and tear everything down in order when the host unmounts.
//!
//! `stage` is the core and only depends on the `engine` and `host`
//! contracts. `gpu` and `window` plug wgpu and winit into those contracts.

pub mod engine;
pub mod gpu;
pub mod host;
pub mod logging;
pub mod stage;
pub mod surface;
pub mod time;
pub mod window;

pub use stage::{LifecycleState, MountOutcome, Stage, StageConfig};
