//! Contracts for the external rendering engine.
//!
//! The stage never looks inside an engine or scene. It only needs to create
//! them, forward resizes, render once per frame and dispose them in order.
//! `crate::gpu` provides the wgpu implementation.

mod error;
mod options;
mod traits;

pub use error::{DisposeError, EngineError};
pub use options::{EngineOptions, FallbackMode, PowerPreference};
pub use traits::{EngineFactory, EngineScene, FrameOutcome, RenderEngine};
