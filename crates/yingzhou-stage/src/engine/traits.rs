use std::future::Future;

use crate::surface::SurfaceSize;

use super::{DisposeError, EngineError, EngineOptions};

/// Result of rendering one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// Transient problem (surface reconfigured, acquire timeout); try again next frame.
    Skipped,
    /// The engine cannot render anymore. The loop stops issuing frames.
    Fatal,
}

/// Rendering device/context bound to one surface.
pub trait RenderEngine {
    /// Recomputes output dimensions after the host surface changed size.
    fn resize(&mut self, size: SurfaceSize);

    /// Releases the device. Called exactly once, after the scene is gone.
    fn dispose(self) -> Result<(), DisposeError>
    where
        Self: Sized;
}

/// Content rendered by an engine each frame.
pub trait EngineScene {
    type Engine: RenderEngine;

    fn render(&mut self, engine: &mut Self::Engine) -> FrameOutcome;

    /// Releases scene resources. Always called before the engine's `dispose`.
    fn dispose(self) -> Result<(), DisposeError>
    where
        Self: Sized;
}

/// Creates engines and scenes for a surface.
///
/// Engine creation is asynchronous (loading a runtime, negotiating an
/// adapter) and fallible. Implementations clean up their own partial state
/// before returning an error.
pub trait EngineFactory {
    type Surface: Clone + 'static;
    type Engine: RenderEngine + 'static;
    type Scene: EngineScene<Engine = Self::Engine> + 'static;

    fn create_engine(
        &self,
        surface: &Self::Surface,
        options: &EngineOptions,
    ) -> impl Future<Output = Result<Self::Engine, EngineError>>;

    fn create_scene(&self, engine: &mut Self::Engine) -> Result<Self::Scene, EngineError>;
}
