use std::sync::Arc;

use winit::window::Window;

use crate::engine::{EngineError, EngineFactory, EngineOptions};

use super::{ClearScene, GpuInit, WgpuEngine};

/// Creates [`WgpuEngine`]s for winit windows.
#[derive(Debug, Clone, Default)]
pub struct WgpuFactory {
    init: GpuInit,
}

impl WgpuFactory {
    pub fn new(init: GpuInit) -> Self {
        Self { init }
    }

    pub fn init(&self) -> &GpuInit {
        &self.init
    }
}

impl EngineFactory for WgpuFactory {
    type Surface = Arc<Window>;
    type Engine = WgpuEngine;
    type Scene = ClearScene;

    async fn create_engine(
        &self,
        surface: &Arc<Window>,
        options: &EngineOptions,
    ) -> Result<WgpuEngine, EngineError> {
        WgpuEngine::new(Arc::clone(surface), options, &self.init).await
    }

    fn create_scene(&self, _engine: &mut WgpuEngine) -> Result<ClearScene, EngineError> {
        Ok(ClearScene::default())
    }
}
