use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::task::{JoinHandle, LocalSet};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::engine::EngineFactory;
use crate::host::ListenerRegistry;
use crate::stage::{FrameFn, MountOutcome, Presentation, Stage, StageConfig};
use crate::surface::SurfaceSize;
use crate::time::FrameClock;

/// How often pending setup work is polled while nothing is drawing.
const SETUP_PUMP_INTERVAL: Duration = Duration::from_millis(4);

/// Window and stage configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub stage: StageConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "yingzhou".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            stage: StageConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }

    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.stage = stage;
        self
    }
}

/// Entry point for the windowed host.
pub struct Runtime;

impl Runtime {
    /// Opens one window, mounts a stage on it and runs until the window closes.
    ///
    /// The winit loop is the host: it binds the window as the stage surface,
    /// emits resizes and one frame per redraw, and unmounts on close. Async
    /// setup work runs on a current-thread tokio runtime pumped from the
    /// event loop.
    pub fn run<F, Setup>(
        config: RuntimeConfig,
        factory: F,
        setup: Setup,
        on_frame: Option<FrameFn<F::Scene>>,
    ) -> Result<()>
    where
        F: EngineFactory<Surface = Arc<Window>> + 'static,
        Setup: AsyncFnOnce(&mut F::Scene, &mut F::Engine) -> Result<()> + 'static,
    {
        let tokio = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to create tokio runtime")?;
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let registry = Rc::new(ListenerRegistry::new());
        let stage = Stage::new(factory, registry.clone(), config.stage.clone());

        let local = LocalSet::new();
        let mount = local.spawn_local(mount_and_report(stage.clone(), setup, on_frame));

        let mut host = Host {
            config,
            tokio,
            local,
            registry,
            stage,
            mount: Some(mount),
            window: None,
            clock: FrameClock::new(),
        };

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

async fn mount_and_report<F, Setup>(
    stage: Stage<F>,
    setup: Setup,
    on_frame: Option<FrameFn<F::Scene>>,
) where
    F: EngineFactory<Surface = Arc<Window>>,
    Setup: AsyncFnOnce(&mut F::Scene, &mut F::Engine) -> Result<()>,
{
    match stage.mount(setup, on_frame).await {
        Ok(MountOutcome::Running) => {}
        Ok(MountOutcome::Failed) => {
            let Presentation::Fallback(view) = stage.presentation() else {
                return;
            };
            log::error!("{}", view.summary());
            for hint in &view.guidance {
                log::info!("{hint}");
            }
            if let Some(window) = stage.surface().current() {
                window.set_title(&view.display_line());
            }
        }
        Ok(MountOutcome::Cancelled) => log::debug!("mount cancelled before the stage ran"),
        Err(e) => log::error!("{e}"),
    }
}

struct Host<F: EngineFactory<Surface = Arc<Window>>> {
    config: RuntimeConfig,
    tokio: tokio::runtime::Runtime,
    local: LocalSet,
    registry: Rc<ListenerRegistry>,
    stage: Stage<F>,
    mount: Option<JoinHandle<()>>,
    window: Option<Arc<Window>>,
    clock: FrameClock,
}

impl<F: EngineFactory<Surface = Arc<Window>>> Host<F> {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        self.stage.surface().bind(Arc::clone(&window));
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Gives pending local tasks (the mount) a turn.
    fn pump(&mut self) {
        if self.mount.is_none() {
            return;
        }
        self.local.block_on(&self.tokio, tokio::task::yield_now());
        if self.mount.as_ref().is_some_and(JoinHandle::is_finished) {
            self.mount = None;
            self.clock.reset();
            log::debug!("mount task finished: stage is {}", self.stage.state());
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.stage.unmount();
        // Let a cancelled mount observe the unmount and dispose what it holds.
        self.pump();
        self.window = None;
        event_loop.exit();
    }
}

impl<F: EngineFactory<Surface = Arc<Window>>> ApplicationHandler for Host<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("failed to create window: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().filter(|w| w.id() == window_id) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                self.registry.emit_resize(SurfaceSize::from(size));
                window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                self.registry
                    .emit_resize(SurfaceSize::from(window.inner_size()));
                window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let time = self.clock.tick();
                self.registry.emit_frame(time);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.pump();

        if self.stage.is_running() && !self.stage.is_halted() {
            event_loop.set_control_flow(ControlFlow::Wait);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else if self.mount.is_some() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(
                Instant::now() + SETUP_PUMP_INTERVAL,
            ));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.stage.unmount();
    }
}
