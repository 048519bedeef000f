use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{EngineError, EngineFactory};
use crate::host::HostEvents;
use crate::surface::SurfaceSlot;

use super::bootstrap::{Bootstrapper, ResourceGuard};
use super::cancel::CancelToken;
use super::render_loop::{FrameFn, RenderLoop};
use super::{ErrorDescriptor, LifecycleState, Presentation, StageConfig, StageError};

/// How a mount cycle ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MountOutcome {
    /// Setup finished and the frame loop is registered.
    Running,
    /// Creation or setup failed; see [`Stage::error`].
    Failed,
    /// The stage was unmounted before setup finished; everything created
    /// along the way has been disposed.
    Cancelled,
}

/// Lifecycle manager for one embedded 3D surface.
///
/// `Stage` is a cheap handle (`Rc` inside): the host keeps one to bind the
/// surface and unmount, while a local task awaits [`Stage::mount`].
/// Everything is single-threaded; nothing here is `Send`.
pub struct Stage<F: EngineFactory> {
    inner: Rc<Inner<F>>,
}

impl<F: EngineFactory> Clone for Stage<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct Inner<F: EngineFactory> {
    config: StageConfig,
    host: Rc<dyn HostEvents>,
    surface: SurfaceSlot<F::Surface>,
    bootstrapper: Bootstrapper<F>,

    state: Cell<LifecycleState>,
    cycle: Cell<u64>,
    cancel: RefCell<Option<CancelToken>>,
    render_loop: RefCell<Option<RenderLoop>>,
    error: RefCell<Option<ErrorDescriptor>>,
}

impl<F: EngineFactory> Drop for Inner<F> {
    fn drop(&mut self) {
        if let Some(mut render_loop) = self.render_loop.get_mut().take() {
            render_loop.stop();
        }
        if self.bootstrapper.dispose() {
            log::debug!("stage dropped while running; engine disposed");
        }
    }
}

impl<F: EngineFactory> Stage<F> {
    pub fn new(factory: F, host: Rc<dyn HostEvents>, config: StageConfig) -> Self {
        let bootstrapper = Bootstrapper::new(factory, config.engine.clone());
        Self {
            inner: Rc::new(Inner {
                config,
                host,
                surface: SurfaceSlot::new(),
                bootstrapper,
                state: Cell::new(LifecycleState::Uninitialized),
                cycle: Cell::new(0),
                cancel: RefCell::new(None),
                render_loop: RefCell::new(None),
                error: RefCell::new(None),
            }),
        }
    }

    /// Slot the host fills with its drawable surface.
    pub fn surface(&self) -> &SurfaceSlot<F::Surface> {
        &self.inner.surface
    }

    pub fn config(&self) -> &StageConfig {
        &self.inner.config
    }

    pub fn factory(&self) -> &F {
        self.inner.bootstrapper.factory()
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.get()
    }

    /// Number of mount cycles started so far.
    pub fn cycle(&self) -> u64 {
        self.inner.cycle.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Error retained from the last failed mount.
    pub fn error(&self) -> Option<ErrorDescriptor> {
        self.inner.error.borrow().clone()
    }

    pub fn presentation(&self) -> Presentation {
        match (self.state(), self.inner.error.borrow().as_ref()) {
            (LifecycleState::Failed, Some(err)) => Presentation::Fallback(err.fallback_view()),
            _ => Presentation::Surface,
        }
    }

    /// Whether an engine and scene are installed and not yet disposed.
    pub fn has_engine(&self) -> bool {
        self.inner.bootstrapper.is_live()
    }

    /// Frames presented by the current render loop.
    pub fn frames_rendered(&self) -> u64 {
        self.inner
            .render_loop
            .borrow()
            .as_ref()
            .map_or(0, RenderLoop::frames_rendered)
    }

    /// Whether the engine reported a fatal frame error.
    pub fn is_halted(&self) -> bool {
        self.inner
            .render_loop
            .borrow()
            .as_ref()
            .is_some_and(RenderLoop::is_halted)
    }

    /// Runs one mount cycle: wait for a surface, create engine and scene,
    /// run `setup`, then start the frame loop.
    ///
    /// Creation and setup failures do not come back as `Err`; they move the
    /// stage to `failed` and are available through [`Stage::error`]. `Err` is
    /// reserved for calling `mount` while another cycle is active.
    ///
    /// If [`Stage::unmount`] runs while this is pending, whatever gets created
    /// is disposed as soon as it resolves and `Cancelled` is returned.
    pub async fn mount<Setup>(
        &self,
        setup: Setup,
        on_frame: Option<FrameFn<F::Scene>>,
    ) -> Result<MountOutcome, StageError>
    where
        Setup: AsyncFnOnce(&mut F::Scene, &mut F::Engine) -> anyhow::Result<()>,
    {
        let state = self.state();
        if !state.accepts_mount() {
            return Err(StageError::MountInProgress(state));
        }

        let cycle = self.inner.cycle.get() + 1;
        self.inner.cycle.set(cycle);
        self.inner.state.set(LifecycleState::Uninitialized);
        self.inner.error.replace(None);
        let cancel = CancelToken::new();
        self.inner.cancel.replace(Some(cancel.clone()));

        let scope = MountScope::new(self);
        log::info!("mounting stage (cycle {cycle})");
        self.transition(LifecycleState::Binding)?;

        let surface = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(scope.finish_cancelled()),
            surface = self.inner.surface.ready() => surface,
        };

        self.transition(LifecycleState::Creating)?;
        let created = self.create_resources(&surface, &cancel).await;
        drop(surface);

        if cancel.is_cancelled() {
            match created {
                Ok(guard) => {
                    log::info!("unmounted during engine creation; disposing the late engine");
                    guard.dispose();
                }
                Err(err) => log::info!("unmounted during engine creation; discarding: {err}"),
            }
            return Ok(scope.finish_cancelled());
        }

        let mut guard = match created {
            Ok(guard) => guard,
            Err(err) => return Ok(scope.fail(err)),
        };

        self.transition(LifecycleState::Configuring)?;
        let setup_result = match guard.parts_mut() {
            Some((scene, engine)) => setup(scene, engine).await,
            None => Err(anyhow::anyhow!("created resources went missing before setup")),
        };

        if cancel.is_cancelled() {
            log::info!("unmounted during scene setup; disposing engine and scene");
            guard.dispose();
            return Ok(scope.finish_cancelled());
        }
        if let Err(err) = setup_result {
            guard.dispose();
            return Ok(scope.fail(EngineError::Setup(err)));
        }

        let Some(resources) = guard.into_inner() else {
            return Ok(scope.fail(EngineError::Setup(anyhow::anyhow!(
                "created resources went missing after setup"
            ))));
        };
        let live = self.inner.bootstrapper.install(resources);
        let render_loop = RenderLoop::start(&self.inner.host, &live, on_frame);
        self.inner.render_loop.replace(Some(render_loop));
        self.transition(LifecycleState::Running)?;
        scope.complete();

        log::info!("stage running (cycle {cycle})");
        Ok(MountOutcome::Running)
    }

    /// Tears the stage down.
    ///
    /// While running: stops the frame loop and resize listener, then disposes
    /// scene and engine, then releases the surface. While setup is pending:
    /// flags the cycle as cancelled so the pending mount disposes its result.
    /// Otherwise only the surface is released.
    pub fn unmount(&self) {
        let state = self.state();
        match state {
            LifecycleState::Running => self.teardown(),
            LifecycleState::Binding | LifecycleState::Creating | LifecycleState::Configuring => {
                log::info!("unmount while {state}; pending work is discarded when it resolves");
                if let Some(cancel) = self.inner.cancel.borrow().as_ref() {
                    cancel.cancel();
                }
                if let Err(e) = self.transition(LifecycleState::Disposing) {
                    log::error!("{e}");
                }
                self.inner.surface.unbind();
            }
            LifecycleState::Disposing => log::debug!("unmount ignored: already disposing"),
            LifecycleState::Uninitialized | LifecycleState::Disposed | LifecycleState::Failed => {
                if self.inner.surface.unbind().is_some() {
                    log::debug!("surface released ({state})");
                }
            }
        }
    }

    fn teardown(&self) {
        if let Err(e) = self.transition(LifecycleState::Disposing) {
            log::error!("{e}");
            return;
        }

        let render_loop = self.inner.render_loop.borrow_mut().take();
        if let Some(mut render_loop) = render_loop {
            render_loop.stop();
            log::info!(
                "render loop stopped after {} frames",
                render_loop.frames_rendered()
            );
        }

        self.inner.bootstrapper.dispose();
        self.inner.surface.unbind();

        if let Err(e) = self.transition(LifecycleState::Disposed) {
            log::error!("{e}");
        }
        log::info!("stage disposed (cycle {})", self.cycle());
    }

    async fn create_resources(
        &self,
        surface: &F::Surface,
        cancel: &CancelToken,
    ) -> Result<ResourceGuard<F::Engine, F::Scene>, EngineError> {
        let attempts = self.inner.config.create_attempts.max(1);
        let mut attempt = 1;
        loop {
            let bootstrap = self.inner.bootstrapper.initialize(surface);
            let result = match self.inner.config.create_timeout {
                Some(limit) => tokio::time::timeout(limit, bootstrap)
                    .await
                    .unwrap_or(Err(EngineError::Timeout(limit))),
                None => bootstrap.await,
            };

            match result {
                Err(err) if attempt < attempts && err.is_retryable() && !cancel.is_cancelled() => {
                    log::warn!("engine creation attempt {attempt}/{attempts} failed: {err}");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn transition(&self, next: LifecycleState) -> Result<(), StageError> {
        let from = self.state();
        if !from.can_transition_to(next) {
            log::error!("rejected lifecycle transition {from} -> {next}");
            return Err(StageError::InvalidTransition { from, to: next });
        }
        log::debug!("stage cycle {}: {from} -> {next}", self.cycle());
        self.inner.state.set(next);
        Ok(())
    }

    fn record_failure(&self, err: EngineError) {
        let descriptor = ErrorDescriptor::from(&err);
        log::error!("stage failed: {}", descriptor.message);
        self.inner.error.replace(Some(descriptor));
        if let Err(e) = self.transition(LifecycleState::Failed) {
            log::error!("{e}");
        }
    }

    /// Closes a cycle whose mount future was dropped before finishing.
    fn abandon_cycle(&self) {
        let state = self.state();
        if let Some(cancel) = self.inner.cancel.borrow().as_ref() {
            cancel.cancel();
        }
        if state.is_setup_phase() {
            self.inner.state.set(LifecycleState::Disposing);
        }
        if self.state() == LifecycleState::Disposing {
            log::warn!("mount abandoned while {state}; cycle closed");
            self.inner.state.set(LifecycleState::Disposed);
        }
    }
}

/// Ends a mount cycle exactly once, whichever way `mount` exits.
struct MountScope<'a, F: EngineFactory> {
    stage: &'a Stage<F>,
    done: bool,
}

impl<'a, F: EngineFactory> MountScope<'a, F> {
    fn new(stage: &'a Stage<F>) -> Self {
        Self { stage, done: false }
    }

    fn complete(mut self) {
        self.done = true;
    }

    fn finish_cancelled(mut self) -> MountOutcome {
        self.done = true;
        if let Err(e) = self.stage.transition(LifecycleState::Disposed) {
            log::error!("{e}");
        }
        log::info!("mount cancelled (cycle {})", self.stage.cycle());
        MountOutcome::Cancelled
    }

    fn fail(mut self, err: EngineError) -> MountOutcome {
        self.done = true;
        self.stage.record_failure(err);
        MountOutcome::Failed
    }
}

impl<F: EngineFactory> Drop for MountScope<'_, F> {
    fn drop(&mut self) {
        if !self.done {
            self.stage.abandon_cycle();
        }
    }
}
