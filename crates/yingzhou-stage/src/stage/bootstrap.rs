use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::engine::{EngineError, EngineFactory, EngineOptions, EngineScene, RenderEngine};

/// A created engine together with its scene.
pub struct Resources<E, S> {
    pub engine: E,
    pub scene: S,
}

/// Disposes scene, then engine. Failures are logged and swallowed.
pub(crate) fn dispose_resources<E, S>(resources: Resources<E, S>)
where
    E: RenderEngine,
    S: EngineScene<Engine = E>,
{
    let Resources { engine, scene } = resources;
    if let Err(e) = scene.dispose() {
        log::warn!("{e}");
    }
    if let Err(e) = engine.dispose() {
        log::warn!("{e}");
    }
}

/// Owns freshly created resources until they are installed.
///
/// Dropping the guard disposes them, which covers the cancelled, failed and
/// abandoned-future paths alike.
pub(crate) struct ResourceGuard<E, S>
where
    E: RenderEngine,
    S: EngineScene<Engine = E>,
{
    inner: Option<Resources<E, S>>,
}

impl<E, S> ResourceGuard<E, S>
where
    E: RenderEngine,
    S: EngineScene<Engine = E>,
{
    pub(crate) fn new(resources: Resources<E, S>) -> Self {
        Self {
            inner: Some(resources),
        }
    }

    /// Scene and engine, for the setup routine.
    pub(crate) fn parts_mut(&mut self) -> Option<(&mut S, &mut E)> {
        self.inner
            .as_mut()
            .map(|Resources { engine, scene }| (scene, engine))
    }

    pub(crate) fn into_inner(mut self) -> Option<Resources<E, S>> {
        self.inner.take()
    }

    pub(crate) fn dispose(mut self) {
        if let Some(resources) = self.inner.take() {
            dispose_resources(resources);
        }
    }
}

impl<E, S> Drop for ResourceGuard<E, S>
where
    E: RenderEngine,
    S: EngineScene<Engine = E>,
{
    fn drop(&mut self) {
        if let Some(resources) = self.inner.take() {
            log::debug!("disposing resources released without installation");
            dispose_resources(resources);
        }
    }
}

/// Installed resources shared with the render loop callbacks.
///
/// Callbacks hold a `Weak` to this; access goes through [`with_mut`], which
/// refuses re-entrant borrows. A dispose requested while a callback holds the
/// resources (e.g. the frame callback triggered an unmount) runs as soon as
/// that callback releases them.
///
/// [`with_mut`]: LiveResources::with_mut
pub(crate) struct LiveResources<E, S>
where
    E: RenderEngine,
    S: EngineScene<Engine = E>,
{
    slot: RefCell<Option<Resources<E, S>>>,
    dispose_pending: Cell<bool>,
}

impl<E, S> LiveResources<E, S>
where
    E: RenderEngine,
    S: EngineScene<Engine = E>,
{
    fn new() -> Self {
        Self {
            slot: RefCell::new(None),
            dispose_pending: Cell::new(false),
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.slot.try_borrow().map_or(true, |slot| slot.is_some())
    }

    pub(crate) fn is_dispose_pending(&self) -> bool {
        self.dispose_pending.get()
    }

    /// Runs `f` on the live resources. `None` if nothing is installed or the
    /// resources are already borrowed further up the stack.
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Resources<E, S>) -> R) -> Option<R> {
        let result = {
            let Ok(mut slot) = self.slot.try_borrow_mut() else {
                return None;
            };
            slot.as_mut().map(f)
        };
        if self.dispose_pending.get() {
            self.dispose();
        }
        result
    }

    fn install(&self, resources: Resources<E, S>) {
        let previous = self.slot.borrow_mut().replace(resources);
        if let Some(previous) = previous {
            log::error!("installed resources over a live engine; disposing the older one");
            dispose_resources(previous);
        }
    }

    /// Returns `true` if resources were disposed by this call.
    fn dispose(&self) -> bool {
        let taken = match self.slot.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                log::debug!("resources in use; dispose deferred until released");
                self.dispose_pending.set(true);
                return false;
            }
        };
        self.dispose_pending.set(false);
        match taken {
            Some(resources) => {
                dispose_resources(resources);
                true
            }
            None => false,
        }
    }
}

/// Marks an initialization as in flight for as long as it lives.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a Cell<bool>) -> Result<Self, EngineError> {
        if flag.replace(true) {
            return Err(EngineError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Creates engine and scene for a bound surface and owns them afterwards.
pub(crate) struct Bootstrapper<F: EngineFactory> {
    factory: F,
    options: EngineOptions,
    in_flight: Cell<bool>,
    live: Rc<LiveResources<F::Engine, F::Scene>>,
}

impl<F: EngineFactory> Bootstrapper<F> {
    pub(crate) fn new(factory: F, options: EngineOptions) -> Self {
        Self {
            factory,
            options,
            in_flight: Cell::new(false),
            live: Rc::new(LiveResources::new()),
        }
    }

    pub(crate) fn factory(&self) -> &F {
        &self.factory
    }

    #[cfg(test)]
    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.is_live()
    }

    /// Creates engine and scene.
    ///
    /// Rejects overlapping calls with `EngineError::Busy`. If the scene cannot
    /// be created, the engine created for it is disposed before returning.
    pub(crate) async fn initialize(
        &self,
        surface: &F::Surface,
    ) -> Result<ResourceGuard<F::Engine, F::Scene>, EngineError> {
        let _flight = InFlight::enter(&self.in_flight)?;
        let started = Instant::now();
        log::info!("creating rendering engine");

        let mut engine = self.factory.create_engine(surface, &self.options).await?;
        log::debug!("engine created in {:?}", started.elapsed());

        let scene = match self.factory.create_scene(&mut engine) {
            Ok(scene) => scene,
            Err(err) => {
                log::warn!("scene creation failed; disposing its engine");
                if let Err(e) = engine.dispose() {
                    log::warn!("{e}");
                }
                return Err(err);
            }
        };

        Ok(ResourceGuard::new(Resources { engine, scene }))
    }

    /// Takes ownership of configured resources and returns the shared handle
    /// the render loop reads from.
    pub(crate) fn install(
        &self,
        resources: Resources<F::Engine, F::Scene>,
    ) -> Rc<LiveResources<F::Engine, F::Scene>> {
        self.live.install(resources);
        Rc::clone(&self.live)
    }

    /// Disposes scene then engine. Idempotent; a no-op when nothing is live.
    pub(crate) fn dispose(&self) -> bool {
        self.live.dispose()
    }
}
