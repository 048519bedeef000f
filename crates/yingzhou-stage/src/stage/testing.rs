//! Test doubles: a scripted engine factory and a host that records
//! listener registration into the same trace.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Instant;

use anyhow::anyhow;
use tokio::sync::oneshot;

use crate::engine::{
    DisposeError, EngineError, EngineFactory, EngineOptions, EngineScene, FrameOutcome,
    RenderEngine,
};
use crate::host::{FrameListener, HostEvents, ListenerId, ListenerRegistry, ResizeListener};
use crate::surface::SurfaceSize;
use crate::time::FrameTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeSurface(pub u32);

/// What the next `create_engine` call does.
pub(crate) enum CreatePlan {
    Succeed,
    Unsupported(&'static str),
    Refuse(&'static str),
    Gated {
        rx: oneshot::Receiver<()>,
        then: Box<CreatePlan>,
    },
    Hang,
}

/// Releases a gated creation.
pub(crate) struct Gate(Option<oneshot::Sender<()>>);

impl Gate {
    pub(crate) fn open(mut self) {
        if let Some(tx) = self.0.take() {
            let _ = tx.send(());
        }
    }
}

/// Shared state behind the fakes; tests read counters and the trace from it.
pub(crate) struct Probe {
    trace: RefCell<Vec<String>>,
    plans: RefCell<VecDeque<CreatePlan>>,
    fail_scene: Cell<bool>,
    frame_outcome: Cell<FrameOutcome>,
    create_calls: Cell<u32>,
    engines_created: Cell<u32>,
    engines_disposed: Cell<u32>,
    scenes_created: Cell<u32>,
    scenes_disposed: Cell<u32>,
    renders: Cell<u32>,
    resizes: RefCell<Vec<SurfaceSize>>,
}

impl Probe {
    fn new() -> Self {
        Self {
            trace: RefCell::new(Vec::new()),
            plans: RefCell::new(VecDeque::new()),
            fail_scene: Cell::new(false),
            frame_outcome: Cell::new(FrameOutcome::Presented),
            create_calls: Cell::new(0),
            engines_created: Cell::new(0),
            engines_disposed: Cell::new(0),
            scenes_created: Cell::new(0),
            scenes_disposed: Cell::new(0),
            renders: Cell::new(0),
            resizes: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn record(&self, entry: impl Into<String>) {
        self.trace.borrow_mut().push(entry.into());
    }

    pub(crate) fn trace(&self) -> Vec<String> {
        self.trace.borrow().clone()
    }

    /// Index of the first trace entry equal to `entry`.
    pub(crate) fn position(&self, entry: &str) -> Option<usize> {
        self.trace.borrow().iter().position(|e| e == entry)
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.trace.borrow().iter().filter(|e| *e == entry).count()
    }

    pub(crate) fn fail_scene_creation(&self) {
        self.fail_scene.set(true);
    }

    pub(crate) fn set_frame_outcome(&self, outcome: FrameOutcome) {
        self.frame_outcome.set(outcome);
    }

    pub(crate) fn create_calls(&self) -> u32 {
        self.create_calls.get()
    }

    pub(crate) fn engines_created(&self) -> u32 {
        self.engines_created.get()
    }

    pub(crate) fn engines_disposed(&self) -> u32 {
        self.engines_disposed.get()
    }

    pub(crate) fn scenes_created(&self) -> u32 {
        self.scenes_created.get()
    }

    pub(crate) fn scenes_disposed(&self) -> u32 {
        self.scenes_disposed.get()
    }

    pub(crate) fn renders(&self) -> u32 {
        self.renders.get()
    }

    pub(crate) fn resizes(&self) -> Vec<SurfaceSize> {
        self.resizes.borrow().clone()
    }
}

#[derive(Clone)]
pub(crate) struct FakeFactory {
    probe: Rc<Probe>,
}

impl FakeFactory {
    pub(crate) fn new() -> Self {
        Self {
            probe: Rc::new(Probe::new()),
        }
    }

    pub(crate) fn probe(&self) -> Rc<Probe> {
        Rc::clone(&self.probe)
    }

    pub(crate) fn plan(&self, plan: CreatePlan) {
        self.probe.plans.borrow_mut().push_back(plan);
    }

    /// Holds the next creation pending until the gate opens, then succeeds.
    pub(crate) fn gate(&self) -> Gate {
        self.gate_then(CreatePlan::Succeed)
    }

    pub(crate) fn gate_then(&self, then: CreatePlan) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.plan(CreatePlan::Gated {
            rx,
            then: Box::new(then),
        });
        Gate(Some(tx))
    }
}

impl EngineFactory for FakeFactory {
    type Surface = FakeSurface;
    type Engine = FakeEngine;
    type Scene = FakeScene;

    async fn create_engine(
        &self,
        surface: &FakeSurface,
        _options: &EngineOptions,
    ) -> Result<FakeEngine, EngineError> {
        let probe = Rc::clone(&self.probe);
        probe.create_calls.set(probe.create_calls.get() + 1);
        probe.record(format!("engine.create surface={}", surface.0));

        let mut plan = probe
            .plans
            .borrow_mut()
            .pop_front()
            .unwrap_or(CreatePlan::Succeed);
        loop {
            plan = match plan {
                CreatePlan::Succeed => break,
                CreatePlan::Unsupported(msg) => {
                    probe.record("engine.create failed");
                    return Err(EngineError::Unsupported(msg.to_string()));
                }
                CreatePlan::Refuse(msg) => {
                    probe.record("engine.create failed");
                    return Err(EngineError::ContextRefused(anyhow!(msg)));
                }
                CreatePlan::Gated { rx, then } => {
                    let _ = rx.await;
                    *then
                }
                CreatePlan::Hang => std::future::pending().await,
            };
        }

        probe.engines_created.set(probe.engines_created.get() + 1);
        probe.record("engine.create ok");
        Ok(FakeEngine { probe })
    }

    fn create_scene(&self, engine: &mut FakeEngine) -> Result<FakeScene, EngineError> {
        if self.probe.fail_scene.get() {
            self.probe.record("scene.create failed");
            return Err(EngineError::Unsupported("scene".to_string()));
        }
        self.probe.scenes_created.set(self.probe.scenes_created.get() + 1);
        self.probe.record("scene.create");
        Ok(FakeScene {
            probe: Rc::clone(&engine.probe),
            configured: false,
        })
    }
}

pub(crate) struct FakeEngine {
    probe: Rc<Probe>,
}

impl RenderEngine for FakeEngine {
    fn resize(&mut self, size: SurfaceSize) {
        self.probe.resizes.borrow_mut().push(size);
        self.probe
            .record(format!("engine.resize {}x{}", size.width, size.height));
    }

    fn dispose(self) -> Result<(), DisposeError> {
        self.probe
            .engines_disposed
            .set(self.probe.engines_disposed.get() + 1);
        self.probe.record("engine.dispose");
        Ok(())
    }
}

pub(crate) struct FakeScene {
    probe: Rc<Probe>,
    pub(crate) configured: bool,
}

impl EngineScene for FakeScene {
    type Engine = FakeEngine;

    fn render(&mut self, _engine: &mut FakeEngine) -> FrameOutcome {
        self.probe.renders.set(self.probe.renders.get() + 1);
        self.probe.record("scene.render");
        self.probe.frame_outcome.get()
    }

    fn dispose(self) -> Result<(), DisposeError> {
        self.probe
            .scenes_disposed
            .set(self.probe.scenes_disposed.get() + 1);
        self.probe.record("scene.dispose");
        Ok(())
    }
}

/// `ListenerRegistry` that also writes registrations into the probe trace.
pub(crate) struct TracingHost {
    registry: ListenerRegistry,
    kinds: RefCell<HashMap<ListenerId, &'static str>>,
    probe: Rc<Probe>,
}

impl TracingHost {
    pub(crate) fn new(probe: Rc<Probe>) -> Rc<Self> {
        Rc::new(Self {
            registry: ListenerRegistry::new(),
            kinds: RefCell::new(HashMap::new()),
            probe,
        })
    }

    pub(crate) fn frame(&self, index: u64) -> usize {
        self.registry.emit_frame(FrameTime {
            dt: 1.0 / 60.0,
            now: Instant::now(),
            frame_index: index,
        })
    }

    pub(crate) fn resize(&self, width: u32, height: u32) -> usize {
        self.registry.emit_resize(SurfaceSize::new(width, height))
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.registry.frame_listener_count() + self.registry.resize_listener_count()
    }
}

impl HostEvents for TracingHost {
    fn add_frame_listener(&self, listener: FrameListener) -> ListenerId {
        let id = self.registry.add_frame_listener(listener);
        self.kinds.borrow_mut().insert(id, "frame");
        self.probe.record("host.add frame");
        id
    }

    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId {
        let id = self.registry.add_resize_listener(listener);
        self.kinds.borrow_mut().insert(id, "resize");
        self.probe.record("host.add resize");
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.registry.remove_listener(id);
        if removed {
            let kind = self.kinds.borrow_mut().remove(&id).unwrap_or("unknown");
            self.probe.record(format!("host.remove {kind}"));
        }
        removed
    }
}
