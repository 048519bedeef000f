use std::cell::Cell;
use std::rc::Rc;

use crate::engine::{EngineScene, FrameOutcome, RenderEngine};
use crate::host::{HostEvents, Subscription};
use crate::time::FrameTime;

use super::bootstrap::{LiveResources, Resources};

/// Caller hook run once per frame, before the scene renders.
pub type FrameFn<S> = Box<dyn FnMut(&mut S, FrameTime)>;

#[derive(Debug, Default)]
struct LoopStats {
    presented: Cell<u64>,
    skipped: Cell<u64>,
    halted: Cell<bool>,
}

/// Frame loop and resize forwarding for one running stage.
///
/// Both registrations are `Subscription`s: `stop()` (or dropping the
/// controller) removes them from the host before the owner disposes the
/// engine. Callbacks only hold a `Weak` to the live resources and do nothing
/// once those are gone.
pub(crate) struct RenderLoop {
    frame: Subscription,
    resize: Subscription,
    stats: Rc<LoopStats>,
}

impl RenderLoop {
    pub(crate) fn start<E, S>(
        host: &Rc<dyn HostEvents>,
        live: &Rc<LiveResources<E, S>>,
        mut on_frame: Option<FrameFn<S>>,
    ) -> Self
    where
        E: RenderEngine + 'static,
        S: EngineScene<Engine = E> + 'static,
    {
        let stats = Rc::new(LoopStats::default());

        let frame_id = {
            let live = Rc::downgrade(live);
            let stats = Rc::clone(&stats);
            host.add_frame_listener(Box::new(move |time| {
                if stats.halted.get() {
                    return;
                }
                let Some(live) = live.upgrade() else {
                    return;
                };
                let outcome = live
                    .with_mut(|Resources { engine, scene }| {
                        if let Some(hook) = on_frame.as_mut() {
                            hook(scene, time);
                        }
                        // The hook may have unmounted the stage.
                        if live.is_dispose_pending() {
                            return None;
                        }
                        Some(scene.render(engine))
                    })
                    .flatten();

                match outcome {
                    Some(FrameOutcome::Presented) => stats.presented.set(stats.presented.get() + 1),
                    Some(FrameOutcome::Skipped) => stats.skipped.set(stats.skipped.get() + 1),
                    Some(FrameOutcome::Fatal) => {
                        log::error!(
                            "fatal frame error after {} frames; render loop halted",
                            stats.presented.get()
                        );
                        stats.halted.set(true);
                    }
                    None => {}
                }
            }))
        };

        let resize_id = {
            let live = Rc::downgrade(live);
            host.add_resize_listener(Box::new(move |size| {
                let Some(live) = live.upgrade() else {
                    return;
                };
                if live.with_mut(|res| res.engine.resize(size)).is_none() {
                    log::trace!("resize to {size:?} ignored: no live engine");
                }
            }))
        };

        log::debug!("render loop started");
        Self {
            frame: Subscription::new(Rc::clone(host), frame_id, "frame"),
            resize: Subscription::new(Rc::clone(host), resize_id, "resize"),
            stats,
        }
    }

    /// Deregisters the frame callback and the resize listener.
    pub(crate) fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.frame.release();
        self.resize.release();
        log::debug!(
            "render loop stopped ({} presented, {} skipped)",
            self.stats.presented.get(),
            self.stats.skipped.get()
        );
    }

    pub(crate) fn is_running(&self) -> bool {
        self.frame.is_active() || self.resize.is_active()
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.stats.halted.get()
    }

    pub(crate) fn frames_rendered(&self) -> u64 {
        self.stats.presented.get()
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
