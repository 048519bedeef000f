use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::surface::SurfaceSize;
use crate::time::FrameTime;

use super::{FrameListener, HostEvents, ListenerId, ResizeListener};

type SharedFrameListener = Rc<RefCell<FrameListener>>;
type SharedResizeListener = Rc<RefCell<ResizeListener>>;

/// In-process host event source.
///
/// The windowing runtime feeds it (`emit_frame` on redraw, `emit_resize` on
/// resize) and stages subscribe to it. Listeners may add or remove
/// listeners, including themselves, while being notified: emission works on
/// a snapshot and re-checks registration before each call.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: Cell<u64>,
    frame: RefCell<Vec<(ListenerId, SharedFrameListener)>>,
    resize: RefCell<Vec<(ListenerId, SharedResizeListener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        ListenerId(id)
    }

    pub fn frame_listener_count(&self) -> usize {
        self.frame.borrow().len()
    }

    pub fn resize_listener_count(&self) -> usize {
        self.resize.borrow().len()
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.frame.borrow().iter().any(|(i, _)| *i == id)
            || self.resize.borrow().iter().any(|(i, _)| *i == id)
    }

    /// Notifies frame listeners. Returns how many were called.
    pub fn emit_frame(&self, time: FrameTime) -> usize {
        let snapshot: Vec<_> = self.frame.borrow().clone();
        let mut called = 0;
        for (id, listener) in snapshot {
            if !self.frame.borrow().iter().any(|(i, _)| *i == id) {
                continue;
            }
            // A listener that re-enters emission is skipped rather than aliased.
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (*listener)(time);
                called += 1;
            }
        }
        called
    }

    /// Notifies resize listeners. Returns how many were called.
    pub fn emit_resize(&self, size: SurfaceSize) -> usize {
        let snapshot: Vec<_> = self.resize.borrow().clone();
        let mut called = 0;
        for (id, listener) in snapshot {
            if !self.resize.borrow().iter().any(|(i, _)| *i == id) {
                continue;
            }
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (*listener)(size);
                called += 1;
            }
        }
        called
    }
}

impl HostEvents for ListenerRegistry {
    fn add_frame_listener(&self, listener: FrameListener) -> ListenerId {
        let id = self.allocate_id();
        self.frame
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId {
        let id = self.allocate_id();
        self.resize
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut frame = self.frame.borrow_mut();
        if let Some(pos) = frame.iter().position(|(i, _)| *i == id) {
            frame.remove(pos);
            return true;
        }
        drop(frame);

        let mut resize = self.resize.borrow_mut();
        if let Some(pos) = resize.iter().position(|(i, _)| *i == id) {
            resize.remove(pos);
            return true;
        }
        false
    }
}
