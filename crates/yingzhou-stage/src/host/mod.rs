//! Host event source.
//!
//! Frame cadence and window resizes come from the host (the windowing
//! runtime). The stage only sees them through [`HostEvents`], injected at
//! construction, so tests can drive frames and resizes by hand.

mod registry;
mod subscription;

pub use registry::ListenerRegistry;
pub use subscription::Subscription;

use crate::surface::SurfaceSize;
use crate::time::FrameTime;

pub type FrameListener = Box<dyn FnMut(FrameTime)>;
pub type ResizeListener = Box<dyn FnMut(SurfaceSize)>;

/// Registration handle issued by a [`HostEvents`] source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Process-wide event source the stage subscribes to.
pub trait HostEvents {
    /// Registers a callback for every display refresh.
    fn add_frame_listener(&self, listener: FrameListener) -> ListenerId;

    /// Registers a callback for host window resizes.
    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId;

    /// Deregisters a listener. Returns `false` if `id` was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}
