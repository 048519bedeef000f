//! Frame timing.
//!
//! The host emits one `FrameTime` per display refresh; scenes use `dt` for
//! animation and `frame_index` for diagnostics.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
