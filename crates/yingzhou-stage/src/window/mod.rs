//! Windowed host.
//!
//! Owns the `winit` event loop and window and plays the host role for one
//! [`Stage`](crate::stage::Stage): surface binding, resize and frame events.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
