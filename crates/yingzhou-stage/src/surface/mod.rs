//! Drawable surface binding.
//!
//! The surface exists only while the host UI has the drawable element
//! mounted. Everything downstream gates on it.

mod slot;

pub use slot::SurfaceSlot;

/// Drawable size in physical pixels.
///
/// Zero dimensions are valid (minimized window); engines defer
/// reconfiguration until both sides are non-zero.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_drawable(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for SurfaceSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}
