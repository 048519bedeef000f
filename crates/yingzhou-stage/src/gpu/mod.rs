//! wgpu implementation of the engine contracts.
//!
//! The surface is an `Arc<winit::window::Window>`; the engine owns the wgpu
//! instance, adapter, device and swapchain for it.

mod engine;
mod factory;
mod init;
mod scene;
mod surface;
mod targets;

pub use engine::{GpuFrame, WgpuEngine};
pub use factory::WgpuFactory;
pub use init::GpuInit;
pub use scene::ClearScene;
pub use surface::SurfaceErrorAction;
