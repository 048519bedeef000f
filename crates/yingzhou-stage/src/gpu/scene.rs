use crate::engine::{DisposeError, EngineScene, FrameOutcome};

use super::WgpuEngine;

/// Minimal scene: clears the surface to a color every frame.
///
/// Setup routines and frame hooks drive it through [`ClearScene::set_clear_color`].
#[derive(Debug, Clone)]
pub struct ClearScene {
    clear: wgpu::Color,
    frames: u64,
}

impl Default for ClearScene {
    fn default() -> Self {
        Self {
            clear: wgpu::Color::BLACK,
            frames: 0,
        }
    }
}

impl ClearScene {
    pub fn new(clear: wgpu::Color) -> Self {
        Self { clear, frames: 0 }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear
    }

    pub fn set_clear_color(&mut self, clear: wgpu::Color) {
        self.clear = clear;
    }

    /// Frames this scene has presented.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl EngineScene for ClearScene {
    type Engine = WgpuEngine;

    fn render(&mut self, engine: &mut WgpuEngine) -> FrameOutcome {
        if !engine.size().is_drawable() {
            return FrameOutcome::Skipped;
        }

        let mut frame = match engine.begin_frame() {
            Ok(frame) => frame,
            Err(err) => return engine.handle_surface_error(err).into(),
        };

        // Multisampled passes draw into the offscreen target and resolve
        // into the swapchain image.
        let (view, resolve_target) = match engine.msaa_view() {
            Some(msaa) => (msaa, Some(&frame.view)),
            None => (&frame.view, None),
        };
        let depth_stencil_attachment =
            engine
                .depth_stencil_view()
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Discard,
                    }),
                });

        {
            let _pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("yingzhou clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: if resolve_target.is_some() {
                            wgpu::StoreOp::Discard
                        } else {
                            wgpu::StoreOp::Store
                        },
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        engine.submit(frame);
        self.frames += 1;
        FrameOutcome::Presented
    }

    fn dispose(self) -> Result<(), DisposeError> {
        log::debug!("clear scene released after {} frames", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_is_mutable() {
        let mut scene = ClearScene::default();
        assert_eq!(scene.clear_color(), wgpu::Color::BLACK);

        scene.set_clear_color(wgpu::Color::RED);
        assert_eq!(scene.clear_color(), wgpu::Color::RED);
        assert_eq!(scene.frames(), 0);
    }
}
