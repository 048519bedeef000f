use std::sync::Arc;

use anyhow::Context;
use winit::window::Window;

use crate::engine::{
    DisposeError, EngineError, EngineOptions, FallbackMode, PowerPreference, RenderEngine,
};
use crate::surface::SurfaceSize;

use super::GpuInit;
use super::surface::{self, SurfaceErrorAction};
use super::targets::{self, FrameTargets};

/// One acquired swapchain image plus the encoder recording into it.
///
/// Short-lived: holding the surface texture blocks the next acquire.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// wgpu device and swapchain bound to one window.
///
/// Owns an `Arc` of the window so the surface is `'static`; the window
/// outlives the engine for as long as the engine exists.
pub struct WgpuEngine {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: SurfaceSize,
    targets: FrameTargets,
}

impl WgpuEngine {
    /// Creates instance, surface, adapter and device for `window`.
    ///
    /// A missing adapter or surface format is `Unsupported`; the platform
    /// refusing the surface or device is `ContextRefused`.
    pub async fn new(
        window: Arc<Window>,
        options: &EngineOptions,
        init: &GpuInit,
    ) -> Result<Self, EngineError> {
        let size = SurfaceSize::from(window.inner_size());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")
            .map_err(EngineError::ContextRefused)?;

        let adapter = request_adapter(&instance, &surface, options).await?;
        let info = adapter.get_info();
        log::info!(
            "using adapter {:?} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("yingzhou device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")
            .map_err(EngineError::ContextRefused)?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb).ok_or_else(|| {
            EngineError::Unsupported(format!("no surface format for adapter {:?}", info.name))
        })?;

        let config = wgpu::SurfaceConfiguration {
            usage: surface::surface_usage(&caps, options.preserve_drawing_buffer),
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let samples = if options.antialias {
            targets::supported_sample_count(&adapter, format, options.stencil, init.msaa_samples)
        } else {
            1
        };
        let targets = FrameTargets::new(&device, &config, samples, options.stencil);
        log::debug!(
            "surface configured: {format:?} {}x{}, {samples}x msaa, stencil {}",
            config.width,
            config.height,
            options.stencil
        );

        Ok(Self {
            window,
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            targets,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size (physical pixels). May be zero while minimized.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn sample_count(&self) -> u32 {
        self.targets.sample_count()
    }

    pub(crate) fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.targets.msaa_view()
    }

    pub(crate) fn depth_stencil_view(&self) -> Option<&wgpu::TextureView> {
        self.targets.depth_stencil_view()
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("yingzhou frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        self.window.pre_present_notify();
        frame.surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::classify(&err);
        match action {
            SurfaceErrorAction::Reconfigured if self.size.is_drawable() => {
                self.surface.configure(&self.device, &self.config);
            }
            SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
            _ => log::debug!("surface error: {err}"),
        }
        action
    }
}

impl RenderEngine for WgpuEngine {
    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        if surface::apply_resize(&self.surface, &self.device, &mut self.config, size) {
            self.targets.rebuild(&self.device, &self.config);
        }
    }

    fn dispose(self) -> Result<(), DisposeError> {
        let Self {
            window,
            surface,
            device,
            queue,
            targets,
            ..
        } = self;

        drop(targets);
        drop(surface);
        drop(queue);
        device.destroy();
        log::debug!("wgpu engine for window {:?} released", window.id());
        Ok(())
    }
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(preference: PowerPreference) -> Self {
        match preference {
            PowerPreference::Default => wgpu::PowerPreference::None,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

/// Picks an adapter according to the fallback policy.
async fn request_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    options: &EngineOptions,
) -> Result<wgpu::Adapter, EngineError> {
    let request = |force_fallback_adapter| wgpu::RequestAdapterOptions {
        power_preference: options.power_preference.into(),
        compatible_surface: Some(surface),
        force_fallback_adapter,
    };

    let hardware = match options.fallback {
        FallbackMode::Force => None,
        FallbackMode::Allow | FallbackMode::Deny => {
            match instance.request_adapter(&request(false)).await {
                Ok(adapter) => return Ok(adapter),
                Err(err) => Some(err),
            }
        }
    };

    if options.fallback == FallbackMode::Deny {
        let reason = hardware.map_or_else(|| "no adapter".to_string(), |e| e.to_string());
        return Err(EngineError::Unsupported(format!(
            "no hardware adapter and software fallback is disabled: {reason}"
        )));
    }

    if hardware.is_some() {
        log::warn!("no hardware adapter available; trying the software fallback");
    }
    instance
        .request_adapter(&request(true))
        .await
        .map_err(|e| EngineError::Unsupported(format!("no suitable GPU adapter: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_preference_maps_to_wgpu() {
        assert_eq!(
            wgpu::PowerPreference::from(PowerPreference::Default),
            wgpu::PowerPreference::None
        );
        assert_eq!(
            wgpu::PowerPreference::from(PowerPreference::HighPerformance),
            wgpu::PowerPreference::HighPerformance
        );
    }
}
