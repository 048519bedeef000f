use crate::engine::FrameOutcome;
use crate::surface::SurfaceSize;

/// Response to a failed swapchain acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// The device cannot present anymore (commonly OOM).
    Fatal,
}

impl SurfaceErrorAction {
    pub fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }
}

impl From<SurfaceErrorAction> for FrameOutcome {
    fn from(action: SurfaceErrorAction) -> Self {
        match action {
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Self::Skipped,
            SurfaceErrorAction::Fatal => Self::Fatal,
        }
    }
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }
    Some(first)
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Surface texture usage. Preserving the drawing buffer needs the presented
/// texture to be copyable, which only some surfaces allow.
pub(crate) fn surface_usage(
    caps: &wgpu::SurfaceCapabilities,
    preserve_drawing_buffer: bool,
) -> wgpu::TextureUsages {
    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if preserve_drawing_buffer {
        if caps.usages.contains(wgpu::TextureUsages::COPY_SRC) {
            usage |= wgpu::TextureUsages::COPY_SRC;
        } else {
            log::warn!("surface cannot be read back; drawing buffer will not be preserved");
        }
    }
    usage
}

/// Applies a new size to the surface configuration.
///
/// Returns `false` when the size is not drawable; the surface keeps its
/// previous configuration until a non-zero size arrives.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    new_size: SurfaceSize,
) -> bool {
    if !new_size.is_drawable() {
        return false;
    }
    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
    true
}
