pub(crate) const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Offscreen attachments sized to the surface: the multisampled color target
/// and the depth-stencil buffer, each only when requested.
pub(crate) struct FrameTargets {
    sample_count: u32,
    stencil: bool,
    msaa: Option<wgpu::TextureView>,
    depth_stencil: Option<wgpu::TextureView>,
}

impl FrameTargets {
    pub(crate) fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
        stencil: bool,
    ) -> Self {
        let mut targets = Self {
            sample_count: sample_count.max(1),
            stencil,
            msaa: None,
            depth_stencil: None,
        };
        targets.rebuild(device, config);
        targets
    }

    pub(crate) fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub(crate) fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa.as_ref()
    }

    pub(crate) fn depth_stencil_view(&self) -> Option<&wgpu::TextureView> {
        self.depth_stencil.as_ref()
    }

    /// Reallocates the attachments for the current surface configuration.
    pub(crate) fn rebuild(&mut self, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        self.msaa = (self.sample_count > 1).then(|| {
            attachment(
                device,
                "yingzhou msaa color",
                size,
                self.sample_count,
                config.format,
            )
        });

        self.depth_stencil = self.stencil.then(|| {
            attachment(
                device,
                "yingzhou depth-stencil",
                size,
                self.sample_count,
                DEPTH_STENCIL_FORMAT,
            )
        });
    }
}

fn attachment(
    device: &wgpu::Device,
    label: &str,
    size: wgpu::Extent3d,
    sample_count: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

/// Largest supported sample count not above `requested`, or 1.
pub(crate) fn supported_sample_count(
    adapter: &wgpu::Adapter,
    color: wgpu::TextureFormat,
    with_stencil: bool,
    requested: u32,
) -> u32 {
    let color_flags = adapter.get_texture_format_features(color).flags;
    let depth_flags = adapter
        .get_texture_format_features(DEPTH_STENCIL_FORMAT)
        .flags;

    [16, 8, 4, 2]
        .into_iter()
        .filter(|&n| n <= requested)
        .find(|&n| {
            color_flags.sample_count_supported(n)
                && (!with_stencil || depth_flags.sample_count_supported(n))
        })
        .unwrap_or(1)
}
