/// Capability bundle passed to engine construction.
///
/// Defaults match what the stage has always asked for: an antialiased,
/// stencil-capable context on the high-performance adapter, with a software
/// fallback allowed when no hardware path exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Multisample the color target when the surface format supports it.
    pub antialias: bool,

    /// Keep the presented image readable after presentation
    /// (screenshots, readback).
    pub preserve_drawing_buffer: bool,

    /// Allocate a stencil buffer alongside depth.
    pub stencil: bool,

    pub fallback: FallbackMode,
    pub power_preference: PowerPreference,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            preserve_drawing_buffer: true,
            stencil: true,
            fallback: FallbackMode::Allow,
            power_preference: PowerPreference::HighPerformance,
        }
    }
}

impl EngineOptions {
    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn with_preserve_drawing_buffer(mut self, preserve: bool) -> Self {
        self.preserve_drawing_buffer = preserve;
        self
    }

    pub fn with_stencil(mut self, stencil: bool) -> Self {
        self.stencil = stencil;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackMode) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_power_preference(mut self, preference: PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }
}

/// Whether a reduced-capability (software) rendering path may be used.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FallbackMode {
    /// Try the hardware path first, fall back if it is unavailable.
    #[default]
    Allow,
    /// Hardware path only; fail otherwise.
    Deny,
    /// Always use the fallback path.
    Force,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PowerPreference {
    #[default]
    Default,
    LowPower,
    HighPerformance,
}
