use anyhow::Result;
use yingzhou_stage::engine::EngineOptions;
use yingzhou_stage::gpu::{ClearScene, GpuInit, WgpuEngine, WgpuFactory};
use yingzhou_stage::logging::{LoggingConfig, init_logging};
use yingzhou_stage::stage::{FrameFn, StageConfig};
use yingzhou_stage::time::FrameTime;
use yingzhou_stage::window::{Runtime, RuntimeConfig};

/// Seconds spent fading from one palette entry to the next.
const EPOCH_SECS: f32 = 4.0;

const PALETTE: [wgpu::Color; 4] = [
    wgpu::Color { r: 0.02, g: 0.03, b: 0.08, a: 1.0 },
    wgpu::Color { r: 0.05, g: 0.18, b: 0.30, a: 1.0 },
    wgpu::Color { r: 0.30, g: 0.12, b: 0.20, a: 1.0 },
    wgpu::Color { r: 0.08, g: 0.22, b: 0.12, a: 1.0 },
];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          YINGZHOU STAGE VIEWER         ║");
    println!("  ║   wgpu engine  ·  winit host runtime   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let config = RuntimeConfig::default()
        .with_title("Yingzhou Stage")
        .with_size(960.0, 600.0)
        .with_stage(StageConfig::default().with_engine_options(EngineOptions::default()));

    Runtime::run(
        config,
        WgpuFactory::new(GpuInit::default()),
        setup,
        Some(fade()),
    )
}

async fn setup(scene: &mut ClearScene, engine: &mut WgpuEngine) -> Result<()> {
    let info = engine.adapter_info();
    log::info!(
        "stage ready on {} ({:?}), {:?}, {}x msaa",
        info.name,
        info.backend,
        engine.surface_format(),
        engine.sample_count()
    );
    scene.set_clear_color(PALETTE[0]);
    Ok(())
}

/// Cross-fades the clear color through the palette.
fn fade() -> FrameFn<ClearScene> {
    let mut elapsed = 0.0_f32;
    Box::new(move |scene: &mut ClearScene, time: FrameTime| {
        elapsed += time.dt;
        let epoch = (elapsed / EPOCH_SECS) as usize;
        let t = (elapsed / EPOCH_SECS).fract() as f64;

        let from = PALETTE[epoch % PALETTE.len()];
        let to = PALETTE[(epoch + 1) % PALETTE.len()];
        scene.set_clear_color(wgpu::Color {
            r: lerp(from.r, to.r, t),
            g: lerp(from.g, to.g, t),
            b: lerp(from.b, to.b, t),
            a: 1.0,
        });

        if time.frame_index > 0 && time.frame_index % 600 == 0 {
            log::debug!("frame {} ({} presented by scene)", time.frame_index, scene.frames());
        }
    })
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
