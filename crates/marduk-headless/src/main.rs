use std::sync::Arc;

use anyhow::{Context, Result};
use marduk_gpu::backend::SoftwareBackend;
use marduk_gpu::caps::{Caps, PixelFormat};
use marduk_gpu::context::{ContextOptions, ImageInfo, SurfaceProps};
use marduk_gpu::coords::{IRect, Matrix, RRect, Rect, Vec2};
use marduk_gpu::logging::{init_logging, LoggingConfig};
use marduk_gpu::ops::Clip;
use marduk_gpu::paint::{Aa, Color, ColorStop, LinearGradient, Paint, Shader, SpreadMode};
use marduk_gpu::shape::{Path, Style};
use marduk_gpu::target::RenderTargetDesc;
use marduk_gpu::GpuContext;

const WIDTH: u32 = 256;
const HEIGHT: u32 = 160;

/// Limits and format support of the default adapter, when there is one.
async fn probe_caps() -> Option<Caps> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok()?;
    log::info!("probed adapter: {}", adapter.get_info().name);
    Some(Caps::from_adapter(&adapter))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let caps = pollster::block_on(probe_caps()).unwrap_or_else(|| {
        log::warn!("no GPU adapter; using default capabilities");
        Caps::default()
    });
    let backend = SoftwareBackend::with_caps(caps);
    let mut gpu = GpuContext::new(backend, ContextOptions::from_env());

    let desc = RenderTargetDesc::new(WIDTH, HEIGHT, PixelFormat::Rgba8Unorm);
    let id = gpu
        .make_draw_context(desc, None, SurfaceProps::default())
        .context("render target not supported by backend")?;

    {
        let mut dc = gpu.draw_context(id).context("draw context vanished")?;
        let identity = Matrix::identity();
        dc.clear(None, Color::from_rgba8(24, 26, 32, 255), true);

        let ramp = LinearGradient::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(WIDTH as f32, 0.0),
            vec![
                ColorStop::new(0.0, Color::from_rgba8(40, 90, 200, 255)),
                ColorStop::new(1.0, Color::from_rgba8(200, 60, 120, 255)),
            ],
            SpreadMode::Pad,
        );
        let header = Paint::solid(Color::WHITE).with_shader(Arc::new(Shader::LinearGradient(ramp)));
        dc.draw_rect(&Clip::WideOpen, &header, Aa::No, &identity, Rect::new(0.0, 0.0, WIDTH as f32, 24.0), None);

        // A row of cards; consecutive cards merge into a single submission.
        let card = Paint::solid(Color::from_rgba8(60, 64, 76, 255));
        for i in 0..4 {
            let r = RRect::from_rect_radius(Rect::new(12.0 + i as f32 * 60.0, 36.0, 52.0, 52.0), 8.0);
            dc.draw_rrect(&Clip::WideOpen, &card, Aa::Yes, &identity, &r, None);
        }

        let accent = Paint::solid(Color::from_rgba8(240, 180, 60, 255));
        dc.draw_oval(&Clip::WideOpen, &accent, Aa::Yes, &identity, Rect::new(24.0, 100.0, 48.0, 48.0), Some(&Style::stroke(3.0)));

        let mut star = Path::new();
        let center = Vec2::new(180.0, 124.0);
        for k in 0..10 {
            let angle = k as f32 * std::f32::consts::PI / 5.0 - std::f32::consts::FRAC_PI_2;
            let radius = if k % 2 == 0 { 30.0 } else { 12.0 };
            let p = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            if k == 0 {
                star.move_to(p);
            } else {
                star.line_to(p);
            }
        }
        star.close();
        let scissor = Clip::Scissor(IRect::new(0, 96, WIDTH as i32, 64));
        dc.draw_path(&scissor, &accent, Aa::Yes, &identity, &star, None);
    }

    let lists = gpu.flush();
    log::info!("executed {lists} op lists");

    let info = ImageInfo::new(WIDTH, HEIGHT, PixelFormat::Rgba8Unorm);
    let mut pixels = vec![0u8; info.min_row_bytes() * HEIGHT as usize];
    gpu.draw_context(id)
        .context("draw context vanished")?
        .read_pixels(&info, &mut pixels, info.min_row_bytes(), 0, 0)
        .context("reading back the frame")?;
    let checksum = pixels.iter().fold(0u32, |acc, &b| acc.rotate_left(5) ^ b as u32);
    log::info!("frame checksum {checksum:08x}");

    let stats = gpu.stats();
    log::info!(
        "draws={} failed={} merged={} flushes={} allocations={}",
        stats.draws,
        stats.failed_draws,
        stats.merged_ops,
        stats.flushes,
        stats.target_allocations
    );
    Ok(())
}
