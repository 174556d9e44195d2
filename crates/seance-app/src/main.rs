use std::time::Instant;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

mod audio;
mod capability;
mod frame;
mod input;
mod render;

use frame::FrameContext;
use render::GpuState;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if !capability::detect() {
        // The decorative fallback is plain page chrome; nothing from the
        // graphics stack may be instantiated on this branch.
        log::warn!("hardware acceleration unavailable; static fallback only");
        eprintln!("seance: no hardware-accelerated renderer found, exiting");
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("GOOD LOOKIN CORPSE")
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let mut ctx = FrameContext::new();
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => {
            gpu.resize_surface(size.width, size.height);
            ctx.resized();
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            let size = gpu.window.inner_size();
            ctx.pointer_moved(input::position_to_field_uv(position, size));
        }
        Event::WindowEvent {
            event: WindowEvent::Touch(touch),
            ..
        } => {
            let size = gpu.window.inner_size();
            ctx.pointer_moved(input::position_to_field_uv(touch.location, size));
        }
        Event::AboutToWait => {
            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32().min(0.1);
            last_frame = now;
            match ctx.frame(&mut gpu, dt) {
                Ok(()) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.reconfigure_surface(),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("frame error: {e:?}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}
