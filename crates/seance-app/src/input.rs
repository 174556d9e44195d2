//! Window-event → field-space input conversion. Mouse and touch both land in
//! the same smoothed pointer; touches are plain pointer moves here.

use glam::Vec2;
use seance_core::pointer::screen_to_field_uv;
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Map a window-space cursor/touch position into raster UV (y-up).
pub fn position_to_field_uv(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vec2 {
    screen_to_field_uv(
        Vec2::new(position.x as f32, position.y as f32),
        Vec2::new(size.width as f32, size.height as f32),
    )
}
