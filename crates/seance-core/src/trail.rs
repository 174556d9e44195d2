//! Touch-trail buffer: a raster-resolution grayscale image that records
//! recent pointer proximity. Painted every frame with a radial falloff and
//! faded toward black, it is uploaded as an R8 texture and sampled by the
//! particle shader for the lingering post-touch ripple. Paint always runs
//! before the particle read within a frame.

use crate::constants::{
    TRAIL_FADE_PER_FRAME, TRAIL_IDLE_INTENSITY, TRAIL_MOVE_INTENSITY, TRAIL_RADIUS,
};
use crate::ease;
use glam::Vec2;

pub struct TrailBuffer {
    width: u32,
    height: u32,
    values: Vec<f32>,
    bytes: Vec<u8>,
}

impl TrailBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width * height) as usize;
        Self {
            width,
            height,
            values: vec![0.0; n],
            bytes: vec![0; n],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn value_at(&self, x: u32, y: u32) -> f32 {
        self.values[(y.min(self.height - 1) * self.width + x.min(self.width - 1)) as usize]
    }

    /// Decay old paint: a frame-rate-independent translucent black fill.
    pub fn fade(&mut self, dt: f32) {
        let keep = (1.0 - TRAIL_FADE_PER_FRAME).powf((dt * 60.0).max(0.0));
        for v in &mut self.values {
            *v = (*v * keep).max(0.0);
        }
    }

    /// Stamp a radial falloff at `uv` (y-up). Intensity rises with pointer
    /// speed while moving; a hot core lands on top of the wide gradient.
    /// Distance 0 receives the documented maximum: `intensity` itself.
    pub fn paint(&mut self, uv: Vec2, speed: f32, moving: bool) {
        let intensity = if moving {
            TRAIL_MOVE_INTENSITY + (speed * 15.0).min(1.0) * 0.3
        } else {
            TRAIL_IDLE_INTENSITY
        };
        let cx = uv.x.clamp(0.0, 1.0) * self.width as f32;
        let cy = uv.y.clamp(0.0, 1.0) * self.height as f32;
        self.splat(cx, cy, TRAIL_RADIUS, intensity);
        if moving {
            self.splat(cx, cy, TRAIL_RADIUS * 0.3, (intensity * 1.2).min(1.0));
        }
    }

    fn splat(&mut self, cx: f32, cy: f32, radius: f32, intensity: f32) {
        let x0 = ((cx - radius).floor().max(0.0)) as u32;
        let x1 = ((cx + radius).ceil() as u32).min(self.width.saturating_sub(1));
        let y0 = ((cy - radius).floor().max(0.0)) as u32;
        let y1 = ((cy + radius).ceil() as u32).min(self.height.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= radius {
                    continue;
                }
                let falloff = ease::expo_out(1.0 - dist / radius) * intensity;
                let i = (y * self.width + x) as usize;
                self.values[i] = (self.values[i] + falloff).min(1.0);
            }
        }
    }

    /// R8 upload bytes for the GPU texture, row 0 at the bottom to match the
    /// shader's y-up addressing.
    pub fn bytes(&mut self) -> &[u8] {
        for (b, v) in self.bytes.iter_mut().zip(&self.values) {
            *b = (*v * 255.0) as u8;
        }
        &self.bytes
    }
}
