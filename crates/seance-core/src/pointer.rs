//! Pointer adapter: adaptive smoothing of raw pointer targets and the
//! screen-space → field-UV projection used by mouse and touch input alike.

use crate::constants::{
    CAMERA_FAR, CAMERA_FOVY, CAMERA_NEAR, CAMERA_Z, POINTER_QUIET_SECS, POINTER_SMOOTHING,
    RASTER_HEIGHT, RASTER_WIDTH,
};
use crate::ease;
use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

/// Smoothed pointer state in raster UV (y-up). Fast motion tracks snappier;
/// `moving` debounces to false after a short quiet interval.
#[derive(Clone, Copy, Debug)]
pub struct PointerState {
    pub current: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub moving: bool,
    last_target: Vec2,
    quiet: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        let mid = Vec2::splat(0.5);
        Self {
            current: mid,
            target: mid,
            speed: 0.0,
            moving: false,
            last_target: mid,
            quiet: POINTER_QUIET_SECS,
        }
    }
}

impl PointerState {
    pub fn set_target(&mut self, uv: Vec2) {
        self.target = uv.clamp(Vec2::ZERO, Vec2::ONE);
        self.moving = true;
        self.quiet = 0.0;
    }

    /// Advance one frame: measure target velocity, smooth with an adaptive
    /// factor (faster motion → snappier tracking), run the quiet debounce.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.speed = (self.target - self.last_target).length();
        self.last_target = self.target;

        // Smoothing drops as velocity rises so quick gestures track tight.
        let adaptive = POINTER_SMOOTHING * (1.0 + 4.0 * (self.speed * 5.0).min(0.8));
        let alpha = ease::per_frame_alpha(adaptive, dt);
        self.current += (self.target - self.current) * alpha;

        self.quiet += dt;
        if self.quiet >= POINTER_QUIET_SECS {
            self.moving = false;
        }
    }
}

/// Project a screen position onto the field's z=0 plane and express it in
/// raster UV (y-up). Ray construction matches the render camera exactly.
pub fn screen_to_field_uv(screen: Vec2, viewport: Vec2) -> Vec2 {
    let w = viewport.x.max(1.0);
    let h = viewport.y.max(1.0);
    let ndc = Vec2::new(2.0 * screen.x / w - 1.0, 1.0 - 2.0 * screen.y / h);

    let proj = Mat4::perspective_rh(CAMERA_FOVY, w / h, CAMERA_NEAR, CAMERA_FAR);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
    let inv = (proj * view).inverse();

    let p_far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
    let p_far = p_far.xyz() / p_far.w;
    let ro = Vec3::new(0.0, 0.0, CAMERA_Z);
    let rd = (p_far - ro).normalize();

    // Intersect z = 0; the camera always looks toward it.
    let t = -ro.z / rd.z;
    let hit = ro + rd * t;

    let tex = Vec2::new(RASTER_WIDTH as f32, RASTER_HEIGHT as f32);
    ((hit.truncate() + tex * 0.5) / tex).clamp(Vec2::ZERO, Vec2::ONE)
}
