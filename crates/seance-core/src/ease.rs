//! Easing primitives shared by the sequencer, morph stepping, the trail
//! painter and the CRT transition. The particle shader carries its own copies
//! of `smooth` and `expo_out` so CPU and GPU agree on the curves.

/// Smoothstep-style ease-in-out, monotonic on [0, 1].
#[inline]
pub fn smooth(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Exponential ease-out; exactly 1.0 at t == 1.
#[inline]
pub fn expo_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t >= 1.0 {
        1.0
    } else {
        1.0 - (2.0_f32).powf(-10.0 * t)
    }
}

/// Frame-rate independent exponential approach of `current` toward `target`.
/// `tau` is the time constant in seconds.
#[inline]
pub fn exp_approach(current: f32, target: f32, dt: f32, tau: f32) -> f32 {
    if tau <= 0.0 {
        return target;
    }
    current + (target - current) * (1.0 - (-dt / tau).exp())
}

/// Convert a per-frame blend factor tuned for 60 fps into a dt-scaled one.
#[inline]
pub fn per_frame_alpha(factor: f32, dt: f32) -> f32 {
    (factor * dt * 60.0).clamp(0.0, 1.0)
}
