// Sanity checks over the tuning constants and easing primitives the
// sequencer and fields depend on.

use seance_core::constants::*;
use seance_core::ease;

#[test]
#[allow(clippy::assertions_on_constants)]
fn phase_timings_are_positive_and_ordered() {
    assert!(STATIC_DURATION > 0.0);
    assert!(GHOST_ENTER_HOLD > 0.0);
    assert!(GHOST_HOLD_DURATION > 0.0);
    assert!(ANGEL_DURATION > 0.0);
    assert!(CTA_DELAY > 0.0);
    // Bounds must exceed the happy-path durations they backstop.
    assert!(GHOST_READY_BOUND > GHOST_ENTER_HOLD);
    assert!(CRT_OFF_BOUND > CRT_OFF_DURATION);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn raster_and_particle_limits_are_consistent() {
    assert!(RASTER_WIDTH > 0 && RASTER_HEIGHT > 0);
    assert!(MAX_PARTICLES > 1_000);
    assert!((LIT_THRESHOLD > 0.0) && (LIT_THRESHOLD < 1.0));
    assert!(EYE_LUMINANCE < LIT_THRESHOLD.max(0.5));
    assert!(BAND_SMOOTHING > 0.0 && BAND_SMOOTHING < 1.0);
    assert!(BAND_BASS_HZ.1 <= BAND_MID_HZ.1);
    assert!(BAND_MID_HZ.1 <= BAND_HIGH_HZ.1);
}

#[test]
fn smooth_ease_is_monotonic_with_fixed_endpoints() {
    assert_eq!(ease::smooth(0.0), 0.0);
    assert_eq!(ease::smooth(1.0), 1.0);
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = ease::smooth(i as f32 / 100.0);
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn expo_out_hits_exactly_one() {
    assert_eq!(ease::expo_out(1.0), 1.0);
    assert_eq!(ease::expo_out(2.0), 1.0);
    assert!(ease::expo_out(0.5) > 0.9, "steep early rise");
    assert!(ease::expo_out(0.0).abs() < 1e-6);
}

#[test]
fn exp_approach_converges_without_overshoot() {
    let mut v = 0.0;
    for _ in 0..200 {
        let next = ease::exp_approach(v, 1.0, 1.0 / 60.0, 0.35);
        assert!(next >= v && next <= 1.0);
        v = next;
    }
    assert!(v > 0.99);
}

#[test]
fn per_frame_alpha_scales_with_dt_and_clamps() {
    let base = ease::per_frame_alpha(0.12, 1.0 / 60.0);
    assert!((base - 0.12).abs() < 1e-6);
    assert_eq!(ease::per_frame_alpha(0.9, 1.0), 1.0);
    assert_eq!(ease::per_frame_alpha(0.5, 0.0), 0.0);
}
