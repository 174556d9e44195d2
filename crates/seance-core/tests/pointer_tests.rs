// Pointer smoothing and the screen → field-UV projection.

use glam::Vec2;
use seance_core::pointer::{screen_to_field_uv, PointerState};

#[test]
fn pointer_converges_to_its_target() {
    let mut p = PointerState::default();
    p.set_target(Vec2::new(0.9, 0.1));
    for _ in 0..300 {
        p.step(1.0 / 60.0);
    }
    assert!((p.current - Vec2::new(0.9, 0.1)).length() < 0.01);
}

#[test]
fn fast_motion_tracks_snappier_than_slow_motion() {
    // One pointer, one big jump: the first step sees a high target velocity,
    // the second sees none. The fast step must cover a larger fraction of
    // the distance it had left.
    let mut p = PointerState::default();
    p.set_target(Vec2::new(1.0, 0.5));

    p.step(1.0 / 60.0); // high measured speed
    let first = p.current.x;
    let first_gain = (first - 0.5) / 0.5;

    p.step(1.0 / 60.0); // settled: zero target velocity
    let second_gain = (p.current.x - first) / (1.0 - first);

    assert!(first_gain > 0.0);
    assert!(
        first_gain > second_gain * 1.5,
        "fast step gained {first_gain}, settled step gained {second_gain}"
    );
}

#[test]
fn moving_flag_debounces_after_a_quiet_interval() {
    let mut p = PointerState::default();
    p.set_target(Vec2::new(0.6, 0.6));
    assert!(p.moving);
    p.step(0.05);
    assert!(p.moving, "still inside the quiet window");
    p.step(0.06);
    assert!(!p.moving, "quiet interval elapsed");

    // A new move re-arms the flag.
    p.set_target(Vec2::new(0.7, 0.7));
    assert!(p.moving);
}

#[test]
fn targets_are_clamped_to_unit_uv() {
    let mut p = PointerState::default();
    p.set_target(Vec2::new(4.0, -3.0));
    assert_eq!(p.target, Vec2::new(1.0, 0.0));
}

#[test]
fn viewport_center_projects_to_field_center() {
    let viewport = Vec2::new(1280.0, 720.0);
    let uv = screen_to_field_uv(viewport * 0.5, viewport);
    assert!((uv - Vec2::splat(0.5)).length() < 0.01, "center uv {uv}");
}

#[test]
fn screen_top_left_lands_up_and_left_in_field_space() {
    let viewport = Vec2::new(1280.0, 720.0);
    let uv = screen_to_field_uv(Vec2::ZERO, viewport);
    assert!(uv.x < 0.5, "left of center: {uv}");
    assert!(uv.y > 0.5, "above center in y-up space: {uv}");
    assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
}

#[test]
fn degenerate_viewports_do_not_produce_nan() {
    let uv = screen_to_field_uv(Vec2::ZERO, Vec2::ZERO);
    assert!(uv.x.is_finite() && uv.y.is_finite());
}
