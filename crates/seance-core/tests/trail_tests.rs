// Touch-trail buffer: paint intensity, decay and upload bytes.

use glam::Vec2;
use seance_core::constants::{RASTER_HEIGHT, RASTER_WIDTH, TRAIL_IDLE_INTENSITY};
use seance_core::TrailBuffer;

fn center_cell(t: &TrailBuffer) -> (u32, u32) {
    (t.width() / 2, t.height() / 2)
}

#[test]
fn paint_at_distance_zero_reaches_the_documented_maximum() {
    let mut t = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    t.paint(Vec2::splat(0.5), 0.0, false);
    let (cx, cy) = center_cell(&t);
    let v = t.value_at(cx, cy);
    assert!(
        (v - TRAIL_IDLE_INTENSITY).abs() < 0.05,
        "center value {v}, expected ~{TRAIL_IDLE_INTENSITY}"
    );
}

#[test]
fn moving_paint_is_hotter_than_idle_paint() {
    let mut idle = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    idle.paint(Vec2::splat(0.5), 0.0, false);
    let mut moving = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    moving.paint(Vec2::splat(0.5), 0.05, true);
    let (cx, cy) = center_cell(&idle);
    assert!(moving.value_at(cx, cy) > idle.value_at(cx, cy));
}

#[test]
fn intensity_falls_off_with_distance() {
    let mut t = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    t.paint(Vec2::splat(0.5), 0.0, false);
    let (cx, cy) = center_cell(&t);
    let near = t.value_at(cx + 10, cy);
    let far = t.value_at(cx + 70, cy);
    let outside = t.value_at(cx, 0);
    assert!(near > far, "near {near} far {far}");
    assert_eq!(outside, 0.0);
}

#[test]
fn fade_decays_monotonically_to_zero() {
    let mut t = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    t.paint(Vec2::splat(0.5), 0.1, true);
    let (cx, cy) = center_cell(&t);
    let mut last = t.value_at(cx, cy);
    assert!(last > 0.0);
    for _ in 0..240 {
        t.fade(1.0 / 60.0);
        let v = t.value_at(cx, cy);
        assert!(v <= last + 1e-6);
        assert!(v >= 0.0);
        last = v;
    }
    assert!(last < 0.01, "value after four seconds of decay: {last}");
}

#[test]
fn values_stay_bounded_under_repeated_paint() {
    let mut t = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    for _ in 0..50 {
        t.paint(Vec2::splat(0.5), 0.2, true);
    }
    let (cx, cy) = center_cell(&t);
    assert!(t.value_at(cx, cy) <= 1.0);
    let bytes = t.bytes();
    assert_eq!(bytes.len(), (RASTER_WIDTH * RASTER_HEIGHT) as usize);
    assert!(bytes.iter().any(|&b| b > 200));
}

#[test]
fn upload_bytes_track_the_float_values() {
    let mut t = TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT);
    t.paint(Vec2::new(0.25, 0.75), 0.0, false);
    let x = (0.25 * RASTER_WIDTH as f32) as u32;
    let y = (0.75 * RASTER_HEIGHT as f32) as u32;
    let v = t.value_at(x, y);
    let idx = (y * RASTER_WIDTH + x) as usize;
    let b = t.bytes()[idx];
    assert!((b as f32 / 255.0 - v).abs() < 0.01);
}
