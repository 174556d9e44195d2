// Particle field model: instance building, morph stepping, uniform packing
// and the GPU-shared struct layouts.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seance_core::constants::{RASTER_HEIGHT, RASTER_WIDTH};
use seance_core::raster::{rasterize_silhouette, sample_with_budget, Silhouette, Tag};
use seance_core::{
    AudioBands, FieldConfig, FieldModel, FieldUniforms, FrameInput, ParticleInstance,
};

fn samples(n: usize, seed: u64) -> Vec<seance_core::raster::ShapeSample> {
    let raster = rasterize_silhouette(Silhouette::Ghost, RASTER_WIDTH, RASTER_HEIGHT);
    sample_with_budget(&raster, n, &mut StdRng::seed_from_u64(seed))
}

fn input(dt: f32) -> FrameInput {
    FrameInput {
        dt,
        pointer: Vec2::splat(0.5),
        pointer_moving: false,
        bands: AudioBands::default(),
        ghost: None,
        opacity: 1.0,
        aspect: 16.0 / 9.0,
    }
}

#[test]
fn shared_struct_layouts_match_the_shader() {
    // The WGSL uniform block is hand-laid-out; keep the Rust mirror honest.
    assert_eq!(std::mem::size_of::<FieldUniforms>(), 224);
    assert_eq!(std::mem::size_of::<FieldUniforms>() % 16, 0);
    assert_eq!(std::mem::size_of::<ParticleInstance>(), 40);
}

#[test]
fn count_is_fixed_at_creation() {
    let s = samples(1_500, 1);
    let model = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 9);
    assert_eq!(model.count(), 1_500);
    assert_eq!(model.instances().len(), 1_500);
}

#[test]
fn instance_building_is_deterministic_per_seed() {
    let s = samples(800, 2);
    let a = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 5);
    let b = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 5);
    for (x, y) in a.instances().iter().zip(b.instances()) {
        assert_eq!(x.offset, y.offset);
        assert_eq!(x.angle, y.angle);
    }
}

#[test]
fn classification_is_immutable_after_creation() {
    let s = samples(1_000, 3);
    let expected: Vec<f32> = s
        .iter()
        .map(|p| if p.tag == Tag::Eye { 1.0 } else { 0.0 })
        .collect();
    let mut model = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 5);
    for inst in model.instances() {
        assert!(inst.tag == 0.0 || inst.tag == 1.0);
    }
    for _ in 0..120 {
        model.frame(&input(1.0 / 60.0));
    }
    let tags: Vec<f32> = model.instances().iter().map(|i| i.tag).collect();
    assert_eq!(tags, expected);
}

#[test]
fn morph_is_monotonic_and_exact_at_the_boundary() {
    let s = samples(400, 4);
    let starts = vec![Vec2::new(0.0, -100.0); s.len()];
    let mut model = FieldModel::new(&s, Some(&starts), FieldConfig::angel_morph(), 5);

    // angel_morph uses a 2 s duration; cross it in uneven steps.
    let mut prev = 0.0f32;
    let mut t = 0.0f32;
    while t < 2.5 {
        let dt = 0.07;
        let u = model.frame(&input(dt));
        t += dt;
        assert!(u.morph >= prev, "morph regressed: {} -> {}", prev, u.morph);
        assert!(u.morph <= 1.0);
        prev = u.morph;
    }
    assert_eq!(prev, 1.0, "morph must land exactly on 1.0");

    // Idempotent past the boundary.
    let u = model.frame(&input(0.1));
    assert_eq!(u.morph, 1.0);
    assert_eq!(model.morph_progress(), 1.0);
}

#[test]
fn non_morphing_fields_sit_at_full_progress() {
    let s = samples(300, 6);
    let mut model = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 5);
    let u = model.frame(&input(0.016));
    assert_eq!(u.morph, 1.0);
    assert_eq!(u.rise, 0.0);
}

#[test]
fn pointer_and_audio_flow_into_the_uniform_block() {
    let s = samples(300, 7);
    let mut model = FieldModel::new(&s, None, FieldConfig::angel_morph(), 5);
    let mut inp = input(0.016);
    inp.pointer = Vec2::new(0.25, 0.75);
    inp.bands = AudioBands {
        bass: 0.9,
        mid: 0.5,
        high: 0.2,
        overall: 0.53,
    };
    inp.opacity = 0.35;
    let u = model.frame(&inp);
    assert_eq!(u.mouse, [0.25, 0.75]);
    assert_eq!(u.audio, [0.9, 0.5, 0.2, 0.53]);
    assert_eq!(u.opacity, 0.35);
    assert_eq!(u.tex_size, [RASTER_WIDTH as f32, RASTER_HEIGHT as f32]);
}

#[test]
fn secondary_repulsor_is_inert_unless_present() {
    let s = samples(300, 8);
    let mut model = FieldModel::new(&s, None, FieldConfig::angel_morph(), 5);

    let u = model.frame(&input(0.016));
    assert_eq!(u.ghost_force, 0.0);
    assert_eq!(u.ghost, [-1.0, -1.0]);

    let mut inp = input(0.016);
    inp.ghost = Some(Vec2::new(0.3, 0.4));
    let u = model.frame(&inp);
    assert!(u.ghost_force > 0.0);
    assert_eq!(u.ghost, [0.3, 0.4]);
}

#[test]
fn apparition_center_drifts_toward_the_pointer() {
    let s = samples(300, 9);
    let mut model = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 5);
    let mut inp = input(1.0 / 60.0);
    inp.pointer = Vec2::new(1.0, 0.5);
    let mut last_x = 0.0;
    for _ in 0..180 {
        let u = model.frame(&inp);
        last_x = u.center[0];
    }
    // Target for a (1.0, 0.5) pointer is +0.5 * tex.x * 0.55 = 88 px.
    assert!(last_x > 40.0, "center x only reached {last_x}");
    assert!(last_x <= 89.0);
}

#[test]
fn fixed_fields_never_move_their_center() {
    let s = samples(300, 10);
    let mut model = FieldModel::new(&s, None, FieldConfig::angel_morph(), 5);
    let mut inp = input(1.0 / 60.0);
    inp.pointer = Vec2::new(1.0, 1.0);
    for _ in 0..60 {
        let u = model.frame(&inp);
        assert_eq!(u.center, [0.0, 0.0]);
    }
}

#[test]
fn opacity_is_clamped_to_unit_range() {
    let s = samples(100, 11);
    let mut model = FieldModel::new(&s, None, FieldConfig::ghost_apparition(), 5);
    let mut inp = input(0.016);
    inp.opacity = 1.7;
    assert_eq!(model.frame(&inp).opacity, 1.0);
    inp.opacity = -0.3;
    assert_eq!(model.frame(&inp).opacity, 0.0);
}
