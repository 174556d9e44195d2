// Shape rasterization: silhouettes, eye classification, budgeted sampling
// and morph start mapping.

use rand::rngs::StdRng;
use rand::SeedableRng;
use seance_core::constants::{MAX_PARTICLES, RASTER_HEIGHT, RASTER_WIDTH};
use seance_core::raster::{
    load_font, morph_starts, rasterize, rasterize_silhouette, sample_with_budget, Raster,
    RasterError, ShapeSource, Silhouette, Tag, TextLine,
};
use std::io::Cursor;

fn ghost() -> Raster {
    rasterize_silhouette(Silhouette::Ghost, RASTER_WIDTH, RASTER_HEIGHT)
}

#[test]
fn silhouettes_produce_lit_samples() {
    for s in [Silhouette::Angel, Silhouette::Skull, Silhouette::Ghost] {
        let raster = rasterize_silhouette(s, RASTER_WIDTH, RASTER_HEIGHT);
        let samples = raster.samples();
        assert!(
            samples.len() > 500,
            "{s:?} produced only {} samples",
            samples.len()
        );
        for p in &samples {
            assert!(p.x >= 0.0 && p.x < RASTER_WIDTH as f32);
            assert!(p.y >= 0.0 && p.y < RASTER_HEIGHT as f32);
        }
    }
}

#[test]
fn skull_and_ghost_have_eye_classified_samples() {
    for s in [Silhouette::Skull, Silhouette::Ghost] {
        let samples = rasterize_silhouette(s, RASTER_WIDTH, RASTER_HEIGHT).samples();
        let eyes = samples.iter().filter(|p| p.tag == Tag::Eye).count();
        let body = samples.len() - eyes;
        assert!(eyes > 20, "{s:?}: {eyes} eye samples");
        assert!(body > eyes, "{s:?}: sockets should stay a minority");
    }
}

#[test]
fn angel_has_no_eye_samples() {
    let samples = rasterize_silhouette(Silhouette::Angel, RASTER_WIDTH, RASTER_HEIGHT).samples();
    assert!(samples.iter().all(|p| p.tag == Tag::Body));
}

#[test]
fn sampling_pads_up_to_the_requested_budget() {
    let raster = ghost();
    let lit = raster.samples().len();
    let budget = lit + 500;
    let mut rng = StdRng::seed_from_u64(1);
    let samples = sample_with_budget(&raster, budget, &mut rng);
    assert_eq!(samples.len(), budget);

    // Padding scatters below the frame with zero luminance.
    let padded: Vec<_> = samples.iter().filter(|p| p.y < 0.0).collect();
    assert!(padded.len() >= 500);
    assert!(padded.iter().all(|p| p.luminance == 0.0 && p.tag == Tag::Body));
}

#[test]
fn sampling_truncates_down_to_the_requested_budget() {
    let raster = ghost();
    let mut rng = StdRng::seed_from_u64(2);
    let samples = sample_with_budget(&raster, 100, &mut rng);
    assert_eq!(samples.len(), 100);
    assert!(samples.iter().all(|p| p.y >= 0.0));
}

#[test]
fn sampling_clamps_at_the_particle_cap() {
    let raster = ghost();
    let mut rng = StdRng::seed_from_u64(3);
    let samples = sample_with_budget(&raster, MAX_PARTICLES + 10_000, &mut rng);
    assert_eq!(samples.len(), MAX_PARTICLES);
}

#[test]
fn sampling_is_deterministic_per_seed() {
    let raster = ghost();
    let a = sample_with_budget(&raster, 2_000, &mut StdRng::seed_from_u64(42));
    let b = sample_with_budget(&raster, 2_000, &mut StdRng::seed_from_u64(42));
    for (p, q) in a.iter().zip(&b) {
        assert_eq!((p.x, p.y, p.tag), (q.x, q.y, q.tag));
    }
}

#[test]
fn image_source_samples_bright_pixels() {
    // A luma image, bright only in its left half.
    let img = image::GrayImage::from_fn(64, 36, |x, _| {
        if x < 32 {
            image::Luma([220u8])
        } else {
            image::Luma([0u8])
        }
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let raster = rasterize(&ShapeSource::Image { bytes: &bytes }, RASTER_WIDTH, RASTER_HEIGHT)
        .expect("png decodes");
    let samples = raster.samples();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|p| p.x < RASTER_WIDTH as f32 * 0.55));
}

#[test]
fn broken_image_reports_a_decode_error() {
    let err = rasterize(
        &ShapeSource::Image {
            bytes: &[0x13, 0x37, 0x00],
        },
        RASTER_WIDTH,
        RASTER_HEIGHT,
    )
    .unwrap_err();
    assert!(matches!(err, RasterError::ImageDecode(_)));
}

#[test]
fn morph_starts_scatter_below_when_nothing_is_lit() {
    let target = ghost().samples();
    let empty = Raster::new(RASTER_WIDTH, RASTER_HEIGHT);
    let mut rng = StdRng::seed_from_u64(4);
    let starts = morph_starts(&target, &empty, &mut rng);
    assert_eq!(starts.len(), target.len());
    assert!(starts.iter().all(|s| s.y < 0.0));
}

#[test]
fn morph_starts_use_covered_cells_shifted_down() {
    // Use a second silhouette as the stand-in start shape.
    let target = ghost().samples();
    let start_shape = rasterize_silhouette(Silhouette::Skull, RASTER_WIDTH, RASTER_HEIGHT);
    let mut rng = StdRng::seed_from_u64(5);
    let starts = morph_starts(&target, &start_shape, &mut rng);

    let h = RASTER_HEIGHT as f32;
    let mut mapped = 0;
    for (sample, start) in target.iter().zip(&starts) {
        let gx = sample.x as u32;
        let gy_down = (h - 1.0 - sample.y) as u32;
        if start_shape.lit_at(gx, gy_down) {
            mapped += 1;
            assert!((start.x - sample.x).abs() < 1e-6);
            assert!((start.y - (sample.y - 0.8 * h)).abs() < 1e-6);
        } else {
            assert!(start.y < 0.0, "uncovered cells scatter below the frame");
        }
    }
    assert!(mapped > 100, "shapes should overlap: {mapped}");
}

#[test]
fn text_rasterization_is_deterministic_when_a_font_exists() {
    // Host fonts are environment-dependent; without one the text source is
    // unavailable and the morph falls back to scatter, so skip quietly.
    let Some(font) = load_font() else {
        return;
    };
    let lines = [
        TextLine {
            text: "GOOD LOOKIN",
            size_divisor: 10.0,
            center: 0.35,
        },
        TextLine {
            text: "CORPSE",
            size_divisor: 7.0,
            center: 0.65,
        },
    ];
    let a = rasterize(
        &ShapeSource::Text {
            lines: &lines,
            font: &font,
        },
        RASTER_WIDTH,
        RASTER_HEIGHT,
    )
    .unwrap();
    let b = rasterize(
        &ShapeSource::Text {
            lines: &lines,
            font: &font,
        },
        RASTER_WIDTH,
        RASTER_HEIGHT,
    )
    .unwrap();
    let sa = a.samples();
    let sb = b.samples();
    assert!(sa.len() > 200, "text should light a few hundred cells");
    assert_eq!(sa.len(), sb.len());
}
