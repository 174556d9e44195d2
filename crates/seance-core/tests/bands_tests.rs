// Band extraction: bucketing, normalization bounds and smoothing behavior.

use seance_core::{AudioBands, BandExtractor};

const SAMPLE_RATE: f32 = 48_000.0;
const BINS: usize = 512; // 1024-point FFT

#[test]
fn bands_start_zeroed() {
    let ex = BandExtractor::default();
    assert_eq!(ex.bands(), AudioBands::default());
}

#[test]
fn bands_always_stay_in_unit_range() {
    let mut ex = BandExtractor::default();
    for k in 0..50 {
        let spectrum: Vec<f32> = (0..BINS).map(|i| ((i * 31 + k * 17) % 997) as f32).collect();
        let b = ex.update(&spectrum, SAMPLE_RATE);
        for v in b.as_array() {
            assert!((0.0..=1.0).contains(&v), "band out of range: {v}");
        }
    }
}

#[test]
fn maximal_spectrum_saturates_within_the_smoothing_constant() {
    let mut ex = BandExtractor::default();
    let spectrum = vec![1_000.0f32; BINS];
    let mut last = AudioBands::default();
    // At factor 0.15 the residual after 30 updates is (0.85)^30 < 1%.
    for _ in 0..30 {
        last = ex.update(&spectrum, SAMPLE_RATE);
    }
    assert!(last.bass > 0.99, "bass {}", last.bass);
    assert!(last.mid > 0.99, "mid {}", last.mid);
    assert!(last.high > 0.99, "high {}", last.high);
    assert!((last.overall - 1.0).abs() < 0.01, "overall {}", last.overall);
}

#[test]
fn silence_decays_back_toward_zero() {
    let mut ex = BandExtractor::default();
    let loud = vec![1_000.0f32; BINS];
    for _ in 0..30 {
        ex.update(&loud, SAMPLE_RATE);
    }
    let quiet = vec![0.0f32; BINS];
    let mut b = ex.bands();
    for _ in 0..60 {
        let next = ex.update(&quiet, SAMPLE_RATE);
        assert!(next.overall <= b.overall + 1e-6, "decay must be monotonic");
        b = next;
    }
    assert!(b.overall < 0.01, "overall after silence: {}", b.overall);
}

#[test]
fn low_frequency_energy_lands_in_the_bass_band() {
    let mut ex = BandExtractor::default();
    // 46.9 Hz per bin at 48 kHz / 1024: bins 2..6 sit well inside 20-344 Hz.
    let mut spectrum = vec![0.0f32; BINS];
    for v in &mut spectrum[2..6] {
        *v = 2_000.0;
    }
    let mut b = AudioBands::default();
    for _ in 0..40 {
        b = ex.update(&spectrum, SAMPLE_RATE);
    }
    assert!(b.bass > 0.8, "bass {}", b.bass);
    assert!(b.high < 0.05, "high {}", b.high);
}

#[test]
fn mid_frequency_energy_lands_in_the_mid_band() {
    let mut ex = BandExtractor::default();
    // Bins 10..40 cover roughly 470-1875 Hz, inside the mid bucket only.
    let mut spectrum = vec![0.0f32; BINS];
    for v in &mut spectrum[10..40] {
        *v = 2_000.0;
    }
    let mut b = AudioBands::default();
    for _ in 0..40 {
        b = ex.update(&spectrum, SAMPLE_RATE);
    }
    assert!(b.mid > 0.8, "mid {}", b.mid);
    assert!(b.high < 0.05, "high {}", b.high);
    assert!(b.bass < 0.05, "bass {}", b.bass);
}

#[test]
fn empty_spectrum_is_a_no_op() {
    let mut ex = BandExtractor::default();
    let before = ex.update(&vec![500.0; BINS], SAMPLE_RATE);
    let after = ex.update(&[], SAMPLE_RATE);
    assert_eq!(before, after);
}

#[test]
fn overall_is_the_mean_of_the_three_bands() {
    let mut ex = BandExtractor::new(1.0); // no smoothing: raw values
    let mut spectrum = vec![0.0f32; BINS];
    for v in &mut spectrum[2..6] {
        *v = 2_000.0;
    }
    let b = ex.update(&spectrum, SAMPLE_RATE);
    let mean = (b.bass + b.mid + b.high) / 3.0;
    assert!((b.overall - mean).abs() < 1e-5);
}
