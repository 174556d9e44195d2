//! Audio band extraction: a magnitude spectrum in, four smoothed bands out.
//!
//! The front-end owns the microphone stream and FFT; this module is the pure
//! half that buckets bin magnitudes into {bass, mid, high}, normalizes them
//! into [0, 1] and low-passes the per-window jitter with a fixed exponential
//! smoothing factor. Only the latest snapshot is retained.

use crate::constants::{
    BAND_BASS_HZ, BAND_GAIN, BAND_HIGH_HZ, BAND_MID_HZ, BAND_SMOOTHING,
};

/// Normalized frequency bands, each in `[0, 1]`. Read-only to consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub overall: f32,
}

impl AudioBands {
    #[inline]
    pub fn as_array(&self) -> [f32; 4] {
        [self.bass, self.mid, self.high, self.overall]
    }
}

/// Smoothing accumulator over successive spectrum snapshots.
pub struct BandExtractor {
    smoothed: AudioBands,
    factor: f32,
}

impl Default for BandExtractor {
    fn default() -> Self {
        Self::new(BAND_SMOOTHING)
    }
}

impl BandExtractor {
    pub fn new(factor: f32) -> Self {
        Self {
            smoothed: AudioBands::default(),
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Latest smoothed snapshot; zero-initialized before the first update.
    #[inline]
    pub fn bands(&self) -> AudioBands {
        self.smoothed
    }

    /// Fold one magnitude spectrum into the smoothed bands.
    ///
    /// `spectrum` holds magnitudes for bins `0..n/2` of an `n`-point FFT at
    /// `sample_rate` Hz. Returns the updated snapshot.
    pub fn update(&mut self, spectrum: &[f32], sample_rate: f32) -> AudioBands {
        if spectrum.is_empty() || sample_rate <= 0.0 {
            return self.smoothed;
        }
        let raw_bass = band_mean(spectrum, sample_rate, BAND_BASS_HZ);
        let raw_mid = band_mean(spectrum, sample_rate, BAND_MID_HZ);
        let raw_high = band_mean(spectrum, sample_rate, BAND_HIGH_HZ);
        let raw_overall = (raw_bass + raw_mid + raw_high) / 3.0;

        let s = self.factor;
        self.smoothed.bass += (raw_bass - self.smoothed.bass) * s;
        self.smoothed.mid += (raw_mid - self.smoothed.mid) * s;
        self.smoothed.high += (raw_high - self.smoothed.high) * s;
        self.smoothed.overall += (raw_overall - self.smoothed.overall) * s;
        self.smoothed
    }
}

/// Mean magnitude over the bins covering `range` Hz, compressed into [0, 1).
fn band_mean(spectrum: &[f32], sample_rate: f32, range: (f32, f32)) -> f32 {
    // bin k covers frequency k * sample_rate / n for an n-point FFT, and the
    // spectrum slice holds n/2 bins.
    let n = (spectrum.len() * 2) as f32;
    let hz_per_bin = sample_rate / n;
    let lo = ((range.0 / hz_per_bin).floor() as usize).max(1);
    let hi = ((range.1 / hz_per_bin).ceil() as usize).min(spectrum.len());
    if lo >= hi {
        return 0.0;
    }
    let sum: f32 = spectrum[lo..hi].iter().sum();
    let mean = sum / (hi - lo) as f32;
    (mean * BAND_GAIN).tanh().clamp(0.0, 1.0)
}
