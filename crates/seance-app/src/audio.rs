//! Microphone capture and spectrum analysis. The cpal callback downmixes
//! interleaved frames to mono into an SPSC ring; a dedicated thread windows
//! the samples, runs the FFT and folds the magnitudes through the core band
//! extractor. The render thread reads the latest snapshot wait-free through
//! a seqlock of atomics. Failure to open a stream leaves the caller without
//! an `AudioInput` and every audio-reactive parameter at zero.

use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::HeapRb;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use seance_core::{AudioBands, BandExtractor};
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Seqlock-published band snapshot: odd sequence means a write in progress.
pub struct AtomicBands {
    seq: AtomicU64,
    vals: [AtomicU32; 4],
}

impl AtomicBands {
    fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            vals: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    fn store(&self, b: AudioBands) {
        self.seq.fetch_add(1, Ordering::Release);
        for (dst, src) in self.vals.iter().zip(b.as_array()) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.seq.fetch_add(1, Ordering::Release);
    }

    fn load(&self) -> AudioBands {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }
            let vals: [f32; 4] =
                std::array::from_fn(|i| f32::from_bits(self.vals[i].load(Ordering::Relaxed)));
            let v2 = self.seq.load(Ordering::Acquire);
            if v1 == v2 {
                return AudioBands {
                    bass: vals[0],
                    mid: vals[1],
                    high: vals[2],
                    overall: vals[3],
                };
            }
        }
    }
}

pub struct AudioInput {
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    bands: Arc<AtomicBands>,
}

impl AudioInput {
    /// Open the default input device and start the analysis thread.
    pub fn start() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device"))?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb = HeapRb::<f32>::new((sample_rate_hz as usize).saturating_mul(2));
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let bands = Arc::new(AtomicBands::new());
        let bands_for_thread = Arc::clone(&bands);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| log::warn!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };
        stream.play().context("start input stream")?;

        let analyzer_handle = thread::Builder::new()
            .name("band-analyzer".into())
            .spawn(move || {
                analyze_loop(&mut cons, sample_rate_hz, &stop_for_thread, &bands_for_thread)
            })
            .context("spawn analysis thread")?;

        log::info!("microphone capture running at {sample_rate_hz} Hz, {channels} ch");
        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            bands,
        })
    }

    /// Latest smoothed snapshot.
    pub fn bands(&self) -> AudioBands {
        self.bands.load()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
        // The stream drops with self, which releases the microphone.
    }
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels.max(1)) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels.max(1) as f32;
        let _ = prod.try_push(mono);
    }
}

fn analyze_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    sample_rate_hz: u32,
    stop: &AtomicBool,
    bands: &AtomicBands,
) {
    let n = 1024usize;
    let hop = 256usize;

    let mut scratch = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;

    let hann = (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
        .collect::<Vec<_>>();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut fft_buf = vec![Complex { re: 0.0, im: 0.0 }; n];
    let mut mags = vec![0.0f32; n / 2];
    let mut extractor = BandExtractor::default();

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            scratch[write_pos] = s;
            write_pos = (write_pos + 1) % n;
            if filled < n {
                filled += 1;
            }
            since_last += 1;
            if filled == n && since_last >= hop {
                since_last = 0;
                for i in 0..n {
                    let v = scratch[(write_pos + i) % n];
                    fft_buf[i].re = v * hann[i];
                    fft_buf[i].im = 0.0;
                }
                fft.process(&mut fft_buf);
                for (i, c) in fft_buf.iter().take(n / 2).enumerate() {
                    mags[i] = (c.re * c.re + c.im * c.im).sqrt();
                }
                bands.store(extractor.update(&mags, sample_rate_hz as f32));
            }
        }
        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
