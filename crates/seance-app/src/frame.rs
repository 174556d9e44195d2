//! Per-frame orchestration: owns the sequencer, pointer, trail and the live
//! particle fields, wires input/audio snapshots into them and drives the GPU
//! pass sequence. Fields are created on phase entry and dropped on exit, so
//! no shape-specific GPU memory outlives its phase.

use crate::audio::AudioInput;
use crate::render::{FieldGpu, GpuState, PostFrame, StaticUniforms};
use glam::Vec2;
use seance_core::constants::{CRT_OFF_DURATION, RASTER_HEIGHT, RASTER_WIDTH};
use seance_core::raster::{
    load_font, morph_starts, rasterize, rasterize_silhouette, sample_with_budget, Raster,
    ShapeSource, Silhouette, TextLine,
};
use seance_core::{
    FieldConfig, FieldModel, FrameInput, Phase, PhaseEvent, PointerState, Sequencer, TrailBuffer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const GHOST_SEED: u64 = 7;
const ANGEL_SEED: u64 = 11;
/// Frames rendered before the apparition reports ready.
const READY_WARMUP_FRAMES: u32 = 3;

const TEXT_LINES: &[TextLine<'static>] = &[
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

struct ActiveField {
    model: FieldModel,
    gpu: FieldGpu,
}

pub struct FrameContext {
    seq: Sequencer,
    pointer: PointerState,
    trail: TrailBuffer,
    ghost: Option<ActiveField>,
    angel: Option<ActiveField>,
    audio: Option<AudioInput>,
    audio_attempted: bool,
    /// Some(frames rendered) while a ready signal is still owed.
    ghost_warmup: Option<u32>,
    crt: f32,
    crt_active: bool,
    cta_logged: bool,
    /// A resize happened and the offscreen targets still need re-layout.
    relayout_pending: bool,
    relayout_quiet: f32,
    time: f32,
}

/// Quiet interval before a resize re-lays-out the post buffers.
const RELAYOUT_DEBOUNCE: f32 = 0.1;

impl FrameContext {
    pub fn new() -> Self {
        Self {
            seq: Sequencer::new(),
            pointer: PointerState::default(),
            trail: TrailBuffer::new(RASTER_WIDTH, RASTER_HEIGHT),
            ghost: None,
            angel: None,
            audio: None,
            audio_attempted: false,
            ghost_warmup: None,
            crt: 0.0,
            crt_active: false,
            cta_logged: false,
            relayout_pending: false,
            relayout_quiet: 0.0,
            time: 0.0,
        }
    }

    pub fn pointer_moved(&mut self, uv: Vec2) {
        self.pointer.set_target(uv);
    }

    /// Note a window resize; the post buffers follow once resizing settles.
    pub fn resized(&mut self) {
        self.relayout_pending = true;
        self.relayout_quiet = 0.0;
    }

    pub fn frame(&mut self, gpu: &mut GpuState, dt: f32) -> Result<(), wgpu::SurfaceError> {
        self.time += dt;
        if self.relayout_pending {
            self.relayout_quiet += dt;
            if self.relayout_quiet >= RELAYOUT_DEBOUNCE {
                self.relayout_pending = false;
                gpu.relayout_targets();
            }
        }
        self.pointer.step(dt);
        // Paint before any particle read within the frame.
        self.trail.fade(dt);
        self.trail
            .paint(self.pointer.current, self.pointer.speed, self.pointer.moving);

        for phase in self.seq.step(dt) {
            self.on_enter(phase, gpu);
        }

        // Apparition reports ready once it has a few frames on screen.
        if let Some(frames) = self.ghost_warmup.as_mut() {
            *frames += 1;
            if *frames >= READY_WARMUP_FRAMES {
                self.ghost_warmup = None;
                for phase in self.seq.notify(PhaseEvent::GhostReady) {
                    self.on_enter(phase, gpu);
                }
            }
        }

        // CRT-off progress; completion is signalled, the sequencer's bound
        // is only the backstop.
        if self.crt_active {
            self.crt = (self.crt + dt / CRT_OFF_DURATION).min(1.0);
            if self.crt >= 1.0 {
                self.crt_active = false;
                for phase in self.seq.notify(PhaseEvent::CrtComplete) {
                    self.on_enter(phase, gpu);
                }
            }
        }

        if !self.cta_logged && self.seq.layers.cta.target > 0.5 {
            self.cta_logged = true;
            log::info!("email capture overlay visible");
        }

        let bands = self.audio.as_ref().map(|a| a.bands()).unwrap_or_default();
        let aspect = gpu.aspect();
        let ghost_flight = self.seq.ghost_flight();
        let trail = self.trail.bytes();

        let ghost_opacity = self.seq.layers.ghost.current;
        let field_opacity = self.seq.layers.field.current;
        let pointer = self.pointer.current;
        let moving = self.pointer.moving;

        if let Some(active) = self.angel.as_mut() {
            let uniforms = active.model.frame(&FrameInput {
                dt,
                pointer,
                pointer_moving: moving,
                bands,
                ghost: ghost_flight,
                opacity: field_opacity,
                aspect,
            });
            active.gpu.write(gpu.queue(), &uniforms, trail);
        }
        if let Some(active) = self.ghost.as_mut() {
            let uniforms = active.model.frame(&FrameInput {
                dt,
                pointer,
                pointer_moving: moving,
                bands,
                ghost: None,
                opacity: ghost_opacity,
                aspect,
            });
            active.gpu.write(gpu.queue(), &uniforms, trail);
        }

        let statik_u = StaticUniforms {
            resolution: [RASTER_WIDTH as f32 * 3.0, RASTER_HEIGHT as f32 * 3.0],
            time: self.time,
            intensity: self.seq.static_intensity(),
            opacity: self.seq.layers.statik.current,
            _pad: [0.0; 3],
        };

        let bloom = self
            .angel
            .as_ref()
            .or(self.ghost.as_ref())
            .map(|f| f.model.bloom());
        let post = PostFrame {
            time: self.time,
            bloom_strength: bloom.map_or(0.9, |b| b.strength),
            bloom_radius: bloom.map_or(0.5, |b| b.radius),
            bloom_threshold: bloom.map_or(0.6, |b| b.threshold),
            crt: if self.crt_active || self.seq.phase() == Phase::CrtOff {
                self.crt
            } else {
                0.0
            },
            bass: bands.bass,
        };

        // Field draw order: the angel layer sits behind the apparition.
        let mut draws: Vec<&FieldGpu> = Vec::with_capacity(2);
        if let Some(a) = self.angel.as_ref() {
            draws.push(&a.gpu);
        }
        if let Some(g) = self.ghost.as_ref() {
            draws.push(&g.gpu);
        }

        gpu.render(&statik_u, &draws, &post)
    }

    fn on_enter(&mut self, phase: Phase, gpu: &GpuState) {
        match phase {
            Phase::Static | Phase::GhostHold => {}
            Phase::GhostEnter => {
                self.ghost = Some(self.build_ghost_field(gpu));
                self.ghost_warmup = Some(0);
            }
            Phase::CrtOff => {
                self.crt = 0.0;
                self.crt_active = true;
            }
            Phase::Angel => {
                // The apparition's buffers are shape-specific; release them
                // before the next field allocates.
                self.ghost = None;
                self.angel = Some(self.build_angel_field(gpu));
                if !self.audio_attempted {
                    self.audio_attempted = true;
                    match AudioInput::start() {
                        Ok(a) => self.audio = Some(a),
                        Err(e) => {
                            log::warn!("audio input unavailable, running non-reactive: {e:#}");
                        }
                    }
                }
            }
            Phase::GhostReturn => {
                self.ghost = Some(self.build_ghost_field(gpu));
            }
        }
    }

    fn build_ghost_field(&self, gpu: &GpuState) -> ActiveField {
        let mut rng = StdRng::seed_from_u64(GHOST_SEED);
        let raster = rasterize_silhouette(Silhouette::Ghost, RASTER_WIDTH, RASTER_HEIGHT);
        let budget = raster.samples().len();
        let samples = sample_with_budget(&raster, budget, &mut rng);
        let model = FieldModel::new(&samples, None, FieldConfig::ghost_apparition(), GHOST_SEED);
        log::info!("ghost field: {} particles", model.count());
        let gpu_field = gpu.create_field(&model);
        ActiveField {
            model,
            gpu: gpu_field,
        }
    }

    fn build_angel_field(&self, gpu: &GpuState) -> ActiveField {
        let mut rng = StdRng::seed_from_u64(ANGEL_SEED);

        // Bitmap source when present, generated silhouette otherwise.
        let raster = match std::fs::read("assets/angel.png") {
            Ok(bytes) => match rasterize(
                &ShapeSource::Image { bytes: &bytes },
                RASTER_WIDTH,
                RASTER_HEIGHT,
            ) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("angel image failed to decode ({e}); using placeholder");
                    self.angel_placeholder()
                }
            },
            Err(_) => {
                log::info!("no angel image asset; using generated silhouette");
                self.angel_placeholder()
            }
        };

        // Morph start shape: the title text, scatter-only when no font.
        let text_raster = match load_font() {
            Some(font) => rasterize(
                &ShapeSource::Text {
                    lines: TEXT_LINES,
                    font: &font,
                },
                RASTER_WIDTH,
                RASTER_HEIGHT,
            )
            .unwrap_or_else(|_| Raster::new(RASTER_WIDTH, RASTER_HEIGHT)),
            None => {
                log::warn!("no usable font found; particles rise from scatter");
                Raster::new(RASTER_WIDTH, RASTER_HEIGHT)
            }
        };

        let budget = raster.samples().len();
        let samples = sample_with_budget(&raster, budget, &mut rng);
        let starts = morph_starts(&samples, &text_raster, &mut rng);
        let model = FieldModel::new(
            &samples,
            Some(&starts),
            FieldConfig::angel_morph(),
            ANGEL_SEED,
        );
        log::info!("angel field: {} particles", model.count());
        let gpu_field = gpu.create_field(&model);
        ActiveField {
            model,
            gpu: gpu_field,
        }
    }

    fn angel_placeholder(&self) -> Raster {
        rasterize_silhouette(Silhouette::Angel, RASTER_WIDTH, RASTER_HEIGHT)
    }
}
