//! Particle field model: the CPU half of the engine. Builds the immutable
//! per-particle instance buffer from sampled shapes and packs the per-frame
//! uniform block the displacement shader consumes. All mutation happens
//! through explicit per-frame input snapshots; the GPU half lives in the
//! front-end crate.

use crate::bands::AudioBands;
use crate::constants::{
    CAMERA_FAR, CAMERA_FOVY, CAMERA_NEAR, CAMERA_Z, GHOST_EYE_DECAY, GHOST_EYE_RESPONSE,
    GHOST_FLOAT_SPEED, GHOST_FOLLOW, GHOST_MOVEMENT_THRESHOLD, GHOST_PULSE_INTENSITY,
    GHOST_PULSE_SPEED, MAX_PARTICLES, RASTER_HEIGHT, RASTER_WIDTH,
};
use crate::ease;
use crate::raster::{ShapeSample, Tag};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-instance attributes, uploaded once at field creation and never
/// mutated afterwards.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub offset: [f32; 3],
    pub start_offset: [f32; 3],
    pub pindex: f32,
    pub angle: f32,
    pub luminance: f32,
    pub tag: f32,
}

/// Uniform block mirrored by `particles.wgsl`; written once per frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FieldUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub tex_size: [f32; 2],
    pub time: f32,
    pub size: f32,
    pub mouse: [f32; 2],
    pub mouse_radius: f32,
    pub mouse_force: f32,
    pub ghost: [f32; 2],
    pub ghost_radius: f32,
    pub ghost_force: f32,
    pub audio: [f32; 4],
    pub center: [f32; 2],
    pub morph: f32,
    pub rise: f32,
    pub random_amp: f32,
    pub depth: f32,
    pub idle_movement: f32,
    pub idle_speed: f32,
    pub idle_intensity: f32,
    pub glow_strength: f32,
    pub color_variation: f32,
    pub opacity: f32,
    pub home_color: [f32; 4],
    pub target_color: [f32; 4],
    pub eye_glow: f32,
    pub pulse: f32,
    pub _pad: [f32; 2],
}

/// Bloom settings a field requests from the post chain.
#[derive(Clone, Copy, Debug)]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

/// Displacement and shading tuning for one field variant.
#[derive(Clone, Copy, Debug)]
pub struct FieldParams {
    pub particle_size: f32,
    pub randomness: f32,
    pub depth: f32,
    pub mouse_radius: f32,
    pub mouse_force: f32,
    pub idle_movement: f32,
    pub idle_speed: f32,
    pub idle_intensity: f32,
    pub glow_strength: f32,
    pub color_variation: f32,
    pub ghost_radius: f32,
    pub ghost_force: f32,
    pub bloom: BloomParams,
}

impl FieldParams {
    /// Angel text-morph field tuning.
    pub fn angel() -> Self {
        Self {
            particle_size: 0.8,
            randomness: 0.4,
            depth: 2.5,
            mouse_radius: 80.0,
            mouse_force: 0.6,
            idle_movement: 0.5,
            idle_speed: 0.4,
            idle_intensity: 0.6,
            glow_strength: 0.4,
            color_variation: 0.2,
            ghost_radius: 0.2,
            ghost_force: 2.0,
            bloom: BloomParams {
                strength: 1.5,
                radius: 0.6,
                threshold: 0.75,
            },
        }
    }

    /// Ghost apparition field tuning.
    pub fn ghost() -> Self {
        Self {
            particle_size: 1.0,
            randomness: 0.6,
            depth: 3.0,
            mouse_radius: 80.0,
            mouse_force: 0.8,
            idle_movement: 0.4,
            idle_speed: 0.5,
            idle_intensity: 0.8,
            glow_strength: 0.3,
            color_variation: 0.15,
            ghost_radius: 0.0,
            ghost_force: 0.0,
            bloom: BloomParams {
                strength: 0.9,
                radius: 0.5,
                threshold: 0.6,
            },
        }
    }
}

/// Sprite tint endpoints, blended by eased morph progress.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub home: Vec3,
    pub target: Vec3,
}

impl Palette {
    /// Neon cyan text state settling into ethereal white-cyan.
    pub fn angel() -> Self {
        Self {
            home: Vec3::new(0.1, 0.9, 1.0),
            target: Vec3::new(0.85, 0.95, 1.0),
        }
    }

    /// Fluorescent orange apparition glow.
    pub fn ghost() -> Self {
        Self {
            home: Vec3::new(1.0, 0.35, 0.08),
            target: Vec3::new(1.0, 0.35, 0.08),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MorphConfig {
    pub duration: f32,
}

/// Morph progress: monotonic, exactly 1.0 at the duration boundary, and
/// idempotent afterwards. The smoothstep ease is applied in the shader.
#[derive(Clone, Copy, Debug)]
pub struct MorphState {
    progress: f32,
    duration: f32,
}

impl MorphState {
    pub fn new(config: MorphConfig) -> Self {
        Self {
            progress: 0.0,
            duration: config.duration.max(1e-3),
        }
    }

    pub fn step(&mut self, dt: f32) -> f32 {
        self.progress = (self.progress + dt / self.duration).min(1.0);
        self.progress
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn done(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Everything that distinguishes one field variant from another. The valid
/// combinations are constructed by the frame layer; there is one engine.
#[derive(Clone, Copy, Debug)]
pub struct FieldConfig {
    pub params: FieldParams,
    pub palette: Palette,
    pub morph: Option<MorphConfig>,
    /// Apparition behavior: the whole field tracks the smoothed pointer and
    /// its eye particles glow with movement.
    pub follow_pointer: bool,
}

impl FieldConfig {
    pub fn angel_morph() -> Self {
        Self {
            params: FieldParams::angel(),
            palette: Palette::angel(),
            morph: Some(MorphConfig { duration: 2.0 }),
            follow_pointer: false,
        }
    }

    pub fn ghost_apparition() -> Self {
        Self {
            params: FieldParams::ghost(),
            palette: Palette::ghost(),
            morph: None,
            follow_pointer: true,
        }
    }
}

/// Explicit per-frame input snapshot; the field never reads ambient state.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub dt: f32,
    /// Smoothed pointer position in raster UV (y-up).
    pub pointer: Vec2,
    pub pointer_moving: bool,
    pub bands: AudioBands,
    /// Secondary repulsor position in raster UV, when one is flying through.
    pub ghost: Option<Vec2>,
    pub opacity: f32,
    pub aspect: f32,
}

/// One particle field: immutable instances plus the per-frame scalar state
/// behind the uniform block.
pub struct FieldModel {
    config: FieldConfig,
    instances: Vec<ParticleInstance>,
    time: f32,
    morph: Option<MorphState>,
    rise: f32,
    center: Vec2,
    movement: f32,
    eye_glow: f32,
}

impl FieldModel {
    /// Build a field from budgeted target samples (and optional morph start
    /// positions, one per sample). `count` is fixed here and never changes.
    pub fn new(
        target: &[ShapeSample],
        starts: Option<&[Vec2]>,
        config: FieldConfig,
        seed: u64,
    ) -> Self {
        let count = target.len().min(MAX_PARTICLES);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut instances = Vec::with_capacity(count);
        for (i, s) in target.iter().take(count).enumerate() {
            let start = starts
                .and_then(|st| st.get(i).copied())
                .unwrap_or(Vec2::new(s.x, s.y));
            instances.push(ParticleInstance {
                offset: [s.x, s.y, 0.0],
                start_offset: [start.x, start.y, 0.0],
                pindex: i as f32,
                angle: rng.gen::<f32>() * std::f32::consts::PI,
                luminance: s.luminance,
                tag: if s.tag == Tag::Eye { 1.0 } else { 0.0 },
            });
        }
        Self {
            config,
            instances,
            time: 0.0,
            morph: config.morph.map(MorphState::new),
            rise: 0.0,
            center: Vec2::ZERO,
            movement: 0.0,
            eye_glow: 0.0,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    #[inline]
    pub fn bloom(&self) -> BloomParams {
        self.config.params.bloom
    }

    #[inline]
    pub fn morph_progress(&self) -> f32 {
        self.morph.map_or(1.0, |m| m.progress())
    }

    /// Step the field one frame and pack the uniform block.
    pub fn frame(&mut self, input: &FrameInput) -> FieldUniforms {
        let p = self.config.params;
        let dt = input.dt.max(0.0);
        // The shader's noise frequencies are tuned for a 0.05-per-frame
        // clock at 60 fps; keep that time scale.
        self.time += dt * 3.0;

        let morph = match self.morph.as_mut() {
            Some(m) => {
                m.step(dt);
                self.rise = ease::exp_approach(self.rise, 1.0, dt, 1.1);
                m.progress()
            }
            None => 1.0,
        };

        if self.config.follow_pointer {
            self.follow(input.pointer, dt);
        }

        let tex = Vec2::new(RASTER_WIDTH as f32, RASTER_HEIGHT as f32);
        let bob = if self.config.follow_pointer {
            (self.time * GHOST_FLOAT_SPEED * 0.5).sin() * 3.0
                + (self.time * GHOST_FLOAT_SPEED * 0.23).cos() * 1.8
        } else {
            0.0
        };
        let pulse = if self.config.follow_pointer {
            1.0 + (self.time * GHOST_PULSE_SPEED * 0.33).sin() * GHOST_PULSE_INTENSITY * 0.3
                + (self.time * 0.2).sin() * 0.12
        } else {
            1.0
        };

        let ghost = input.ghost.unwrap_or(Vec2::new(-1.0, -1.0));
        let ghost_force = if input.ghost.is_some() {
            p.ghost_force
        } else {
            0.0
        };

        FieldUniforms {
            view_proj: view_proj(input.aspect),
            tex_size: tex.to_array(),
            time: self.time,
            size: p.particle_size,
            mouse: input.pointer.to_array(),
            mouse_radius: p.mouse_radius,
            mouse_force: p.mouse_force,
            ghost: ghost.to_array(),
            ghost_radius: p.ghost_radius,
            ghost_force,
            audio: input.bands.as_array(),
            center: [self.center.x, self.center.y + bob],
            // Eased here so CPU and GPU agree on the curve; the shader only
            // applies the per-particle delay on top.
            morph: ease::smooth(morph),
            rise: self.rise,
            random_amp: p.randomness,
            depth: p.depth,
            idle_movement: p.idle_movement,
            idle_speed: p.idle_speed,
            idle_intensity: p.idle_intensity,
            glow_strength: p.glow_strength,
            color_variation: p.color_variation,
            opacity: input.opacity.clamp(0.0, 1.0),
            home_color: [
                self.config.palette.home.x,
                self.config.palette.home.y,
                self.config.palette.home.z,
                0.0,
            ],
            target_color: [
                self.config.palette.target.x,
                self.config.palette.target.y,
                self.config.palette.target.z,
                0.0,
            ],
            eye_glow: if self.config.follow_pointer {
                self.eye_glow
            } else {
                1.0
            },
            pulse,
            _pad: [0.0; 2],
        }
    }

    /// Apparition drift: ease the field center toward the pointer and derive
    /// eye glow from recent movement.
    fn follow(&mut self, pointer: Vec2, dt: f32) {
        let tex = Vec2::new(RASTER_WIDTH as f32, RASTER_HEIGHT as f32);
        let target = (pointer - Vec2::splat(0.5)) * tex * 0.55;
        let alpha = ease::per_frame_alpha(GHOST_FOLLOW, dt);
        let prev = self.center;
        self.center += (target - self.center) * alpha;

        let step = (self.center - prev).length();
        self.movement = self.movement * GHOST_EYE_DECAY + step * (1.0 - GHOST_EYE_DECAY);
        let moving = self.movement > GHOST_MOVEMENT_THRESHOLD;
        let response = if moving {
            GHOST_EYE_RESPONSE * 2.0
        } else {
            GHOST_EYE_RESPONSE
        };
        let target_glow = if moving { 1.0 } else { 0.0 };
        self.eye_glow += (target_glow - self.eye_glow) * ease::per_frame_alpha(response, dt);
    }
}

/// Right-handed perspective camera looking down -Z at the raster plane.
pub fn view_proj(aspect: f32) -> [[f32; 4]; 4] {
    let proj = Mat4::perspective_rh(CAMERA_FOVY, aspect.max(1e-3), CAMERA_NEAR, CAMERA_FAR);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
    (proj * view).to_cols_array_2d()
}
