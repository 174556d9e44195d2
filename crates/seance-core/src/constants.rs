// Shared tuning constants used by the sequencer, fields and render passes.

// Shape raster resolution. Every particle field samples its source shapes at
// this fixed grid; pointer and trail coordinates are expressed in it too.
pub const RASTER_WIDTH: u32 = 320;
pub const RASTER_HEIGHT: u32 = 180;

// A cell is "lit" when its coverage exceeds this (34/255).
pub const LIT_THRESHOLD: f32 = 34.0 / 255.0;
// Lit cells darker than this luminance are classified as eye/socket pixels.
pub const EYE_LUMINANCE: f32 = 30.0 / 255.0;

// Hard cap on instanced particles per field; requests above it clamp silently.
pub const MAX_PARTICLES: usize = 32_768;

// Phase timings (seconds).
pub const STATIC_DURATION: f32 = 2.0;
pub const GHOST_READY_BOUND: f32 = 8.0; // worst case if the ready signal never fires
pub const GHOST_ENTER_HOLD: f32 = 1.0; // visible time after ready before holding
pub const GHOST_HOLD_DURATION: f32 = 4.0;
pub const CRT_OFF_BOUND: f32 = 1.5;
pub const CRT_OFF_DURATION: f32 = 0.6;
pub const ANGEL_DURATION: f32 = 12.0;
pub const CTA_DELAY: f32 = 3.0;

// Layer opacity tween: exponential approach time constant and snap epsilon.
pub const OPACITY_TAU: f32 = 0.35;
pub const OPACITY_SNAP: f32 = 0.005;

// Residual static texture kept behind the particle phases.
pub const STATIC_ANGEL_OPACITY: f32 = 0.12;
pub const STATIC_RETURN_OPACITY: f32 = 0.10;
pub const ANGEL_RETURN_OPACITY: f32 = 0.35;

// Camera for all particle fields: perspective, looking down -Z at the raster
// plane centered on the origin.
pub const CAMERA_Z: f32 = 300.0;
pub const CAMERA_FOVY: f32 = 45.0 * std::f32::consts::PI / 180.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 1000.0;

// Pointer smoothing (per-frame factor at 60 fps) and moving debounce.
pub const POINTER_SMOOTHING: f32 = 0.12;
pub const POINTER_QUIET_SECS: f32 = 0.1;

// Touch trail.
pub const TRAIL_FADE_PER_FRAME: f32 = 0.08; // alpha of the black fade fill
pub const TRAIL_RADIUS: f32 = 80.0; // raster pixels, matches the mouse radius
pub const TRAIL_IDLE_INTENSITY: f32 = 0.5;
pub const TRAIL_MOVE_INTENSITY: f32 = 0.7;

// Audio band extraction. Bucket edges sit on the effective bin boundaries
// of a 256-point analyser at 44.1 kHz; the gain compresses raw FFT
// magnitudes into [0, 1) before smoothing.
pub const BAND_BASS_HZ: (f32, f32) = (20.0, 344.0);
pub const BAND_MID_HZ: (f32, f32) = (344.0, 2064.0);
pub const BAND_HIGH_HZ: (f32, f32) = (2064.0, 11_000.0);
pub const BAND_GAIN: f32 = 0.02;
pub const BAND_SMOOTHING: f32 = 0.15;

// Ghost apparition field: pointer follow and float bob.
pub const GHOST_FOLLOW: f32 = 0.075; // per-frame at 60 fps
pub const GHOST_FLOAT_SPEED: f32 = 1.6;
pub const GHOST_PULSE_SPEED: f32 = 1.6;
pub const GHOST_PULSE_INTENSITY: f32 = 0.6;
pub const GHOST_EYE_DECAY: f32 = 0.95;
pub const GHOST_EYE_RESPONSE: f32 = 0.31;
pub const GHOST_MOVEMENT_THRESHOLD: f32 = 0.002;

// Bloom.
pub const BLOOM_BASS_BOOST: f32 = 1.5;
