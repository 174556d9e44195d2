//! Phase sequencer: a declarative, one-directional state machine driving the
//! whole experience. Phases advance either on a fixed timer or on a
//! completion event raised by the active visual layer; every event-driven
//! phase also carries a hard bound so the sequence can never stall. All time
//! comes in through `step(dt)`, so the machine runs against a virtual clock
//! in tests.

use crate::constants::{
    ANGEL_DURATION, ANGEL_RETURN_OPACITY, CRT_OFF_BOUND, CTA_DELAY, GHOST_ENTER_HOLD,
    GHOST_HOLD_DURATION, GHOST_READY_BOUND, OPACITY_SNAP, OPACITY_TAU, STATIC_ANGEL_OPACITY,
    STATIC_DURATION, STATIC_RETURN_OPACITY,
};
use crate::ease;
use glam::Vec2;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Static,
    GhostEnter,
    GhostHold,
    CrtOff,
    Angel,
    GhostReturn,
}

/// Completion signals from visual sub-components. Exactly one is accepted
/// per activation; anything late or duplicated is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    GhostReady,
    CrtComplete,
}

#[derive(Clone, Copy, Debug)]
enum Advance {
    Timer(f32),
    /// Event-driven with a worst-case bound.
    Event(PhaseEvent, f32),
    Terminal,
}

struct PhaseSpec {
    phase: Phase,
    advance: Advance,
}

const TABLE: &[PhaseSpec] = &[
    PhaseSpec {
        phase: Phase::Static,
        advance: Advance::Timer(STATIC_DURATION),
    },
    PhaseSpec {
        phase: Phase::GhostEnter,
        advance: Advance::Event(PhaseEvent::GhostReady, GHOST_READY_BOUND),
    },
    PhaseSpec {
        phase: Phase::GhostHold,
        advance: Advance::Timer(GHOST_HOLD_DURATION),
    },
    PhaseSpec {
        phase: Phase::CrtOff,
        advance: Advance::Event(PhaseEvent::CrtComplete, CRT_OFF_BOUND),
    },
    PhaseSpec {
        phase: Phase::Angel,
        advance: Advance::Timer(ANGEL_DURATION),
    },
    PhaseSpec {
        phase: Phase::GhostReturn,
        advance: Advance::Terminal,
    },
];

/// One tweened visual layer opacity. Targets are set on phase entry; the
/// current value approaches exponentially and snaps to exact endpoints.
#[derive(Clone, Copy, Debug)]
pub struct LayerOpacity {
    pub current: f32,
    pub target: f32,
}

impl LayerOpacity {
    fn new(v: f32) -> Self {
        Self {
            current: v,
            target: v,
        }
    }

    fn step(&mut self, dt: f32) {
        self.current = ease::exp_approach(self.current, self.target, dt, OPACITY_TAU);
        if (self.current - self.target).abs() < OPACITY_SNAP {
            self.current = self.target;
        }
    }
}

/// Per-layer opacities owned by the sequencer. Presentation state, but their
/// endpoints are part of the phase contract.
#[derive(Clone, Copy, Debug)]
pub struct Layers {
    pub statik: LayerOpacity,
    pub ghost: LayerOpacity,
    pub field: LayerOpacity,
    pub cta: LayerOpacity,
}

pub struct Sequencer {
    index: usize,
    elapsed: f32,
    total: f32,
    /// Set once GhostReady has been consumed; later signals are no-ops.
    ready_at: Option<f32>,
    crt_seen: bool,
    cta_shown: bool,
    pub layers: Layers,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            index: 0,
            elapsed: 0.0,
            total: 0.0,
            ready_at: None,
            crt_seen: false,
            cta_shown: false,
            layers: Layers {
                statik: LayerOpacity::new(1.0),
                ghost: LayerOpacity::new(0.0),
                field: LayerOpacity::new(0.0),
                cta: LayerOpacity::new(0.0),
            },
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        TABLE[self.index].phase
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(TABLE[self.index].advance, Advance::Terminal)
    }

    /// Static noise intensity for the current phase.
    pub fn static_intensity(&self) -> f32 {
        if self.phase() == Phase::Static {
            1.0
        } else {
            0.5
        }
    }

    /// Secondary-repulsor flight path during the return phase, in raster UV.
    pub fn ghost_flight(&self) -> Option<Vec2> {
        if self.phase() != Phase::GhostReturn {
            return None;
        }
        let t = self.elapsed;
        Some(Vec2::new(
            0.3 + (t * 0.7).sin() * 0.3,
            0.4 + (t * 0.5).cos() * 0.2,
        ))
    }

    /// Advance timers and opacity tweens. Returns the phases entered during
    /// this step (at most a couple, on the rare frame that crosses a
    /// boundary exactly).
    pub fn step(&mut self, dt: f32) -> SmallVec<[Phase; 2]> {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.total += dt;

        let mut entered = SmallVec::new();
        match TABLE[self.index].advance {
            Advance::Timer(duration) => {
                if self.elapsed >= duration {
                    self.advance(&mut entered);
                }
            }
            Advance::Event(_, bound) => {
                if let Some(at) = self.ready_at {
                    // GhostReady consumed: hold the entrance briefly, then move on.
                    if self.phase() == Phase::GhostEnter && self.elapsed - at >= GHOST_ENTER_HOLD {
                        self.advance(&mut entered);
                    }
                } else if self.elapsed >= bound {
                    log::warn!(
                        "phase {:?} hit its {}s bound without a completion signal",
                        self.phase(),
                        bound
                    );
                    self.advance(&mut entered);
                }
            }
            Advance::Terminal => {}
        }

        if self.phase() == Phase::GhostReturn && !self.cta_shown && self.elapsed >= CTA_DELAY {
            self.cta_shown = true;
            self.layers.cta.target = 1.0;
        }

        self.layers.statik.step(dt);
        self.layers.ghost.step(dt);
        self.layers.field.step(dt);
        self.layers.cta.step(dt);
        entered
    }

    /// Deliver a completion event. Accepted only when the current phase
    /// advances on it and it has not been consumed yet; a signal from a
    /// phase the sequencer already left changes nothing. Returns any phase
    /// entered as a direct consequence.
    pub fn notify(&mut self, event: PhaseEvent) -> SmallVec<[Phase; 2]> {
        let mut entered = SmallVec::new();
        match (self.phase(), event) {
            (Phase::GhostEnter, PhaseEvent::GhostReady) if self.ready_at.is_none() => {
                self.ready_at = Some(self.elapsed);
                // Crossfade static out, apparition in.
                self.layers.statik.target = 0.0;
                self.layers.ghost.target = 1.0;
            }
            (Phase::CrtOff, PhaseEvent::CrtComplete) if !self.crt_seen => {
                self.crt_seen = true;
                self.advance(&mut entered);
            }
            _ => {
                log::debug!("discarding stale phase event {:?} in {:?}", event, self.phase());
            }
        }
        entered
    }

    fn advance(&mut self, entered: &mut SmallVec<[Phase; 2]>) {
        if self.index + 1 >= TABLE.len() {
            return;
        }
        self.index += 1;
        self.elapsed = 0.0;
        // Per-phase sub-state; the entrance hold marker must not leak into
        // later event-driven phases or their bounds would never fire.
        self.ready_at = None;
        let phase = self.phase();
        self.enter(phase);
        entered.push(phase);
    }

    /// Set the layer targets for exactly the layers a phase owns.
    fn enter(&mut self, phase: Phase) {
        match phase {
            Phase::Static => {}
            Phase::GhostEnter => {
                // Targets change when the apparition reports ready.
            }
            Phase::GhostHold => {
                self.layers.ghost.target = 1.0;
            }
            Phase::CrtOff => {}
            Phase::Angel => {
                self.layers.ghost.target = 0.0;
                self.layers.field.target = 1.0;
                self.layers.statik.target = STATIC_ANGEL_OPACITY;
            }
            Phase::GhostReturn => {
                self.layers.field.target = ANGEL_RETURN_OPACITY;
                self.layers.ghost.target = 1.0;
                self.layers.statik.target = STATIC_RETURN_OPACITY;
            }
        }
        log::info!("phase -> {:?} (t={:.2}s)", phase, self.total);
    }
}
