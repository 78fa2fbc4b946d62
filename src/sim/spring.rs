//! Rubber-band actuator physics
//!
//! A 1-D mass-spring-damper. While held, the anchor follows the finger through
//! a saturating pull mapping and the body lags behind it. On release the band
//! gets a launch impulse and flies under spring + damper + gravity until it
//! either crosses the belt (pressing the actuator) or falls back to rest.
//!
//! Screen coordinates: y grows downward, so pulling is +y and launching is -y.

use serde::{Deserialize, Serialize};

use crate::config::SpringConfig;
use crate::consts::{
    DRAG_DEADZONE, LAUNCH_IMPULSE_FACTOR, MAX_SPRING_SUBSTEPS, PULL_GAIN, PULL_SOFTNESS, SPRING_DT,
};

/// Spring phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpringPhase {
    /// At rest, no integration
    #[default]
    Idle,
    /// Finger down, inside the drag deadzone
    Arming,
    /// Being pulled
    Held,
    /// Released and flying
    Launched,
}

/// Result of a single physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringSignal {
    /// Nothing to integrate
    Idle,
    Held,
    Flying,
    /// Crossed the belt moving upward (once per launch)
    HitBelt,
    /// Fell back to rest and went idle
    Landed,
}

/// What happened across a frame's worth of sub-steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpringOutcome {
    pub hit_belt: bool,
    pub landed: bool,
}

/// Saturating pull mapping.
///
/// `raw` is clamped to >= 0. The result is 0 at 0, strictly increasing,
/// strictly concave, and always below `PULL_GAIN * max_pull`.
pub fn effective_pull(raw: f32, max_pull: f32) -> f32 {
    let d = raw.max(0.0);
    let ceiling = PULL_GAIN * max_pull;
    ceiling * d / (d + PULL_SOFTNESS * max_pull)
}

/// Actuator physics state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringState {
    pub y: f32,
    pub vy: f32,
    /// Point the spring pulls toward
    pub anchor_y: f32,
    phase: SpringPhase,
    /// Finger position at grab, for the deadzone
    grab_finger_y: Option<f32>,
    /// Belt already crossed during this launch
    belt_hit: bool,
}

impl SpringState {
    pub fn new(rest_y: f32) -> Self {
        Self {
            y: rest_y,
            vy: 0.0,
            anchor_y: rest_y,
            phase: SpringPhase::Idle,
            grab_finger_y: None,
            belt_hit: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> SpringPhase {
        self.phase
    }

    /// Finger down. Only honored while idle; grabbing mid-flight is rejected.
    pub fn grab(&mut self, finger_y: f32) -> bool {
        if self.phase != SpringPhase::Idle {
            return false;
        }
        self.phase = SpringPhase::Arming;
        self.grab_finger_y = Some(finger_y);
        self.anchor_y = self.y;
        self.vy = 0.0;
        true
    }

    /// Finger moved. Leaves the deadzone into `Held`, then drives the anchor
    /// through the pull mapping. Returns false when the drag was ignored.
    pub fn drag(&mut self, config: &SpringConfig, finger_y: f32) -> bool {
        if !matches!(self.phase, SpringPhase::Arming | SpringPhase::Held) {
            return false;
        }
        let grab_y = *self.grab_finger_y.get_or_insert(finger_y);

        if self.phase == SpringPhase::Arming && finger_y - grab_y < DRAG_DEADZONE {
            return false;
        }
        self.phase = SpringPhase::Held;

        let raw_pull = finger_y - config.rest_y;
        self.anchor_y = config.rest_y + effective_pull(raw_pull, config.max_pull_distance);
        true
    }

    /// Let go of a held band. Returns the launch impulse, or None (with the
    /// state untouched) if the band was not held.
    ///
    /// `flick_velocity` is the measured upward finger speed (positive = up).
    pub fn release(&mut self, config: &SpringConfig, flick_velocity: f32) -> Option<f32> {
        if self.phase != SpringPhase::Held {
            return None;
        }
        self.phase = SpringPhase::Launched;

        let stretch = (self.y - config.rest_y).max(0.0);
        let impulse = stretch.min(config.max_pull_distance) * LAUNCH_IMPULSE_FACTOR;

        self.vy -= impulse / config.mass.max(1.0);
        if flick_velocity > 0.0 {
            self.vy -= flick_velocity;
        }
        // Anchor snaps home so the band recoils on its own
        self.anchor_y = config.rest_y;
        self.grab_finger_y = None;
        self.belt_hit = false;
        Some(impulse)
    }

    /// A tap that never left the deadzone: back to idle at rest
    pub fn cancel_arming(&mut self, config: &SpringConfig) -> bool {
        if self.phase != SpringPhase::Arming {
            return false;
        }
        self.phase = SpringPhase::Idle;
        self.anchor_y = config.rest_y;
        self.grab_finger_y = None;
        true
    }

    pub fn reset(&mut self, config: &SpringConfig) {
        *self = Self::new(config.rest_y);
    }

    /// One semi-implicit Euler step
    pub fn step(&mut self, config: &SpringConfig, dt: f32) -> SpringSignal {
        if matches!(self.phase, SpringPhase::Idle | SpringPhase::Arming) {
            return SpringSignal::Idle;
        }
        let launched = self.phase == SpringPhase::Launched;

        let displacement = self.y - self.anchor_y;
        let spring_force = -config.k * displacement;
        let damping_force = -config.c * self.vy;
        let gravity_force = if launched {
            config.mass * config.gravity
        } else {
            0.0
        };
        let acceleration = (spring_force + damping_force + gravity_force) / config.mass;

        self.vy += acceleration * dt;
        self.y += self.vy * dt;

        if !launched {
            return SpringSignal::Held;
        }

        if self.vy < 0.0 && self.y <= config.belt_y && !self.belt_hit {
            self.belt_hit = true;
            return SpringSignal::HitBelt;
        }

        if self.vy > 0.0 && self.y >= config.rest_y {
            self.y = config.rest_y;
            self.vy = 0.0;
            self.phase = SpringPhase::Idle;
            self.anchor_y = config.rest_y;
            self.belt_hit = false;
            return SpringSignal::Landed;
        }

        SpringSignal::Flying
    }

    /// Integrate a frame's dt in fixed sub-steps
    pub fn advance(&mut self, config: &SpringConfig, dt: f32) -> SpringOutcome {
        let mut outcome = SpringOutcome::default();
        if dt <= 0.0 || matches!(self.phase, SpringPhase::Idle | SpringPhase::Arming) {
            return outcome;
        }

        let steps = ((dt / SPRING_DT).ceil() as u32).clamp(1, MAX_SPRING_SUBSTEPS);
        let h = dt / steps as f32;
        for _ in 0..steps {
            match self.step(config, h) {
                SpringSignal::HitBelt => outcome.hit_belt = true,
                SpringSignal::Landed => {
                    outcome.landed = true;
                    break;
                }
                _ => {}
            }
        }
        outcome
    }

    /// Visual tension in [0, 1], ramping sharply near full pull
    pub fn tension(&self, config: &SpringConfig) -> f32 {
        let stretch = (self.y - self.anchor_y).abs();
        let normalized = (stretch / config.max_pull_distance.max(1.0)).min(1.0);

        let curved = normalized.powf(1.2) * (1.0 - normalized.powi(2));
        let steep_ramp = normalized.powi(3);

        (curved + steep_ramp).min(1.0)
    }
}
