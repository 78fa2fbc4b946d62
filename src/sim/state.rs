//! Simulation state and core types
//!
//! `Simulation` owns every piece of mutable state. The item collection is only
//! touched by the lane pass (`lifecycle`) and the inspection controller
//! (`inspect`); the spring only by its own step; the score only through its
//! reducer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::inspect::InspectionController;
use super::score::Score;
use super::spawn::SpawnScheduler;
use super::speed::SpeedRamp;
use super::spring::SpringState;
use super::timers::TaskQueue;
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::settings::LaneGeometry;

/// Stable item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Hidden ground truth, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Safe,
    Malicious,
}

/// Item lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Travelling toward the line, not yet looked at
    Unprocessed,
    /// Under the inspection beam
    Inspecting,
    /// Inspected, found safe
    Safe,
    /// Inspected, found malicious (slides off and drops)
    Threat,
    /// Crossed the line without being inspected
    Missed,
}

impl ItemStatus {
    /// Legal edges of the status graph. Nothing ever returns to `Unprocessed`.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (Unprocessed, Inspecting)
                | (Unprocessed, Missed)
                | (Inspecting, Safe)
                | (Inspecting, Threat)
        )
    }

    /// Safe, threat, and missed items never change status again
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Safe | ItemStatus::Threat | ItemStatus::Missed)
    }
}

/// One unit travelling along the lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Left edge (x) and vertical position (y)
    pub pos: Vec2,
    pub width: f32,
    classification: Classification,
    status: ItemStatus,
    pub created_at_ms: f64,
    pub inspection_started_at_ms: Option<f64>,
    /// Vertical speed once dropped as a threat
    #[serde(default)]
    pub fall_speed: f32,
}

impl Item {
    pub fn new(
        id: ItemId,
        pos: Vec2,
        width: f32,
        classification: Classification,
        created_at_ms: f64,
    ) -> Self {
        Self {
            id,
            pos,
            width,
            classification,
            status: ItemStatus::Unprocessed,
            created_at_ms,
            inspection_started_at_ms: None,
            fall_speed: 0.0,
        }
    }

    #[inline]
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Ground truth. Presentation code should use `revealed_classification`.
    #[inline]
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Classification once the item has been inspected, `None` before
    pub fn revealed_classification(&self) -> Option<Classification> {
        match self.status {
            ItemStatus::Safe | ItemStatus::Threat => Some(self.classification),
            _ => None,
        }
    }

    #[inline]
    pub fn is_malicious(&self) -> bool {
        self.classification == Classification::Malicious
    }

    /// Move along the status graph. Returns false (and changes nothing) for an
    /// illegal edge.
    pub fn transition(&mut self, next: ItemStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Does the line at `line_x` fall within `[x, x + width]`?
    #[inline]
    pub fn overlaps(&self, line_x: f32) -> bool {
        self.left() <= line_x && self.right() >= line_x
    }

    /// Age relative to the simulation clock
    #[inline]
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.created_at_ms
    }
}

/// Logical actuator position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorPosition {
    #[default]
    Up,
    Down,
}

/// What pressed the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// Direct tap/click
    Tap,
    /// Spring actuator crossed the belt
    Spring,
    /// Autopilot duck
    Autopilot,
}

/// The logical "down" signal shared by every trigger front-end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actuator {
    pub position: ActuatorPosition,
    /// Source of the current press (None while up)
    pub source: Option<TriggerSource>,
    /// Incremented on every press so deferred returns can tell presses apart
    press_seq: u32,
}

impl Actuator {
    #[inline]
    pub fn is_up(&self) -> bool {
        self.position == ActuatorPosition::Up
    }

    #[inline]
    pub fn press_seq(&self) -> u32 {
        self.press_seq
    }

    /// Press the actuator. Returns the press sequence, or None if it was
    /// already down.
    pub fn press(&mut self, source: TriggerSource) -> Option<u32> {
        if !self.is_up() {
            return None;
        }
        self.press_seq = self.press_seq.wrapping_add(1);
        self.position = ActuatorPosition::Down;
        self.source = Some(source);
        Some(self.press_seq)
    }

    /// Return to the up position. Returns false if already up.
    pub fn raise(&mut self) -> bool {
        if self.is_up() {
            return false;
        }
        self.position = ActuatorPosition::Up;
        self.source = None;
        true
    }
}

/// Why an item left the lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Exceeded the lifetime ceiling
    Expired,
    /// Past the right-hand visible bound
    Offscreen,
    /// Flagged threat fell past the drop bound
    Dropped,
}

/// Events produced by a tick or command, for presentation hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    Spawned { id: ItemId },
    ActuatorPressed { source: TriggerSource },
    ActuatorRaised,
    InspectionStarted { id: ItemId },
    /// Inspected and found safe
    Cleared { id: ItemId },
    /// Inspected and found malicious
    ThreatCaught { id: ItemId },
    /// Inspected item vanished before the timer fired
    InspectionAborted { id: ItemId },
    /// Crossed the line unprocessed; `scored` when it counted against the player
    Missed { id: ItemId, scored: bool },
    Removed { id: ItemId, reason: RemovalReason },
    SpringHitBelt,
    SpringLanded,
    AutopilotChanged { enabled: bool },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) geometry: LaneGeometry,
    /// Seed the spawn RNG was created from
    pub(crate) seed: u64,
    /// Simulated time (frozen while paused)
    pub(crate) now_ms: f64,
    /// Timestamp of the previous frame, for dt
    pub(crate) last_frame_ms: Option<f64>,
    pub(crate) spawner: SpawnScheduler,
    /// Items in spawn order
    pub(crate) items: Vec<Item>,
    pub(crate) inspection: InspectionController,
    pub(crate) actuator: Actuator,
    pub(crate) spring: SpringState,
    pub(crate) score: Score,
    pub(crate) speed: SpeedRamp,
    pub(crate) timers: TaskQueue,
    pub(crate) paused: bool,
    pub(crate) debug: bool,
}

impl Simulation {
    /// Create a new simulation. Fails if the configuration would make the
    /// simulation's invariants unsatisfiable.
    pub fn new(config: SimConfig, geometry: LaneGeometry, seed: u64) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate().and_then(|_| geometry.validate()) {
            log::warn!("Rejected simulation config: {}", e);
            return Err(e);
        }

        let spawner = SpawnScheduler::new(&config, &geometry, seed);
        let spring = SpringState::new(config.spring.rest_y);
        let speed = SpeedRamp::new(config.travel_speed, config.speed_ramp_up_ms);

        log::info!(
            "Simulation created (seed {}, speed {} px/s, line at x={})",
            seed,
            config.travel_speed,
            geometry.inspection_line_x
        );

        Ok(Self {
            config,
            geometry,
            seed,
            now_ms: 0.0,
            last_frame_ms: None,
            spawner,
            items: Vec::new(),
            inspection: InspectionController::default(),
            actuator: Actuator::default(),
            spring,
            score: Score::default(),
            speed,
            timers: TaskQueue::default(),
            paused: false,
            debug: false,
        })
    }

    /// Simulation with default tunables and pointer layout
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(SimConfig::default(), LaneGeometry::default(), seed)
            .unwrap_or_else(|e| unreachable!("default config is valid: {e}"))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn geometry(&self) -> &LaneGeometry {
        &self.geometry
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated milliseconds since start (or last reset)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Items in spawn order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Current (eased) lane speed
    pub fn speed(&self) -> f32 {
        self.speed.current()
    }

    pub fn spring(&self) -> &SpringState {
        &self.spring
    }

    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    pub fn is_inspecting(&self) -> bool {
        self.inspection.is_active()
    }

    pub fn autopilot(&self) -> bool {
        self.inspection.autopilot
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Deferred tasks still waiting to fire
    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }
}
