//! Deterministic simulation module
//!
//! Everything that decides what happens on the lane lives here:
//! - Simulated time only (frame dt is clamped, paused time stands still)
//! - Seeded RNG only
//! - Deferred work is an explicit task queue, never a platform timer
//! - No rendering or platform dependencies

pub mod commands;
pub mod inspect;
pub mod lifecycle;
pub mod score;
pub mod snapshot;
pub mod spawn;
pub mod speed;
pub mod spring;
pub mod state;
pub mod tick;
pub mod timers;

pub use commands::Command;
pub use inspect::{ActiveInspection, InspectionController, autopilot_target, predict_duck_delay};
pub use lifecycle::{LaneEvent, LanePass, advance_lane};
pub use score::{Score, ScoreEvent};
pub use snapshot::{ActuatorView, ItemView, Snapshot};
pub use spawn::{BurstSchedule, SpawnScheduler};
pub use speed::SpeedRamp;
pub use spring::{SpringOutcome, SpringPhase, SpringSignal, SpringState, effective_pull};
pub use state::{
    Actuator, ActuatorPosition, Classification, Item, ItemId, ItemStatus, RemovalReason, SimEvent,
    Simulation, TriggerSource,
};
pub use timers::{Task, TaskQueue};
