//! Belt Inspect - conveyor inspection simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, item lifecycle, inspection, spring physics)
//! - `config`: Gameplay tunables with validation
//! - `settings`: Presentation-layer layout and debug preferences
//! - `platform`: Browser/native platform abstraction

pub mod config;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use config::{SimConfig, SpringConfig};
pub use error::ConfigError;
pub use settings::{LaneGeometry, LayoutPreset, Settings};
pub use sim::{Command, Simulation, Snapshot};

/// Default tunables
pub mod consts {
    /// Lane travel speed (pixels per second)
    pub const TRAVEL_SPEED: f32 = 120.0;
    /// How long an item stays under inspection
    pub const INSPECTION_DURATION_MS: f64 = 350.0;
    /// Hard lifetime ceiling for any item
    pub const ITEM_LIFETIME_MS: f64 = 13_000.0;
    /// Chance that a freshly spawned item is malicious
    pub const MALICIOUS_PROBABILITY: f64 = 0.4;

    /// Burst cadence
    pub const BURST_SIZE_MIN: u32 = 1;
    pub const BURST_SIZE_MAX: u32 = 4;
    pub const INTRA_BURST_GAP_MIN_MS: f64 = 10.0;
    pub const INTRA_BURST_GAP_MAX_MS: f64 = 25.0;
    pub const POST_BURST_GAP_MIN_MS: f64 = 1200.0;
    pub const POST_BURST_GAP_MAX_MS: f64 = 3000.0;
    /// Extra clearance past the item width before the next spawn
    pub const SPAWN_MARGIN: f32 = 5.0;
    /// Retry delay when the spawn point is still occupied
    pub const SPAWN_RETRY_MS: f64 = 50.0;

    /// Autopilot fires this much earlier than the predicted arrival
    pub const AUTOPILOT_LEAD_MS: f64 = 30.0;
    /// Autopilot only considers items whose center is this close to the line
    pub const AUTOPILOT_PROXIMITY_WINDOW: f32 = 80.0;

    /// Actuator pops back up this long after a press
    pub const ACTUATOR_RETURN_MS: f64 = 200.0;
    /// Ease to a stop when a manual inspection begins
    pub const SPEED_RAMP_DOWN_MS: f64 = 50.0;
    /// Ease back up to travel speed
    pub const SPEED_RAMP_UP_MS: f64 = 250.0;
    /// Flagged threats slide at this fraction of lane speed
    pub const THREAT_SPEED_FACTOR: f32 = 0.2;
    /// Downward acceleration of a flagged threat (pixels/s²)
    pub const THREAT_FALL_ACCEL: f32 = 900.0;
    /// Frame dt clamp (tab switches, debugger pauses)
    pub const MAX_FRAME_DT_MS: f64 = 100.0;

    /// Spring defaults
    pub const SPRING_K: f32 = 180.0;
    pub const SPRING_C: f32 = 12.0;
    pub const SPRING_MASS: f32 = 1.0;
    pub const SPRING_GRAVITY: f32 = 800.0;
    pub const SPRING_REST_Y: f32 = 600.0;
    pub const SPRING_BELT_Y: f32 = 150.0;
    pub const SPRING_MAX_PULL: f32 = 160.0;

    /// Fixed spring sub-step (120 Hz for stable integration)
    pub const SPRING_DT: f32 = 1.0 / 120.0;
    /// Maximum spring sub-steps per frame to prevent spiral of death
    pub const MAX_SPRING_SUBSTEPS: u32 = 8;
    /// Finger travel needed before a grab becomes a hold
    pub const DRAG_DEADZONE: f32 = 8.0;
    /// Release impulse per pixel of stretch
    pub const LAUNCH_IMPULSE_FACTOR: f32 = 3.2;
    /// Effective pull saturates at this fraction of the max pull distance
    pub const PULL_GAIN: f32 = 0.9;
    /// Shape of the pull saturation curve (fraction of max pull at half gain)
    pub const PULL_SOFTNESS: f32 = 0.4;

    /// Lane geometry defaults (pointer layout)
    pub const LANE_WIDTH: f32 = 896.0;
    pub const LANE_Y: f32 = 290.0;
    pub const SPAWN_X: f32 = -60.0;
    pub const ITEM_WIDTH: f32 = 48.0;
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    pub const DROP_Y: f32 = 650.0;
}

/// Cubic ease-in-out over `t` in [0, 1]
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
