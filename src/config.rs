//! Gameplay tunables
//!
//! Supplied once at construction. Timing, probabilities, and physics live
//! here; lane geometry is chosen by the presentation layer (see `settings`).

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Mass-spring-damper tunables for the draggable actuator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Spring constant
    pub k: f32,
    /// Damping coefficient
    pub c: f32,
    pub mass: f32,
    /// Downward acceleration, applied only while launched
    pub gravity: f32,
    /// Resting position (screen y, grows downward)
    pub rest_y: f32,
    /// Trigger threshold; crossing it upward while launched presses the actuator
    pub belt_y: f32,
    pub max_pull_distance: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            k: SPRING_K,
            c: SPRING_C,
            mass: SPRING_MASS,
            gravity: SPRING_GRAVITY,
            rest_y: SPRING_REST_Y,
            belt_y: SPRING_BELT_Y,
            max_pull_distance: SPRING_MAX_PULL,
        }
    }
}

impl SpringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("spring.mass", self.mass)?;
        positive("spring.max_pull_distance", self.max_pull_distance)?;
        non_negative("spring.k", self.k)?;
        non_negative("spring.c", self.c)?;
        non_negative("spring.gravity", self.gravity)?;
        if !self.rest_y.is_finite() || !self.belt_y.is_finite() || self.belt_y >= self.rest_y {
            return Err(ConfigError::BeltBelowRest {
                belt_y: self.belt_y,
                rest_y: self.rest_y,
            });
        }
        Ok(())
    }
}

/// Simulation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Full lane speed (pixels per second)
    pub travel_speed: f32,
    pub inspection_duration_ms: f64,
    pub item_lifetime_ms: f64,
    pub malicious_probability: f64,
    /// Items per burst
    pub burst_size_range: RangeInclusive<u32>,
    /// Gap between items inside a burst
    pub intra_burst_gap_range: RangeInclusive<f64>,
    /// Pause after the last item of a burst
    pub post_burst_gap_range: RangeInclusive<f64>,
    /// Clearance beyond item width required before the next spawn
    pub spawn_margin: f32,
    pub spawn_retry_ms: f64,
    pub spring: SpringConfig,
    /// Autopilot presses this long before the predicted arrival
    pub autopilot_lead_ms: f64,
    /// Max distance between an item center and the line for autopilot to target it
    pub autopilot_proximity_window: f32,
    pub actuator_return_ms: f64,
    pub speed_ramp_down_ms: f64,
    pub speed_ramp_up_ms: f64,
    /// Horizontal speed multiplier for flagged threats
    pub threat_speed_factor: f32,
    pub threat_fall_accel: f32,
    pub max_frame_dt_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            travel_speed: TRAVEL_SPEED,
            inspection_duration_ms: INSPECTION_DURATION_MS,
            item_lifetime_ms: ITEM_LIFETIME_MS,
            malicious_probability: MALICIOUS_PROBABILITY,
            burst_size_range: BURST_SIZE_MIN..=BURST_SIZE_MAX,
            intra_burst_gap_range: INTRA_BURST_GAP_MIN_MS..=INTRA_BURST_GAP_MAX_MS,
            post_burst_gap_range: POST_BURST_GAP_MIN_MS..=POST_BURST_GAP_MAX_MS,
            spawn_margin: SPAWN_MARGIN,
            spawn_retry_ms: SPAWN_RETRY_MS,
            spring: SpringConfig::default(),
            autopilot_lead_ms: AUTOPILOT_LEAD_MS,
            autopilot_proximity_window: AUTOPILOT_PROXIMITY_WINDOW,
            actuator_return_ms: ACTUATOR_RETURN_MS,
            speed_ramp_down_ms: SPEED_RAMP_DOWN_MS,
            speed_ramp_up_ms: SPEED_RAMP_UP_MS,
            threat_speed_factor: THREAT_SPEED_FACTOR,
            threat_fall_accel: THREAT_FALL_ACCEL,
            max_frame_dt_ms: MAX_FRAME_DT_MS,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that make the simulation's invariants unsatisfiable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.travel_speed.is_finite() && self.travel_speed > 0.0) {
            return Err(ConfigError::NonPositiveSpeed(self.travel_speed));
        }

        duration("inspection_duration_ms", self.inspection_duration_ms)?;
        duration("item_lifetime_ms", self.item_lifetime_ms)?;
        duration("spawn_retry_ms", self.spawn_retry_ms)?;
        duration("autopilot_lead_ms", self.autopilot_lead_ms)?;
        duration("actuator_return_ms", self.actuator_return_ms)?;
        duration("speed_ramp_down_ms", self.speed_ramp_down_ms)?;
        duration("speed_ramp_up_ms", self.speed_ramp_up_ms)?;
        duration("max_frame_dt_ms", self.max_frame_dt_ms)?;

        if !(0.0..=1.0).contains(&self.malicious_probability) {
            return Err(ConfigError::InvalidProbability {
                name: "malicious_probability",
                value: self.malicious_probability,
            });
        }

        let (burst_min, burst_max) = (
            *self.burst_size_range.start(),
            *self.burst_size_range.end(),
        );
        if burst_min == 0 {
            return Err(ConfigError::EmptyBurst(burst_min));
        }
        if burst_min > burst_max {
            return Err(ConfigError::InvalidRange {
                name: "burst_size_range",
                min: burst_min as f64,
                max: burst_max as f64,
            });
        }
        gap_range("intra_burst_gap_range", &self.intra_burst_gap_range)?;
        gap_range("post_burst_gap_range", &self.post_burst_gap_range)?;

        non_negative("spawn_margin", self.spawn_margin)?;
        non_negative("autopilot_proximity_window", self.autopilot_proximity_window)?;
        non_negative("threat_speed_factor", self.threat_speed_factor)?;
        non_negative("threat_fall_accel", self.threat_fall_accel)?;

        self.spring.validate()
    }
}

fn duration(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { name, value })
    }
}

fn gap_range(name: &'static str, range: &RangeInclusive<f64>) -> Result<(), ConfigError> {
    let (min, max) = (*range.start(), *range.end());
    if min.is_finite() && max.is_finite() && min >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { name, min, max })
    }
}

pub(crate) fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
