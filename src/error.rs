//! Construction-time configuration errors
//!
//! Everything else in the simulation resolves bad input with a guard clause,
//! so this is the only error type the crate surfaces.

use thiserror::Error;

/// A configuration that would make the simulation's invariants unsatisfiable
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Lane speed must be strictly positive (spawn spacing divides by it)
    #[error("travel speed must be positive and finite, got {0}")]
    NonPositiveSpeed(f32),

    /// A duration or delay was negative or not finite
    #[error("{name} must be a non-negative duration, got {value} ms")]
    InvalidDuration { name: &'static str, value: f64 },

    /// Probability outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    /// Range with min > max or a negative bound
    #[error("{name} range is invalid: {min}..={max}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    /// Burst sizes must spawn at least one item
    #[error("burst size must be at least 1, got {0}")]
    EmptyBurst(u32),

    /// A geometric or physical quantity that must be strictly positive
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    /// A quantity that must be non-negative
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f32 },

    /// The belt threshold must sit above (smaller y than) the rest position
    #[error("belt y ({belt_y}) must be above rest y ({rest_y})")]
    BeltBelowRest { belt_y: f32, rest_y: f32 },

    /// The inspection line must lie on the visible lane
    #[error("inspection line x ({line_x}) must lie within the lane width ({lane_width})")]
    LineOffLane { line_x: f32, lane_width: f32 },

    /// Malformed JSON configuration document
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
