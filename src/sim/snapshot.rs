//! Read-only view of the simulation for the presentation shell

use serde::{Deserialize, Serialize};

use super::score::Score;
use super::spring::SpringPhase;
use super::state::{ActuatorPosition, Classification, ItemId, ItemStatus, Simulation};

/// What the shell may know about an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub status: ItemStatus,
    /// Only revealed once inspected
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorView {
    pub position: ActuatorPosition,
    pub spring_phase: SpringPhase,
    pub y: f32,
    pub anchor_y: f32,
    /// Visual stretch feedback in [0, 1]
    pub tension: f32,
}

/// Per-tick snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time_ms: f64,
    pub items: Vec<ItemView>,
    pub actuator: ActuatorView,
    pub score: Score,
    pub speed: f32,
    /// Item under inspection, if any
    pub inspecting: Option<ItemId>,
    pub autopilot: bool,
    pub paused: bool,
    pub debug: bool,
    pub inspection_line_x: f32,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Simulation {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time_ms: self.now_ms,
            items: self
                .items
                .iter()
                .map(|item| ItemView {
                    id: item.id,
                    x: item.pos.x,
                    y: item.pos.y,
                    width: item.width,
                    status: item.status(),
                    classification: item.revealed_classification(),
                })
                .collect(),
            actuator: ActuatorView {
                position: self.actuator.position,
                spring_phase: self.spring.phase(),
                y: self.spring.y,
                anchor_y: self.spring.anchor_y,
                tension: self.spring.tension(&self.config.spring),
            },
            score: self.score,
            speed: self.speed.current(),
            inspecting: self.inspection.active().map(|a| a.item_id),
            autopilot: self.inspection.autopilot,
            paused: self.paused,
            debug: self.debug,
            inspection_line_x: self.geometry.inspection_line_x,
        }
    }
}
