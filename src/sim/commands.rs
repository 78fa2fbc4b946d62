//! Commands accepted from the presentation shell
//!
//! Every command is a guard-clause no-op when it does not apply (grab while
//! flying, tap while already down, release while not held, ...).

use serde::{Deserialize, Serialize};

use super::inspect::InspectionController;
use super::score::{Score, ScoreEvent};
use super::speed::SpeedRamp;
use super::spring::SpringPhase;
use super::state::{Actuator, SimEvent, Simulation, TriggerSource};
use super::timers::TaskQueue;

/// Shell → core command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Tap/click on the actuator
    ManualTrigger,
    /// Finger down on the spring actuator
    Grab { finger_y: f32 },
    /// Finger moved
    Drag { finger_y: f32 },
    /// Finger up, with measured upward flick speed
    Release { flick_velocity: f32 },
    SetAutopilot { enabled: bool },
    /// Presentation only
    SetDebug { enabled: bool },
    SetPaused { paused: bool },
    Reset,
}

impl Simulation {
    /// Apply a command, returning any events it produced
    pub fn apply(&mut self, command: Command) -> Vec<SimEvent> {
        match command {
            Command::ManualTrigger => self.manual_trigger(),
            Command::Grab { finger_y } => {
                self.grab(finger_y);
                Vec::new()
            }
            Command::Drag { finger_y } => {
                self.drag(finger_y);
                Vec::new()
            }
            Command::Release { flick_velocity } => {
                self.release(flick_velocity);
                Vec::new()
            }
            Command::SetAutopilot { enabled } => self.set_autopilot(enabled),
            Command::SetDebug { enabled } => {
                self.set_debug(enabled);
                Vec::new()
            }
            Command::SetPaused { paused } => {
                self.set_paused(paused);
                Vec::new()
            }
            Command::Reset => {
                self.reset();
                Vec::new()
            }
        }
    }

    /// Tap/click. Presses the actuator in manual mode; while autopilot is on,
    /// a tap hands control back to the player instead.
    pub fn manual_trigger(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.paused {
            return events;
        }
        if self.inspection.autopilot {
            return self.set_autopilot(false);
        }
        self.press_actuator(TriggerSource::Tap, &mut events);
        events
    }

    /// Finger down on the spring. Rejected unless the spring is idle.
    pub fn grab(&mut self, finger_y: f32) -> bool {
        if self.paused {
            return false;
        }
        self.spring.grab(finger_y)
    }

    pub fn drag(&mut self, finger_y: f32) -> bool {
        if self.paused {
            return false;
        }
        self.spring.drag(&self.config.spring, finger_y)
    }

    /// Finger up. A held band launches and the impulse is returned; a grab
    /// that never left the deadzone is cancelled as a tap; anything else is
    /// a no-op.
    pub fn release(&mut self, flick_velocity: f32) -> Option<f32> {
        if self.paused {
            return None;
        }
        if self.spring.phase() == SpringPhase::Arming {
            self.spring.cancel_arming(&self.config.spring);
            return None;
        }
        let impulse = self.spring.release(&self.config.spring, flick_velocity)?;
        log::debug!("Spring launched (impulse {:.1})", impulse);
        Some(impulse)
    }

    /// Switch autopilot. Turning it on restarts the missed counter.
    pub fn set_autopilot(&mut self, enabled: bool) -> Vec<SimEvent> {
        if self.inspection.autopilot == enabled {
            return Vec::new();
        }
        if enabled {
            self.score = self.score.apply(ScoreEvent::AutopilotEngaged);
        }
        self.inspection.autopilot = enabled;
        log::info!("Autopilot {}", if enabled { "on" } else { "off" });
        vec![SimEvent::AutopilotChanged { enabled }]
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Freeze or resume simulated time
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Start over: empty lane, fresh score, manual mode. Config, geometry,
    /// debug flag, and the RNG stream carry over.
    pub fn reset(&mut self) {
        log::info!("Simulation reset");
        self.spawner.reset();
        self.items.clear();
        self.inspection = InspectionController::default();
        self.actuator = Actuator::default();
        self.spring.reset(&self.config.spring);
        self.score = Score::default();
        self.speed = SpeedRamp::new(self.config.travel_speed, self.config.speed_ramp_up_ms);
        self.timers = TaskQueue::default();
        self.now_ms = 0.0;
        self.last_frame_ms = None;
        self.paused = false;
    }
}
