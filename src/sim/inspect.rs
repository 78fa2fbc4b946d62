//! Inspection controller
//!
//! Two front-ends feed one pipeline: the manual "actuator is down" signal
//! (tap or spring), and autopilot, which predicts when the nearest item will
//! reach the line and schedules a press just ahead of it. Only one inspection
//! runs at a time across the whole lane.

use serde::{Deserialize, Serialize};

use super::score::ScoreEvent;
use super::state::{Classification, Item, ItemId, ItemStatus, SimEvent, Simulation, TriggerSource};
use super::timers::Task;

/// The inspection currently holding the lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveInspection {
    pub item_id: ItemId,
    pub started_ms: f64,
}

/// Inspection mutex and autopilot mode
#[derive(Debug, Clone, Default)]
pub struct InspectionController {
    pub(crate) active: Option<ActiveInspection>,
    pub(crate) autopilot: bool,
    /// Target of the duck autopilot has already scheduled
    pub(crate) pending_duck: Option<ItemId>,
}

impl InspectionController {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveInspection> {
        self.active.as_ref()
    }
}

/// Nearest unprocessed item whose center is within `window` of the line
pub fn autopilot_target(items: &[Item], line_x: f32, window: f32) -> Option<&Item> {
    items
        .iter()
        .filter(|item| item.status() == ItemStatus::Unprocessed)
        .map(|item| (item, (item.center_x() - line_x).abs()))
        .filter(|(_, distance)| *distance <= window)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(item, _)| item)
}

/// Delay before autopilot should press for an item centered at `center_x`.
///
/// Constant-velocity extrapolation of the time until the center reaches the
/// line, minus the lead. Items already past the line fire immediately. None
/// when the lane is not moving.
pub fn predict_duck_delay(center_x: f32, line_x: f32, speed: f32, lead_ms: f64) -> Option<f64> {
    if speed <= f32::EPSILON {
        return None;
    }
    let distance = (line_x - center_x).max(0.0);
    let arrival_ms = (distance / speed) as f64 * 1000.0;
    Some((arrival_ms - lead_ms).max(0.0))
}

impl Simulation {
    /// Replace the collection with one where `id` has been updated by `f`.
    /// Returns whatever `f` returned, or false if the item is gone.
    fn update_item(&mut self, id: ItemId, mut f: impl FnMut(&mut Item) -> bool) -> bool {
        let mut applied = false;
        self.items = std::mem::take(&mut self.items)
            .into_iter()
            .map(|mut item| {
                if item.id == id {
                    applied = f(&mut item);
                }
                item
            })
            .collect();
        applied
    }

    /// Push the actuator down and schedule its auto-return
    pub(crate) fn press_actuator(&mut self, source: TriggerSource, events: &mut Vec<SimEvent>) -> bool {
        let Some(press_seq) = self.actuator.press(source) else {
            return false;
        };
        self.timers.schedule(
            self.now_ms,
            self.config.actuator_return_ms,
            Task::ActuatorReturn { press_seq },
        );
        log::debug!("Actuator down ({:?})", source);
        events.push(SimEvent::ActuatorPressed { source });
        true
    }

    pub(crate) fn raise_actuator(&mut self, events: &mut Vec<SimEvent>) {
        if self.actuator.raise() {
            events.push(SimEvent::ActuatorRaised);
        }
    }

    /// Autopilot: find the nearest approaching item and schedule a press
    /// slightly before it arrives
    pub(crate) fn scan_autopilot(&mut self) {
        if !self.inspection.autopilot
            || self.inspection.is_active()
            || !self.actuator.is_up()
            || self.inspection.pending_duck.is_some()
        {
            return;
        }

        let line_x = self.geometry.inspection_line_x;
        let Some(target) =
            autopilot_target(&self.items, line_x, self.config.autopilot_proximity_window)
        else {
            return;
        };
        let Some(delay_ms) = predict_duck_delay(
            target.center_x(),
            line_x,
            self.speed.current(),
            self.config.autopilot_lead_ms,
        ) else {
            return;
        };

        let target = target.id;
        log::debug!("Autopilot duck for {:?} in {:.1}ms", target, delay_ms);
        self.timers
            .schedule(self.now_ms, delay_ms, Task::AutopilotDuck { target });
        self.inspection.pending_duck = Some(target);
    }

    /// Deferred autopilot press. Stale if autopilot was switched off, an
    /// inspection already started, or the actuator is not up.
    pub(crate) fn fire_autopilot_duck(&mut self, target: ItemId, events: &mut Vec<SimEvent>) {
        if self.inspection.pending_duck == Some(target) {
            self.inspection.pending_duck = None;
        }
        if !self.inspection.autopilot || self.inspection.is_active() || !self.actuator.is_up() {
            log::debug!("Dropped stale autopilot duck for {:?}", target);
            return;
        }
        self.press_actuator(TriggerSource::Autopilot, events);
    }

    /// Deferred auto-return of a press
    pub(crate) fn fire_actuator_return(&mut self, press_seq: u32, events: &mut Vec<SimEvent>) {
        if self.actuator.press_seq() != press_seq || self.inspection.is_active() {
            return;
        }
        self.raise_actuator(events);
    }

    /// While the actuator is down and nothing is being inspected, inspect the
    /// first unprocessed item under the line
    pub(crate) fn check_manual_inspection(&mut self, events: &mut Vec<SimEvent>) {
        if self.actuator.is_up() || self.inspection.is_active() {
            return;
        }
        let line_x = self.geometry.inspection_line_x;
        let candidate = self
            .items
            .iter()
            .find(|item| item.status() == ItemStatus::Unprocessed && item.overlaps(line_x))
            .map(|item| item.id);

        if let Some(id) = candidate {
            self.start_inspection(id, events);
        }
    }

    /// Flip `id` to inspecting and start the inspection timer. Rejected while
    /// another inspection holds the lane.
    pub(crate) fn start_inspection(&mut self, id: ItemId, events: &mut Vec<SimEvent>) -> bool {
        if self.inspection.is_active() {
            return false;
        }
        let now_ms = self.now_ms;
        let started = self.update_item(id, |item| {
            if item.transition(ItemStatus::Inspecting) {
                item.inspection_started_at_ms = Some(now_ms);
                true
            } else {
                false
            }
        });
        if !started {
            return false;
        }

        self.inspection.active = Some(ActiveInspection {
            item_id: id,
            started_ms: now_ms,
        });
        self.timers.schedule(
            now_ms,
            self.config.inspection_duration_ms,
            Task::FinishInspection { item_id: id },
        );
        log::debug!("Inspecting {:?}", id);
        events.push(SimEvent::InspectionStarted { id });
        true
    }

    /// Inspection timer ran out: reveal, score, release the lane
    pub(crate) fn finish_inspection(&mut self, item_id: ItemId, events: &mut Vec<SimEvent>) {
        if self.inspection.active.map(|a| a.item_id) != Some(item_id) {
            return;
        }
        self.inspection.active = None;

        let classification = self.item(item_id).map(Item::classification);
        match classification {
            None => {
                log::debug!("Inspected item {:?} left the lane, aborting", item_id);
                events.push(SimEvent::InspectionAborted { id: item_id });
            }
            Some(Classification::Malicious) => {
                self.update_item(item_id, |item| item.transition(ItemStatus::Threat));
                self.score = self.score.apply(ScoreEvent::Caught);
                log::debug!("Threat caught: {:?}", item_id);
                events.push(SimEvent::ThreatCaught { id: item_id });
            }
            Some(Classification::Safe) => {
                self.update_item(item_id, |item| item.transition(ItemStatus::Safe));
                self.score = self.score.apply(ScoreEvent::Cleared);
                log::debug!("Cleared: {:?}", item_id);
                events.push(SimEvent::Cleared { id: item_id });
            }
        }

        self.raise_actuator(events);
    }
}
