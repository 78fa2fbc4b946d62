//! Per-tick lane pass
//!
//! Moves every item, marks unprocessed items that slip past the line as
//! missed, and drops items that expire or leave the lane. The pass consumes
//! the previous collection and returns a new one, so removal and mutation
//! never share an iterator.

use serde::{Deserialize, Serialize};

use super::state::{Item, ItemId, ItemStatus, RemovalReason};

/// Inputs for one lane pass
#[derive(Debug, Clone, Copy)]
pub struct LanePass {
    pub now_ms: f64,
    /// Frame dt in seconds
    pub dt: f32,
    /// Current lane speed (pixels per second)
    pub speed: f32,
    /// False while a manual inspection halts the lane
    pub moving: bool,
    pub autopilot: bool,
    pub line_x: f32,
    pub offscreen_x: f32,
    pub drop_y: f32,
    pub lifetime_ms: f64,
    pub threat_speed_factor: f32,
    pub threat_fall_accel: f32,
}

/// Things the lane pass noticed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneEvent {
    /// Crossed the line unprocessed
    Missed { id: ItemId, malicious: bool },
    Removed { id: ItemId, reason: RemovalReason },
}

/// Advance all items by one tick
pub fn advance_lane(items: Vec<Item>, pass: &LanePass) -> (Vec<Item>, Vec<LaneEvent>) {
    let mut events = Vec::new();

    let items = items
        .into_iter()
        .filter_map(|item| {
            let item = if pass.moving {
                move_item(item, pass, &mut events)
            } else {
                item
            };
            match removal_reason(&item, pass) {
                Some(reason) => {
                    events.push(LaneEvent::Removed {
                        id: item.id,
                        reason,
                    });
                    None
                }
                None => Some(item),
            }
        })
        .collect();

    (items, events)
}

fn move_item(mut item: Item, pass: &LanePass, events: &mut Vec<LaneEvent>) -> Item {
    if item.status() == ItemStatus::Threat {
        // Ejected: slow slide while falling off the lane
        item.pos.x += pass.speed * pass.threat_speed_factor * pass.dt;
        item.fall_speed += pass.threat_fall_accel * pass.dt;
        item.pos.y += item.fall_speed * pass.dt;
        return item;
    }

    item.pos.x += pass.speed * pass.dt;

    if !pass.autopilot
        && item.status() == ItemStatus::Unprocessed
        && item.pos.x > pass.line_x
        && item.transition(ItemStatus::Missed)
    {
        events.push(LaneEvent::Missed {
            id: item.id,
            malicious: item.is_malicious(),
        });
    }
    item
}

/// Removal predicate, checked every tick regardless of movement
pub fn removal_reason(item: &Item, pass: &LanePass) -> Option<RemovalReason> {
    if item.age_ms(pass.now_ms) > pass.lifetime_ms {
        Some(RemovalReason::Expired)
    } else if item.pos.x > pass.offscreen_x {
        Some(RemovalReason::Offscreen)
    } else if item.status() == ItemStatus::Threat && item.pos.y > pass.drop_y {
        Some(RemovalReason::Dropped)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Classification;
    use glam::Vec2;

    fn pass() -> LanePass {
        LanePass {
            now_ms: 0.0,
            dt: 0.1,
            speed: 100.0,
            moving: true,
            autopilot: false,
            line_x: 448.0,
            offscreen_x: 996.0,
            drop_y: 650.0,
            lifetime_ms: 13_000.0,
            threat_speed_factor: 0.2,
            threat_fall_accel: 900.0,
        }
    }

    fn item(id: u32, x: f32, classification: Classification) -> Item {
        Item::new(ItemId(id), Vec2::new(x, 290.0), 48.0, classification, 0.0)
    }

    #[test]
    fn test_items_move_at_lane_speed() {
        let (items, events) = advance_lane(vec![item(1, 0.0, Classification::Safe)], &pass());
        assert!(events.is_empty());
        assert!((items[0].pos.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_halted_lane_does_not_move() {
        let halted = LanePass {
            moving: false,
            ..pass()
        };
        let (items, _) = advance_lane(vec![item(1, 445.0, Classification::Malicious)], &halted);
        assert_eq!(items[0].pos.x, 445.0);
        assert_eq!(items[0].status(), ItemStatus::Unprocessed);
    }

    #[test]
    fn test_crossing_unprocessed_is_missed() {
        let (items, events) = advance_lane(
            vec![
                item(1, 445.0, Classification::Malicious),
                item(2, 300.0, Classification::Safe),
            ],
            &pass(),
        );
        assert_eq!(items[0].status(), ItemStatus::Missed);
        assert_eq!(items[1].status(), ItemStatus::Unprocessed);
        assert_eq!(
            events,
            vec![LaneEvent::Missed {
                id: ItemId(1),
                malicious: true,
            }]
        );
    }

    #[test]
    fn test_autopilot_never_misses() {
        let autopilot = LanePass {
            autopilot: true,
            ..pass()
        };
        let (items, events) =
            advance_lane(vec![item(1, 445.0, Classification::Malicious)], &autopilot);
        assert_eq!(items[0].status(), ItemStatus::Unprocessed);
        assert!(events.is_empty());
    }

    #[test]
    fn test_inspecting_item_is_not_missed() {
        let mut inspecting = item(1, 445.0, Classification::Safe);
        inspecting.transition(ItemStatus::Inspecting);
        let autopilot = LanePass {
            autopilot: true,
            ..pass()
        };
        let (items, _) = advance_lane(vec![inspecting], &autopilot);
        assert_eq!(items[0].status(), ItemStatus::Inspecting);
        assert!(items[0].pos.x > 445.0);
    }

    #[test]
    fn test_threat_slides_slowly_and_falls() {
        let mut threat = item(1, 460.0, Classification::Malicious);
        threat.transition(ItemStatus::Inspecting);
        threat.transition(ItemStatus::Threat);
        let (items, _) = advance_lane(vec![threat], &pass());
        assert!((items[0].pos.x - 462.0).abs() < 1e-4);
        assert!(items[0].pos.y > 290.0);
    }

    #[test]
    fn test_removal_reasons() {
        let old = LanePass {
            now_ms: 13_001.0,
            ..pass()
        };
        let (items, events) = advance_lane(vec![item(1, 0.0, Classification::Safe)], &old);
        assert!(items.is_empty());
        assert_eq!(
            events,
            vec![LaneEvent::Removed {
                id: ItemId(1),
                reason: RemovalReason::Expired,
            }]
        );

        let mut gone = item(2, 1000.0, Classification::Safe);
        gone.transition(ItemStatus::Missed);
        let (items, _) = advance_lane(vec![gone], &pass());
        assert!(items.is_empty());

        let mut dropped = item(3, 500.0, Classification::Malicious);
        dropped.transition(ItemStatus::Inspecting);
        dropped.transition(ItemStatus::Threat);
        dropped.pos.y = 660.0;
        let halted = LanePass {
            moving: false,
            ..pass()
        };
        let (items, events) = advance_lane(vec![dropped], &halted);
        assert!(items.is_empty());
        assert_eq!(
            events,
            vec![LaneEvent::Removed {
                id: ItemId(3),
                reason: RemovalReason::Dropped,
            }]
        );
    }

    #[test]
    fn test_unflagged_items_ignore_drop_bound() {
        let mut low = item(1, 100.0, Classification::Safe);
        low.pos.y = 700.0;
        let (items, _) = advance_lane(vec![low], &pass());
        assert_eq!(items.len(), 1);
    }
}
