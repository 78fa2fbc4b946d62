//! Simulation clock
//!
//! One logical tick per animation frame. Order within a tick is fixed:
//! spring physics, due deferred tasks, spawn, lane pass, autopilot scan,
//! manual inspection check, then the speed ramp. The spring runs first so a
//! belt hit takes precedence over an autopilot duck due in the same tick.

use super::lifecycle::{LaneEvent, LanePass, advance_lane};
use super::score::ScoreEvent;
use super::state::{SimEvent, Simulation, TriggerSource};
use super::timers::Task;

impl Simulation {
    /// Advance to frame `timestamp_ms` (any monotonic clock). The first call
    /// only records the timestamp. While paused the timestamp is recorded but
    /// simulated time stands still.
    pub fn tick(&mut self, timestamp_ms: f64) -> Vec<SimEvent> {
        let dt_ms = self
            .last_frame_ms
            .map_or(0.0, |last| timestamp_ms - last);
        self.last_frame_ms = Some(timestamp_ms);
        self.step(dt_ms)
    }

    /// Advance simulated time by `dt_ms` (clamped to `[0, max_frame_dt_ms]`)
    pub fn step(&mut self, dt_ms: f64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.paused {
            return events;
        }

        let dt_ms = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, self.config.max_frame_dt_ms)
        } else {
            0.0
        };
        self.now_ms += dt_ms;
        let dt = (dt_ms / 1000.0) as f32;

        // Spring physics
        let outcome = self.spring.advance(&self.config.spring, dt);
        if outcome.hit_belt {
            log::debug!("Spring hit the belt");
            events.push(SimEvent::SpringHitBelt);
            self.press_actuator(TriggerSource::Spring, &mut events);
        }
        if outcome.landed {
            events.push(SimEvent::SpringLanded);
        }

        // Deferred tasks
        for task in self.timers.take_due(self.now_ms) {
            match task {
                Task::FinishInspection { item_id } => self.finish_inspection(item_id, &mut events),
                Task::AutopilotDuck { target } => self.fire_autopilot_duck(target, &mut events),
                Task::ActuatorReturn { press_seq } => {
                    self.fire_actuator_return(press_seq, &mut events)
                }
            }
        }

        // Spawn
        let lane_tail_x = self.items.last().map(|item| item.pos.x);
        if let Some(item) = self.spawner.tick(self.now_ms, lane_tail_x) {
            log::debug!("Spawned {:?}", item.id);
            events.push(SimEvent::Spawned { id: item.id });
            self.items.push(item);
        }

        // Lane pass
        let autopilot = self.inspection.autopilot;
        let pass = LanePass {
            now_ms: self.now_ms,
            dt,
            speed: self.speed.current(),
            moving: autopilot || !self.inspection.is_active(),
            autopilot,
            line_x: self.geometry.inspection_line_x,
            offscreen_x: self.geometry.offscreen_x(),
            drop_y: self.geometry.drop_y,
            lifetime_ms: self.config.item_lifetime_ms,
            threat_speed_factor: self.config.threat_speed_factor,
            threat_fall_accel: self.config.threat_fall_accel,
        };
        let (items, lane_events) = advance_lane(std::mem::take(&mut self.items), &pass);
        self.items = items;
        for event in lane_events {
            match event {
                LaneEvent::Missed { id, malicious } => {
                    if malicious {
                        self.score = self.score.apply(ScoreEvent::Missed);
                    }
                    log::debug!("Missed {:?} (malicious: {})", id, malicious);
                    events.push(SimEvent::Missed {
                        id,
                        scored: malicious,
                    });
                }
                LaneEvent::Removed { id, reason } => {
                    events.push(SimEvent::Removed { id, reason });
                }
            }
        }

        self.scan_autopilot();
        self.check_manual_inspection(&mut events);
        self.update_speed(dt_ms);

        events
    }

    /// Ease toward full speed, or toward a stop while a manual inspection
    /// holds the lane
    fn update_speed(&mut self, dt_ms: f64) {
        let halted = self.inspection.is_active() && !self.inspection.autopilot;
        let (target, duration_ms) = if halted {
            (0.0, self.config.speed_ramp_down_ms)
        } else {
            (self.config.travel_speed, self.config.speed_ramp_up_ms)
        };
        self.speed.retarget(target, duration_ms);
        self.speed.advance(dt_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::settings::LaneGeometry;
    use crate::sim::state::{ActuatorPosition, ItemId, ItemStatus};
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn sim_with(config: SimConfig) -> Simulation {
        Simulation::new(config, LaneGeometry::default(), 12345).expect("valid config")
    }

    fn positions(sim: &Simulation) -> Vec<(ItemId, f32)> {
        sim.items().iter().map(|i| (i.id, i.pos.x)).collect()
    }

    /// Step until `pred` holds, returning every event along the way
    fn run_until(
        sim: &mut Simulation,
        max_frames: usize,
        mut pred: impl FnMut(&Simulation) -> bool,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..max_frames {
            events.extend(sim.step(FRAME_MS));
            if pred(sim) {
                return events;
            }
        }
        panic!("condition not reached in {max_frames} frames");
    }

    #[test]
    fn test_first_tick_only_records_timestamp() {
        let mut sim = Simulation::with_defaults(1);
        sim.tick(5_000.0);
        assert_eq!(sim.now_ms(), 0.0);
        sim.tick(5_016.0);
        assert_eq!(sim.now_ms(), 16.0);
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        let mut sim = Simulation::with_defaults(1);
        sim.tick(0.0);
        sim.tick(10_000.0);
        assert_eq!(sim.now_ms(), 100.0);
        // Clock going backwards is treated as no time passing
        sim.tick(9_000.0);
        assert_eq!(sim.now_ms(), 100.0);
    }

    #[test]
    fn test_lane_spawns_and_moves() {
        let mut sim = Simulation::with_defaults(7);
        let events = sim.step(FRAME_MS);
        assert!(events.contains(&SimEvent::Spawned { id: ItemId(1) }));
        let start = sim.items()[0].pos.x;
        for _ in 0..30 {
            sim.step(FRAME_MS);
        }
        assert!(sim.items()[0].pos.x > start);
        assert!(sim.speed() > 0.0);
    }

    #[test]
    fn test_tap_inspects_overlapping_item() {
        let mut sim = sim_with(SimConfig {
            malicious_probability: 0.0,
            ..Default::default()
        });
        let line = sim.geometry().inspection_line_x;
        run_until(&mut sim, 2000, |s| s.items().first().is_some_and(|i| i.overlaps(line)));

        let events = sim.manual_trigger();
        assert!(events.contains(&SimEvent::ActuatorPressed {
            source: TriggerSource::Tap
        }));
        let events = sim.step(FRAME_MS);
        assert!(events.contains(&SimEvent::InspectionStarted { id: ItemId(1) }));
        assert!(sim.is_inspecting());

        run_until(&mut sim, 100, |s| !s.is_inspecting());
        assert_eq!(sim.item(ItemId(1)).map(|i| i.status()), Some(ItemStatus::Safe));
        assert_eq!(sim.score().safe_count, 1);
        assert_eq!(sim.actuator().position, ActuatorPosition::Up);
    }

    #[test]
    fn test_tap_on_empty_line_returns_after_delay() {
        let mut sim = Simulation::with_defaults(3);
        sim.step(FRAME_MS);
        sim.manual_trigger();
        assert_eq!(sim.actuator().position, ActuatorPosition::Down);
        // Second tap while down is ignored
        assert!(sim.manual_trigger().is_empty());
        let events = run_until(&mut sim, 30, |s| s.actuator().is_up());
        assert!(events.contains(&SimEvent::ActuatorRaised));
        assert!(!sim.is_inspecting());
    }

    #[test]
    fn test_manual_inspection_halts_lane() {
        let mut sim = Simulation::with_defaults(5);
        let line = sim.geometry().inspection_line_x;
        run_until(&mut sim, 2000, |s| s.items().first().is_some_and(|i| i.overlaps(line)));
        sim.manual_trigger();
        sim.step(FRAME_MS);
        assert!(sim.is_inspecting());

        let frozen = positions(&sim);
        sim.step(FRAME_MS);
        for (id, x) in frozen {
            assert_eq!(sim.item(id).map(|i| i.pos.x), Some(x));
        }
    }

    #[test]
    fn test_autopilot_inspects_without_misses() {
        let mut sim = sim_with(SimConfig {
            malicious_probability: 1.0,
            ..Default::default()
        });
        sim.set_autopilot(true);
        let mut started = 0;
        for _ in 0..(60 * 20) {
            for event in sim.step(FRAME_MS) {
                if matches!(event, SimEvent::InspectionStarted { .. }) {
                    started += 1;
                }
            }
        }
        assert!(started > 0);
        assert_eq!(sim.score().missed_count, 0);
        assert!(sim.score().caught_count > 0);
        assert!(sim
            .items()
            .iter()
            .all(|i| i.status() != ItemStatus::Missed));
    }

    #[test]
    fn test_autopilot_lane_keeps_moving_during_inspection() {
        let mut sim = Simulation::with_defaults(9);
        sim.set_autopilot(true);
        run_until(&mut sim, 2000, |s| s.is_inspecting());
        let before = positions(&sim);
        sim.step(FRAME_MS);
        for (id, x) in before {
            let now = sim.item(id).expect("still on the lane").pos.x;
            assert!(now > x);
        }
    }

    #[test]
    fn test_stale_duck_after_autopilot_off_is_noop() {
        let mut sim = Simulation::with_defaults(11);
        sim.set_autopilot(true);
        run_until(&mut sim, 2000, |s| s.inspection.pending_duck.is_some());
        sim.set_autopilot(false);
        let events = run_until(&mut sim, 200, |s| s.inspection.pending_duck.is_none());
        assert!(!events.contains(&SimEvent::ActuatorPressed {
            source: TriggerSource::Autopilot
        }));
        assert!(sim.actuator().is_up());
    }

    #[test]
    fn test_removed_item_aborts_inspection() {
        let mut sim = sim_with(SimConfig {
            inspection_duration_ms: 5_000.0,
            item_lifetime_ms: 4_500.0,
            ..Default::default()
        });
        let line = sim.geometry().inspection_line_x;
        run_until(&mut sim, 2000, |s| s.items().first().is_some_and(|i| i.overlaps(line)));
        sim.manual_trigger();
        sim.step(FRAME_MS);
        let id = sim.inspection.active.map(|a| a.item_id).expect("inspection started");

        let events = run_until(&mut sim, 2000, |s| !s.is_inspecting());
        assert!(events.contains(&SimEvent::InspectionAborted { id }));
        assert_eq!(sim.score().inspected(), 0);
        assert!(sim.actuator().is_up());
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut sim = Simulation::with_defaults(2);
        sim.tick(0.0);
        sim.tick(16.0);
        sim.set_paused(true);
        sim.tick(5_000.0);
        assert_eq!(sim.now_ms(), 16.0);
        sim.set_paused(false);
        sim.tick(5_016.0);
        assert_eq!(sim.now_ms(), 32.0);
    }

    #[test]
    fn test_determinism() {
        // Two simulations with the same seed and inputs stay identical
        let mut sim1 = Simulation::with_defaults(99999);
        let mut sim2 = Simulation::with_defaults(99999);
        for frame in 0..600 {
            if frame == 200 {
                sim1.manual_trigger();
                sim2.manual_trigger();
            }
            assert_eq!(sim1.step(FRAME_MS), sim2.step(FRAME_MS));
        }
        assert_eq!(sim1.snapshot(), sim2.snapshot());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_lane_invariants_hold(
            seed in any::<u64>(),
            taps in proptest::collection::vec(0usize..1800, 0..40),
            autopilot_at in proptest::option::of(0usize..1800),
        ) {
            let mut sim = Simulation::with_defaults(seed);
            let mut history: std::collections::HashMap<ItemId, ItemStatus> =
                std::collections::HashMap::new();

            for frame in 0..1800 {
                if taps.contains(&frame) {
                    sim.manual_trigger();
                }
                if autopilot_at == Some(frame) {
                    sim.set_autopilot(true);
                }
                sim.step(FRAME_MS);

                let inspecting = sim
                    .items()
                    .iter()
                    .filter(|i| i.status() == ItemStatus::Inspecting)
                    .count();
                prop_assert!(inspecting <= 1);
                if inspecting == 1 {
                    prop_assert!(sim.is_inspecting());
                }

                for item in sim.items() {
                    let previous = history.insert(item.id, item.status());
                    match previous {
                        Some(prev) if prev != item.status() => {
                            prop_assert!(prev.can_transition_to(item.status()));
                        }
                        None => prop_assert_eq!(item.status(), ItemStatus::Unprocessed),
                        _ => {}
                    }
                }
            }
        }
    }
}
