//! End-to-end lane scenarios against the public API

use belt_inspect::consts::LAUNCH_IMPULSE_FACTOR;
use belt_inspect::sim::{
    ActuatorPosition, Classification, Command, ItemId, ItemStatus, SimEvent, SpringPhase,
    TriggerSource,
};
use belt_inspect::{LaneGeometry, SimConfig, Simulation, SpringConfig};

const FRAME_MS: f64 = 10.0;

fn sim_with(config: SimConfig) -> Simulation {
    Simulation::new(config, LaneGeometry::default(), 2024).expect("valid config")
}

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

/// Step until the first item sits under the inspection line
fn first_item_at_line(sim: &mut Simulation) -> ItemId {
    let line = sim.geometry().inspection_line_x;
    run_until(sim, 10_000, |s| {
        s.items()
            .first()
            .is_some_and(|i| i.status() == ItemStatus::Unprocessed && i.overlaps(line))
    });
    sim.items()[0].id
}

#[test]
fn malicious_item_crossing_unprocessed_is_missed() {
    let mut sim = sim_with(SimConfig {
        malicious_probability: 1.0,
        ..Default::default()
    });
    let events = run_until(&mut sim, 10_000, |s| s.score().missed_count > 0);

    assert_eq!(sim.score().missed_count, 1);
    assert_eq!(
        sim.item(ItemId(1)).map(|i| i.status()),
        Some(ItemStatus::Missed)
    );
    assert!(events.contains(&SimEvent::Missed {
        id: ItemId(1),
        scored: true,
    }));
}

#[test]
fn safe_item_crossing_unprocessed_is_not_scored() {
    let mut sim = sim_with(SimConfig {
        malicious_probability: 0.0,
        ..Default::default()
    });
    run_until(&mut sim, 10_000, |s| {
        s.item(ItemId(1))
            .is_some_and(|i| i.status() == ItemStatus::Missed)
    });
    assert_eq!(sim.score().missed_count, 0);
}

#[test]
fn manual_trigger_reveals_classification_after_inspection() {
    let mut sim = sim_with(SimConfig::default());
    let id = first_item_at_line(&mut sim);

    sim.manual_trigger();
    let events = sim.step(FRAME_MS);
    assert!(events.contains(&SimEvent::InspectionStarted { id }));
    let started = sim.now_ms();

    run_until(&mut sim, 100, |s| s.now_ms() >= started + 340.0);
    assert_eq!(
        sim.item(id).map(|i| i.status()),
        Some(ItemStatus::Inspecting)
    );
    assert_eq!(sim.score().inspected(), 0);

    run_until(&mut sim, 100, |s| s.now_ms() >= started + 360.0);
    let item = sim.item(id).expect("still on the lane");
    match item.classification() {
        Classification::Malicious => {
            assert_eq!(item.status(), ItemStatus::Threat);
            assert_eq!(sim.score().caught_count, 1);
            assert_eq!(sim.score().safe_count, 0);
        }
        Classification::Safe => {
            assert_eq!(item.status(), ItemStatus::Safe);
            assert_eq!(sim.score().safe_count, 1);
            assert_eq!(sim.score().caught_count, 0);
        }
    }
    assert_eq!(item.revealed_classification(), Some(item.classification()));
    assert_eq!(sim.actuator().position, ActuatorPosition::Up);
}

#[test]
fn enabling_autopilot_resets_missed_and_stops_counting() {
    let mut sim = sim_with(SimConfig {
        malicious_probability: 1.0,
        ..Default::default()
    });
    run_until(&mut sim, 20_000, |s| s.score().missed_count >= 3);
    assert_eq!(sim.score().missed_count, 3);

    let events = sim.set_autopilot(true);
    assert_eq!(events, vec![SimEvent::AutopilotChanged { enabled: true }]);
    assert_eq!(sim.score().missed_count, 0);

    for _ in 0..3_000 {
        sim.step(FRAME_MS);
        assert_eq!(sim.score().missed_count, 0);
    }
    assert!(sim.score().caught_count > 0);
}

#[test]
fn launch_impulse_uses_saturated_stretch() {
    let mut sim = Simulation::with_defaults(5);
    let spring = sim.config().spring;
    let rest = spring.rest_y;

    assert!(sim.grab(rest));
    assert!(sim.drag(rest + spring.max_pull_distance));
    for _ in 0..200 {
        sim.step(FRAME_MS);
    }
    assert_eq!(sim.spring().phase(), SpringPhase::Held);

    let stretch = sim.spring().y - rest;
    // The band settles at the eased pull, well short of the raw pull
    assert!(stretch > 0.0);
    assert!(stretch < spring.max_pull_distance * 0.9);

    let impulse = sim.release(0.0).expect("held band launches");
    assert_eq!(
        impulse,
        stretch.max(0.0).min(spring.max_pull_distance) * LAUNCH_IMPULSE_FACTOR
    );
    assert_eq!(sim.spring().phase(), SpringPhase::Launched);
    // Releasing again does nothing
    assert_eq!(sim.release(0.0), None);
}

#[test]
fn manual_inspection_eases_lane_to_a_stop() {
    let mut sim = sim_with(SimConfig::default());
    first_item_at_line(&mut sim);
    let full_speed = sim.speed();
    assert!((full_speed - sim.config().travel_speed).abs() < 1e-3);

    sim.manual_trigger();
    sim.step(FRAME_MS);
    assert!(sim.is_inspecting());

    let mut samples = vec![sim.speed()];
    for _ in 0..3 {
        sim.step(FRAME_MS);
        samples.push(sim.speed());
    }
    // No instantaneous drop
    assert!(samples[0] > 0.5 * full_speed);
    for pair in samples.windows(2) {
        assert!(pair[1] < pair[0], "speed not decreasing: {samples:?}");
    }

    // Fully stopped once the ramp completes, then resumes after the inspection
    run_until(&mut sim, 20, |s| s.speed() == 0.0);
    run_until(&mut sim, 100, |s| !s.is_inspecting());
    run_until(&mut sim, 100, |s| s.speed() >= full_speed - 1e-3);
}

#[test]
fn spring_launch_past_belt_presses_actuator() {
    let mut sim = sim_with(SimConfig {
        spring: SpringConfig {
            belt_y: 590.0,
            ..Default::default()
        },
        ..Default::default()
    });
    let rest = sim.config().spring.rest_y;

    sim.apply(Command::Grab { finger_y: rest });
    sim.apply(Command::Drag {
        finger_y: rest + 160.0,
    });
    for _ in 0..100 {
        sim.step(FRAME_MS);
    }
    sim.apply(Command::Release {
        flick_velocity: 0.0,
    });

    let events = run_until(&mut sim, 500, |s| s.spring().phase() == SpringPhase::Idle);
    assert!(events.contains(&SimEvent::SpringHitBelt));
    assert!(events.contains(&SimEvent::ActuatorPressed {
        source: TriggerSource::Spring
    }));
    assert!(events.contains(&SimEvent::SpringLanded));
    assert_eq!(sim.spring().y, rest);
}

#[test]
fn grab_while_flying_is_rejected() {
    let mut sim = Simulation::with_defaults(5);
    let rest = sim.config().spring.rest_y;
    sim.grab(rest);
    sim.drag(rest + 100.0);
    sim.step(FRAME_MS);
    sim.release(0.0);
    assert_eq!(sim.spring().phase(), SpringPhase::Launched);
    assert!(!sim.grab(rest));
    assert!(!sim.drag(rest + 50.0));
}

#[test]
fn config_from_json_drives_the_lane() {
    let config = SimConfig::from_json(r#"{ "travel_speed": 240.0, "malicious_probability": 0.0 }"#)
        .expect("valid config");
    let mut sim = sim_with(config);
    first_item_at_line(&mut sim);
    // Twice the default speed reaches the line in well under the default time
    assert!(sim.now_ms() < 5_000.0);

    assert!(SimConfig::from_json(r#"{ "travel_speed": -1.0 }"#).is_err());
}

#[test]
fn snapshot_json_is_stable_for_the_shell() {
    let mut sim = Simulation::with_defaults(42);
    sim.set_autopilot(true);
    for _ in 0..500 {
        sim.step(FRAME_MS);
    }
    let json = sim.snapshot().to_json().expect("serializes");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["autopilot"], serde_json::Value::Bool(true));
    assert!(value["items"].is_array());
    assert!(value["score"]["missed_count"].is_number());
    assert_eq!(value["inspection_line_x"], serde_json::json!(448.0));
}
