//! Belt Inspect entry point
//!
//! On the web the page drives `platform::web::WebSimulation` and this binary
//! is unused. Natively it runs a headless autopilot session and prints the
//! final snapshot.
//!
//! Usage: `belt-inspect [config.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use belt_inspect::platform::clock_seed;
    use belt_inspect::sim::SimEvent;
    use belt_inspect::{LaneGeometry, SimConfig, Simulation};

    env_logger::init();
    log::info!("Belt Inspect (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading config from {}", path);
            SimConfig::from_json(&std::fs::read_to_string(&path)?)?
        }
        None => SimConfig::default(),
    };
    let seconds: u32 = match args.next() {
        Some(s) => s.parse()?,
        None => 30,
    };

    let seed = clock_seed();
    let mut sim = Simulation::new(config, LaneGeometry::default(), seed)?;
    sim.set_autopilot(true);

    const FRAME_MS: f64 = 1000.0 / 60.0;
    let mut inspected = 0u32;
    for frame in 0..(seconds * 60) {
        for event in sim.tick(frame as f64 * FRAME_MS) {
            if matches!(event, SimEvent::Cleared { .. } | SimEvent::ThreatCaught { .. }) {
                inspected += 1;
            }
        }
    }

    let score = sim.score();
    log::info!(
        "Ran {}s: {} inspected ({} safe, {} caught), {} missed",
        seconds,
        inspected,
        score.safe_count,
        score.caught_count,
        score.missed_count
    );
    println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
