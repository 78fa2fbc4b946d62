//! Browser bindings
//!
//! The page owns the canvas, the animation loop, and pointer handling. It
//! forwards timestamps and gestures here and draws from the snapshot JSON.

use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::settings::{LayoutPreset, Settings};
use crate::sim::{Command, SimEvent, Simulation};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Belt Inspect core loaded");
}

fn events_json(events: &[SimEvent]) -> String {
    serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string())
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS handle to one running simulation
#[wasm_bindgen]
pub struct WebSimulation {
    sim: Simulation,
    settings: Settings,
}

impl WebSimulation {
    fn build(config: SimConfig, settings: Settings) -> Result<WebSimulation, JsValue> {
        let seed = super::clock_seed();
        let mut sim = Simulation::new(config, settings.geometry(), seed).map_err(js_error)?;
        sim.set_debug(settings.debug);
        log::info!("Simulation initialized with seed: {}", seed);
        Ok(WebSimulation { sim, settings })
    }
}

#[wasm_bindgen]
impl WebSimulation {
    /// Default tunables, layout from saved settings, seeded from the clock
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebSimulation, JsValue> {
        Self::build(SimConfig::default(), Settings::load())
    }

    /// Tunables from a (possibly partial) JSON object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str, layout: &str) -> Result<WebSimulation, JsValue> {
        let config = SimConfig::from_json(config_json).map_err(js_error)?;
        let layout = LayoutPreset::from_name(layout).unwrap_or_default();
        Self::build(config, Settings::from_preset(layout))
    }

    /// Advance to a `requestAnimationFrame` timestamp; returns events JSON
    pub fn tick(&mut self, timestamp_ms: f64) -> String {
        events_json(&self.sim.tick(timestamp_ms))
    }

    /// Apply a JSON command (`{"command": "grab", "finger_y": 612}`)
    pub fn command(&mut self, command_json: &str) -> Result<String, JsValue> {
        let command: Command = serde_json::from_str(command_json).map_err(js_error)?;
        Ok(events_json(&self.sim.apply(command)))
    }

    #[wasm_bindgen(js_name = manualTrigger)]
    pub fn manual_trigger(&mut self) -> String {
        events_json(&self.sim.manual_trigger())
    }

    pub fn grab(&mut self, finger_y: f32) -> bool {
        self.sim.grab(finger_y)
    }

    pub fn drag(&mut self, finger_y: f32) -> bool {
        self.sim.drag(finger_y)
    }

    /// Returns the launch impulse, or undefined if nothing launched
    pub fn release(&mut self, flick_velocity: f32) -> Option<f32> {
        self.sim.release(flick_velocity)
    }

    #[wasm_bindgen(js_name = setAutopilot)]
    pub fn set_autopilot(&mut self, enabled: bool) -> String {
        events_json(&self.sim.set_autopilot(enabled))
    }

    #[wasm_bindgen(js_name = setDebug)]
    pub fn set_debug(&mut self, enabled: bool) {
        self.sim.set_debug(enabled);
        self.settings.debug = enabled;
        self.settings.save();
    }

    /// Visibility/focus changes pause simulated time
    #[wasm_bindgen(js_name = setPaused)]
    pub fn set_paused(&mut self, paused: bool) {
        self.sim.set_paused(paused);
    }

    pub fn reset(&mut self) {
        self.sim.reset();
    }

    /// Current snapshot as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.sim.snapshot().to_json().map_err(js_error)
    }

    /// Whether the debug toggle is still hidden from the player
    #[wasm_bindgen(js_name = debugHidden)]
    pub fn debug_hidden(&self) -> bool {
        self.settings.debug_hidden
    }

    /// Unlock (or re-hide) the debug toggle; persisted with the settings
    #[wasm_bindgen(js_name = setDebugHidden)]
    pub fn set_debug_hidden(&mut self, hidden: bool) {
        self.settings.debug_hidden = hidden;
        self.settings.save();
    }

    pub fn layout(&self) -> String {
        self.settings.layout.as_str().to_string()
    }
}
