//! Presentation-layer settings
//!
//! Selects lane geometry for the input layout and carries the debug overlay
//! flag. Never touches gameplay timing or probabilities. Persisted separately
//! from gameplay config in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::config::{non_negative, positive};
use crate::consts::*;
use crate::error::ConfigError;

/// Input layout presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutPreset {
    /// Mouse/trackpad on a wide lane
    #[default]
    Pointer,
    /// Phone-width lane with the draggable spring actuator
    Touch,
}

impl LayoutPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPreset::Pointer => "Pointer",
            LayoutPreset::Touch => "Touch",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pointer" | "mouse" | "desktop" => Some(LayoutPreset::Pointer),
            "touch" | "mobile" => Some(LayoutPreset::Touch),
            _ => None,
        }
    }

    /// Lane geometry for this layout
    pub fn geometry(&self) -> LaneGeometry {
        match self {
            LayoutPreset::Pointer => LaneGeometry::default(),
            LayoutPreset::Touch => LaneGeometry {
                lane_width: 390.0,
                inspection_line_x: 195.0,
                item_width: 40.0,
                ..LaneGeometry::default()
            },
        }
    }
}

/// Fixed lane geometry (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneGeometry {
    /// Visible lane width
    pub lane_width: f32,
    /// Horizontal position where items are inspected
    pub inspection_line_x: f32,
    /// Where new items appear (left of the visible area)
    pub spawn_x: f32,
    /// Vertical position of the lane
    pub lane_y: f32,
    pub item_width: f32,
    /// Items are removed once past `lane_width + offscreen_margin`
    pub offscreen_margin: f32,
    /// Flagged threats are removed once they fall past this y
    pub drop_y: f32,
}

impl Default for LaneGeometry {
    fn default() -> Self {
        Self {
            lane_width: LANE_WIDTH,
            inspection_line_x: LANE_WIDTH / 2.0,
            spawn_x: SPAWN_X,
            lane_y: LANE_Y,
            item_width: ITEM_WIDTH,
            offscreen_margin: OFFSCREEN_MARGIN,
            drop_y: DROP_Y,
        }
    }
}

impl LaneGeometry {
    /// Right-hand removal bound
    #[inline]
    pub fn offscreen_x(&self) -> f32 {
        self.lane_width + self.offscreen_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("geometry.lane_width", self.lane_width)?;
        positive("geometry.item_width", self.item_width)?;
        non_negative("geometry.offscreen_margin", self.offscreen_margin)?;
        if !(0.0..=self.lane_width).contains(&self.inspection_line_x) {
            return Err(ConfigError::LineOffLane {
                line_x: self.inspection_line_x,
                lane_width: self.lane_width,
            });
        }
        if !(self.drop_y.is_finite() && self.lane_y.is_finite() && self.drop_y > self.lane_y) {
            return Err(ConfigError::NonPositive {
                name: "geometry.drop_y - geometry.lane_y",
                value: self.drop_y - self.lane_y,
            });
        }
        Ok(())
    }
}

/// Presentation preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Input layout (selects geometry)
    pub layout: LayoutPreset,
    /// Collision debug overlay
    pub debug: bool,
    /// Debug toggle button is hidden until unlocked
    pub debug_hidden: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: LayoutPreset::default(),
            debug: false,
            debug_hidden: true,
        }
    }
}

impl Settings {
    /// Create settings for a layout preset
    pub fn from_preset(layout: LayoutPreset) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Geometry selected by the current layout
    pub fn geometry(&self) -> LaneGeometry {
        self.layout.geometry()
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "belt_inspect_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
