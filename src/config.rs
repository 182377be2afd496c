// src/config.rs

//! Defines the configuration for the popup.
//!
//! Everything is compiled in: edit the `Default` impls below and rebuild to
//! change how the popup looks or behaves.

use crate::geometry::{Corner, Point};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// X pointer button numbers (`Button1` .. `Button5`).
pub const BUTTON_LEFT: u32 = 1;
pub const BUTTON_RIGHT: u32 = 3;

/// Process-wide configuration. Always the compiled-in defaults.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Size, font and colors of the popup.
    pub appearance: AppearanceConfig,
    /// Where the popup goes when not centered.
    pub placement: PlacementConfig,
    /// Timer and pointer bindings.
    pub behavior: BehaviorConfig,
}

// --- Appearance Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Popup width in pixels, excluding the border.
    pub width: u32,
    /// Space between the border and the text on every side.
    pub padding: u32,
    /// Vertical gap between two lines of text.
    pub line_spacing: u32,
    /// Window border width in pixels.
    pub border_size: u32,
    /// Fontconfig pattern handed to Xft (e.g. "monospace:size=10").
    pub font: String,
    pub colors: ColorConfig,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            width: 450,
            padding: 15,
            line_spacing: 5,
            border_size: 2,
            font: "monospace:size=10".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

/// Colors as X color names or `#rrggbb` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub background: String,
    pub border: String,
    pub font: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            background: "#3b4252".to_string(),
            border: "#ececec".to_string(),
            font: "#ececec".to_string(),
        }
    }
}

// --- Placement Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Horizontal distance from the anchoring corner.
    pub pos_x: i32,
    /// Vertical distance from the anchoring corner.
    pub pos_y: i32,
    pub corner: Corner,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        PlacementConfig {
            pos_x: 30,
            pos_y: 60,
            corner: Corner::TOP_RIGHT,
        }
    }
}

impl PlacementConfig {
    pub fn offset(&self) -> Point {
        Point::new(self.pos_x, self.pos_y)
    }
}

// --- Behavior Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Seconds before the popup dismisses itself when `-d` is not given.
    /// Zero keeps it open until clicked.
    pub duration_secs: u32,
    /// Pointer button that dismisses the popup.
    pub dismiss_button: u32,
    /// Pointer button that triggers the action.
    pub action_button: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            duration_secs: 5,
            dismiss_button: BUTTON_LEFT,
            action_button: BUTTON_RIGHT,
        }
    }
}

impl Config {
    /// Pixel budget available to one line of text.
    pub fn text_budget(&self) -> u32 {
        self.appearance
            .width
            .saturating_sub(2 * self.appearance.padding)
    }
}
