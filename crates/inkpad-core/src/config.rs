//! Canvas behaviour settings.

use crate::color::InkColor;
use serde::{Deserialize, Serialize};

/// A key that selects an ink color while painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteBinding {
    pub key: char,
    pub color: InkColor,
}

/// Tunable canvas settings. Missing JSON fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Brush radius in device pixels for new strokes.
    pub default_radius: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    pub default_color: InkColor,
    /// Wheel delta that doubles the scale; `factor = 1 + delta / zoom_step`.
    pub zoom_step: f64,
    /// Re-rasterize a stroke once the camera scale differs from its raster
    /// scale by more than this ratio. `None` keeps rasters at authored size.
    pub regen_zoom_ratio: Option<f64>,
    pub palette: Vec<PaletteBinding>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_radius: 3,
            min_radius: 1,
            max_radius: 10,
            default_color: InkColor::BLACK,
            zoom_step: 10.0,
            regen_zoom_ratio: None,
            palette: vec![
                PaletteBinding { key: 'b', color: InkColor::BLACK },
                PaletteBinding { key: 'r', color: InkColor::RED },
                PaletteBinding { key: 'g', color: InkColor::GREEN },
                PaletteBinding { key: 'o', color: InkColor::ORANGE },
            ],
        }
    }
}

impl CanvasConfig {
    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up the palette color bound to `key`.
    pub fn palette_color(&self, key: char) -> Option<InkColor> {
        self.palette.iter().find(|b| b.key == key).map(|b| b.color)
    }

    /// Clamp a radius into the configured range.
    pub fn clamp_radius(&self, radius: u32) -> u32 {
        radius.clamp(self.min_radius, self.max_radius.max(self.min_radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.default_radius, 3);
        assert_eq!(config.palette_color('r'), Some(InkColor::RED));
        assert_eq!(config.palette_color('x'), None);
        assert_eq!(config.clamp_radius(0), 1);
        assert_eq!(config.clamp_radius(42), 10);
    }

    #[test]
    fn test_partial_json() {
        let config = CanvasConfig::from_json(r#"{"default_radius": 5, "regen_zoom_ratio": 1.5}"#).unwrap();
        assert_eq!(config.default_radius, 5);
        assert_eq!(config.regen_zoom_ratio, Some(1.5));
        assert_eq!(config.max_radius, 10);
        assert_eq!(config.palette.len(), 4);
    }

    #[test]
    fn test_invalid_json() {
        assert!(CanvasConfig::from_json("{\"zoom_step\": \"fast\"}").is_err());
    }
}
