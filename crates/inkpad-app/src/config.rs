//! Application configuration and errors.

use inkpad_core::{CanvasConfig, CanvasError, InkColor};
use inkpad_render::{DEFAULT_FONT_SIZE, RendererError};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Event script error: {0}")]
    Script(String),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

/// Settings for the headless shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    /// TrueType/OpenType font for text. The bundled font is used when unset;
    /// a configured font that cannot be loaded stops startup.
    pub font: Option<PathBuf>,
    /// Text size in pixels.
    pub font_size: f32,
    pub background_color: InkColor,
    pub canvas: CanvasConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            font: None,
            font_size: DEFAULT_FONT_SIZE,
            background_color: InkColor::new(250, 250, 250, 255),
            canvas: CanvasConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing fields take their default.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Frame size in pixels.
    pub fn viewport(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inkpad.json");
        fs::write(&path, r#"{"width": 320, "font": "fonts/hand.ttf", "canvas": {"default_radius": 6}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.font, Some(PathBuf::from("fonts/hand.ttf")));
        assert!((config.font_size - DEFAULT_FONT_SIZE).abs() < f32::EPSILON);
        assert_eq!(config.height, 800);
        assert_eq!(config.canvas.default_radius, 6);
        assert_eq!(config.viewport(), Size::new(320.0, 800.0));
    }

    #[test]
    fn test_missing_config() {
        let dir = tempdir().unwrap();
        let result = AppConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
