//! Render errors and per-frame settings.

use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Asset missing: {0}")]
    AssetMissing(String),
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),
    #[error("Invalid size: {0}")]
    InvalidSize(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single composited frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Frame size in pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Selection outline color.
    pub selection_color: Color,
    /// Erase guide line color.
    pub guide_color: Color,
}

impl RenderContext {
    /// Create a new render context.
    pub fn new(viewport_size: Size) -> Self {
        Self {
            viewport_size,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            guide_color: Color::from_rgba8(128, 128, 128, 255),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}
