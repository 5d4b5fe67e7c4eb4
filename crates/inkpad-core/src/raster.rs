//! Raster backend abstraction.
//!
//! The engine never touches pixels directly. Everything it needs from a
//! rendering context (off-screen targets, ink primitives, cropping, text
//! rasterization) goes through [`RasterBackend`], so the same canvas logic
//! runs against a GPU renderer, the CPU backend in `inkpad-render`, or a
//! recording mock in tests.

use crate::color::InkColor;
use kurbo::{Point, Rect, Size};

/// Longest side of a raster the engine will ask a backend for.
pub const MAX_TEXTURE_SIDE: u32 = 8192;
/// Largest pixel count of a raster the engine will ask a backend for.
pub const MAX_TEXTURE_PIXELS: u64 = 4096 * 4096;

/// Check a raster size against [`MAX_TEXTURE_SIDE`] and [`MAX_TEXTURE_PIXELS`].
pub fn fits_texture_limits(width: f64, height: f64) -> bool {
    let max_side = f64::from(MAX_TEXTURE_SIDE);
    width.is_finite()
        && height.is_finite()
        && width <= max_side
        && height <= max_side
        && width * height <= MAX_TEXTURE_PIXELS as f64
}

/// Trait for rendering backends that own off-screen raster targets.
pub trait RasterBackend {
    /// Off-screen raster target type.
    type Texture;

    /// Create a transparent target of the given pixel size.
    ///
    /// Returns `None` if the backend cannot allocate it.
    fn create_texture(&mut self, width: u32, height: u32) -> Option<Self::Texture>;

    /// Fill a round joint of `radius` device pixels centred at `center`.
    fn fill_disc(&mut self, target: &mut Self::Texture, center: Point, radius: u32, color: InkColor);

    /// Fill a constant-width capsule (thick line with round caps) from `from` to `to`.
    fn fill_capsule(
        &mut self,
        target: &mut Self::Texture,
        from: Point,
        to: Point,
        radius: u32,
        color: InkColor,
    );

    /// Copy `area` (device pixels, may extend past the source) into a new target.
    fn crop(&mut self, source: &Self::Texture, area: Rect) -> Option<Self::Texture>;

    /// Pixel dimensions of a target.
    fn texture_size(&self, texture: &Self::Texture) -> Size;

    /// Rasterize a string with the backend's font.
    ///
    /// Returns `None` for content that produces no pixels (empty string).
    fn rasterize_text(&mut self, content: &str) -> Option<Self::Texture>;
}
