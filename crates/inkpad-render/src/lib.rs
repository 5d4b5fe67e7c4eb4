//! Inkpad Render Library
//!
//! CPU implementation of the core [`inkpad_core::RasterBackend`] on
//! `tiny-skia` pixmaps, `ab_glyph` text rendering, and a compositor that
//! turns a canvas scene into an RGBA frame.

mod compositor;
mod font;
mod raster;
mod renderer;

pub use compositor::{compose, save_png, to_rgba_image};
pub use font::{DEFAULT_FONT_SIZE, TextFont};
pub use raster::SoftwareRaster;
pub use renderer::{RenderContext, RenderResult, RendererError};
