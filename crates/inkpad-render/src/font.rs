//! Text rasterization with `ab_glyph`.

use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use inkpad_core::InkColor;
use std::fs;
use std::path::Path;
use tiny_skia::{ColorU8, Pixmap};

/// Font bundled with the renderer, used when no font file is configured.
static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Default text size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 30.0;

/// A TrueType/OpenType font at a fixed pixel size.
#[derive(Clone)]
pub struct TextFont {
    font: FontArc,
    size: f32,
}

impl std::fmt::Debug for TextFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFont").field("size", &self.size).finish_non_exhaustive()
    }
}

impl TextFont {
    /// The bundled DejaVu Sans.
    pub fn embedded(size: f32) -> RenderResult<Self> {
        let font = FontArc::try_from_slice(DEJAVU_SANS)
            .map_err(|e| RendererError::InvalidAsset(format!("bundled font: {e}")))?;
        Ok(Self { font, size })
    }

    /// Load a font file from disk.
    pub fn load(path: &Path, size: f32) -> RenderResult<Self> {
        if !path.exists() {
            return Err(RendererError::AssetMissing(path.display().to_string()));
        }
        let bytes = fs::read(path)
            .map_err(|e| RendererError::AssetMissing(format!("{}: {}", path.display(), e)))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| RendererError::InvalidAsset(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded font {} at {size}px", path.display());
        Ok(Self { font, size })
    }

    /// Pixel size glyphs are rendered at.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Distance between baselines.
    pub fn line_height(&self) -> f32 {
        let scaled = self.font.as_scaled(self.size);
        scaled.height() + scaled.line_gap()
    }

    /// Advance width of one line, kerning included.
    pub fn line_width(&self, line: &str) -> f32 {
        let scaled = self.font.as_scaled(self.size);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Render `content` in `color`; lines are split on `'\n'`.
    ///
    /// Returns `None` for an empty string.
    pub fn render(&self, content: &str, color: InkColor) -> Option<Pixmap> {
        if content.is_empty() {
            return None;
        }
        let scaled = self.font.as_scaled(self.size);
        let line_height = self.line_height();
        let lines: Vec<&str> = content.split('\n').collect();
        let width = lines.iter().map(|l| self.line_width(l)).fold(0.0, f32::max);
        let height = line_height * lines.len() as f32;

        let mut pixmap = Pixmap::new(width.ceil().max(1.0) as u32, height.ceil().max(1.0) as u32)?;
        let (columns, rows) = (pixmap.width() as i32, pixmap.height() as i32);
        let pixels = pixmap.pixels_mut();

        for (row, line) in lines.iter().enumerate() {
            let baseline = scaled.ascent() + row as f32 * line_height;
            let mut x = 0.0;
            let mut prev: Option<GlyphId> = None;
            for ch in line.chars() {
                let id = self.font.glyph_id(ch);
                if let Some(prev) = prev {
                    x += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(self.size, point(x, baseline));
                if let Some(outlined) = self.font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        let px = bounds.min.x as i32 + gx as i32;
                        let py = bounds.min.y as i32 + gy as i32;
                        if px < 0 || py < 0 || px >= columns || py >= rows {
                            return;
                        }
                        let alpha = (coverage.clamp(0.0, 1.0) * f32::from(color.a)).round() as u8;
                        let pixel = &mut pixels[(py * columns + px) as usize];
                        // Overlapping glyph edges keep the stronger coverage.
                        if alpha > pixel.alpha() {
                            *pixel = ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
                        }
                    });
                }
                x += scaled.h_advance(id);
                prev = Some(id);
            }
        }
        Some(pixmap)
    }
}
