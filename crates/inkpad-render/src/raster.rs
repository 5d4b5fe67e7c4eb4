//! CPU raster backend on `tiny-skia` pixmaps.

use crate::font::TextFont;
use inkpad_core::InkColor;
use inkpad_core::raster::RasterBackend;
use kurbo::{Point, Rect, Size};
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

/// Anti-aliased solid paint.
pub(crate) fn solid_paint(r: u8, g: u8, b: u8, a: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn ink_paint(color: InkColor) -> Paint<'static> {
    solid_paint(color.r, color.g, color.b, color.a)
}

/// Stroke the segment `from`..`to` with round caps, `radius` pixels either side.
pub(crate) fn stroke_segment(pixmap: &mut Pixmap, from: Point, to: Point, radius: f32, paint: &Paint<'_>) {
    let mut builder = PathBuilder::new();
    builder.move_to(from.x as f32, from.y as f32);
    builder.line_to(to.x as f32, to.y as f32);
    let Some(path) = builder.finish() else {
        return;
    };
    let stroke = Stroke {
        width: 2.0 * radius,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

/// Raster backend that draws into [`Pixmap`] buffers.
#[derive(Debug, Clone)]
pub struct SoftwareRaster {
    font: TextFont,
}

impl SoftwareRaster {
    /// Create a backend. Text is rendered with `font`.
    pub fn new(font: TextFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &TextFont {
        &self.font
    }
}

impl RasterBackend for SoftwareRaster {
    type Texture = Pixmap;

    fn create_texture(&mut self, width: u32, height: u32) -> Option<Pixmap> {
        Pixmap::new(width, height)
    }

    fn fill_disc(&mut self, target: &mut Pixmap, center: Point, radius: u32, color: InkColor) {
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32) else {
            return;
        };
        target.fill_path(&path, &ink_paint(color), FillRule::Winding, Transform::identity(), None);
    }

    fn fill_capsule(&mut self, target: &mut Pixmap, from: Point, to: Point, radius: u32, color: InkColor) {
        stroke_segment(target, from, to, radius as f32, &ink_paint(color));
    }

    fn crop(&mut self, source: &Pixmap, area: Rect) -> Option<Pixmap> {
        let area = area.expand();
        let mut cropped = Pixmap::new((area.width() as u32).max(1), (area.height() as u32).max(1))?;
        cropped.draw_pixmap(
            -(area.x0 as i32),
            -(area.y0 as i32),
            source.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Some(cropped)
    }

    fn texture_size(&self, texture: &Pixmap) -> Size {
        Size::new(f64::from(texture.width()), f64::from(texture.height()))
    }

    fn rasterize_text(&mut self, content: &str) -> Option<Pixmap> {
        self.font.render(content, InkColor::BLACK)
    }
}
