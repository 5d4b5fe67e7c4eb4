//! Composites a canvas [`Scene`] into an RGBA frame.

use crate::raster::{solid_paint, stroke_segment};
use crate::renderer::{RenderContext, RenderResult, RendererError};
use image::{ImageFormat, Rgba, RgbaImage};
use inkpad_core::canvas::{Scene, SceneItem};
use kurbo::Rect;
use peniko::Color;
use std::path::Path;
use tiny_skia::{FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

fn paint(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    solid_paint(rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Render every scene item, back to front, over the background.
pub fn compose(scene: &Scene<'_, Pixmap>, ctx: &RenderContext) -> RenderResult<Pixmap> {
    let size = ctx.viewport_size.ceil();
    let (width, height) = (size.width.max(1.0) as u32, size.height.max(1.0) as u32);
    let mut frame = Pixmap::new(width, height)
        .ok_or_else(|| RendererError::InvalidSize(format!("{width}x{height} frame")))?;
    let background = ctx.background_color.to_rgba8();
    frame.fill(tiny_skia::Color::from_rgba8(background.r, background.g, background.b, background.a));

    for item in &scene.items {
        match item {
            SceneItem::Texture { texture, dest } => draw_texture(&mut frame, texture, *dest),
            SceneItem::SelectionOutline(rect) => draw_outline(&mut frame, *rect, &paint(ctx.selection_color)),
            SceneItem::EraseGuide(line) => {
                stroke_segment(&mut frame, line.p0, line.p1, 1.0, &paint(ctx.guide_color));
            }
        }
    }
    Ok(frame)
}

/// Map `texture` onto `dest` and blend it onto `frame`.
///
/// Only the part of `dest` inside the frame is rasterized, however far the
/// texture is magnified.
fn draw_texture(frame: &mut Pixmap, texture: &Pixmap, dest: Rect) {
    let bounds = Rect::new(0.0, 0.0, f64::from(frame.width()), f64::from(frame.height()));
    if dest.width() <= 0.0 || dest.height() <= 0.0 || dest.intersect(bounds).area() <= 0.0 {
        return;
    }
    let sx = dest.width() / f64::from(texture.width());
    let sy = dest.height() / f64::from(texture.height());
    let quality = if (sx - 1.0).abs() < 1e-9 && (sy - 1.0).abs() < 1e-9 {
        FilterQuality::Nearest
    } else {
        FilterQuality::Bilinear
    };
    let paint = PixmapPaint {
        quality,
        ..PixmapPaint::default()
    };
    let transform = Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, dest.x0 as f32, dest.y0 as f32);
    frame.draw_pixmap(0, 0, texture.as_ref(), &paint, transform, None);
}

/// One-pixel rectangle outline just outside `rect`.
fn draw_outline(frame: &mut Pixmap, rect: Rect, paint: &Paint<'_>) {
    let rect = rect.expand();
    let Some(outline) =
        tiny_skia::Rect::from_ltrb(rect.x0 as f32 - 0.5, rect.y0 as f32 - 0.5, rect.x1 as f32 + 0.5, rect.y1 as f32 + 0.5)
    else {
        return;
    };
    let path = PathBuilder::from_rect(outline);
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    frame.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

/// Convert a premultiplied frame to a straight-alpha `image` buffer.
pub fn to_rgba_image(frame: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(frame.width(), frame.height());
    for (out, pixel) in image.pixels_mut().zip(frame.pixels()) {
        let color = pixel.demultiply();
        *out = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

/// Encode a frame as PNG.
pub fn save_png(frame: &Pixmap, path: &Path) -> RenderResult<()> {
    to_rgba_image(frame)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| RendererError::Encode(format!("{}: {}", path.display(), e)))?;
    log::info!("Wrote {}x{} frame to {}", frame.width(), frame.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::test_font;
    use crate::raster::SoftwareRaster;
    use inkpad_core::{CanvasConfig, CanvasController, CanvasEvent, Command, MouseButton, NoFilePicker};
    use kurbo::{Line, Point, Size, Vec2};
    use tempfile::tempdir;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn ctx(width: f64, height: f64) -> RenderContext {
        RenderContext::new(Size::new(width, height)).with_background(Color::from_rgba8(255, 255, 255, 255))
    }

    fn render(scene: &Scene<'_, Pixmap>, context: &RenderContext) -> RgbaImage {
        to_rgba_image(&compose(scene, context).unwrap())
    }

    fn expected(color: Color) -> Rgba<u8> {
        let rgba = color.to_rgba8();
        Rgba([rgba.r, rgba.g, rgba.b, rgba.a])
    }

    fn assert_close(actual: &Rgba<u8>, expected: Rgba<u8>) {
        let close = actual.0.iter().zip(expected.0).all(|(a, e)| a.abs_diff(e) <= 2);
        assert!(close, "{actual:?} != {expected:?}");
    }

    fn solid(width: u32, height: u32, color: tiny_skia::Color) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(color);
        pixmap
    }

    #[test]
    fn test_empty_scene_is_background() {
        let scene: Scene<'_, Pixmap> = Scene { items: Vec::new() };
        let frame = render(&scene, &ctx(8.0, 4.0));
        assert_eq!(frame.dimensions(), (8, 4));
        assert!(frame.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_texture_is_placed_and_scaled() {
        let texture = solid(2, 2, tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        let scene = Scene {
            items: vec![SceneItem::Texture {
                texture: &texture,
                dest: Rect::new(4.0, 4.0, 8.0, 8.0),
            }],
        };
        let frame = render(&scene, &ctx(12.0, 12.0));

        assert_close(frame.get_pixel(4, 4), Rgba([255, 0, 0, 255]));
        assert_close(frame.get_pixel(7, 7), Rgba([255, 0, 0, 255]));
        assert_eq!(*frame.get_pixel(3, 3), WHITE);
        assert_eq!(*frame.get_pixel(8, 8), WHITE);
    }

    #[test]
    fn test_huge_magnification_is_clipped_to_frame() {
        let texture = solid(1280, 800, tiny_skia::Color::from_rgba8(0, 0, 255, 255));
        // A full-viewport raster drawn at scale 0.1 and viewed at scale 10.
        let scene = Scene {
            items: vec![SceneItem::Texture {
                texture: &texture,
                dest: Rect::new(-60_000.0, -40_000.0, 68_000.0, 40_000.0),
            }],
        };
        let frame = render(&scene, &ctx(64.0, 48.0));
        assert_eq!(frame.dimensions(), (64, 48));
        assert_close(frame.get_pixel(32, 24), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_offscreen_texture_is_skipped() {
        let texture = solid(4, 4, tiny_skia::Color::BLACK);
        let scene = Scene {
            items: vec![SceneItem::Texture {
                texture: &texture,
                dest: Rect::new(100.0, 100.0, 104.0, 104.0),
            }],
        };
        let frame = render(&scene, &ctx(16.0, 16.0));
        assert!(frame.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_outline_and_guide() {
        let scene: Scene<'_, Pixmap> = Scene {
            items: vec![
                SceneItem::SelectionOutline(Rect::new(2.0, 2.0, 6.0, 6.0)),
                SceneItem::EraseGuide(Line::new(Point::new(0.0, 10.5), Point::new(12.0, 10.5))),
            ],
        };
        let context = ctx(12.0, 12.0);
        let frame = render(&scene, &context);

        assert_close(frame.get_pixel(1, 1), expected(context.selection_color));
        assert_close(frame.get_pixel(6, 4), expected(context.selection_color));
        assert_eq!(*frame.get_pixel(4, 4), WHITE);
        assert_close(frame.get_pixel(5, 10), expected(context.guide_color));
    }

    #[test]
    fn test_controller_frame_shows_ink() {
        let mut canvas = CanvasController::new(
            SoftwareRaster::new(test_font()),
            Box::new(NoFilePicker),
            CanvasConfig::default(),
            Size::new(96.0, 96.0),
        );
        let events = [
            CanvasEvent::PointerDown { position: Point::new(10.0, 20.0), button: MouseButton::Left },
            CanvasEvent::PointerMove { position: Point::new(80.0, 20.0), delta: Vec2::new(70.0, 0.0) },
            CanvasEvent::PointerUp { position: Point::new(80.0, 20.0), button: MouseButton::Left },
            CanvasEvent::PointerMove { position: Point::new(10.0, 50.0), delta: Vec2::new(-70.0, 30.0) },
            CanvasEvent::Command(Command::Type),
            CanvasEvent::TextInput('W'),
        ];
        for event in events {
            canvas.handle_event(event).unwrap();
        }

        let frame = render(&canvas.scene(), &ctx(96.0, 96.0));
        assert_close(frame.get_pixel(40, 20), Rgba([0, 0, 0, 255]));
        assert_eq!(*frame.get_pixel(40, 4), WHITE);
        // Text typed at the last pointer position.
        let text_ink = (50..90)
            .flat_map(|y| (10..40).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.get_pixel(x, y).0[0] < 128)
            .count();
        assert!(text_ink > 0);
    }

    #[test]
    fn test_save_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let frame = solid(3, 2, tiny_skia::Color::WHITE);
        save_png(&frame, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(*decoded.get_pixel(2, 1), WHITE);
    }
}
