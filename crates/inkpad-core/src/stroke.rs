//! Freehand stroke capture, cropping and regeneration.

use crate::camera::Camera;
use crate::color::InkColor;
use crate::raster::{RasterBackend, fits_texture_limits};
use kurbo::{Point, Rect, Size, Vec2};
use thiserror::Error;

/// Strokes with fewer points than this are treated as dots when erasing.
pub const DOT_POINT_LIMIT: usize = 5;

/// Stroke errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeError {
    #[error("Stroke radius {world_radius} at scale {scale} rounds below one device pixel")]
    DegenerateRadius { world_radius: f64, scale: f64 },
    #[error("Stroke raster of {width}x{height} pixels at scale {scale} is too large")]
    RasterTooLarge { width: f64, height: f64, scale: f64 },
    #[error("Backend could not allocate a {width}x{height} stroke raster")]
    Allocation { width: u32, height: u32 },
}

/// A finished freehand stroke placed in world space.
#[derive(Debug, Clone)]
pub struct Stroke<T> {
    /// Points in world units, relative to `placement`'s top-left corner.
    pub points: Vec<Point>,
    /// Position and size of the raster in world units.
    pub placement: Rect,
    /// Ink radius in world units.
    pub world_radius: f64,
    /// Camera scale the stroke was drawn at.
    pub authored_scale: f64,
    pub color: InkColor,
    /// Cropped raster, absent until rasterized (e.g. right after a load).
    pub texture: Option<T>,
    /// Camera scale `texture` was rendered at.
    pub raster_scale: f64,
}

impl<T> Stroke<T> {
    /// Create a stroke from persisted vector data, without a raster.
    pub fn from_parts(
        points: Vec<Point>,
        placement: Rect,
        world_radius: f64,
        authored_scale: f64,
        color: InkColor,
    ) -> Self {
        Self {
            points,
            placement,
            world_radius,
            authored_scale,
            color,
            texture: None,
            raster_scale: authored_scale,
        }
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Too few points to test the path itself; hit-tests use the rect only.
    pub fn is_dot(&self) -> bool {
        self.points.len() < DOT_POINT_LIMIT
    }

    /// Points in absolute world coordinates.
    pub fn world_points(&self) -> impl Iterator<Item = Point> + '_ {
        let offset = self.placement.origin().to_vec2();
        self.points.iter().map(move |p| *p + offset)
    }

    /// World bounding box of the ink: all points expanded by the radius.
    pub fn ink_bounds(&self) -> Rect {
        let mut points = self.world_points();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
            .inflate(self.world_radius, self.world_radius)
    }

    /// Move the stroke; the raster is unaffected.
    pub fn translate(&mut self, delta: Vec2) {
        self.placement = self.placement + delta;
    }
}

/// A stroke being drawn: screen-space points and a viewport-sized raster.
#[derive(Debug)]
pub struct StrokeCapture<T> {
    pub points: Vec<Point>,
    pub texture: T,
    pub radius: u32,
    pub color: InkColor,
}

impl<T> StrokeCapture<T> {
    /// Screen bounding box of the ink, rounded outward to whole pixels.
    pub fn ink_bounds(&self) -> Rect {
        let r = f64::from(self.radius);
        let first = self.points[0];
        self.points
            .iter()
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(*p))
            .inflate(r, r)
            .expand()
    }
}

/// Captures pointer motion into a transient raster and finalizes it.
#[derive(Debug)]
pub struct StrokeEngine<T> {
    capture: Option<StrokeCapture<T>>,
}

impl<T> Default for StrokeEngine<T> {
    fn default() -> Self {
        Self { capture: None }
    }
}

impl<T> StrokeEngine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a stroke is being drawn.
    pub fn is_active(&self) -> bool {
        self.capture.is_some()
    }

    /// The in-progress stroke, if any.
    pub fn capture(&self) -> Option<&StrokeCapture<T>> {
        self.capture.as_ref()
    }

    /// Begin a stroke at `point` (screen coordinates).
    ///
    /// Allocates a raster covering the whole viewport and draws the first joint.
    /// Returns `false` if the raster could not be allocated.
    pub fn start_stroke<B>(
        &mut self,
        backend: &mut B,
        viewport: Size,
        point: Point,
        radius: u32,
        color: InkColor,
    ) -> bool
    where
        B: RasterBackend<Texture = T>,
    {
        if self.capture.take().is_some() {
            log::debug!("Starting a stroke while another is active; discarding the old one");
        }

        let viewport = viewport.ceil();
        let (width, height) = (viewport.width.max(1.0) as u32, viewport.height.max(1.0) as u32);
        let Some(mut texture) = backend.create_texture(width, height) else {
            log::warn!("Cannot allocate a {width}x{height} stroke raster");
            return false;
        };
        backend.fill_disc(&mut texture, point, radius, color);

        self.capture = Some(StrokeCapture {
            points: vec![point],
            texture,
            radius,
            color,
        });
        true
    }

    /// Extend the stroke to `point`. Returns whether anything was drawn.
    pub fn continue_stroke<B>(&mut self, backend: &mut B, point: Point) -> bool
    where
        B: RasterBackend<Texture = T>,
    {
        let Some(capture) = self.capture.as_mut() else {
            return false;
        };
        let Some(&last) = capture.points.last() else {
            return false;
        };
        // Duplicate motion events carry no new ink.
        if last == point {
            return false;
        }

        backend.fill_capsule(&mut capture.texture, last, point, capture.radius, capture.color);
        capture.points.push(point);
        true
    }

    /// Close the stroke, crop its raster to the ink and convert it to world space.
    pub fn finalize_stroke<B>(&mut self, backend: &mut B, camera: &Camera) -> Option<Stroke<T>>
    where
        B: RasterBackend<Texture = T>,
    {
        let mut capture = self.capture.take()?;
        let last = *capture.points.last()?;
        backend.fill_disc(&mut capture.texture, last, capture.radius, capture.color);

        let bounds = capture.ink_bounds();
        let Some(texture) = backend.crop(&capture.texture, bounds) else {
            log::warn!("Dropping stroke: cannot crop {}x{} raster", bounds.width(), bounds.height());
            return None;
        };

        let scale = camera.scale();
        let origin = bounds.origin();
        let points = capture
            .points
            .iter()
            .map(|p| ((*p - origin) / scale).to_point())
            .collect();

        Some(Stroke {
            points,
            placement: camera.screen_world_rect(bounds),
            world_radius: f64::from(capture.radius) / scale,
            authored_scale: scale,
            color: capture.color,
            texture: Some(texture),
            raster_scale: scale,
        })
    }

    /// Abandon the in-progress stroke. Returns whether one was discarded.
    pub fn cancel(&mut self) -> bool {
        self.capture.take().is_some()
    }
}

/// Rebuild a stroke's raster from its vector data at `scale`.
///
/// Rasters beyond the texture limits are refused rather than allocated.
/// On error the stroke keeps whatever raster it had.
pub fn regen_stroke<B: RasterBackend>(
    backend: &mut B,
    stroke: &mut Stroke<B::Texture>,
    scale: f64,
) -> Result<(), StrokeError> {
    let radius = (stroke.world_radius * scale).round();
    if radius.is_nan() || radius < 1.0 {
        return Err(StrokeError::DegenerateRadius {
            world_radius: stroke.world_radius,
            scale,
        });
    }
    let radius = radius as u32;

    let size = (stroke.placement.size() * scale).ceil();
    if !fits_texture_limits(size.width, size.height) {
        return Err(StrokeError::RasterTooLarge {
            width: size.width,
            height: size.height,
            scale,
        });
    }
    let (width, height) = (size.width.max(1.0) as u32, size.height.max(1.0) as u32);
    let mut texture = backend
        .create_texture(width, height)
        .ok_or(StrokeError::Allocation { width, height })?;

    let mut device = stroke.points.iter().map(|p| (p.to_vec2() * scale).to_point());
    if let Some(first) = device.next() {
        backend.fill_disc(&mut texture, first, radius, stroke.color);
        let mut prev = first;
        for next in device {
            backend.fill_capsule(&mut texture, prev, next, radius, stroke.color);
            prev = next;
        }
        if stroke.points.len() > 1 {
            backend.fill_disc(&mut texture, prev, radius, stroke.color);
        }
    }

    stroke.texture = Some(texture);
    stroke.raster_scale = scale;
    Ok(())
}
