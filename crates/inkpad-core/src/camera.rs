//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom level.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed zoom level.
pub const MAX_SCALE: f64 = 10.0;

/// Camera manages the view transform for the canvas.
///
/// `origin` is the world point shown at the top-left corner of the viewport
/// and `scale` the number of device pixels per world unit:
///
/// ```text
/// world_screen(p) = (p - origin) * scale
/// screen_world(p) = p / scale + origin
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World point at the top-left of the viewport.
    pub origin: Point,
    /// Current zoom level.
    scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with the given origin and scale (clamped).
    pub fn with_origin_scale(origin: Point, scale: f64) -> Self {
        Self {
            origin,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// Current zoom level.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale) * Affine::translate(-self.origin.to_vec2())
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(self.origin.to_vec2()) * Affine::scale(1.0 / self.scale)
    }

    /// Convert a world point to screen coordinates.
    pub fn world_screen(&self, world_point: Point) -> Point {
        ((world_point - self.origin) * self.scale).to_point()
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_world(&self, screen_point: Point) -> Point {
        self.origin + screen_point.to_vec2() / self.scale
    }

    /// Convert a world rect to screen coordinates (both corners).
    pub fn world_screen_rect(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.world_screen(Point::new(rect.x0, rect.y0)),
            self.world_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Convert a screen rect to world coordinates (both corners).
    pub fn screen_world_rect(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.screen_world(Point::new(rect.x0, rect.y0)),
            self.screen_world(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Convert a world size to a screen size.
    pub fn world_screen_size(&self, size: Size) -> Size {
        size * self.scale
    }

    /// Convert a screen size to a world size.
    pub fn screen_world_size(&self, size: Size) -> Size {
        size / self.scale
    }

    /// Pan the camera by a delta in screen coordinates.
    ///
    /// The world under the pointer follows the pointer: dragging right
    /// moves the origin left.
    pub fn translate(&mut self, delta: Vec2) {
        self.origin -= delta / self.scale;
    }

    /// Zoom by `factor`, keeping the world point under `anchor` fixed on screen.
    pub fn zoom(&mut self, factor: f64, anchor: Point) {
        self.set_scale(self.scale * factor, anchor);
    }

    /// Set an absolute zoom level, keeping the world point under `anchor` fixed.
    ///
    /// Non-finite or non-positive scales are ignored.
    pub fn set_scale(&mut self, scale: f64, anchor: Point) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let new_scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let world_anchor = self.screen_world(anchor);
        self.scale = new_scale;
        self.origin = world_anchor - anchor.to_vec2() / new_scale;
    }

    /// Reset camera to the identity transform.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.origin, Point::ZERO);
        assert!((camera.scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_world_with_origin() {
        let camera = Camera::with_origin_scale(Point::new(50.0, 100.0), 1.0);
        let world = camera.screen_world(Point::new(100.0, 200.0));
        assert_point_eq(world, Point::new(150.0, 300.0));
    }

    #[test]
    fn test_screen_world_with_scale() {
        let camera = Camera::with_origin_scale(Point::ZERO, 2.0);
        let world = camera.screen_world(Point::new(100.0, 200.0));
        assert_point_eq(world, Point::new(50.0, 100.0));
    }

    #[test]
    fn test_affine_matches_point_conversion() {
        let camera = Camera::with_origin_scale(Point::new(-12.0, 7.5), 3.25);
        let p = Point::new(40.0, -9.0);
        assert_point_eq(camera.transform() * p, camera.world_screen(p));
        assert_point_eq(camera.inverse_transform() * p, camera.screen_world(p));
    }

    #[test]
    fn test_roundtrip_conversion() {
        let cameras = [
            Camera::new(),
            Camera::with_origin_scale(Point::new(30.0, -20.0), 1.5),
            Camera::with_origin_scale(Point::new(-1e4, 2e3), 0.1),
            Camera::with_origin_scale(Point::new(0.25, 0.75), 10.0),
        ];
        let points = [
            Point::new(123.0, 456.0),
            Point::new(-3.5, 0.0),
            Point::new(1e5, -1e5),
        ];

        for camera in cameras {
            for p in points {
                let back = camera.screen_world(camera.world_screen(p));
                assert!((back.x - p.x).abs() < 1e-6 * p.x.abs().max(1.0));
                assert!((back.y - p.y).abs() < 1e-6 * p.y.abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_rect_transform_both_corners() {
        let camera = Camera::with_origin_scale(Point::new(10.0, 10.0), 2.0);
        let rect = camera.world_screen_rect(Rect::new(10.0, 10.0, 20.0, 15.0));
        assert_eq!(rect, Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(camera.screen_world_rect(rect), Rect::new(10.0, 10.0, 20.0, 15.0));
        assert_eq!(camera.world_screen_size(Size::new(3.0, 4.0)), Size::new(6.0, 8.0));
        assert_eq!(camera.screen_world_size(Size::new(6.0, 8.0)), Size::new(3.0, 4.0));
    }

    #[test]
    fn test_zoom_anchor_invariance() {
        let mut camera = Camera::with_origin_scale(Point::new(13.0, -4.0), 1.3);
        let anchor = Point::new(320.0, 240.0);

        for factor in [1.1, 0.9, 2.0, 0.5, 1.0] {
            let before = camera.screen_world(anchor);
            camera.zoom(factor, anchor);
            assert_point_eq(camera.screen_world(anchor), before);
        }
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom(0.001, Point::ZERO);
        assert!((camera.scale() - MIN_SCALE).abs() < f64::EPSILON);

        camera.zoom(1e6, Point::new(5.0, 5.0));
        assert!((camera.scale() - MAX_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_zoom_factor_is_ignored() {
        let mut camera = Camera::with_origin_scale(Point::new(3.0, 4.0), 2.0);
        for factor in [f64::NAN, f64::INFINITY, 0.0, -1.5] {
            camera.zoom(factor, Point::new(10.0, 10.0));
            assert!((camera.scale() - 2.0).abs() < f64::EPSILON);
            assert_eq!(camera.origin, Point::new(3.0, 4.0));
        }
    }

    #[test]
    fn test_translate_follows_pointer() {
        let mut camera = Camera::with_origin_scale(Point::ZERO, 2.0);
        let world = Point::new(10.0, 10.0);
        let before = camera.world_screen(world);

        camera.translate(Vec2::new(8.0, -4.0));

        let after = camera.world_screen(world);
        assert_point_eq(after, before + Vec2::new(8.0, -4.0));
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::with_origin_scale(Point::new(5.0, 5.0), 4.0);
        camera.reset();
        assert_eq!(camera, Camera::new());
    }
}
