//! Picking, erase sweeps and index-based selection.

use crate::canvas::CanvasDocument;
use crate::stroke::Stroke;
use crate::text::TextEntity;
use kurbo::{Line, ParamCurveNearest, Point, Rect, Vec2};

/// Kind of entity a [`Selection`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityKind {
    Stroke,
    Text,
    #[default]
    None,
}

/// Reference to a document entity by position in its collection.
///
/// This is an index, not a borrow: it must be resolved against the live
/// collections on every use and fixed up after every swap-remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub index: usize,
    pub kind: EntityKind,
}

impl Selection {
    pub const NONE: Self = Self {
        index: 0,
        kind: EntityKind::None,
    };

    pub fn stroke(index: usize) -> Self {
        Self {
            index,
            kind: EntityKind::Stroke,
        }
    }

    pub fn text(index: usize) -> Self {
        Self {
            index,
            kind: EntityKind::Text,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == EntityKind::None
    }

    /// Selected text index, if the selection is a text.
    pub fn text_index(&self) -> Option<usize> {
        (self.kind == EntityKind::Text).then_some(self.index)
    }

    /// Fix up the selection after `removed` was swap-removed from a
    /// collection of `kind` that held `old_len` entries.
    ///
    /// The removed entity clears the selection; the former tail element,
    /// which now lives at `removed`, keeps it.
    pub fn after_swap_remove(self, kind: EntityKind, removed: usize, old_len: usize) -> Self {
        if self.kind != kind || kind == EntityKind::None {
            return self;
        }
        if self.index == removed {
            Self::NONE
        } else if self.index + 1 == old_len {
            Self {
                index: removed,
                kind,
            }
        } else {
            self
        }
    }

    /// Current world rect of the selected entity.
    pub fn resolve_rect<T>(&self, document: &CanvasDocument<T>) -> Option<Rect> {
        match self.kind {
            EntityKind::Stroke => document.strokes.get(self.index).map(|s| s.placement),
            EntityKind::Text => document.texts.get(self.index).map(|t| t.placement),
            EntityKind::None => None,
        }
    }
}

/// Find the topmost entity whose placement contains `point` (world).
///
/// Strokes are searched before texts, each newest first, so recent ink
/// wins over older ink the same way it is drawn on top.
pub fn find_entity_at<T>(point: Point, strokes: &[Stroke<T>], texts: &[TextEntity<T>]) -> Selection {
    if let Some(index) = strokes.iter().rposition(|s| s.placement.contains(point)) {
        return Selection::stroke(index);
    }
    if let Some(index) = texts.iter().rposition(|t| t.placement.contains(point)) {
        return Selection::text(index);
    }
    Selection::NONE
}

/// Find every stroke touched by the erase `sweep` (world).
///
/// Indices are returned in descending order, ready for swap-remove.
pub fn find_line_intersections<T>(strokes: &[Stroke<T>], sweep: Line) -> Vec<usize> {
    let mut hits = Vec::new();

    for (index, stroke) in strokes.iter().enumerate().rev() {
        if !rect_segment_collision(stroke.placement, sweep) {
            continue;
        }
        if stroke.is_dot() {
            hits.push(index);
            continue;
        }

        let offset = stroke.placement.origin().to_vec2();
        let touched = stroke.points.windows(2).any(|pair| {
            let segment = Line::new(pair[0] + offset, pair[1] + offset);
            segment_distance(segment, sweep) <= stroke.world_radius
        });
        if touched {
            hits.push(index);
        }
    }

    hits
}

/// Drag the selected entity by a screen-space delta.
///
/// Only the placement changes; rasters are position independent.
pub fn move_selected<T>(document: &mut CanvasDocument<T>, selection: Selection, delta: Vec2) -> bool {
    let delta = delta / document.camera.scale();
    match selection.kind {
        EntityKind::Stroke => match document.strokes.get_mut(selection.index) {
            Some(stroke) => {
                stroke.translate(delta);
                true
            }
            None => false,
        },
        EntityKind::Text => match document.texts.get_mut(selection.index) {
            Some(text) => {
                text.translate(delta);
                true
            }
            None => false,
        },
        EntityKind::None => false,
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

fn within_bounds(p: Point, segment: Line) -> bool {
    p.x >= segment.p0.x.min(segment.p1.x)
        && p.x <= segment.p0.x.max(segment.p1.x)
        && p.y >= segment.p0.y.min(segment.p1.y)
        && p.y <= segment.p0.y.max(segment.p1.y)
}

/// Check if two segments touch or cross.
pub fn segments_intersect(a: Line, b: Line) -> bool {
    let d1 = orientation(b.p0, b.p1, a.p0);
    let d2 = orientation(b.p0, b.p1, a.p1);
    let d3 = orientation(a.p0, a.p1, b.p0);
    let d4 = orientation(a.p0, a.p1, b.p1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear endpoints lying on the other segment.
    (d1 == 0.0 && within_bounds(a.p0, b))
        || (d2 == 0.0 && within_bounds(a.p1, b))
        || (d3 == 0.0 && within_bounds(b.p0, a))
        || (d4 == 0.0 && within_bounds(b.p1, a))
}

fn point_segment_distance(p: Point, segment: Line) -> f64 {
    if segment.p0 == segment.p1 {
        return p.distance(segment.p0);
    }
    segment.nearest(p, 1e-9).distance_sq.sqrt()
}

/// Shortest distance between two segments; zero when they intersect.
pub fn segment_distance(a: Line, b: Line) -> f64 {
    if segments_intersect(a, b) {
        return 0.0;
    }
    point_segment_distance(a.p0, b)
        .min(point_segment_distance(a.p1, b))
        .min(point_segment_distance(b.p0, a))
        .min(point_segment_distance(b.p1, a))
}

fn rect_contains_inclusive(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Check if a segment touches a rect (inside or crossing an edge).
pub fn rect_segment_collision(rect: Rect, segment: Line) -> bool {
    let rect = rect.abs();
    if rect_contains_inclusive(rect, segment.p0) || rect_contains_inclusive(rect, segment.p1) {
        return true;
    }

    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    (0..4).any(|i| segments_intersect(segment, Line::new(corners[i], corners[(i + 1) % 4])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::InkColor;
    use crate::raster::mock::MockTexture;

    fn stroke_through(points: &[Point], radius: f64) -> Stroke<MockTexture> {
        let first = points[0];
        let bbox = points
            .iter()
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p))
            .inflate(radius, radius);
        let origin = bbox.origin();
        let local = points.iter().map(|p| (*p - origin).to_point()).collect();
        Stroke::from_parts(local, bbox, radius, 1.0, InkColor::BLACK)
    }

    fn text_at(rect: Rect) -> TextEntity<MockTexture> {
        let mut text = TextEntity::new(rect.origin(), 1.0);
        text.placement = rect;
        text
    }

    fn long_horizontal(y: f64, x0: f64, x1: f64) -> Vec<Point> {
        (0..6)
            .map(|i| Point::new(x0 + (x1 - x0) * f64::from(i) / 5.0, y))
            .collect()
    }

    #[test]
    fn test_find_entity_prefers_newest_stroke() {
        let strokes = vec![
            stroke_through(&[Point::new(0.0, 0.0), Point::new(50.0, 50.0)], 2.0),
            stroke_through(&[Point::new(20.0, 20.0), Point::new(80.0, 80.0)], 2.0),
        ];
        let texts = vec![text_at(Rect::new(0.0, 0.0, 100.0, 100.0))];

        assert_eq!(find_entity_at(Point::new(30.0, 30.0), &strokes, &texts), Selection::stroke(1));
        assert_eq!(find_entity_at(Point::new(5.0, 5.0), &strokes, &texts), Selection::stroke(0));
        assert_eq!(find_entity_at(Point::new(95.0, 5.0), &strokes, &texts), Selection::text(0));
        assert!(find_entity_at(Point::new(500.0, 5.0), &strokes, &texts).is_none());
    }

    #[test]
    fn test_find_entity_prefers_newest_text() {
        let strokes: Vec<Stroke<MockTexture>> = Vec::new();
        let texts = vec![
            text_at(Rect::new(0.0, 0.0, 10.0, 10.0)),
            text_at(Rect::new(5.0, 5.0, 15.0, 15.0)),
        ];
        assert_eq!(find_entity_at(Point::new(7.0, 7.0), &strokes, &texts), Selection::text(1));
    }

    #[test]
    fn test_sweep_crossing_long_stroke() {
        let strokes = vec![stroke_through(&long_horizontal(50.0, 0.0, 100.0), 2.0)];
        let sweep = Line::new(Point::new(50.0, 0.0), Point::new(50.0, 100.0));
        assert_eq!(find_line_intersections(&strokes, sweep), vec![0]);
    }

    #[test]
    fn test_sweep_inside_rect_but_missing_path() {
        // An L-shaped stroke leaves an empty corner inside its rect.
        let mut points = long_horizontal(0.0, 0.0, 100.0);
        points.extend((1..6).map(|i| Point::new(100.0, f64::from(i) * 20.0)));
        let strokes = vec![stroke_through(&points, 2.0)];

        let sweep = Line::new(Point::new(10.0, 80.0), Point::new(30.0, 95.0));
        assert!(find_line_intersections(&strokes, sweep).is_empty());
    }

    #[test]
    fn test_dot_stroke_accepted_on_rect_hit() {
        let strokes = vec![stroke_through(&[Point::new(0.0, 0.0), Point::new(40.0, 40.0)], 1.0)];
        // Passes through the rect corner, far from the path itself.
        let sweep = Line::new(Point::new(30.0, -5.0), Point::new(45.0, 10.0));
        assert_eq!(find_line_intersections(&strokes, sweep), vec![0]);
    }

    #[test]
    fn test_sweep_rejected_by_rect() {
        let strokes = vec![stroke_through(&long_horizontal(10.0, 0.0, 100.0), 2.0)];
        let sweep = Line::new(Point::new(0.0, 50.0), Point::new(100.0, 60.0));
        assert!(find_line_intersections(&strokes, sweep).is_empty());
    }

    #[test]
    fn test_sweep_within_radius_counts() {
        let strokes = vec![stroke_through(&long_horizontal(50.0, 0.0, 100.0), 5.0)];
        // Ends 3 units short of the path, inside the radius.
        let sweep = Line::new(Point::new(50.0, 20.0), Point::new(50.0, 47.0));
        assert_eq!(find_line_intersections(&strokes, sweep), vec![0]);
    }

    #[test]
    fn test_intersections_are_descending() {
        let strokes = vec![
            stroke_through(&long_horizontal(10.0, 0.0, 100.0), 2.0),
            stroke_through(&long_horizontal(200.0, 0.0, 100.0), 2.0),
            stroke_through(&long_horizontal(30.0, 0.0, 100.0), 2.0),
        ];
        let sweep = Line::new(Point::new(50.0, 0.0), Point::new(50.0, 40.0));
        assert_eq!(find_line_intersections(&strokes, sweep), vec![2, 0]);
    }

    #[test]
    fn test_segment_helpers() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = Line::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0));
        let c = Line::new(Point::new(0.0, 3.0), Point::new(10.0, 3.0));
        let d = Line::new(Point::new(10.0, 0.0), Point::new(20.0, 0.0));

        assert!(segments_intersect(a, b));
        assert!(!segments_intersect(a, c));
        assert!(segments_intersect(a, d));
        assert!((segment_distance(a, c) - 3.0).abs() < 1e-9);
        assert!(rect_segment_collision(Rect::new(0.0, 0.0, 10.0, 10.0), Line::new(Point::new(-5.0, 5.0), Point::new(15.0, 5.0))));
        assert!(!rect_segment_collision(Rect::new(0.0, 0.0, 10.0, 10.0), Line::new(Point::new(-5.0, 20.0), Point::new(15.0, 20.0))));
    }

    #[test]
    fn test_after_swap_remove() {
        // Removing the selected entity clears the selection.
        assert!(Selection::stroke(1).after_swap_remove(EntityKind::Stroke, 1, 3).is_none());
        // The tail element moves into the hole.
        assert_eq!(
            Selection::stroke(2).after_swap_remove(EntityKind::Stroke, 0, 3),
            Selection::stroke(0)
        );
        // Other indices are untouched.
        assert_eq!(
            Selection::stroke(1).after_swap_remove(EntityKind::Stroke, 0, 3),
            Selection::stroke(1)
        );
        // Other kinds are untouched.
        assert_eq!(
            Selection::text(0).after_swap_remove(EntityKind::Stroke, 0, 3),
            Selection::text(0)
        );
    }

    #[test]
    fn test_move_selected_divides_by_scale() {
        let mut document: CanvasDocument<MockTexture> = CanvasDocument::new();
        document.camera = crate::camera::Camera::with_origin_scale(Point::ZERO, 2.0);
        document.texts.push(text_at(Rect::new(0.0, 0.0, 10.0, 10.0)));

        assert!(move_selected(&mut document, Selection::text(0), Vec2::new(10.0, -4.0)));
        assert_eq!(document.texts[0].placement, Rect::new(5.0, -2.0, 15.0, 8.0));
        assert!(!move_selected(&mut document, Selection::stroke(0), Vec2::new(1.0, 1.0)));
        assert!(!move_selected(&mut document, Selection::NONE, Vec2::new(1.0, 1.0)));
    }
}
