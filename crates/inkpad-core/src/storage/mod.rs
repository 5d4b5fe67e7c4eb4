//! Document persistence.
//!
//! Only vector data is stored: stroke points, radius, color and placement,
//! and text content and position. Rasters are rebuilt after loading.

mod file;

pub use file::{load_document, save_document};

use crate::canvas::CanvasDocument;
use crate::color::InkColor;
use crate::stroke::Stroke;
use crate::text::TextEntity;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative tolerance for point and placement checks.
const PLACEMENT_SLACK: f64 = 1e-6;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid document: {0}")]
    Invalid(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Root of a document file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub doc: DocumentRecord,
}

/// Staged document contents, validated before they replace anything live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub line: Vec<StrokeRecord>,
    pub text: Vec<TextRecord>,
}

/// One stroke on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    /// Ink radius in world units.
    pub r: f64,
    /// Color packed as `0xRRGGBBAA`.
    pub c: u32,
    /// Authored camera scale.
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Points relative to `(x, y)`.
    pub p: Vec<PointRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

/// One text on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Authored camera scale.
    pub s: f64,
    pub t: String,
    pub x: f64,
    pub y: f64,
}

impl From<Point> for PointRecord {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointRecord> for Point {
    fn from(p: PointRecord) -> Self {
        Point::new(p.x, p.y)
    }
}

impl StrokeRecord {
    pub fn from_stroke<T>(stroke: &Stroke<T>) -> Self {
        Self {
            r: stroke.world_radius,
            c: stroke.color.to_packed(),
            s: stroke.authored_scale,
            x: stroke.placement.x0,
            y: stroke.placement.y0,
            w: stroke.placement.width(),
            h: stroke.placement.height(),
            p: stroke.points.iter().copied().map(PointRecord::from).collect(),
        }
    }

    /// Build a stroke without a raster.
    pub fn to_stroke<T>(&self) -> Stroke<T> {
        Stroke::from_parts(
            self.p.iter().copied().map(Point::from).collect(),
            Rect::new(self.x, self.y, self.x + self.w, self.y + self.h),
            self.r,
            self.s,
            InkColor::from_packed(self.c),
        )
    }

    fn validate(&self, index: usize) -> StorageResult<()> {
        let numbers = [self.r, self.s, self.x, self.y, self.w, self.h];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(invalid("line", index, "non-finite number"));
        }
        if self.r <= 0.0 {
            return Err(invalid("line", index, "radius must be positive"));
        }
        if self.s <= 0.0 {
            return Err(invalid("line", index, "scale must be positive"));
        }
        if self.w < 0.0 || self.h < 0.0 {
            return Err(invalid("line", index, "negative size"));
        }
        if self.p.is_empty() {
            return Err(invalid("line", index, "no points"));
        }
        if self.p.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(invalid("line", index, "non-finite point"));
        }

        let slack = PLACEMENT_SLACK * self.w.max(self.h).max(1.0);
        if self
            .p
            .iter()
            .any(|p| p.x < -slack || p.y < -slack || p.x > self.w + slack || p.y > self.h + slack)
        {
            return Err(invalid("line", index, "point outside its placement"));
        }

        // The placement is the ink bounds rounded out to whole pixels at the
        // authored scale, so it can exceed the points by one pixel per side.
        let (min, max) = self.p.iter().fold(
            (Point::new(f64::MAX, f64::MAX), Point::new(f64::MIN, f64::MIN)),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );
        let margin = 2.0 * self.r + 2.0 / self.s + slack;
        if self.w > max.x - min.x + margin || self.h > max.y - min.y + margin {
            return Err(invalid("line", index, "placement larger than its ink"));
        }
        Ok(())
    }
}

impl TextRecord {
    pub fn from_text<T>(text: &TextEntity<T>) -> Self {
        let position = text.position();
        Self {
            s: text.authored_scale,
            t: text.content.clone(),
            x: position.x,
            y: position.y,
        }
    }

    /// Build a text without a raster.
    pub fn to_text<T>(&self) -> TextEntity<T> {
        TextEntity::with_content(Point::new(self.x, self.y), self.s, self.t.clone())
    }

    fn validate(&self, index: usize) -> StorageResult<()> {
        if !self.s.is_finite() || !self.x.is_finite() || !self.y.is_finite() {
            return Err(invalid("text", index, "non-finite number"));
        }
        if self.s <= 0.0 {
            return Err(invalid("text", index, "scale must be positive"));
        }
        Ok(())
    }
}

fn invalid(element: &str, index: usize, reason: &str) -> StorageError {
    StorageError::Invalid(format!("{element} #{index}: {reason}"))
}

impl DocumentRecord {
    /// Capture the vector data of a document.
    pub fn from_document<T>(document: &CanvasDocument<T>) -> Self {
        Self {
            line: document.strokes.iter().map(StrokeRecord::from_stroke).collect(),
            text: document.texts.iter().map(TextRecord::from_text).collect(),
        }
    }

    /// Check every record, stopping at the first bad one.
    pub fn validate(&self) -> StorageResult<()> {
        for (index, line) in self.line.iter().enumerate() {
            line.validate(index)?;
        }
        for (index, text) in self.text.iter().enumerate() {
            text.validate(index)?;
        }
        Ok(())
    }

    /// Convert into fresh, unrasterized entities.
    pub fn into_entities<T>(self) -> (Vec<Stroke<T>>, Vec<TextEntity<T>>) {
        (
            self.line.iter().map(StrokeRecord::to_stroke).collect(),
            self.text.iter().map(TextRecord::to_text).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> StrokeRecord {
        StrokeRecord {
            r: 3.0,
            c: 0xff00_00ff,
            s: 1.0,
            x: -3.0,
            y: -3.0,
            w: 56.0,
            h: 6.0,
            p: vec![PointRecord { x: 3.0, y: 3.0 }, PointRecord { x: 53.0, y: 3.0 }],
        }
    }

    #[test]
    fn test_record_to_stroke() {
        let stroke: Stroke<()> = line().to_stroke();
        assert_eq!(stroke.placement, Rect::new(-3.0, -3.0, 53.0, 3.0));
        assert_eq!(stroke.color, InkColor::RED);
        assert_eq!(stroke.points, vec![Point::new(3.0, 3.0), Point::new(53.0, 3.0)]);
        assert!(stroke.texture.is_none());
        assert_eq!(StrokeRecord::from_stroke(&stroke), line());
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut record = DocumentRecord {
            line: vec![line()],
            text: Vec::new(),
        };
        assert!(record.validate().is_ok());

        record.line[0].r = 0.0;
        assert!(matches!(record.validate(), Err(StorageError::Invalid(_))));

        record.line[0].r = 3.0;
        record.line[0].p[1].x = f64::NAN;
        assert!(matches!(record.validate(), Err(StorageError::Invalid(_))));

        record.line[0].p.clear();
        assert!(matches!(record.validate(), Err(StorageError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_placement() {
        let mut record = DocumentRecord {
            line: vec![line()],
            text: Vec::new(),
        };
        record.line[0].w = 1e12;
        record.line[0].h = 1e12;
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("larger than its ink"));

        record.line[0] = line();
        record.line[0].p.push(PointRecord { x: 80.0, y: 3.0 });
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("outside its placement"));

        // One pixel of rounding per side is accepted.
        record.line[0] = line();
        record.line[0].x -= 1.0;
        record.line[0].w += 2.0;
        record.line[0].p = vec![PointRecord { x: 4.0, y: 3.0 }, PointRecord { x: 54.0, y: 3.0 }];
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_text() {
        let record = DocumentRecord {
            line: Vec::new(),
            text: vec![TextRecord {
                s: -1.0,
                t: "hi".to_string(),
                x: 0.0,
                y: 0.0,
            }],
        };
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("text #0"));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"doc":{"line":[{"r":1.0,"c":0,"s":1.0,"x":0.0,"y":0.0,"w":1.0,"p":[]}],"text":[]}}"#;
        assert!(serde_json::from_str::<DocumentFile>(json).is_err());
    }
}
