//! Text entities and the draft text editor.

use crate::raster::RasterBackend;
use kurbo::{Point, Rect, Vec2};

/// A text label placed in world space.
#[derive(Debug, Clone)]
pub struct TextEntity<T> {
    /// The text content.
    pub content: String,
    /// Position and size of the raster in world units.
    pub placement: Rect,
    /// Camera scale the text was created at; the raster is sized relative to it.
    pub authored_scale: f64,
    /// Rasterized content, `None` while the content is empty.
    pub texture: Option<T>,
}

impl<T> TextEntity<T> {
    /// Create an empty text at `position` (world coordinates).
    pub fn new(position: Point, authored_scale: f64) -> Self {
        Self::with_content(position, authored_scale, String::new())
    }

    /// Create a text from persisted data, without a raster.
    pub fn with_content(position: Point, authored_scale: f64, content: String) -> Self {
        Self {
            content,
            placement: Rect::from_origin_size(position, (0.0, 0.0)),
            authored_scale,
            texture: None,
        }
    }

    /// Top-left corner in world coordinates.
    pub fn position(&self) -> Point {
        self.placement.origin()
    }

    /// Check if the text has any content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Move the text; the raster is unaffected.
    pub fn translate(&mut self, delta: Vec2) {
        self.placement = self.placement + delta;
    }
}

/// Re-rasterize the full string and resize the placement to match.
///
/// The world size is the raster size divided by the authored scale; the
/// position never changes.
pub fn regen_text<B: RasterBackend>(backend: &mut B, text: &mut TextEntity<B::Texture>) {
    let origin = text.placement.origin();
    text.texture = backend.rasterize_text(&text.content);
    let size = match &text.texture {
        Some(texture) => backend.texture_size(texture) / text.authored_scale,
        None => kurbo::Size::ZERO,
    };
    text.placement = Rect::from_origin_size(origin, size);
}

/// Append a character and re-rasterize.
pub fn add_character<B: RasterBackend>(backend: &mut B, text: &mut TextEntity<B::Texture>, ch: char) {
    text.content.push(ch);
    regen_text(backend, text);
}

/// Remove the last character and re-rasterize. No-op on empty text.
pub fn remove_character<B: RasterBackend>(backend: &mut B, text: &mut TextEntity<B::Texture>) {
    if text.content.pop().is_some() {
        regen_text(backend, text);
    }
}

/// Holds the one text being typed that is not yet part of the document.
#[derive(Debug)]
pub struct TextEditor<T> {
    draft: Option<TextEntity<T>>,
}

impl<T> Default for TextEditor<T> {
    fn default() -> Self {
        Self { draft: None }
    }
}

impl<T> TextEditor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-progress text, if any.
    pub fn draft(&self) -> Option<&TextEntity<T>> {
        self.draft.as_ref()
    }

    /// Check if a draft is being edited.
    pub fn is_active(&self) -> bool {
        self.draft.is_some()
    }

    /// Start a new empty draft at `position`.
    ///
    /// Any previous draft is dropped; flush it first to keep it.
    pub fn start_new_text(&mut self, position: Point, scale: f64) {
        self.draft = Some(TextEntity::new(position, scale));
    }

    /// Append a character to the draft.
    pub fn add_character<B>(&mut self, backend: &mut B, ch: char)
    where
        B: RasterBackend<Texture = T>,
    {
        if let Some(draft) = self.draft.as_mut() {
            add_character(backend, draft, ch);
        }
    }

    /// Remove the last character of the draft.
    pub fn remove_character<B>(&mut self, backend: &mut B)
    where
        B: RasterBackend<Texture = T>,
    {
        if let Some(draft) = self.draft.as_mut() {
            remove_character(backend, draft);
        }
    }

    /// Move a rasterized draft into `texts`; an empty draft is discarded.
    ///
    /// Returns the index of the stored text.
    pub fn flush_text(&mut self, texts: &mut Vec<TextEntity<T>>) -> Option<usize> {
        let draft = self.draft.take()?;
        if draft.texture.is_none() {
            return None;
        }
        texts.push(draft);
        Some(texts.len() - 1)
    }

    /// Drop the draft without storing it.
    pub fn discard(&mut self) -> bool {
        self.draft.take().is_some()
    }
}
