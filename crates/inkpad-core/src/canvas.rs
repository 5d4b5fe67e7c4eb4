//! Canvas document and the mode state machine that edits it.

use crate::camera::Camera;
use crate::color::InkColor;
use crate::config::CanvasConfig;
use crate::input::{CanvasEvent, Command, InputState, Key, MouseButton};
use crate::raster::RasterBackend;
use crate::selection::{EntityKind, Selection, find_entity_at, find_line_intersections, move_selected};
use crate::storage::{StorageError, load_document, save_document};
use crate::stroke::{Stroke, StrokeEngine, StrokeError, regen_stroke};
use crate::text::{self, TextEditor, TextEntity, regen_text};
use kurbo::{Line, Point, Rect, Size};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that makes up a drawing.
#[derive(Debug, Clone)]
pub struct CanvasDocument<T> {
    /// Strokes in drawing order (oldest first).
    pub strokes: Vec<Stroke<T>>,
    /// Texts in creation order (oldest first).
    pub texts: Vec<TextEntity<T>>,
    pub camera: Camera,
}

impl<T> Default for CanvasDocument<T> {
    fn default() -> Self {
        Self {
            strokes: Vec::new(),
            texts: Vec::new(),
            camera: Camera::default(),
        }
    }
}

impl<T> CanvasDocument<T> {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the document has no entities.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.texts.is_empty()
    }

    /// Remove every entity and reset the camera.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.texts.clear();
        self.camera.reset();
    }

    /// Swap-remove strokes by index and return the fixed-up selection.
    ///
    /// `indices` must be sorted descending.
    pub fn erase_strokes(&mut self, indices: &[usize], mut selection: Selection) -> Selection {
        for &index in indices {
            let old_len = self.strokes.len();
            if index >= old_len {
                continue;
            }
            self.strokes.swap_remove(index);
            selection = selection.after_swap_remove(EntityKind::Stroke, index, old_len);
        }
        selection
    }

    /// Swap-remove a text and return the fixed-up selection.
    pub fn remove_text(&mut self, index: usize, selection: Selection) -> Selection {
        let old_len = self.texts.len();
        if index >= old_len {
            return selection;
        }
        self.texts.swap_remove(index);
        selection.after_swap_remove(EntityKind::Text, index, old_len)
    }
}

/// Which text the keyboard edits while typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    /// The editor's draft, not yet part of the document.
    Draft,
    /// A text already in the document.
    Placed(usize),
}

/// Interaction mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Painting,
    Selecting,
    Typing(TextTarget),
}

/// Source of file paths for save and load requests, usually a native dialog.
pub trait FilePicker {
    fn pick_save_path(&mut self) -> Option<PathBuf>;
    fn pick_load_path(&mut self) -> Option<PathBuf>;
}

/// Picker that never offers a path; only a cached quicksave path can be used.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFilePicker;

impl FilePicker for NoFilePicker {
    fn pick_save_path(&mut self) -> Option<PathBuf> {
        None
    }

    fn pick_load_path(&mut self) -> Option<PathBuf> {
        None
    }
}

/// Canvas errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No file was chosen")]
    NoPath,
}

/// Outcome of rebuilding rasters from vector data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenReport {
    pub strokes: usize,
    pub texts: usize,
    /// Strokes whose radius rounds below one device pixel; they keep their
    /// previous raster, or none after a load.
    pub degenerate: Vec<usize>,
    /// Strokes whose raster would exceed the texture limits at this scale.
    pub oversized: Vec<usize>,
}

impl RegenReport {
    /// Number of strokes left without a fresh raster.
    pub fn skipped(&self) -> usize {
        self.degenerate.len() + self.oversized.len()
    }
}

/// One thing to draw, in screen coordinates.
#[derive(Debug)]
pub enum SceneItem<'a, T> {
    /// A raster stretched into `dest`.
    Texture { texture: &'a T, dest: Rect },
    /// Outline around the selected entity.
    SelectionOutline(Rect),
    /// Preview of an erase sweep.
    EraseGuide(Line),
}

/// Draw list for one frame, back to front.
#[derive(Debug)]
pub struct Scene<'a, T> {
    pub items: Vec<SceneItem<'a, T>>,
}

/// Rebuild every raster at `scale`.
pub fn regen_entities<B: RasterBackend>(
    backend: &mut B,
    strokes: &mut [Stroke<B::Texture>],
    texts: &mut [TextEntity<B::Texture>],
    scale: f64,
) -> RegenReport {
    let mut report = RegenReport::default();
    for (index, stroke) in strokes.iter_mut().enumerate() {
        match regen_stroke(backend, stroke, scale) {
            Ok(()) => report.strokes += 1,
            Err(e @ StrokeError::DegenerateRadius { .. }) => {
                log::warn!("Skipping stroke {index}: {e}");
                report.degenerate.push(index);
            }
            Err(e) => {
                log::warn!("Skipping stroke {index}: {e}");
                report.oversized.push(index);
            }
        }
    }
    for text in texts.iter_mut() {
        regen_text(backend, text);
        report.texts += 1;
    }
    report
}

/// Routes input to the stroke engine, text editor and selection, and owns
/// the document they edit.
pub struct CanvasController<B: RasterBackend> {
    backend: B,
    picker: Box<dyn FilePicker>,
    config: CanvasConfig,
    document: CanvasDocument<B::Texture>,
    mode: Mode,
    stroke_engine: StrokeEngine<B::Texture>,
    editor: TextEditor<B::Texture>,
    selection: Selection,
    input: InputState,
    /// Brush radius in world units at scale 1; the device radius follows the zoom.
    radius: u32,
    color: InkColor,
    /// Erase sweep start in world coordinates.
    erase_anchor: Option<Point>,
    /// Erase sweep end in screen coordinates, for the guide.
    erase_end: Option<Point>,
    save_path: Option<PathBuf>,
    viewport: Size,
}

impl<B: RasterBackend> CanvasController<B> {
    pub fn new(backend: B, picker: Box<dyn FilePicker>, config: CanvasConfig, viewport: Size) -> Self {
        let radius = config.clamp_radius(config.default_radius);
        let color = config.default_color;
        Self {
            backend,
            picker,
            config,
            document: CanvasDocument::new(),
            mode: Mode::default(),
            stroke_engine: StrokeEngine::new(),
            editor: TextEditor::new(),
            selection: Selection::NONE,
            input: InputState::new(),
            radius,
            color,
            erase_anchor: None,
            erase_end: None,
            save_path: None,
            viewport,
        }
    }

    pub fn document(&self) -> &CanvasDocument<B::Texture> {
        &self.document
    }

    pub fn camera(&self) -> &Camera {
        &self.document.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.document.camera
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn editor(&self) -> &TextEditor<B::Texture> {
        &self.editor
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke_engine.is_active()
    }

    /// Brush radius setting, in the configured range.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Brush radius in device pixels at the current zoom, at least one.
    pub fn device_radius(&self) -> u32 {
        let radius = (f64::from(self.radius) * self.document.camera.scale()).round();
        radius.clamp(1.0, f64::from(u16::MAX)) as u32
    }

    pub fn color(&self) -> InkColor {
        self.color
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Path used by quicksave, once one is known.
    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Feed one input event through the general handler and then the
    /// handler of the current mode.
    pub fn handle_event(&mut self, event: CanvasEvent) -> Result<(), CanvasError> {
        self.input.observe(&event);
        self.handle_general(&event)?;

        match self.mode {
            Mode::Painting => self.handle_painting(&event),
            Mode::Selecting => self.handle_selecting(&event),
            Mode::Typing(target) => self.handle_typing(target, &event),
        }
        Ok(())
    }

    /// Switch mode, discarding an unfinished stroke or flushing the draft text.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }

        match self.mode {
            Mode::Painting => {
                if self.stroke_engine.cancel() {
                    log::debug!("Discarded unfinished stroke on mode change");
                }
                self.erase_anchor = None;
                self.erase_end = None;
            }
            Mode::Selecting => {}
            Mode::Typing(target) => self.finish_typing(target),
        }

        log::debug!("Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    /// Drop every entity and all transient state.
    pub fn new_document(&mut self) {
        self.input.release_all();
        self.stroke_engine.cancel();
        self.editor.discard();
        self.document.clear();
        self.selection = Selection::NONE;
        self.erase_anchor = None;
        self.erase_end = None;
        if matches!(self.mode, Mode::Typing(_)) {
            self.mode = Mode::Selecting;
        }
    }

    /// Re-rasterize every entity at the current camera scale.
    pub fn regen_all(&mut self) -> RegenReport {
        let scale = self.document.camera.scale();
        regen_entities(
            &mut self.backend,
            &mut self.document.strokes,
            &mut self.document.texts,
            scale,
        )
    }

    /// Write the document to `path`.
    ///
    /// A draft being typed is committed first and stays under the cursor.
    pub fn save_to(&mut self, path: &Path) -> Result<(), CanvasError> {
        self.commit_draft();
        save_document(&self.document, path)?;
        Ok(())
    }

    fn commit_draft(&mut self) {
        if self.mode != Mode::Typing(TextTarget::Draft) {
            return;
        }
        if !self.editor.draft().is_some_and(|d| d.texture.is_some()) {
            return;
        }
        if let Some(index) = self.editor.flush_text(&mut self.document.texts) {
            self.selection = Selection::text(index);
            self.mode = Mode::Typing(TextTarget::Placed(index));
        }
    }

    /// Replace the document with the contents of `path`.
    ///
    /// The file is parsed and validated and its rasters rebuilt before
    /// anything live changes; on error the current document is untouched.
    /// The camera is kept.
    pub fn load_from(&mut self, path: &Path) -> Result<RegenReport, CanvasError> {
        let record = load_document(path).inspect_err(|e| {
            log::warn!("Rejected {}: {}", path.display(), e);
        })?;

        let (mut strokes, mut texts) = record.into_entities();
        let report = regen_entities(
            &mut self.backend,
            &mut strokes,
            &mut texts,
            self.document.camera.scale(),
        );

        self.input.release_all();
        self.stroke_engine.cancel();
        self.editor.discard();
        self.selection = Selection::NONE;
        self.erase_anchor = None;
        self.erase_end = None;
        if matches!(self.mode, Mode::Typing(_)) {
            self.mode = Mode::Selecting;
        }
        self.document.strokes = strokes;
        self.document.texts = texts;

        Ok(report)
    }

    /// Build the draw list for the current frame.
    pub fn scene(&self) -> Scene<'_, B::Texture> {
        let camera = &self.document.camera;
        let mut items = Vec::new();

        for stroke in &self.document.strokes {
            if let Some(texture) = &stroke.texture {
                items.push(SceneItem::Texture {
                    texture,
                    dest: camera.world_screen_rect(stroke.placement),
                });
            }
        }
        let placed = self.document.texts.iter();
        for text in placed.chain(self.editor.draft()) {
            if let Some(texture) = &text.texture {
                items.push(SceneItem::Texture {
                    texture,
                    dest: camera.world_screen_rect(text.placement),
                });
            }
        }

        if let Some(capture) = self.stroke_engine.capture() {
            items.push(SceneItem::Texture {
                texture: &capture.texture,
                dest: Rect::from_origin_size(Point::ZERO, self.backend.texture_size(&capture.texture)),
            });
        }

        if let Some(rect) = self.selection.resolve_rect(&self.document) {
            items.push(SceneItem::SelectionOutline(camera.world_screen_rect(rect)));
        }

        if let (Some(anchor), Some(end)) = (self.erase_anchor, self.erase_end) {
            items.push(SceneItem::EraseGuide(Line::new(camera.world_screen(anchor), end)));
        }

        Scene { items }
    }

    fn handle_general(&mut self, event: &CanvasEvent) -> Result<(), CanvasError> {
        match *event {
            CanvasEvent::PointerMove { delta, .. } if self.input.is_button_pressed(MouseButton::Middle) => {
                if self.stroke_engine.is_active() {
                    return Ok(());
                }
                self.document.camera.translate(delta);
            }
            CanvasEvent::Wheel { position, delta } => {
                if self.stroke_engine.is_active() {
                    log::debug!("Ignoring zoom while a stroke is being drawn");
                    return Ok(());
                }
                let factor = 1.0 + delta / self.config.zoom_step;
                self.document.camera.zoom(factor, position);
                self.regen_drifted_strokes();
            }
            CanvasEvent::Command(command) => self.handle_command(command)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_command(&mut self, command: Command) -> Result<(), CanvasError> {
        match command {
            Command::Draw => self.set_mode(Mode::Painting),
            Command::Select => self.set_mode(Mode::Selecting),
            Command::Type => {
                if !matches!(self.mode, Mode::Typing(_)) {
                    self.set_mode(Mode::Typing(TextTarget::Draft));
                    let position = self.document.camera.screen_world(self.input.pointer_position);
                    self.editor.start_new_text(position, self.document.camera.scale());
                }
            }
            Command::Save => self.save_as()?,
            Command::QuickSave => match self.save_path.clone() {
                Some(path) => self.save_to(&path)?,
                None => self.save_as()?,
            },
            Command::Load => {
                let path = self.picker.pick_load_path().ok_or(CanvasError::NoPath)?;
                self.load_from(&path)?;
                self.save_path = Some(path);
            }
        }
        Ok(())
    }

    fn save_as(&mut self) -> Result<(), CanvasError> {
        let path = self.picker.pick_save_path().ok_or(CanvasError::NoPath)?;
        self.save_to(&path)?;
        self.save_path = Some(path);
        Ok(())
    }

    fn regen_drifted_strokes(&mut self) {
        let Some(ratio) = self.config.regen_zoom_ratio else {
            return;
        };
        let scale = self.document.camera.scale();
        for stroke in &mut self.document.strokes {
            let drift = (scale / stroke.raster_scale).max(stroke.raster_scale / scale);
            if drift > ratio {
                if let Err(e) = regen_stroke(&mut self.backend, stroke, scale) {
                    log::warn!("Keeping old raster: {e}");
                }
            }
        }
    }

    fn handle_painting(&mut self, event: &CanvasEvent) {
        match *event {
            CanvasEvent::PointerDown { position, button: MouseButton::Left } => {
                let radius = self.device_radius();
                self.stroke_engine
                    .start_stroke(&mut self.backend, self.viewport, position, radius, self.color);
            }
            CanvasEvent::PointerDown { position, button: MouseButton::Right } => {
                self.erase_anchor = Some(self.document.camera.screen_world(position));
                self.erase_end = Some(position);
            }
            CanvasEvent::PointerMove { position, .. } => {
                if self.input.is_button_pressed(MouseButton::Left) {
                    self.stroke_engine.continue_stroke(&mut self.backend, position);
                } else if self.input.is_button_pressed(MouseButton::Right) && self.erase_anchor.is_some() {
                    self.erase_end = Some(position);
                }
            }
            CanvasEvent::PointerUp { button: MouseButton::Left, .. } => {
                if let Some(stroke) = self.stroke_engine.finalize_stroke(&mut self.backend, &self.document.camera) {
                    self.document.strokes.push(stroke);
                }
            }
            CanvasEvent::PointerUp { position, button: MouseButton::Right } => {
                self.erase_end = None;
                if let Some(anchor) = self.erase_anchor.take() {
                    let end = self.document.camera.screen_world(position);
                    self.erase_sweep(Line::new(anchor, end));
                }
            }
            CanvasEvent::Key(Key::Up) => {
                self.radius = self.config.clamp_radius(self.radius.saturating_add(1));
            }
            CanvasEvent::Key(Key::Down) => {
                self.radius = self.config.clamp_radius(self.radius.saturating_sub(1));
            }
            CanvasEvent::Key(Key::Char(key)) => {
                if let Some(color) = self.config.palette_color(key) {
                    self.color = color;
                }
            }
            _ => {}
        }
    }

    fn erase_sweep(&mut self, sweep: Line) {
        let hits = find_line_intersections(&self.document.strokes, sweep);
        if hits.is_empty() {
            return;
        }
        log::debug!("Erasing {} strokes", hits.len());
        self.selection = self.document.erase_strokes(&hits, self.selection);
    }

    fn handle_selecting(&mut self, event: &CanvasEvent) {
        match *event {
            CanvasEvent::PointerDown { position, button: MouseButton::Left } => {
                let world = self.document.camera.screen_world(position);
                let hit = find_entity_at(world, &self.document.strokes, &self.document.texts);
                self.selection = hit;

                if !self.input.is_double_click() {
                    return;
                }
                match hit.kind {
                    EntityKind::Text => self.set_mode(Mode::Typing(TextTarget::Placed(hit.index))),
                    EntityKind::None => {
                        self.set_mode(Mode::Typing(TextTarget::Draft));
                        self.editor.start_new_text(world, self.document.camera.scale());
                    }
                    EntityKind::Stroke => {}
                }
            }
            CanvasEvent::PointerMove { delta, .. } if self.input.is_button_pressed(MouseButton::Left) => {
                move_selected(&mut self.document, self.selection, delta);
            }
            CanvasEvent::Key(Key::Delete) => self.remove_selected(),
            CanvasEvent::Key(Key::Backspace) => {
                if let Some(index) = self.selection.text_index() {
                    self.edit_placed(index, None);
                }
            }
            CanvasEvent::Key(Key::Enter) => {
                if let Some(index) = self.selection.text_index() {
                    self.edit_placed(index, Some('\n'));
                }
            }
            CanvasEvent::TextInput(ch) => {
                if let Some(index) = self.selection.text_index() {
                    self.edit_placed(index, Some(ch));
                }
            }
            _ => {}
        }
    }

    fn remove_selected(&mut self) {
        match self.selection.kind {
            EntityKind::Stroke => {
                self.selection = self.document.erase_strokes(&[self.selection.index], self.selection);
            }
            EntityKind::Text => {
                self.selection = self.document.remove_text(self.selection.index, self.selection);
            }
            EntityKind::None => {}
        }
    }

    /// Append `ch` to a placed text, or remove its last character on `None`.
    fn edit_placed(&mut self, index: usize, ch: Option<char>) {
        let Some(entry) = self.document.texts.get_mut(index) else {
            return;
        };
        match ch {
            Some(ch) => text::add_character(&mut self.backend, entry, ch),
            None => text::remove_character(&mut self.backend, entry),
        }
    }

    fn handle_typing(&mut self, target: TextTarget, event: &CanvasEvent) {
        match *event {
            CanvasEvent::TextInput(ch) => self.type_character(target, Some(ch)),
            CanvasEvent::Key(Key::Enter) => self.type_character(target, Some('\n')),
            CanvasEvent::Key(Key::Backspace) => self.type_character(target, None),
            CanvasEvent::Key(Key::Escape) => self.set_mode(Mode::Selecting),
            CanvasEvent::Key(Key::Delete) => {
                match target {
                    TextTarget::Draft => {
                        self.editor.discard();
                    }
                    TextTarget::Placed(index) => {
                        self.selection = self.document.remove_text(index, self.selection);
                    }
                }
                // Nothing is left to flush.
                self.mode = Mode::Selecting;
            }
            CanvasEvent::PointerDown { button: MouseButton::Left, .. } => {
                self.set_mode(Mode::Selecting);
                self.handle_selecting(event);
            }
            _ => {}
        }
    }

    fn type_character(&mut self, target: TextTarget, ch: Option<char>) {
        match target {
            TextTarget::Draft => {
                if !self.editor.is_active() {
                    let position = self.document.camera.screen_world(self.input.pointer_position);
                    self.editor.start_new_text(position, self.document.camera.scale());
                }
                match ch {
                    Some(ch) => self.editor.add_character(&mut self.backend, ch),
                    None => self.editor.remove_character(&mut self.backend),
                }
            }
            TextTarget::Placed(index) => self.edit_placed(index, ch),
        }
    }

    fn finish_typing(&mut self, target: TextTarget) {
        match target {
            TextTarget::Draft => {
                if let Some(index) = self.editor.flush_text(&mut self.document.texts) {
                    self.selection = Selection::text(index);
                }
            }
            TextTarget::Placed(index) => {
                // Backspacing a text down to nothing deletes it.
                if self.document.texts.get(index).is_some_and(|t| t.is_empty()) {
                    self.selection = self.document.remove_text(index, self.selection);
                }
            }
        }
    }
}
