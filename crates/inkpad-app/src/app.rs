//! Headless application shell around the canvas controller.

use crate::config::{AppConfig, AppError};
use image::RgbaImage;
use inkpad_core::{CanvasController, CanvasEvent, FilePicker, RegenReport};
use inkpad_render::{RenderContext, SoftwareRaster, TextFont, compose, save_png, to_rgba_image};
use kurbo::{Point, Rect, Vec2};
use tiny_skia::Pixmap;
use std::fs;
use std::path::{Path, PathBuf};

/// Blank border kept around the content by [`App::fit_to_content`], in pixels.
const FIT_MARGIN: f64 = 16.0;

/// Answers save/load requests with paths given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FixedPaths {
    pub save: Option<PathBuf>,
    pub load: Option<PathBuf>,
}

impl FilePicker for FixedPaths {
    fn pick_save_path(&mut self) -> Option<PathBuf> {
        self.save.clone()
    }

    fn pick_load_path(&mut self) -> Option<PathBuf> {
        self.load.clone()
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    canvas: CanvasController<SoftwareRaster>,
}

impl App {
    /// Create the app. Fails if the configured font cannot be loaded.
    pub fn new(config: AppConfig, picker: Box<dyn FilePicker>) -> Result<Self, AppError> {
        let font = match &config.font {
            Some(path) => TextFont::load(path, config.font_size)?,
            None => TextFont::embedded(config.font_size)?,
        };
        let canvas = CanvasController::new(
            SoftwareRaster::new(font),
            picker,
            config.canvas.clone(),
            config.viewport(),
        );
        Ok(Self { config, canvas })
    }

    pub fn canvas(&self) -> &CanvasController<SoftwareRaster> {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasController<SoftwareRaster> {
        &mut self.canvas
    }

    /// Load a document file into the canvas.
    pub fn open(&mut self, path: &Path) -> Result<RegenReport, AppError> {
        let report = self.canvas.load_from(path)?;
        if !report.degenerate.is_empty() {
            log::warn!("{} strokes are too thin to draw at this zoom", report.degenerate.len());
        }
        if !report.oversized.is_empty() {
            log::warn!("{} strokes are too large to rasterize at this zoom", report.oversized.len());
        }
        Ok(report)
    }

    /// Feed events to the canvas. Failed events are logged and skipped.
    ///
    /// Returns the number of events that failed.
    pub fn replay(&mut self, events: &[CanvasEvent]) -> usize {
        let mut failures = 0;
        for event in events {
            if let Err(e) = self.canvas.handle_event(*event) {
                log::error!("{event:?} failed: {e}");
                failures += 1;
            }
        }
        failures
    }

    /// Read a JSON array of events and replay it.
    pub fn replay_file(&mut self, path: &Path) -> Result<usize, AppError> {
        let json = fs::read_to_string(path)
            .map_err(|e| AppError::Script(format!("Failed to read {}: {}", path.display(), e)))?;
        let events: Vec<CanvasEvent> = serde_json::from_str(&json)
            .map_err(|e| AppError::Script(format!("Failed to parse {}: {}", path.display(), e)))?;
        log::info!("Replaying {} events from {}", events.len(), path.display());
        Ok(self.replay(&events))
    }

    /// Zoom and pan so every entity is visible, then re-rasterize.
    ///
    /// Returns `None` for an empty document.
    pub fn fit_to_content(&mut self) -> Option<RegenReport> {
        let document = self.canvas.document();
        let bounds = document
            .strokes
            .iter()
            .map(|s| s.placement)
            .chain(document.texts.iter().map(|t| t.placement))
            .reduce(|a, b| a.union(b))?;

        let viewport = self.config.viewport();
        let available = Rect::new(FIT_MARGIN, FIT_MARGIN, viewport.width - FIT_MARGIN, viewport.height - FIT_MARGIN);
        let scale = (available.width() / bounds.width().max(1.0))
            .min(available.height() / bounds.height().max(1.0));

        let camera = self.canvas.camera_mut();
        camera.set_scale(scale, Point::ZERO);
        let scale = camera.scale();
        let half_view = Vec2::new(viewport.width, viewport.height) / (2.0 * scale);
        camera.origin = bounds.center() - half_view;

        Some(self.canvas.regen_all())
    }

    fn compose_frame(&self) -> Result<Pixmap, AppError> {
        let ctx = RenderContext::new(self.config.viewport()).with_background(self.config.background_color.into());
        Ok(compose(&self.canvas.scene(), &ctx)?)
    }

    /// Composite the current scene.
    pub fn render_frame(&self) -> Result<RgbaImage, AppError> {
        Ok(to_rgba_image(&self.compose_frame()?))
    }

    /// Composite the current scene and write it as PNG.
    pub fn export_png(&self, path: &Path) -> Result<(), AppError> {
        save_png(&self.compose_frame()?, path)?;
        Ok(())
    }
}
