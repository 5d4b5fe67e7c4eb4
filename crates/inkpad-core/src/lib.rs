//! Inkpad Core Library
//!
//! Canvas engine for the Inkpad freehand drawing surface: camera, stroke
//! capture and regeneration, hit-testing, text editing, the input mode
//! state machine and document persistence. Pixels are produced through the
//! [`raster::RasterBackend`] trait, so this crate has no rendering dependencies.

pub mod camera;
pub mod canvas;
pub mod color;
pub mod config;
pub mod input;
pub mod raster;
pub mod selection;
pub mod storage;
pub mod stroke;
pub mod text;

pub use camera::Camera;
pub use canvas::{
    CanvasController, CanvasDocument, CanvasError, FilePicker, Mode, NoFilePicker, RegenReport,
    Scene, SceneItem, TextTarget,
};
pub use color::InkColor;
pub use config::CanvasConfig;
pub use input::{CanvasEvent, Command, InputState, Key, MouseButton};
pub use raster::RasterBackend;
pub use selection::{EntityKind, Selection};
pub use storage::StorageError;
pub use stroke::{Stroke, StrokeEngine, StrokeError};
pub use text::{TextEditor, TextEntity};
