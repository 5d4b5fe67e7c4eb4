//! Inkpad Application
//!
//! Headless shell around the canvas engine: loads drawings or replays
//! recorded input, and exports the composited canvas as PNG.

mod app;
mod config;

pub use app::{App, FixedPaths};
pub use config::{AppConfig, AppError};
