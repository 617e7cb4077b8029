//! Shared building blocks for lightdeck: settings, the error taxonomy,
//! color conversion, and the built-in scene catalog.

pub mod color;
pub mod config;
pub mod error;
pub mod scenes;

pub use color::Hsbk;
pub use error::Error;
pub use scenes::{Directive, Scene, SceneCatalog};
