#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod data;
pub mod designs;
pub mod error;
pub mod item;
pub mod layout;
pub mod padding;
pub mod render;
pub mod scene;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use designs::{compose, render_infographic, render_template};
pub use error::{RenderError, Result};
pub use render::{Document, InfographicOptions, Renderer, to_svg};
