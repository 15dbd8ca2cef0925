//! # devkit-renderer
//!
//! Tera-based engine that renders the skeleton's CI descriptor for one
//! repository of the fleet.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use devkit_core::types::RepoSlug;
//! use devkit_renderer::TemplateEngine;
//!
//! fn render(slug: &RepoSlug) {
//!     if let Ok(engine) = TemplateEngine::new(None) {
//!         if let Ok(travis) = engine.render_for(slug) {
//!             println!("{} bytes", travis.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{TemplateEngine, CI_DESCRIPTOR};
pub use error::RenderError;
