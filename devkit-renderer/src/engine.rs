//! Tera rendering engine for the skeleton's CI descriptor.
//!
//! The skeleton directory may ship its own `.travis.yml`; when it does, that
//! file is the template. Otherwise the embedded default is used.

use std::path::{Path, PathBuf};

use tera::Tera;

use devkit_core::types::RepoSlug;

use crate::context::TemplateContext;
use crate::error::RenderError;

/// File name of the CI descriptor, relative to the working copy root.
pub const CI_DESCRIPTOR: &str = ".travis.yml";

const CI_TEMPLATE_NAME: &str = "ci/travis.yml.tera";

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const DEFAULT_CI_TEMPLATE: &str = include_str!("templates/travis.yml.tera");

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn load_skeleton_template(skeleton_dir: &Path) -> Result<Option<String>, RenderError> {
    let path = skeleton_dir.join(CI_DESCRIPTOR);
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| io_err(&path, e))
}

fn build_tera(skeleton_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let source = match skeleton_dir {
        Some(dir) => load_skeleton_template(dir)?,
        None => None,
    };
    let source = source.unwrap_or_else(|| DEFAULT_CI_TEMPLATE.to_string());

    let mut tera = Tera::default();
    // Rendered YAML is not HTML; URLs must survive untouched.
    tera.autoescape_on(vec![]);
    tera.add_raw_template(CI_TEMPLATE_NAME, &source)?;
    Ok(tera)
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine rendering the CI descriptor.
///
/// Create once per run with [`TemplateEngine::new`] and reuse for every
/// repository.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`] from the skeleton's `.travis.yml`,
    /// falling back to the embedded default when the skeleton has none.
    pub fn new(skeleton_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(skeleton_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the CI descriptor with a caller-provided [`TemplateContext`].
    pub fn render_ci_descriptor(&self, ctx: &TemplateContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(CI_TEMPLATE_NAME, &tera_ctx)?;
        Ok(normalize_line_endings(&rendered))
    }

    /// Render the CI descriptor for `slug`.
    pub fn render_for(&self, slug: &RepoSlug) -> Result<String, RenderError> {
        self.render_ci_descriptor(&TemplateContext::from_slug(slug))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
