//! Error types for devkit-renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The CI descriptor template failed to parse or render.
    #[error("CI descriptor template error: {0}")]
    Tera(#[from] tera::Error),

    /// The skeleton's `.travis.yml` exists but could not be read.
    #[error("cannot read CI template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
