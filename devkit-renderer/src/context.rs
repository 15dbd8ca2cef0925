//! Template context: serializable rendering payload built from a [`RepoSlug`].

use serde::{Deserialize, Serialize};

use devkit_core::types::RepoSlug;

use crate::error::RenderError;

/// Variables visible to the CI descriptor template.
///
/// `github_url` is the only variable the shipped skeleton relies on; `owner`
/// and `repository` are exposed for custom skeletons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    /// Canonical clone URL, `https://github.com/<owner>/<repo>.git`.
    pub github_url: String,
    pub owner: String,
    pub repository: String,
}

impl TemplateContext {
    pub fn from_slug(slug: &RepoSlug) -> Self {
        Self {
            github_url: slug.github_url(),
            owner: slug.owner.0.clone(),
            repository: slug.name.0.clone(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
