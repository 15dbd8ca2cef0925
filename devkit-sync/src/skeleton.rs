//! Skeleton mirroring and CI descriptor rendering.
//!
//! ## `write_if_changed`: hash-gated write
//!
//! 1. SHA-256 hash the new content.
//! 2. SHA-256 hash the file currently on disk (if any).
//! 3. Skip when identical.
//! 4. Write to `<path>.devkit.tmp`.
//! 5. Rename to final path (atomic on POSIX).
//!
//! Mirroring never deletes files that exist only in the working copy.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use devkit_core::types::RepoSlug;
use devkit_renderer::{TemplateEngine, CI_DESCRIPTOR};

use crate::error::{io_err, SyncError};

/// Resources subtree moved for full projects: `src/Resources` → `app/Resources`.
pub const PROJECT_RESOURCES_FROM: &str = "src/Resources";
pub const PROJECT_RESOURCES_TO: &str = "app/Resources";

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write into a working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: content on disk already matches.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

// ---------------------------------------------------------------------------
// write_if_changed
// ---------------------------------------------------------------------------

fn digest(content: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(content);
    hex::encode(h.finalize())
}

fn read_existing(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Write `content` to `path` unless the file already holds the same bytes.
pub(crate) fn write_if_changed(path: &Path, content: &[u8]) -> Result<WriteResult, SyncError> {
    if let Some(existing) = read_existing(path)? {
        if digest(&existing) == digest(content) {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = PathBuf::from(format!("{}.devkit.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Mirroring
// ---------------------------------------------------------------------------

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SyncError> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_name() == ".git" {
            continue;
        }
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Copy every file under `source` into `target`, overriding conflicting
/// files. `skip` lists paths relative to `source` that are left out.
pub fn mirror(source: &Path, target: &Path, skip: &[&Path]) -> Result<Vec<WriteResult>, SyncError> {
    let mut files = Vec::new();
    collect_files(source, &mut files)?;

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let rel = file.strip_prefix(source).unwrap_or(file.as_path());
        if skip.iter().any(|s| *s == rel) {
            continue;
        }
        let content = std::fs::read(&file).map_err(|e| io_err(&file, e))?;
        let dest = target.join(rel);
        let result = write_if_changed(&dest, &content)?;
        sync_permissions(&file, &dest)?;
        results.push(result);
    }
    Ok(results)
}

/// Give `to` the mode of `from`, including when only the mode differs.
#[cfg(unix)]
fn sync_permissions(from: &Path, to: &Path) -> Result<(), SyncError> {
    let wanted = std::fs::metadata(from)
        .map_err(|e| io_err(from, e))?
        .permissions();
    let current = std::fs::metadata(to).map_err(|e| io_err(to, e))?.permissions();
    if current == wanted {
        return Ok(());
    }
    tracing::debug!("mode changed: {}", to.display());
    std::fs::set_permissions(to, wanted).map_err(|e| io_err(to, e))
}
#[cfg(not(unix))]
fn sync_permissions(_from: &Path, _to: &Path) -> Result<(), SyncError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// SkeletonApplier
// ---------------------------------------------------------------------------

/// Applies the shared skeleton to a working copy. No network or VCS access.
pub struct SkeletonApplier {
    skeleton_dir: PathBuf,
    engine: TemplateEngine,
}

impl SkeletonApplier {
    /// Build an applier for `skeleton_dir`. The CI descriptor template is
    /// read from the skeleton once, here.
    pub fn new(skeleton_dir: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let skeleton_dir = skeleton_dir.into();
        if !skeleton_dir.is_dir() {
            return Err(SyncError::SkeletonNotFound { path: skeleton_dir });
        }
        let engine = TemplateEngine::new(Some(&skeleton_dir))?;
        Ok(Self {
            skeleton_dir,
            engine,
        })
    }

    pub fn skeleton_dir(&self) -> &Path {
        &self.skeleton_dir
    }

    /// Mirror the skeleton into `root`, then write the CI descriptor rendered
    /// with `github_url` bound to the canonical URL of `slug`.
    pub fn apply(&self, root: &Path, slug: &RepoSlug) -> Result<Vec<WriteResult>, SyncError> {
        let mut results = mirror(&self.skeleton_dir, root, &[Path::new(CI_DESCRIPTOR)])?;

        let rendered = self.engine.render_for(slug)?;
        results.push(write_if_changed(&root.join(CI_DESCRIPTOR), rendered.as_bytes())?);

        let written = results.iter().filter(|r| r.is_written()).count();
        tracing::info!(
            "skeleton applied to {slug} ({written} written, {} unchanged)",
            results.len() - written
        );
        Ok(results)
    }
}

/// Move `src/Resources` to `app/Resources` inside a project working copy.
///
/// A working copy without `src/Resources` is left untouched.
pub fn relocate_project_resources(root: &Path) -> Result<Vec<WriteResult>, SyncError> {
    let from = root.join(PROJECT_RESOURCES_FROM);
    if !from.is_dir() {
        tracing::debug!("no {} in {}", PROJECT_RESOURCES_FROM, root.display());
        return Ok(vec![]);
    }
    let results = mirror(&from, &root.join(PROJECT_RESOURCES_TO), &[])?;
    std::fs::remove_dir_all(&from).map_err(|e| io_err(&from, e))?;
    tracing::info!(
        "moved {} to {} ({} files)",
        PROJECT_RESOURCES_FROM,
        PROJECT_RESOURCES_TO,
        results.len()
    );
    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
