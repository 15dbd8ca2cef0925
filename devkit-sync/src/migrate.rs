//! Source-layout migration: move package sources under `src/`.
//!
//! Used by `devkit src-migrate`. The skeleton itself is applied by the
//! workflow between [`prepare_layout`] and [`rewrite_composer_autoload`].

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{io_err, SyncError};

pub const COMPOSER_FILE: &str = "composer.json";

/// True for names like `Controller` or `Entity`: one ASCII uppercase letter
/// followed by an ASCII lowercase letter.
fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(second)) if first.is_ascii_uppercase() && second.is_ascii_lowercase()
    )
}

/// Top-level entries that belong under `src/`: package directories and
/// `*.php` files with a package-style name. Sorted.
fn package_entries(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut nodes = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| io_err(root, e))? {
        let entry = entry.map_err(|e| io_err(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_package_name(&name) {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
        if file_type.is_dir() || (file_type.is_file() && name.ends_with(".php")) {
            nodes.push(entry.path());
        }
    }
    nodes.sort();
    Ok(nodes)
}

/// Remove `etc/`, ensure `src/` and `tests/.gitkeep`, and move package
/// entries into `src/`. Returns the new locations of moved entries.
pub fn prepare_layout(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let etc = root.join("etc");
    if etc.exists() {
        std::fs::remove_dir_all(&etc).map_err(|e| io_err(&etc, e))?;
    }

    let src = root.join("src");
    std::fs::create_dir_all(&src).map_err(|e| io_err(&src, e))?;

    let tests = root.join("tests");
    if !tests.exists() {
        std::fs::create_dir_all(&tests).map_err(|e| io_err(&tests, e))?;
        let keep = tests.join(".gitkeep");
        std::fs::write(&keep, b"").map_err(|e| io_err(&keep, e))?;
    }

    let mut moved = Vec::new();
    for node in package_entries(root)? {
        let Some(name) = node.file_name() else { continue };
        let dest = src.join(name);
        if dest.exists() {
            return Err(SyncError::Layout {
                path: dest,
                reason: "already exists under src/".to_string(),
            });
        }
        tracing::info!("move {} in /src", name.to_string_lossy());
        std::fs::rename(&node, &dest).map_err(|e| io_err(&node, e))?;
        moved.push(dest);
    }
    Ok(moved)
}

/// Point the first PSR-4 namespace at `src/` and add `<namespace>Tests\`
/// → `tests/`. Key order of the document is preserved.
pub fn rewrite_composer_autoload(root: &Path) -> Result<(), SyncError> {
    let path = root.join(COMPOSER_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let mut doc: Value = serde_json::from_str(&raw).map_err(|source| SyncError::Composer {
        path: path.clone(),
        source,
    })?;

    let psr4 = psr4_block(&mut doc).ok_or_else(|| SyncError::Layout {
        path: path.clone(),
        reason: "no autoload.psr-4 namespace".to_string(),
    })?;
    let namespace = psr4
        .keys()
        .next()
        .cloned()
        .ok_or_else(|| SyncError::Layout {
            path: path.clone(),
            reason: "autoload.psr-4 is empty".to_string(),
        })?;

    psr4.insert(namespace.clone(), Value::String("src/".to_string()));
    psr4.insert(format!("{namespace}Tests\\"), Value::String("tests/".to_string()));

    let mut out = to_pretty_json(&doc).map_err(|source| SyncError::Composer {
        path: path.clone(),
        source,
    })?;
    out.push('\n');
    std::fs::write(&path, out).map_err(|e| io_err(&path, e))
}

fn psr4_block(doc: &mut Value) -> Option<&mut Map<String, Value>> {
    doc.get_mut("autoload")?.get_mut("psr-4")?.as_object_mut()
}

/// Four-space indented JSON, matching what composer itself writes.
fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
