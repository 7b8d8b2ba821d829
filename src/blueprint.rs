//! Blueprint construction: packaging a directory tree into a flat
//! mapping of relative file path to file text content.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

/// Snapshot mapping of relative file path to file text content.
///
/// Keys are unique by construction (file-system paths are unique) and
/// iterate in lexicographic order, which matches the sorted traversal
/// order of the source tree.
pub type Blueprint = BTreeMap<String, String>;

/// Recursively read files under `folder` and return a mapping of
/// relative path to content.
///
/// Each key is the file's path relative to the *parent* of `folder`,
/// so the folder's own name is the first path segment, with `/`
/// separators regardless of the host platform. Files that do not
/// decode as UTF-8 are skipped entirely. A missing or non-directory
/// path yields an empty mapping rather than an error.
pub fn build_blueprint(folder: &Path) -> Blueprint {
    let mut blueprint = Blueprint::new();
    if !folder.is_dir() {
        return blueprint;
    }
    let base = folder.parent().unwrap_or(folder);
    // Symlinks are not followed, so a linked directory cycle cannot
    // recurse.
    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match entry.path().strip_prefix(base) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match fs::read_to_string(entry.path()) {
            Ok(text) => {
                blueprint.insert(key, text);
            }
            Err(e) => {
                // Binary or otherwise unreadable file: skip it.
                debug!("Skipping {}: {}", entry.path().display(), e);
            }
        }
    }
    blueprint
}

/// Serialize a blueprint as the committed JSON document: 2-space
/// indentation, non-ASCII characters preserved literally, keys in map
/// iteration order.
pub fn serialize_blueprint(blueprint: &Blueprint) -> String {
    serde_json::to_string_pretty(blueprint).unwrap_or_else(|_| "{}".to_string())
}
