//! Shared utility functions for tree walking

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// Join a child name onto a root-relative parent path.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Directories before everything else, then names by raw bytes.
pub fn compare_entries(a_is_dir: bool, a: &OsStr, b_is_dir: bool, b: &OsStr) -> Ordering {
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| a.as_encoded_bytes().cmp(b.as_encoded_bytes()))
}

/// Display name for the scan root: the last component of its resolved path.
pub fn root_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| root.display().to_string())
}

/// Express `path` relative to `root` with `/` separators, if it lies inside.
///
/// `path` need not exist yet; only its parent directory is resolved.
pub fn relative_within(root: &Path, path: &Path) -> Option<String> {
    let root = root.canonicalize().ok()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let full = parent.canonicalize().ok()?.join(path.file_name()?);
    let relative = full.strip_prefix(&root).ok()?;

    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}
