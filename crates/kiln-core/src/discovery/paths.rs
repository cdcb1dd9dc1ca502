//! Search-path resolution for plugin discovery.
//!
//! Pure glob-pattern construction plus the filesystem expansion step.
//! Output order matches input order; the first-loaded command in a
//! group keeps the bare subtype name and becomes the group default,
//! so earlier roots take priority.

use super::loader::{LoadError, Result};
use std::path::PathBuf;

/// Produces one glob pattern per search root: `<root>/<prefix>-*`.
pub fn resolve(search_paths: &[PathBuf], prefix: &str) -> Vec<String> {
    search_paths
        .iter()
        .map(|root| root.join(format!("{}-*", prefix)).to_string_lossy().into_owned())
        .collect()
}

/// Expands glob patterns into candidate plugin paths, pattern by
/// pattern, preserving pattern order.
pub fn enumerate(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(|e| LoadError::Io(e.into_error()))?;
            if path.is_file() {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}
