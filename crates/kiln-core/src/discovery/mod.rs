//! Command discovery.
//!
//! Built-in and installed discovery run as two independent async
//! passes; their results are merged deterministically (installed wins
//! on collision) regardless of which pass completed first.

pub mod builder;
pub mod loader;
pub mod paths;
pub mod template;

use crate::command::CommandSet;
use builder::CommandSetBuilder;
use loader::{BuiltinLoader, ManifestLoader, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Discovery options.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Plugin manifest search roots. Earlier roots win the bare
    /// command name and the group default.
    pub search_paths: Vec<PathBuf>,

    /// Plugin name prefix (`<prefix>-<group>-<subtype>`).
    pub prefix: String,

    /// Commands found under this root are marked globally installed.
    pub global_root: Option<PathBuf>,
}

impl DiscoveryOptions {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { search_paths: Vec::new(), prefix: prefix.into(), global_root: None }
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn with_global_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.global_root = Some(root.into());
        self
    }
}

/// Runs the built-in and installed discovery passes and merges them.
pub async fn discover(options: &DiscoveryOptions) -> Result<CommandSet> {
    let built_in_pass = async {
        let mut loader = BuiltinLoader::new(&options.prefix);
        let paths = loader.paths();
        CommandSetBuilder::build(&paths, &mut loader)
    };
    let installed_pass = async {
        let patterns = paths::resolve(&options.search_paths, &options.prefix);
        let candidates = paths::enumerate(&patterns)?;
        let mut loader = ManifestLoader::new(&options.prefix);
        if let Some(root) = &options.global_root {
            loader = loader.with_global_root(root);
        }
        CommandSetBuilder::build(&candidates, &mut loader)
    };

    let (built_in, installed) = tokio::join!(built_in_pass, installed_pass);
    Ok(builder::merge(&built_in?, &installed?))
}

/// Process-scoped memo of the merged command set.
///
/// Discovery runs once per process; callers hold the cache and call
/// [`DiscoveryCache::reset`] when the install surface changed under
/// them (mainly useful in tests and long-lived hosts).
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    cached: Option<Arc<CommandSet>>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached set, running discovery on first use.
    pub async fn get_or_discover(&mut self, options: &DiscoveryOptions) -> Result<Arc<CommandSet>> {
        if let Some(set) = &self.cached {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(discover(options).await?);
        self.cached = Some(Arc::clone(&set));
        Ok(set)
    }

    /// Drops the memoized set so the next lookup re-discovers.
    pub fn reset(&mut self) {
        self.cached = None;
    }
}

/// Convenience for hosts assembling default search roots: project
/// commands directory under `project_root`, if it exists.
pub fn project_commands_dir(project_root: &Path) -> PathBuf {
    project_root.join(".kiln").join("commands")
}
