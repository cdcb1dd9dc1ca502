//! Plugin module loading.
//!
//! [`ModuleLoader`] is the seam between the impure load mechanism and
//! the pure naming logic: [`ManifestLoader`] reads TOML manifests from
//! disk, [`BuiltinLoader`] serves the compiled-in registry, and both
//! share the stem parsing and per-pass name disambiguation below.

use crate::builtin;
use crate::command::{Alias, Command, OptionDecl, BUILTIN_PATH};
use crate::discovery::template::TemplateHandler;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Plugin load errors. Any one of these fails the whole discovery
/// pass containing the offending path.
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O error reading a plugin module.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest did not deserialize against the command schema.
    #[error("invalid command manifest at {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// The module name does not match `<prefix>-<group>-<subtype>`.
    #[error("plugin name '{0}' does not match the <prefix>-<group>-<subtype> pattern")]
    BadName(String),

    /// A search-root pattern failed to compile.
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A sentinel path does not name a compiled-in command.
    #[error("unknown built-in command: {0}")]
    UnknownBuiltin(String),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Parses a plugin module stem into `(group, subtype)`.
///
/// The stem must be `<prefix>-<group>-<subtype>`; the subtype may
/// itself contain dashes (`kiln-build-webpack-legacy` parses as group
/// `build`, subtype `webpack-legacy`).
pub fn parse_plugin_stem(stem: &str, prefix: &str) -> Option<(String, String)> {
    let rest = stem.strip_prefix(prefix)?.strip_prefix('-')?;
    let (group, subtype) = rest.split_once('-')?;
    if group.is_empty() || subtype.is_empty() {
        return None;
    }
    Some((group.to_string(), subtype.to_string()))
}

/// Per-pass command name disambiguation.
///
/// Two plugins declaring the same subtype in one discovery pass get
/// strictly increasing `-1`, `-2`, … suffixes; a chosen name is
/// recorded before it is handed out, so a suffix is never reused.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name`, or the first free suffixed variant of it.
    pub fn claim(&mut self, name: &str) -> String {
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{}-{}", name, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Loads one module at a resolved path into a normalized [`Command`].
pub trait ModuleLoader {
    fn load(&mut self, path: &Path) -> Result<Command>;
}

/// Strict manifest schema for installed command plugins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CommandManifest {
    description: String,
    template: String,
    version: Option<String>,
    #[serde(default)]
    options: IndexMap<String, OptionDecl>,
    #[serde(default)]
    aliases: Vec<Alias>,
}

/// Loads installed command plugins from TOML manifests.
#[derive(Debug)]
pub struct ManifestLoader {
    prefix: String,
    global_root: Option<PathBuf>,
    names: NameRegistry,
}

impl ManifestLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), global_root: None, names: NameRegistry::new() }
    }

    /// Marks commands found under `root` as globally installed.
    pub fn with_global_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.global_root = Some(root.into());
        self
    }
}

impl ModuleLoader for ManifestLoader {
    fn load(&mut self, path: &Path) -> Result<Command> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LoadError::BadName(path.display().to_string()))?;
        let (group, subtype) = parse_plugin_stem(stem, &self.prefix)
            .ok_or_else(|| LoadError::BadName(stem.to_string()))?;

        let raw = fs::read_to_string(path)?;
        let mut manifest: CommandManifest =
            toml::from_str(&raw).map_err(|e| LoadError::Manifest {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        for (key, decl) in &mut manifest.options {
            decl.key.clone_from(key);
        }

        let name = self.names.claim(&subtype);
        let global = self.global_root.as_ref().is_some_and(|root| path.starts_with(root));
        let handler = TemplateHandler::new(manifest.template, manifest.options);

        let mut command =
            Command::new(group, name, manifest.description, path.display().to_string())
                .with_handler(Arc::new(handler))
                .with_aliases(manifest.aliases)
                .with_global(global);
        if let Some(version) = manifest.version {
            command = command.with_version(version);
        }
        Ok(command)
    }
}

/// Serves the compiled-in command registry through the same seam as
/// installed plugins, addressed by `<built-in>/<prefix>-<group>-<subtype>`
/// sentinel paths.
#[derive(Debug)]
pub struct BuiltinLoader {
    prefix: String,
    names: NameRegistry,
}

impl BuiltinLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), names: NameRegistry::new() }
    }

    /// Sentinel paths for every compiled-in command, in registration
    /// order.
    pub fn paths(&self) -> Vec<PathBuf> {
        builtin::specs()
            .iter()
            .map(|spec| {
                PathBuf::from(format!(
                    "{}/{}-{}-{}",
                    BUILTIN_PATH, self.prefix, spec.group, spec.name
                ))
            })
            .collect()
    }
}

impl ModuleLoader for BuiltinLoader {
    fn load(&mut self, path: &Path) -> Result<Command> {
        let stem = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LoadError::BadName(path.display().to_string()))?;
        let (group, subtype) = parse_plugin_stem(stem, &self.prefix)
            .ok_or_else(|| LoadError::BadName(stem.to_string()))?;

        let spec = builtin::specs()
            .iter()
            .find(|spec| spec.group == group && spec.name == subtype)
            .ok_or_else(|| LoadError::UnknownBuiltin(stem.to_string()))?;

        let name = self.names.claim(&subtype);
        Ok(Command::new(group, name, spec.description, BUILTIN_PATH)
            .with_handler((spec.factory)())
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_global(true))
    }
}
