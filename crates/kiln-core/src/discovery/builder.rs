//! Command set construction and merging.
//!
//! [`CommandSetBuilder`] folds loaded commands into a [`CommandSet`],
//! electing the first command of each group as the group default.
//! [`merge`] combines the built-in and installed sets with installed
//! commands taking precedence on key collision.

use super::loader::{ModuleLoader, Result};
use crate::command::CommandSet;
use std::path::PathBuf;

/// Folds command paths into a [`CommandSet`].
pub struct CommandSetBuilder;

impl CommandSetBuilder {
    /// Loads every path in order and builds the set. The first command
    /// loaded for a group becomes its default. Any path failing to
    /// load fails the whole pass; a malformed plugin indicates a
    /// broken install, so no partial set is used.
    pub fn build<L: ModuleLoader>(paths: &[PathBuf], loader: &mut L) -> Result<CommandSet> {
        let mut set = CommandSet::new();
        for path in paths {
            let mut command = loader.load(path)?;
            if !set.has_group(&command.group) {
                command.is_default = true;
            }
            set.insert(command);
        }
        Ok(set)
    }
}

/// Merges the built-in and installed sets.
///
/// Installed commands win on key collision (a user can shadow a
/// built-in such as `version`); groups present in only one source pass
/// through unchanged. Implemented as built-in base with the installed
/// set applied on top, so the last-applied source is the installed
/// layer. Defaults are re-normalized afterwards: if both sources
/// elected a default for the same group, the installed one stands.
pub fn merge(built_in: &CommandSet, installed: &CommandSet) -> CommandSet {
    let mut merged = built_in.clone();
    merged.overlay(installed);
    merged.normalize_defaults();
    merged
}
