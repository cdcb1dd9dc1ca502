//! Compiled-in command registry.
//!
//! Built-ins go through the same [`crate::discovery::loader::ModuleLoader`]
//! seam as installed plugins, addressed by sentinel paths, so the
//! discovery pipeline has a single code path.

mod version;

use crate::command::CommandHandler;
use std::sync::Arc;

/// Static description of one compiled-in command.
pub struct BuiltinSpec {
    pub group: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub factory: fn() -> Arc<dyn CommandHandler>,
}

const SPECS: &[BuiltinSpec] = &[BuiltinSpec {
    group: "version",
    name: "show",
    description: "Shows the installed command plugins and their versions",
    factory: version::handler,
}];

/// Every compiled-in command, in registration order.
pub fn specs() -> &'static [BuiltinSpec] {
    SPECS
}
