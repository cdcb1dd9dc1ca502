//! Per-invocation helper context.
//!
//! Every `register`/`run` call receives a [`Helper`]: it lets a command
//! invoke or probe other commands through the shared [`CommandSet`],
//! read and write its own slice of the persisted configuration, and
//! exchange free-form data with other commands dispatched in the same
//! invocation tree.

use crate::args::ParsedArgs;
use crate::command::{CommandSet, RunError, RunResult};
use crate::config::{ConfigError, ConfigStore};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// Context bag shared across one dispatch tree.
type ContextBag = Arc<Mutex<Map<String, Value>>>;

/// Command-facing invocation context.
#[derive(Clone)]
pub struct Helper {
    set: Arc<CommandSet>,
    config: Arc<Mutex<ConfigStore>>,
    context: ContextBag,
    command_key: String,
}

impl Helper {
    /// Creates a fresh helper for a dispatch rooted at `command_key`.
    pub fn new(
        set: Arc<CommandSet>,
        config: Arc<Mutex<ConfigStore>>,
        command_key: impl Into<String>,
    ) -> Self {
        Self {
            set,
            config,
            context: Arc::new(Mutex::new(Map::new())),
            command_key: command_key.into(),
        }
    }

    /// Derives a helper for a nested command invocation. The context
    /// bag is shared; the configuration scope moves to the new key.
    fn for_command(&self, command_key: String) -> Self {
        Self {
            set: Arc::clone(&self.set),
            config: Arc::clone(&self.config),
            context: Arc::clone(&self.context),
            command_key,
        }
    }

    /// The command set this dispatch was registered from.
    pub fn command_set(&self) -> &CommandSet {
        &self.set
    }

    /// Composite key of the command this helper is scoped to.
    pub fn command_key(&self) -> &str {
        &self.command_key
    }

    /// True when `(group, command)` resolves to a registered command.
    pub fn exists(&self, group: &str, command: Option<&str>) -> bool {
        self.set.resolve(group, command).is_some()
    }

    /// Invokes another command, sharing this dispatch's context bag.
    pub async fn run(
        &self,
        group: &str,
        command: Option<&str>,
        args: Option<ParsedArgs>,
    ) -> RunResult {
        let target = self
            .set
            .resolve(group, command)
            .cloned()
            .ok_or_else(|| match command {
                Some(name) => RunError::UnknownCommand(format!("{}-{}", group, name)),
                None => RunError::UnknownCommand(group.to_string()),
            })?;
        let nested = self.for_command(target.key());
        target.run(&nested, &args.unwrap_or_default()).await
    }

    /// Configuration object persisted under this command's key.
    pub fn configuration(&self) -> Map<String, Value> {
        self.config.lock().expect("config store lock poisoned").get(&self.command_key)
    }

    /// Replaces the configuration object under this command's key.
    pub fn set_configuration(
        &self,
        object: Map<String, Value>,
    ) -> std::result::Result<(), ConfigError> {
        self.config.lock().expect("config store lock poisoned").set(&self.command_key, object)
    }

    /// Reads a value from the shared context bag.
    pub fn context_get(&self, key: &str) -> Option<Value> {
        self.context.lock().expect("context bag lock poisoned").get(key).cloned()
    }

    /// Writes a value into the shared context bag.
    pub fn context_set(&self, key: impl Into<String>, value: Value) {
        self.context.lock().expect("context bag lock poisoned").insert(key.into(), value);
    }
}
