//! Command data model.
//!
//! A [`Command`] is one pluggable unit of behavior: a `(group, name)`
//! pair with a description, an option schema declared through an
//! [`OptionSink`], and an async run handler. Commands discovered in the
//! same process are folded into a [`CommandSet`], the navigable
//! group/command hierarchy everything downstream (dispatch, help,
//! validation) reads from.

use crate::args::{OptionValue, ParsedArgs};
use crate::helper::Helper;
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Sentinel `path` value for compiled-in commands.
pub const BUILTIN_PATH: &str = "<built-in>";

/// Errors raised while running a command.
#[derive(Debug, Error)]
pub enum RunError {
    /// The command reported a failure.
    #[error("{0}")]
    Message(String),

    /// I/O error while executing the command.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No command is addressable under the given name.
    #[error("no command '{0}' is registered")]
    UnknownCommand(String),

    /// The command exists but has no runnable handler.
    #[error("command '{0}' is not installed")]
    NotRunnable(String),
}

/// Result type for run operations.
pub type RunResult = std::result::Result<RunOutput, RunError>;

/// Value produced by a successful run.
pub type RunOutput = serde_json::Value;

/// Declaration of a single command option.
///
/// The field set mirrors what plugin manifests may spell out; the five
/// required-flag spellings are synonyms collected by
/// [`crate::validate::is_required_option`], and the description
/// spellings fall back in a fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionDecl {
    /// Canonical option key; filled from the manifest table key.
    #[serde(skip)]
    pub key: String,

    /// Additional flag spellings.
    #[serde(default)]
    pub alias: Vec<String>,

    pub describe: Option<String>,
    pub description: Option<String>,
    pub desc: Option<String>,
    pub default_description: Option<String>,

    /// Declared value type (`string`, `boolean`, `number`).
    #[serde(rename = "type")]
    pub value_type: Option<String>,

    /// Default value, substituted when the option is absent.
    pub default: Option<OptionValue>,

    /// Allowed values.
    #[serde(default)]
    pub choices: Vec<OptionValue>,

    #[serde(default)]
    pub require: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub requires_arg: bool,
    #[serde(default)]
    pub demand: bool,
    #[serde(default)]
    pub demand_option: bool,
}

impl OptionDecl {
    /// Creates a declaration with only a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ..Self::default() }
    }

    /// First present description, in the fixed fallback order:
    /// `describe`, `description`, `desc`, `default-description`.
    pub fn description_text(&self) -> Option<&str> {
        self.describe
            .as_deref()
            .or(self.description.as_deref())
            .or(self.desc.as_deref())
            .or(self.default_description.as_deref())
    }
}

/// Receives option declarations from a command's `register`.
pub trait OptionSink {
    /// Accepts one declared option.
    fn option(&mut self, decl: OptionDecl);
}

/// The behavior seam implemented by every runnable command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Declares the command's option schema into the sink.
    fn register(&self, sink: &mut dyn OptionSink, helper: &Helper);

    /// Executes the command.
    async fn run(&self, helper: &Helper, args: &ParsedArgs) -> RunResult;
}

/// A fixed option binding carried by an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasOption {
    /// Option key to pin.
    pub option: String,

    /// Pinned value; overrides anything the invoker supplies.
    pub value: OptionValue,
}

/// A synthetic top-level verb bound to an existing command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Options pre-filled when the alias is invoked.
    #[serde(default)]
    pub options: Vec<AliasOption>,
}

/// One pluggable unit of behavior.
#[derive(Clone)]
pub struct Command {
    /// Namespace the command belongs to (first CLI token).
    pub group: String,

    /// Name within the group, unique after disambiguation.
    pub name: String,

    pub description: String,

    /// Origin: filesystem path for installed commands, the
    /// [`BUILTIN_PATH`] sentinel for built-ins, or the install
    /// instruction for not-yet-installed candidates.
    pub path: String,

    pub installed: bool,
    pub global: bool,

    /// True for the command invoked when only the group verb is given.
    pub is_default: bool,

    /// Plugin version, shown by the version listing.
    pub version: Option<String>,

    pub aliases: Vec<Alias>,

    handler: Option<Arc<dyn CommandHandler>>,
}

impl Command {
    /// Creates an installed, non-global command without a handler.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            description: description.into(),
            path: path.into(),
            installed: true,
            global: false,
            is_default: false,
            version: None,
            aliases: Vec::new(),
            handler: None,
        }
    }

    /// Creates a not-yet-installed candidate. `install_hint` is the
    /// command a user runs to install it, surfaced by help output.
    pub fn not_installed(
        group: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        install_hint: impl Into<String>,
    ) -> Self {
        let mut command = Self::new(group, name, description, install_hint);
        command.installed = false;
        command
    }

    pub fn with_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<Alias>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Composite key uniquely identifying this command in a set.
    pub fn key(&self) -> String {
        format!("{}-{}", self.group, self.name)
    }

    /// True when the command has a handler and can be invoked.
    pub fn is_runnable(&self) -> bool {
        self.handler.is_some()
    }

    /// Declares the command's options into the sink. A placeholder
    /// without a handler declares nothing.
    pub fn register(&self, sink: &mut dyn OptionSink, helper: &Helper) {
        if let Some(handler) = &self.handler {
            handler.register(sink, helper);
        }
    }

    /// Runs the command.
    pub async fn run(&self, helper: &Helper, args: &ParsedArgs) -> RunResult {
        match &self.handler {
            Some(handler) => handler.run(helper, args).await,
            None => Err(RunError::NotRunnable(self.key())),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("group", &self.group)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("installed", &self.installed)
            .field("global", &self.global)
            .field("is_default", &self.is_default)
            .field("runnable", &self.is_runnable())
            .finish()
    }
}

/// The merged group/command hierarchy.
///
/// `commands` is keyed by both the bare group name (the group's default
/// so far) and each composite `group-name` key; `group_keys` maps each
/// group to its ordered composite keys so dispatch and help never
/// re-derive the grouping. Insertion order is preserved everywhere and
/// drives help output ordering.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: IndexMap<String, Command>,
    group_keys: IndexMap<String, IndexSet<String>>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a command under its composite key (and, when flagged as
    /// the group default, under the bare group key too).
    pub fn insert(&mut self, command: Command) {
        let group = command.group.clone();
        let key = command.key();
        if command.is_default {
            self.commands.insert(group.clone(), command.clone());
        }
        self.commands.insert(key.clone(), command);
        self.group_keys.entry(group).or_default().insert(key);
    }

    /// Group names in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.group_keys.keys().map(String::as_str)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.group_keys.contains_key(group)
    }

    /// Ordered composite keys registered under `group`.
    pub fn group_keys(&self, group: &str) -> Option<&IndexSet<String>> {
        self.group_keys.get(group)
    }

    /// Commands in `group`, in registration order.
    pub fn commands_in(&self, group: &str) -> Vec<&Command> {
        self.group_keys
            .get(group)
            .map(|keys| keys.iter().filter_map(|k| self.commands.get(k)).collect())
            .unwrap_or_default()
    }

    /// The group's default command, if any.
    pub fn default_of(&self, group: &str) -> Option<&Command> {
        self.commands.get(group)
    }

    /// Looks up a command by group and name.
    pub fn find(&self, group: &str, name: &str) -> Option<&Command> {
        self.commands.get(&format!("{}-{}", group, name))
    }

    /// Resolves an invocation target: the named command when it exists,
    /// otherwise the group's default.
    pub fn resolve(&self, group: &str, name: Option<&str>) -> Option<&Command> {
        match name {
            Some(name) => self.find(group, name).or_else(|| self.default_of(group)),
            None => self.default_of(group),
        }
    }

    /// Looks up an entry by raw key (group or composite).
    pub fn get(&self, key: &str) -> Option<&Command> {
        self.commands.get(key)
    }

    /// Number of distinct entries (group keys plus composite keys).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Overlays `other` onto this set: entries from `other` win on key
    /// collision, key sets are unioned preserving this set's order
    /// first.
    pub(crate) fn overlay(&mut self, other: &CommandSet) {
        for (key, command) in &other.commands {
            self.commands.insert(key.clone(), command.clone());
        }
        for (group, keys) in &other.group_keys {
            let entry = self.group_keys.entry(group.clone()).or_default();
            for key in keys {
                entry.insert(key.clone());
            }
        }
    }

    /// Re-establishes the one-default-per-group invariant after an
    /// overlay: the command under the bare group key is the default,
    /// every other command in the group is not.
    pub(crate) fn normalize_defaults(&mut self) {
        let groups: Vec<String> = self.group_keys.keys().cloned().collect();
        for group in groups {
            let Some(default_key) = self.commands.get(&group).map(Command::key) else {
                continue;
            };
            let keys: Vec<String> =
                self.group_keys.get(&group).map(|k| k.iter().cloned().collect()).unwrap_or_default();
            for key in keys {
                if let Some(command) = self.commands.get_mut(&key) {
                    command.is_default = key == default_key;
                }
            }
            if let Some(command) = self.commands.get_mut(&group) {
                command.is_default = true;
            }
        }
    }
}
