//! Verb registration and dispatch.
//!
//! The dispatcher binds a merged [`CommandSet`] plus its expanded alias
//! verbs into a single invocation surface. Registration is the only
//! fatal stage (verb collisions); after that, a dispatch resolves one
//! target, validates its required options, runs it, and reports the
//! outcome as a process exit code.

pub mod alias;

use crate::args::ParsedArgs;
use crate::command::{Command, CommandSet};
use crate::config::ConfigStore;
use crate::help;
use crate::helper::Helper;
use crate::validate;
use alias::AliasVerb;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced while binding the verb surface, before any command
/// can execute.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// An alias name collides with a group verb or another alias.
    #[error("alias '{0}' collides with an existing verb")]
    VerbCollision(String),
}

/// Group verb description: the single command's own description, or a
/// summary line when the group has more than one command.
pub fn group_description(set: &CommandSet, group: &str) -> String {
    let commands = set.commands_in(group);
    if commands.len() > 1 {
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        format!("There are {} {} commands: {}", commands.len(), group, names.join(", "))
    } else {
        commands.first().map(|c| c.description.clone()).unwrap_or_default()
    }
}

/// The bound invocation surface.
#[derive(Debug)]
pub struct Dispatcher {
    set: Arc<CommandSet>,
    config: Arc<Mutex<ConfigStore>>,
    aliases: Vec<AliasVerb>,
}

impl Dispatcher {
    /// Binds the command set and its alias verbs. Fails on any alias
    /// name colliding with a group verb or another alias.
    pub fn register(set: CommandSet, config: ConfigStore) -> Result<Self, ConfigurationError> {
        let aliases = alias::expand(&set);

        let mut taken: HashSet<String> = set.groups().map(str::to_string).collect();
        for verb in &aliases {
            if !taken.insert(verb.name.clone()) {
                return Err(ConfigurationError::VerbCollision(verb.name.clone()));
            }
        }

        tracing::debug!(
            groups = set.groups().count(),
            aliases = aliases.len(),
            "verb surface registered"
        );
        Ok(Self { set: Arc::new(set), config: Arc::new(Mutex::new(config)), aliases })
    }

    /// The registered command set.
    pub fn command_set(&self) -> &CommandSet {
        &self.set
    }

    fn helper(&self, command_key: &str) -> Helper {
        Helper::new(Arc::clone(&self.set), Arc::clone(&self.config), command_key)
    }

    fn alias(&self, name: &str) -> Option<&AliasVerb> {
        self.aliases.iter().find(|v| v.name == name)
    }

    /// Runs the resolved target and maps the outcome to an exit code.
    /// Run failures are reported, never propagated as a panic.
    async fn invoke(&self, target: &Command, args: &ParsedArgs, helper: &Helper) -> i32 {
        if let Err(err) = validate::validate_command(target, args, helper) {
            eprintln!("{}", err);
            return 1;
        }
        match target.run(helper, args).await {
            Ok(output) => {
                tracing::debug!(command = %target.key(), %output, "command succeeded");
                0
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                1
            }
        }
    }

    /// Dispatches one parsed invocation.
    pub async fn dispatch(&self, mut args: ParsedArgs) -> i32 {
        let Some(first) = args.positional(0).map(str::to_string) else {
            print!("{}", help::format(&args, &self.set, &self.helper("")));
            return 0;
        };

        // Alias verbs take priority; collisions with group verbs were
        // rejected at registration, so the match is unambiguous.
        if let Some(verb) = self.alias(&first) {
            let helper = self.helper(&verb.command);
            if args.help_requested() {
                print!("{}", help::format_alias(verb, &self.set, &helper));
                return 0;
            }
            let Some(target) = self.set.get(&verb.command).cloned() else {
                eprintln!("Error: alias '{}' points at an unregistered command", first);
                return 1;
            };
            verb.apply(&mut args);
            args.set_consumed(1);
            return self.invoke(&target, &args, &helper).await;
        }

        if !self.set.has_group(&first) {
            eprintln!("Unknown command: {}", first);
            print!("{}", help::format(&ParsedArgs::new(), &self.set, &self.helper("")));
            return 1;
        }

        if args.help_requested() {
            print!("{}", help::format(&args, &self.set, &self.helper("")));
            return 0;
        }

        let second = args.positional(1).map(str::to_string);
        let (target, consumed) = match &second {
            Some(name) => match self.set.find(&first, name).cloned() {
                Some(command) => (command, 2),
                None => {
                    // Extra token that is no subcommand of the group;
                    // the default only runs on a bare group verb.
                    eprintln!("Unknown command: {} {}", first, name);
                    let group_args =
                        ParsedArgs::parse(std::slice::from_ref(&first));
                    print!("{}", help::format(&group_args, &self.set, &self.helper("")));
                    return 1;
                }
            },
            None => match self.set.default_of(&first).cloned() {
                Some(command) if command.is_runnable() => (command, 1),
                _ => {
                    // No invokable default (e.g. an uninstalled
                    // placeholder); show the group's help instead.
                    print!("{}", help::format(&args, &self.set, &self.helper("")));
                    return 0;
                }
            },
        };

        if !target.is_runnable() {
            let helper = self.helper(&target.key());
            print!("{}", help::option_block(&target, &helper, &[]));
            return 1;
        }

        args.set_consumed(consumed);
        let helper = self.helper(&target.key());
        self.invoke(&target, &args, &helper).await
    }
}
