//! Alias expansion.
//!
//! An alias is a synthetic top-level verb that invokes an existing
//! command with some option values pinned. Pinned values override
//! whatever the invoker supplies, and the pinned keys are withheld from
//! the alias's help surface.

use crate::args::ParsedArgs;
use crate::command::{AliasOption, CommandSet};

/// One expanded alias verb, bound to a command by composite key.
#[derive(Debug, Clone)]
pub struct AliasVerb {
    pub name: String,
    pub description: Option<String>,

    /// Composite key of the command this alias invokes.
    pub command: String,

    /// Options pinned by the alias.
    pub fixed: Vec<AliasOption>,
}

impl AliasVerb {
    /// Folds the pinned options into `args`, overriding any value the
    /// invoker supplied under the same key.
    pub fn apply(&self, args: &mut ParsedArgs) {
        for option in &self.fixed {
            args.set(option.option.clone(), option.value.clone());
        }
    }

    /// Keys whose values this alias fixes.
    pub fn pinned_keys(&self) -> Vec<String> {
        self.fixed.iter().map(|o| o.option.clone()).collect()
    }
}

/// Expands every declared alias in the set into a top-level verb.
///
/// Expansion order follows command registration order, then alias
/// declaration order within a command. Names are not deduplicated
/// here; a collision with a group verb (or another alias) is caught at
/// dispatcher registration.
pub fn expand(set: &CommandSet) -> Vec<AliasVerb> {
    let mut verbs = Vec::new();
    for group in set.groups() {
        for command in set.commands_in(group) {
            for alias in &command.aliases {
                verbs.push(AliasVerb {
                    name: alias.name.clone(),
                    description: alias.description.clone(),
                    command: command.key(),
                    fixed: alias.options.clone(),
                });
            }
        }
    }
    verbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OptionValue;
    use crate::command::{Alias, Command};

    fn ship_alias() -> Alias {
        Alias {
            name: "ship".to_string(),
            description: Some("Production build".to_string()),
            options: vec![AliasOption {
                option: "mode".to_string(),
                value: OptionValue::from("production"),
            }],
        }
    }

    fn set_with_alias() -> CommandSet {
        let mut set = CommandSet::new();
        let mut command = Command::new("build", "webpack", "Bundles the app", "/p/x")
            .with_aliases(vec![ship_alias()]);
        command.is_default = true;
        set.insert(command);
        set
    }

    #[test]
    fn test_expand_binds_alias_to_composite_key() {
        let verbs = expand(&set_with_alias());
        assert_eq!(verbs.len(), 1);
        assert_eq!(verbs[0].name, "ship");
        assert_eq!(verbs[0].command, "build-webpack");
        assert_eq!(verbs[0].description.as_deref(), Some("Production build"));
    }

    #[test]
    fn test_apply_overrides_invoker_value() {
        let verbs = expand(&set_with_alias());
        let mut args = ParsedArgs::parse(&["ship".to_string(), "--mode".to_string(), "dev".to_string()]);
        verbs[0].apply(&mut args);
        assert_eq!(args.get("mode"), Some(&OptionValue::String("production".to_string())));
    }

    #[test]
    fn test_pinned_keys() {
        let verbs = expand(&set_with_alias());
        assert_eq!(verbs[0].pinned_keys(), vec!["mode".to_string()]);
    }

    #[test]
    fn test_expand_preserves_declaration_order() {
        let mut set = set_with_alias();
        let second = Alias { name: "preview".to_string(), ..Alias::default() };
        set.insert(
            Command::new("serve", "dev", "Serves the app", "/p/y").with_aliases(vec![second]),
        );

        let verbs = expand(&set);
        let names: Vec<&str> = verbs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["ship", "preview"]);
    }

    #[test]
    fn test_commands_without_aliases_expand_to_nothing() {
        let mut set = CommandSet::new();
        set.insert(Command::new("build", "webpack", "Bundles the app", "/p/x"));
        assert!(expand(&set).is_empty());
    }
}
