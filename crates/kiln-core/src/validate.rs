//! Option-requirement validation.
//!
//! Runs after verb resolution and before `run`: the target command's
//! option schema is captured through a side-effect-free sink, and every
//! declared-required option missing from the parsed arguments becomes
//! one message line. Validation blocks dispatch; it never crashes it.

use crate::args::ParsedArgs;
use crate::command::{Command, CommandSet, OptionDecl, OptionSink};
use crate::helper::Helper;
use thiserror::Error;

/// Missing required option(s), one message per option in declaration
/// order.
#[derive(Debug, Error)]
#[error("Error(s):\n{}", .messages.join("\n"))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// True when the declaration carries any of the required-flag
/// synonyms: `require`, `required`, `requires-arg`, `demand`,
/// `demand-option`.
pub fn is_required_option(decl: &OptionDecl) -> bool {
    decl.require || decl.required || decl.requires_arg || decl.demand || decl.demand_option
}

/// Captures option declarations without touching the real parser.
#[derive(Debug, Default)]
pub struct CapturingSink {
    options: Vec<OptionDecl>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations in registration order.
    pub fn options(&self) -> &[OptionDecl] {
        &self.options
    }
}

impl OptionSink for CapturingSink {
    fn option(&mut self, decl: OptionDecl) {
        self.options.push(decl);
    }
}

/// Validates the parsed arguments against the target command's
/// declared options.
///
/// Passes trivially when help was requested, when no group token was
/// supplied, or when no command is addressable (an unresolvable
/// command is a dispatch concern, not a validation concern).
pub fn validate(
    args: &ParsedArgs,
    set: &CommandSet,
    helper: &Helper,
) -> Result<(), ValidationError> {
    if args.help_requested() {
        return Ok(());
    }
    let Some(group) = args.positional(0) else {
        return Ok(());
    };
    let Some(target) = set.resolve(group, args.positional(1)) else {
        return Ok(());
    };
    validate_command(target, args, helper)
}

/// Validates the parsed arguments against one resolved command.
pub fn validate_command(
    command: &Command,
    args: &ParsedArgs,
    helper: &Helper,
) -> Result<(), ValidationError> {
    let mut sink = CapturingSink::new();
    command.register(&mut sink, helper);

    let messages: Vec<String> = sink
        .options()
        .iter()
        .filter(|decl| is_required_option(decl) && !args.contains(&decl.key))
        .map(|decl| format!("Required option '{}' not provided", decl.key))
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OptionValue;
    use crate::command::{Command, CommandHandler, RunResult};
    use crate::config::ConfigStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct DeclaredOptions(Vec<OptionDecl>);

    #[async_trait]
    impl CommandHandler for DeclaredOptions {
        fn register(&self, sink: &mut dyn OptionSink, _helper: &Helper) {
            for decl in &self.0 {
                sink.option(decl.clone());
            }
        }

        async fn run(&self, _helper: &Helper, _args: &ParsedArgs) -> RunResult {
            Ok(json!(null))
        }
    }

    fn required(key: &str) -> OptionDecl {
        let mut decl = OptionDecl::new(key);
        decl.required = true;
        decl
    }

    fn set_with(decls: Vec<OptionDecl>) -> (CommandSet, Helper, TempDir) {
        let mut set = CommandSet::new();
        let mut command = Command::new("build", "webpack", "builds", "/tmp/none")
            .with_handler(Arc::new(DeclaredOptions(decls)));
        command.is_default = true;
        set.insert(command);

        let temp_dir = TempDir::new().unwrap();
        let config = ConfigStore::load(temp_dir.path().join(".kilnrc")).unwrap();
        let helper = Helper::new(
            Arc::new(set.clone()),
            Arc::new(Mutex::new(config)),
            "build-webpack",
        );
        (set, helper, temp_dir)
    }

    fn parsed(tokens: &[&str]) -> ParsedArgs {
        ParsedArgs::parse(&tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_is_required_option_synonyms() {
        let mut decl = OptionDecl::new("o");
        assert!(!is_required_option(&decl));

        decl.require = true;
        assert!(is_required_option(&decl));

        let mut decl = OptionDecl::new("o");
        decl.required = true;
        assert!(is_required_option(&decl));

        let mut decl = OptionDecl::new("o");
        decl.requires_arg = true;
        assert!(is_required_option(&decl));

        let mut decl = OptionDecl::new("o");
        decl.demand = true;
        assert!(is_required_option(&decl));

        let mut decl = OptionDecl::new("o");
        decl.demand_option = true;
        assert!(is_required_option(&decl));
    }

    #[test]
    fn test_validate_passes_when_required_option_present() {
        let (set, helper, _dir) = set_with(vec![required("bar")]);
        let mut args = parsed(&["build", "webpack"]);
        args.set("bar", OptionValue::String("x".to_string()));
        assert!(validate(&args, &set, &helper).is_ok());
    }

    #[test]
    fn test_validate_single_missing_option_message() {
        let (set, helper, _dir) = set_with(vec![required("bar")]);
        let err = validate(&parsed(&["build", "webpack"]), &set, &helper).unwrap_err();
        assert_eq!(err.messages, vec!["Required option 'bar' not provided".to_string()]);
        assert_eq!(err.to_string(), "Error(s):\nRequired option 'bar' not provided");
    }

    #[test]
    fn test_validate_two_missing_options_in_declaration_order() {
        let (set, helper, _dir) = set_with(vec![required("bar"), required("baz")]);
        let err = validate(&parsed(&["build", "webpack"]), &set, &helper).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error(s):\nRequired option 'bar' not provided\nRequired option 'baz' not provided"
        );
    }

    #[test]
    fn test_validate_passes_with_help_flag() {
        let (set, helper, _dir) = set_with(vec![required("bar")]);
        assert!(validate(&parsed(&["build", "webpack", "--help"]), &set, &helper).is_ok());
    }

    #[test]
    fn test_validate_passes_without_group_token() {
        let (set, helper, _dir) = set_with(vec![required("bar")]);
        assert!(validate(&parsed(&[]), &set, &helper).is_ok());
    }

    #[test]
    fn test_validate_passes_for_unresolvable_command() {
        let (set, helper, _dir) = set_with(vec![required("bar")]);
        assert!(validate(&parsed(&["deploy"]), &set, &helper).is_ok());
    }

    #[test]
    fn test_validate_resolves_group_default() {
        let (set, helper, _dir) = set_with(vec![required("bar")]);
        let err = validate(&parsed(&["build"]), &set, &helper).unwrap_err();
        assert_eq!(err.messages.len(), 1);
    }

    #[test]
    fn test_optional_options_never_block() {
        let (set, helper, _dir) = set_with(vec![OptionDecl::new("verbose")]);
        assert!(validate(&parsed(&["build", "webpack"]), &set, &helper).is_ok());
    }
}
