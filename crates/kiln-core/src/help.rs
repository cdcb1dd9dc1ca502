//! Help text rendering.
//!
//! Three views over the same command set, selected by how many verb
//! tokens the invocation carried: root (none), group (one), and single
//! command (two). Rendering is a pure function of the parsed arguments
//! and the set; it performs no I/O of its own.

use crate::args::ParsedArgs;
use crate::command::{Command, CommandSet, OptionDecl};
use crate::dispatch::alias::AliasVerb;
use crate::dispatch::group_description;
use crate::helper::Helper;
use crate::validate::{is_required_option, CapturingSink};

/// Names and option flag strings are padded to this column so
/// descriptions align within a block.
const COLUMN_WIDTH: usize = 24;

fn pad(text: &str) -> String {
    if text.len() >= COLUMN_WIDTH {
        format!("{} ", text)
    } else {
        format!("{:<COLUMN_WIDTH$}", text)
    }
}

/// Flag form of a key: `-k` for single characters, `--key` otherwise.
fn flag(key: &str) -> String {
    if key.chars().count() == 1 {
        format!("-{}", key)
    } else {
        format!("--{}", key)
    }
}

/// Comma-joined flag forms, aliases before the canonical key.
fn flag_forms(decl: &OptionDecl) -> String {
    let mut forms: Vec<String> = decl.alias.iter().map(|a| flag(a)).collect();
    forms.push(flag(&decl.key));
    forms.join(", ")
}

fn option_line(decl: &OptionDecl) -> String {
    let mut line = format!("  {}", pad(&flag_forms(decl)));
    if let Some(description) = decl.description_text() {
        line.push_str(description);
    }
    if !decl.choices.is_empty() {
        let choices: Vec<String> = decl.choices.iter().map(ToString::to_string).collect();
        line.push_str(&format!(" [choices: {}]", choices.join(", ")));
    }
    if let Some(default) = &decl.default {
        line.push_str(&format!(" [default: {}]", default));
    }
    if let Some(value_type) = &decl.value_type {
        line.push_str(&format!(" [{}]", value_type));
    }
    if is_required_option(decl) {
        line.push_str(" [required]");
    }
    format!("{}\n", line.trim_end())
}

/// Option listing for one command, skipping any keys in `skip`. For a
/// not-yet-installed command the listing is replaced by its install
/// instruction.
pub(crate) fn option_block(command: &Command, helper: &Helper, skip: &[String]) -> String {
    if !command.installed {
        return format!("To install this command run: {}\n", command.path);
    }
    let mut sink = CapturingSink::new();
    command.register(&mut sink, helper);
    let lines: Vec<String> = sink
        .options()
        .iter()
        .filter(|decl| !skip.contains(&decl.key))
        .map(option_line)
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("Options:\n{}", lines.concat())
}

fn root_view(set: &CommandSet) -> String {
    let sections: [(&str, fn(&Command) -> bool); 3] = [
        ("Global commands", |c| c.installed && c.global),
        ("Project commands", |c| c.installed && !c.global),
        ("Installable commands", |c| !c.installed),
    ];

    let mut out = String::from("Usage: kiln <group> [<command>] [options]\n");
    for (heading, belongs) in sections {
        let mut body = String::new();
        for group in set.groups() {
            let members: Vec<&Command> =
                set.commands_in(group).into_iter().filter(|c| belongs(c)).collect();
            if members.is_empty() {
                continue;
            }
            body.push_str(&format!("  {}\n", group));
            for command in members {
                body.push_str(&format!("    {}{}\n", pad(&command.name), command.description));
            }
        }
        if !body.is_empty() {
            out.push_str(&format!("\n{}:\n{}", heading, body));
        }
    }
    out
}

fn group_view(set: &CommandSet, group: &str, helper: &Helper) -> String {
    let commands = set.commands_in(group);
    if commands.is_empty() {
        return root_view(set);
    }

    let mut out = format!("{}\n\n", group_description(set, group));
    let many = commands.len() > 1;
    for command in &commands {
        let mut name = command.name.clone();
        if command.is_default && many {
            name.push_str(" (Default)");
        }
        out.push_str(&format!("  {}{}\n", pad(&name), command.description));
    }

    if let Some(default) = set.default_of(group) {
        let block = option_block(default, helper, &[]);
        if !block.is_empty() {
            out.push_str(&format!("\n{}", block));
        }
    }
    out
}

fn command_view(set: &CommandSet, group: &str, name: &str, helper: &Helper) -> String {
    let Some(command) = set.find(group, name) else {
        return group_view(set, group, helper);
    };

    let mut out = format!("{}\n", command.description);
    let block = option_block(command, helper, &[]);
    if !block.is_empty() {
        out.push_str(&format!("\n{}", block));
    }
    out
}

/// Help for an alias verb: the alias description plus the bound
/// command's options, minus every key the alias already pins.
pub fn format_alias(verb: &AliasVerb, set: &CommandSet, helper: &Helper) -> String {
    let Some(command) = set.get(&verb.command) else {
        return root_view(set);
    };

    let description = verb.description.clone().unwrap_or_else(|| command.description.clone());
    let mut out = format!("{}\n", description);
    let block = option_block(command, helper, &verb.pinned_keys());
    if !block.is_empty() {
        out.push_str(&format!("\n{}", block));
    }
    out
}

/// Renders the help view matching the invocation shape.
pub fn format(args: &ParsedArgs, set: &CommandSet, helper: &Helper) -> String {
    match (args.positional(0), args.positional(1)) {
        (None, _) => root_view(set),
        (Some(group), None) => group_view(set, group, helper),
        (Some(group), Some(name)) => command_view(set, group, name, helper),
    }
}
