//! Built-in `version` command.

use crate::args::ParsedArgs;
use crate::command::{CommandHandler, CommandSet, OptionSink, RunResult, BUILTIN_PATH};
use crate::helper::Helper;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub(super) fn handler() -> Arc<dyn CommandHandler> {
    Arc::new(VersionCommand)
}

struct VersionCommand;

/// One line per installed plugin, sorted by group name ascending.
fn version_rows(set: &CommandSet) -> Vec<(String, String, String)> {
    let mut rows: Vec<(String, String, String)> = Vec::new();
    for group in set.groups() {
        for command in set.commands_in(group) {
            if !command.installed || command.path == BUILTIN_PATH {
                continue;
            }
            rows.push((
                command.group.clone(),
                command.name.clone(),
                command.version.clone().unwrap_or_else(|| "unknown".to_string()),
            ));
        }
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[async_trait]
impl CommandHandler for VersionCommand {
    fn register(&self, _sink: &mut dyn OptionSink, _helper: &Helper) {}

    async fn run(&self, helper: &Helper, _args: &ParsedArgs) -> RunResult {
        let rows = version_rows(helper.command_set());

        println!("You are currently running kiln {}", env!("CARGO_PKG_VERSION"));
        if rows.is_empty() {
            println!("There are no installed command plugins.");
        } else {
            println!("The currently installed command plugins are:");
            for (group, name, version) in &rows {
                println!("  {} {} {}", group, name, version);
            }
        }

        Ok(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "plugins": rows
                .into_iter()
                .map(|(group, name, version)| json!({
                    "group": group,
                    "name": name,
                    "version": version,
                }))
                .collect::<Vec<_>>(),
        }))
    }
}
