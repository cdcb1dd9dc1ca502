//! Run handler for manifest-backed commands.
//!
//! Installed plugins declare their behavior as a shell template:
//! `{{key}}` placeholders are substituted from the parsed options
//! (falling back to declared defaults) and `{{args}}` expands to the
//! trailing positional operands. The rendered command line runs under
//! `sh -c`.

use crate::args::ParsedArgs;
use crate::command::{CommandHandler, OptionDecl, OptionSink, RunError, RunResult};
use crate::helper::Helper;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::json;

#[derive(Debug)]
pub struct TemplateHandler {
    template: String,
    options: IndexMap<String, OptionDecl>,
}

impl TemplateHandler {
    pub fn new(template: impl Into<String>, options: IndexMap<String, OptionDecl>) -> Self {
        Self { template: template.into(), options }
    }

    /// Renders the template against the parsed arguments.
    fn render(&self, args: &ParsedArgs) -> String {
        let mut rendered = self.template.clone();

        for (key, decl) in &self.options {
            let placeholder = format!("{{{{{}}}}}", key);
            if !rendered.contains(&placeholder) {
                continue;
            }
            let value = args.get(key).cloned().or_else(|| decl.default.clone());
            let text = value.map(|v| v.to_string()).unwrap_or_default();
            rendered = rendered.replace(&placeholder, &text);
        }

        // Undeclared options are still substitutable.
        for (key, value) in args.options() {
            let placeholder = format!("{{{{{}}}}}", key);
            rendered = rendered.replace(&placeholder, &value.to_string());
        }

        rendered.replace("{{args}}", &args.tail().join(" "))
    }
}

#[async_trait]
impl CommandHandler for TemplateHandler {
    fn register(&self, sink: &mut dyn OptionSink, _helper: &Helper) {
        for decl in self.options.values() {
            sink.option(decl.clone());
        }
    }

    async fn run(&self, _helper: &Helper, args: &ParsedArgs) -> RunResult {
        let rendered = self.render(args);
        tracing::debug!(command = %rendered, "running plugin template");

        let output =
            tokio::process::Command::new("sh").arg("-c").arg(&rendered).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RunError::Message(format!(
                "command failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            print!("{}", stdout);
        }
        Ok(json!({ "output": stdout.trim() }))
    }
}
