//! Kiln CLI - Pluggable command-line front end.
//!
//! The `kiln` binary discovers command plugins installed under the
//! project and home command directories (plus the compiled-in
//! built-ins), binds them into a verb surface, and dispatches the
//! invocation. The verb surface is data-driven: `kiln <group>
//! [<command>] [options]`, with `kiln` alone printing the root help.

use anyhow::Context;
use colored::Colorize;
use kiln_core::discovery::{self, DiscoveryOptions};
use kiln_core::{ConfigStore, Dispatcher, ParsedArgs};
use std::env;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Plugin basename prefix (`kiln-<group>-<subtype>`).
const PLUGIN_PREFIX: &str = "kiln";

fn init_tracing() -> anyhow::Result<()> {
    let level = match env::var("KILN_LOG").ok().as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Plugin search roots, earliest root winning the bare command name
/// and the group default. `KILN_PATH` (a PATH-style list) replaces the
/// default project-then-home pair.
fn search_roots() -> anyhow::Result<(Vec<PathBuf>, Option<PathBuf>)> {
    if let Some(joined) = env::var_os("KILN_PATH") {
        return Ok((env::split_paths(&joined).collect(), None));
    }

    let cwd = env::current_dir().context("cannot determine current directory")?;
    let mut roots = vec![discovery::project_commands_dir(&cwd)];
    let mut global_root = None;
    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".kiln").join("commands");
        roots.push(dir.clone());
        global_root = Some(dir);
    }
    Ok((roots, global_root))
}

async fn run() -> anyhow::Result<i32> {
    init_tracing()?;

    let (roots, global_root) = search_roots()?;
    let mut options = DiscoveryOptions::new(PLUGIN_PREFIX);
    for root in roots {
        options = options.with_search_path(root);
    }
    if let Some(root) = global_root {
        options = options.with_global_root(root);
    }

    let set = discovery::discover(&options).await.context("command discovery failed")?;
    tracing::debug!(groups = set.groups().count(), "discovery complete");

    let cwd = env::current_dir().context("cannot determine current directory")?;
    let config = ConfigStore::load(cwd.join(".kilnrc")).context("cannot read .kilnrc")?;

    let dispatcher = Dispatcher::register(set, config)?;
    let argv: Vec<String> = env::args().skip(1).collect();
    Ok(dispatcher.dispatch(ParsedArgs::parse(&argv)).await)
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            1
        }
    };
    std::process::exit(code);
}
