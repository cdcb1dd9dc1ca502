//! Kiln Core - Pluggable command discovery and dispatch.
//!
//! This crate provides the core functionality for Kiln, including:
//! - Filesystem discovery of plugin commands and built-ins
//! - Group/command hierarchy with default-command resolution
//! - Alias expansion, option validation, and help rendering
//! - The dispatch engine binding it all to a CLI front end
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_core::discovery::{self, DiscoveryOptions};
//! use kiln_core::{ConfigStore, Dispatcher, ParsedArgs};
//!
//! #[tokio::main]
//! async fn main() -> kiln_core::Result<()> {
//!     let options = DiscoveryOptions::new("kiln").with_search_path(".kiln/commands");
//!     let set = discovery::discover(&options).await?;
//!     let config = ConfigStore::load(".kilnrc")?;
//!     let dispatcher = Dispatcher::register(set, config)?;
//!     let args: Vec<String> = std::env::args().skip(1).collect();
//!     std::process::exit(dispatcher.dispatch(ParsedArgs::parse(&args)).await);
//! }
//! ```

pub mod args;
pub mod builtin;
pub mod command;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod helper;
pub mod validate;

pub use args::{OptionValue, ParsedArgs};
pub use command::{
    Alias, AliasOption, Command, CommandHandler, CommandSet, OptionDecl, OptionSink, RunError,
    RunOutput, RunResult, BUILTIN_PATH,
};
pub use config::{ConfigError, ConfigStore};
pub use discovery::loader::{LoadError, ModuleLoader};
pub use discovery::{discover, DiscoveryCache, DiscoveryOptions};
pub use dispatch::alias::AliasVerb;
pub use dispatch::{group_description, ConfigurationError, Dispatcher};
pub use error::{KilnError, Result};
pub use helper::Helper;
pub use validate::{is_required_option, validate, validate_command, ValidationError};
