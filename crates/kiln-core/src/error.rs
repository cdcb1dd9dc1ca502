//! Crate-level error type.

use thiserror::Error;

/// Any error the dispatch pipeline can surface, from discovery through
/// command execution.
#[derive(Debug, Error)]
pub enum KilnError {
    #[error(transparent)]
    Load(#[from] crate::discovery::loader::LoadError),

    #[error(transparent)]
    Validation(#[from] crate::validate::ValidationError),

    #[error(transparent)]
    Run(#[from] crate::command::RunError),

    #[error(transparent)]
    Configuration(#[from] crate::dispatch::ConfigurationError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Result type for pipeline-level operations.
pub type Result<T> = std::result::Result<T, KilnError>;
