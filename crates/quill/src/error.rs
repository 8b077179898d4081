//! CLI error types.

use quill_config::ConfigError;
use quill_sanitize::ContextError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid render context: {0}")]
    Context(#[from] ContextError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
