//! Error types for linetint

use thiserror::Error;

/// Result type alias for linetint operations
pub type Result<T> = std::result::Result<T, TintError>;

/// Errors surfaced by configuration loading and the CLI host.
///
/// The decoration engine itself never fails on configuration content: a bad
/// pattern, glob or style reference is logged and skipped where it is used.
#[derive(Error, Debug)]
pub enum TintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid path glob {glob:?}: {source}")]
    Glob {
        glob: String,
        #[source]
        source: globset::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Message(String),
}
