//! Error types for the Palisade decision engine.

use thiserror::Error;

/// Errors raised while building an engine from configuration.
///
/// Decision calls (`check`, `validate`, `analyze`, `classify`) never return
/// errors; rejections are encoded in their result types. Construction is the
/// only fallible surface because it compiles user-supplied patterns.
#[derive(Debug, Error)]
pub enum PalisadeError {
    /// A configured regex failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A permission rule is malformed
    #[error("Invalid rule for tool '{tool}': {message}")]
    InvalidRule { tool: String, message: String },

    /// A configuration value is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PalisadeError {
    /// Build an `InvalidPattern` error from a regex compile failure
    pub fn invalid_pattern(pattern: impl Into<String>, err: &regex::Error) -> Self {
        PalisadeError::InvalidPattern {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for engine construction
pub type PalisadeResult<T> = Result<T, PalisadeError>;
