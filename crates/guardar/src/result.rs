//! Result and error types for Guardar.

use thiserror::Error;

/// Result type for Guardar operations
pub type GuardarResult<T> = Result<T, GuardarError>;

/// Errors that can occur in Guardar
#[derive(Debug, Error)]
pub enum GuardarError {
    /// Invalid plugin configuration (construction-time, always fatal)
    #[error("invalid plugin configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Operation attempted before a script channel was attached
    #[error("script channel not attached; call attach_channel before use")]
    ChannelNotAttached,

    /// Script-execution channel rejected a request
    #[error("script execution failed: {message}")]
    Channel {
        /// Error message
        message: String,
    },

    /// Coverage artifact write failed
    #[error("failed to write coverage artifact {path}: {message}")]
    Write {
        /// Path that failed
        path: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuardarError {
    /// Construct a channel error from any displayable cause.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }
}
