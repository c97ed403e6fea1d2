//! Error handling module for devsetup
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Recoverable failures (missing config, absent package managers) never surface
//! as errors; they degrade the session instead. Everything else uses these types.

use thiserror::Error;

/// Main error type for devsetup
#[derive(Error, Debug)]
pub enum DevSetupError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provisioning script errors (spawn, read, wait)
    #[error("Script execution failed: {0}")]
    Script(String),

    /// Package-manager version probe errors
    #[error("Probe failed: {0}")]
    Probe(String),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for devsetup operations
pub type Result<T> = std::result::Result<T, DevSetupError>;

impl DevSetupError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a script execution error
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Create a probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DevSetupError::config("stacks must be an object");
        assert_eq!(err.to_string(), "Configuration error: stacks must be an object");

        let err = DevSetupError::probe("choco timed out");
        assert_eq!(err.to_string(), "Probe failed: choco timed out");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DevSetupError = io_err.into();
        assert!(matches!(err, DevSetupError::Io(_)));
    }

    #[test]
    fn test_error_constructors() {
        let err = DevSetupError::script("spawn failed");
        assert!(matches!(err, DevSetupError::Script(_)));

        let err = DevSetupError::terminal("raw mode unavailable");
        assert!(matches!(err, DevSetupError::Terminal(_)));
    }
}
