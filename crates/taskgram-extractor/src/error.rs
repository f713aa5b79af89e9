//! Error types for the extractor crate.

use thiserror::Error;

use crate::parser::ParseError;

/// Errors that can occur during task extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Configuration error (missing API key, empty model list).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Model invocation failed.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// The model responded, but its output could not be decoded.
    #[error("failed to parse model output: {0}")]
    Parse(#[from] ParseError),
}

/// Result type for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::Configuration("missing OPENROUTER_API_KEY".into());
        assert_eq!(
            err.to_string(),
            "configuration error: missing OPENROUTER_API_KEY"
        );

        let err = ExtractError::ModelInvocation("HTTP 502".into());
        assert_eq!(err.to_string(), "model invocation failed: HTTP 502");
    }
}
