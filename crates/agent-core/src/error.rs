//! Error Types

use thiserror::Error;

/// Result type alias for agent system operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent system error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Missing or invalid configuration (no framework set, missing key, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No agent registered under the requested id
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// An agent is already registered under the requested id
    #[error("Agent already registered: {0}")]
    DuplicateAgent(String),

    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// An agent failed while processing a message
    #[error("Processing error: {0}")]
    Processing(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Whether this error is raised by the system API itself rather than
    /// by a single message delivery.
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::AgentNotFound(_) | Self::DuplicateAgent(_)
        )
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors() {
        assert!(AgentError::Config("no framework".into()).is_usage_error());
        assert!(AgentError::AgentNotFound("a".into()).is_usage_error());
        assert!(!AgentError::Provider("boom".into()).is_usage_error());
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: AgentError = anyhow::anyhow!("callback failed").into();
        assert_eq!(err.to_string(), "callback failed");
    }
}
