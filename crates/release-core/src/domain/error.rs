//! Error taxonomy for release decisions.

use release_host::HostError;

/// Errors produced while resolving options or running a release decision.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid version template: {0}")]
    InvalidTemplate(String),

    #[error("authorization error: {0}")]
    Authorization(String),

    #[error("host error: {0}")]
    Host(String),
}

impl ReleaseError {
    /// Whether the error comes from bad input rather than from the host.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReleaseError::Configuration(_) | ReleaseError::InvalidTemplate(_)
        )
    }
}

impl From<HostError> for ReleaseError {
    fn from(err: HostError) -> Self {
        ReleaseError::Host(err.to_string())
    }
}

/// Result type for release operations.
pub type Result<T> = std::result::Result<T, ReleaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_keeps_message() {
        let err: ReleaseError = HostError::Api {
            status: 401,
            message: "Bad credentials".to_string(),
        }
        .into();
        assert!(matches!(err, ReleaseError::Host(_)));
        assert!(err.to_string().contains("Bad credentials"));
    }

    #[test]
    fn template_errors_count_as_configuration() {
        assert!(ReleaseError::InvalidTemplate("v**".to_string()).is_configuration());
        assert!(ReleaseError::Configuration("missing --repo".to_string()).is_configuration());
        assert!(!ReleaseError::Authorization("no scope".to_string()).is_configuration());
    }
}
