/*!
 * Error types for model-method
 */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Failures raised by a transport while retrieving the remote resource
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint {endpoint} answered with status {status}")]
    Status { status: u16, endpoint: String },

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ProxyError {
    /// Retrieval failed before a response body was available
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Response body did not have the expected envelope shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ProxyError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ProxyError::Transport(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ProxyError::MalformedResponse(_))
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ProxyError::MalformedResponse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifiers() {
        let err = ProxyError::from(TransportError::Status {
            status: 502,
            endpoint: "http://localhost/api".to_string(),
        });
        assert!(err.is_transport());
        assert!(!err.is_malformed());

        let err = ProxyError::malformed("empty objects");
        assert!(err.is_malformed());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_display() {
        let err = ProxyError::from(TransportError::Status {
            status: 404,
            endpoint: "http://localhost/api".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Transport failure: Endpoint http://localhost/api answered with status 404"
        );
        assert_eq!(
            ProxyError::malformed("response contains no objects").to_string(),
            "Malformed response: response contains no objects"
        );
    }
}
