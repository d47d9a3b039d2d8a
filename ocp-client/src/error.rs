//! Error types for the OCP client.

use ocp_core::OcpError;
use thiserror::Error;

/// Errors that can occur when using the OCP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Failed to deserialize response.
    #[error("Failed to deserialize response: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

impl From<ClientError> for OcpError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => OcpError::Transport(e.to_string()),
            ClientError::Api { status, message } => OcpError::Api { status, message },
            ClientError::Deserialize(e) => OcpError::MalformedResponse(e.to_string()),
            ClientError::InvalidResponse(msg) => OcpError::MalformedResponse(msg),
            ClientError::InvalidUrl(msg) => OcpError::InvalidConfig(msg),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_status() {
        let err: OcpError = ClientError::Api {
            status: 404,
            message: "missing".into(),
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn decode_errors_become_malformed_responses() {
        let json_err = serde_json::from_str::<u32>("{}").unwrap_err();
        let err: OcpError = ClientError::Deserialize(json_err).into();
        assert!(matches!(err, OcpError::MalformedResponse(_)));

        let err: OcpError = ClientError::InvalidUrl("ftp://x".into()).into();
        assert!(matches!(err, OcpError::InvalidConfig(_)));
    }
}
