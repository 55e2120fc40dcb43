//! Error types
//!
//! Every fallible library operation returns [`RdsError`]. Variants carry
//! rendered messages rather than source errors so a single resolution result
//! can be cloned out to every caller waiting on it.

/// Result alias used across the crate
pub type Result<T, E = RdsError> = std::result::Result<T, E>;

/// Errors raised while building requests or talking to an RDS API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RdsError {
    /// The base address could not be parsed as an absolute URL
    #[error("malformed url '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Network-level failure before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not valid JSON, or not the expected shape
    #[error("failed to decode response as JSON: {0}")]
    Decode(String),

    /// The body decoded but the status was not 2xx
    #[error("API request failed: {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },

    /// Query parameters did not serialize to a flat field map
    #[error("invalid query parameters: {0}")]
    InvalidParameters(String),

    /// The process-wide server was read before it was initialized
    #[error("RDS server has not been initialized; call init before getting the instance")]
    UninitializedSingleton,

    /// The process-wide server was initialized a second time
    #[error("RDS server can only be initialized once")]
    DoubleInitialization,
}

impl RdsError {
    pub(crate) fn malformed_url(url: &str, reason: impl ToString) -> Self {
        Self::MalformedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status code, when this error came from a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RdsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_http_errors() {
        let err = RdsError::HttpStatus {
            status: 404,
            status_text: "Not Found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API request failed: 404 Not Found");
        assert_eq!(RdsError::Transport("refused".into()).status(), None);
    }

    #[test]
    fn test_json_errors_map_to_decode() {
        let err: RdsError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, RdsError::Decode(_)));
    }
}
