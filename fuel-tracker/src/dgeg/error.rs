//! DGEG client error types.

use crate::domain::MalformedDataError;

/// Errors from the DGEG HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum DgegError {
    /// HTTP request failed (connection, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with something other than 200 OK
    #[error("API error: status {status}")]
    Status { status: u16 },

    /// API answered 200 but not with JSON
    #[error("unexpected content type {content_type:?}")]
    ContentType { content_type: String },

    /// Body was JSON but not a valid station
    #[error("malformed station data: {0}")]
    Malformed(#[from] MalformedDataError),
}

impl DgegError {
    /// Whether this is a transport or protocol failure rather than bad data.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, DgegError::Malformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DgegError::Status { status: 503 };
        assert_eq!(err.to_string(), "API error: status 503");

        let err = DgegError::ContentType {
            content_type: "text/html".into(),
        };
        assert_eq!(err.to_string(), "unexpected content type \"text/html\"");

        let err = DgegError::from(MalformedDataError::MissingField("Nome"));
        assert_eq!(
            err.to_string(),
            "malformed station data: missing required field: Nome"
        );
    }

    #[test]
    fn upstream_classification() {
        assert!(DgegError::Status { status: 500 }.is_upstream());
        assert!(
            DgegError::ContentType {
                content_type: String::new()
            }
            .is_upstream()
        );
        assert!(!DgegError::from(MalformedDataError::MissingField("Nome")).is_upstream());
    }
}
