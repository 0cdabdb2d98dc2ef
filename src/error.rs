//! Unified error types.

use thiserror::Error;

/// Top-level error returned by the API clients.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The service answered with JSON we could not turn into domain values.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// HTTP status carried by the error, if it is a status failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Session-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Transport failure (DNS, connect, timeout, body read), passed through as-is.
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Reqwest(e) => e.status().map(|s| s.as_u16()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = HttpError::Status {
            status: 404,
            body: "no such entity".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP status 404: no such entity");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_top_level_status_passthrough() {
        let err: Error = HttpError::Status {
            status: 500,
            body: String::new(),
        }
        .into();
        assert_eq!(err.status(), Some(500));
        assert_eq!(Error::Validation("x".into()).status(), None);
    }
}
