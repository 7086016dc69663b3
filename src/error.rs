//! Error types for the Splunk SDK.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Splunk SDK.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Argument and State Errors =====
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot access a disposed object: {0}")]
    Disposed(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Index out of range: index {index} but length is {len}")]
    IndexOutOfRange { index: usize, len: usize },

    // ===== Server Errors =====
    #[error("API error: {status} {status_text} - {message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    // ===== Document Errors =====
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Malformed feed: {0}")]
    Feed(String),

    #[error("Entity construction failed: {0}")]
    Entity(String),

    // ===== Serialization Errors =====
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ===== HTTP Errors =====
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an API error from HTTP response details.
    pub fn api(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            status_text: status_text.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by using a disposed context.
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let api_err = Error::api(404, "Not Found", "Unknown endpoint");
        assert_eq!(
            api_err.to_string(),
            "API error: 404 Not Found - Unknown endpoint"
        );

        let disposed = Error::Disposed("https://localhost:8089".to_string());
        assert_eq!(
            disposed.to_string(),
            "Cannot access a disposed object: https://localhost:8089"
        );

        let arg = Error::InvalidArgument("host must not be empty".to_string());
        assert_eq!(arg.to_string(), "Invalid argument: host must not be empty");
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = Error::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "Index out of range: index 7 but length is 3"
        );
    }

    #[test]
    fn test_is_disposed() {
        assert!(Error::Disposed("ctx".to_string()).is_disposed());
        assert!(!Error::InvalidOperation("ctx".to_string()).is_disposed());
    }

    #[test]
    fn test_api_error_constructor() {
        let err = Error::api(500, "Internal Server Error", "Something went wrong");
        match err {
            Error::Api {
                status,
                status_text,
                message,
            } => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
                assert_eq!(message, "Something went wrong");
            }
            _ => panic!("Expected Api error"),
        }
    }

    #[test]
    fn test_xml_error_conversion() {
        let err: Error = roxmltree::Document::parse("<feed>").unwrap_err().into();
        assert!(matches!(err, Error::Xml(_)));
        assert!(err.to_string().starts_with("XML parsing error"));
    }
}
