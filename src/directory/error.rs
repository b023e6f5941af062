//! Errors raised while talking to the user directory

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = DirectoryError::Status {
            url: "http://localhost/users/1".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "http://localhost/users/1 responded with HTTP 404");
    }

    #[test]
    fn test_decode_message_names_url() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = DirectoryError::Decode {
            url: "http://localhost/users".to_string(),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("response from http://localhost/users is not valid JSON"));
    }
}
