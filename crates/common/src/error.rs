//! Error types shared across titlecard crates.

use std::path::PathBuf;

/// Top-level error type for titlecard operations.
///
/// The first four variants form the request-facing taxonomy: every failure
/// of a title-card request surfaces as exactly one of them.
#[derive(Debug, thiserror::Error)]
pub enum TitlecardError {
    /// The remote source could not be fetched (non-success status or transport failure).
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// The input bytes are not a readable video.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Encoding the composed video failed.
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// Malformed request parameters.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to load font {path}: {message}")]
    FontLoad { path: PathBuf, message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TitlecardError.
pub type TitlecardResult<T> = Result<T, TitlecardError>;

impl TitlecardError {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether the failure was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = TitlecardError::fetch("upstream returned 404 Not Found");
        assert_eq!(
            err.to_string(),
            "Fetch error: upstream returned 404 Not Found"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(TitlecardError::invalid_input("missing text").is_client_error());
        assert!(TitlecardError::decode("no video stream").is_client_error());
        assert!(!TitlecardError::encode("ffmpeg exited 1").is_client_error());
        assert!(!TitlecardError::fetch("timeout").is_client_error());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TitlecardError = io.into();
        assert!(matches!(err, TitlecardError::Io(_)));
    }
}
