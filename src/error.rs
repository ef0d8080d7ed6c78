use std::path::PathBuf;

use thiserror::Error;

/// Shown when the backend rejects a request without saying why.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Every failure the client distinguishes.
///
/// The UI renders all of them the same way (a transient notification), so
/// the split exists for callers and logs, not for the user.
#[derive(Error, Debug)]
pub enum Error {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("session storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("could not read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid API URL: {0:?}")]
    InvalidUrl(String),

    #[error("you need to sign in first")]
    Unauthenticated,

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Text for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Server { message, .. } if message.trim().is_empty() => {
                FALLBACK_MESSAGE.to_string()
            }
            Error::Server { message, .. } => message.clone(),
            Error::Validation { message, .. } => message.clone(),
            Error::Transport(_) => "Could not reach the server. Check your connection.".to_string(),
            Error::Decode(_) | Error::Storage(_) => FALLBACK_MESSAGE.to_string(),
            Error::Image { path, .. } => format!(
                "Could not read the photo {}",
                path.file_name().unwrap_or(path.as_os_str()).to_string_lossy()
            ),
            Error::InvalidUrl(_) | Error::Unauthenticated | Error::Cancelled => self.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_server_message_uses_fallback() {
        let err = Error::Server {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn server_message_is_passed_through() {
        let err = Error::Server {
            status: 409,
            message: "Room already booked".into(),
        };
        assert_eq!(err.user_message(), "Room already booked");
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn validation_message_names_only_the_problem() {
        let err = Error::validation("price", "Price must be a positive number");
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Price must be a positive number");
        assert_eq!(err.to_string(), "price: Price must be a positive number");
    }

    #[test]
    fn image_read_failure_is_not_a_session_error() {
        let err = Error::Image {
            path: PathBuf::from("/tmp/photos/front.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("could not read image /tmp/photos/front.jpg"));
        assert!(!err.to_string().contains("session"));
        assert_eq!(err.user_message(), "Could not read the photo front.jpg");
    }
}
