use thiserror::Error;

use crate::http::response::Response;

/// Everything that can end a single request/response exchange early.
///
/// Each variant maps to exactly one response through [`HttpError::into_response`].
#[derive(Debug, Error)]
pub enum HttpError {
    /// Malformed input at any parse step. The message is sent back as the
    /// body of a 400 response.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The client sent nothing within the read timeout.
    #[error("timed out waiting for request data")]
    Timeout,

    /// Anything else: transport failures, filesystem errors in handlers.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::BadRequest(message.into())
    }

    /// Converts the error into the response the client receives.
    ///
    /// The cause of an `Io` error is never written to the body.
    pub fn into_response(self) -> Response {
        match self {
            HttpError::BadRequest(message) => Response::bad_request(message),
            HttpError::Timeout => Response::request_timeout(),
            HttpError::Io(_) => Response::internal_error(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;
