use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kernel::Reply;
use thiserror::Error;

/// Failures reported by the file host.
///
/// Every variant is reported to the caller synchronously; none of them is
/// fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing or empty.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Username already exists.")]
    AlreadyExists,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Missing or unknown session on a gated operation.
    #[error("Unauthorized. Please log in.")]
    Unauthorized,

    #[error("File not found: {0}")]
    NotFound(String),

    /// The multipart upload body could not be read, e.g. it went over the size limit.
    #[error("{}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) | Error::AlreadyExists => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Multipart(e) => e.status(),
            Error::Io(_) | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Server error: {self}");
        }
        (status, Json(Reply::failed(self.to_string()))).into_response()
    }
}
