// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Per-request HTTP errors

use crate::vfs::FsError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::io;

/// Body of every "no such resource" response
pub const NOT_FOUND_BODY: &str = "File not found";

/// Errors isolated to a single request
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("file not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<FsError> for HttpError {
    fn from(err: FsError) -> Self {
        match err {
            // Wrong name and missing file look the same from outside
            FsError::InvalidRequest | FsError::NotFound => HttpError::NotFound,
            FsError::Io(e) => HttpError::Io(e),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response(),
            HttpError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, HeaderValue::from_static("GET, HEAD"))],
                "Method not allowed",
            )
                .into_response(),
            HttpError::InvalidHeader(_) | HttpError::Io(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_errors_map_to_not_found() {
        assert!(matches!(
            HttpError::from(FsError::InvalidRequest),
            HttpError::NotFound
        ));
        assert!(matches!(HttpError::from(FsError::NotFound), HttpError::NotFound));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HttpError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        let io_err = HttpError::from(FsError::Io(io::Error::other("disk on fire")));
        assert_eq!(
            io_err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
