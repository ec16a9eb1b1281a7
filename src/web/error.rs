use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::store::StoreError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("method not allowed: {0}")]
    MethodNotAllowed(Method),
    #[error("request body is not a valid form submission: {0}")]
    FormRejected(#[from] FormRejection),
    #[error("request body is not a valid multipart form: {0}")]
    MultipartRejected(#[from] MultipartRejection),
    #[error("failed to read a multipart field: {0}")]
    Multipart(#[from] MultipartError),

    #[error("subscription store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    /// The landing page script only reads the body, so protocol errors keep the 200 status.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::MethodNotAllowed(_)
            | Error::FormRejected(_)
            | Error::MultipartRejected(_)
            | Error::Multipart(_) => (StatusCode::OK, InvalidRequest),
            Error::Store(_) | Error::Io(_) | Error::Unexpected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// The error as the client gets to see it.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Invalid request")]
    InvalidRequest,
    #[display("Service error")]
    ServiceError,
}
