//! Request failures and their HTTP mapping.

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::decode::DecodeError;
use crate::http::response::TEXT_PLAIN;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid submission: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to read request body")]
    BodyRead(#[source] axum::Error),

    #[error("failed to store submission")]
    Store(#[from] StoreError),

    #[error("store worker failed")]
    Worker(#[from] tokio::task::JoinError),

    #[error("store document unavailable")]
    DocumentUnavailable(#[source] std::io::Error),

    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Worker(_) | ApiError::DocumentUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_string();
        match self {
            ApiError::MethodNotAllowed(_) => (
                status,
                [(header::CONTENT_TYPE, TEXT_PLAIN), (header::ALLOW, "GET, POST")],
                body,
            )
                .into_response(),
            _ => (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response(),
        }
    }
}
