//! API error taxonomy and its HTTP mapping.
//!
//! This is the only place status codes and client-facing messages for
//! failures are chosen. Store errors are logged with full detail here and
//! replaced by a generic message on the wire.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cadeira_store::StoreError;
use serde::Serialize;
use thiserror::Error;

pub const MISSING_FIELDS_MESSAGE: &str =
    "O campo \"personalidade\" e \"qtdPernas\" são obrigatórios";
pub const NOT_FOUND_MESSAGE: &str = "cadeira não encontrada";
pub const INVALID_BODY_MESSAGE: &str = "corpo da requisição inválido";
pub const INTERNAL_MESSAGE: &str = "Erro interno no servidor";

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// `personalidade` or `qtdPernas` missing or falsy.
    #[error("required fields missing")]
    MissingFields,

    /// Body is not valid JSON for the request schema.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("cadeira not found")]
    NotFound,

    #[error("{operation}: {source}")]
    Internal {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wrap a store failure with the operation that hit it.
    pub fn internal(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Internal { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::MissingFields => MISSING_FIELDS_MESSAGE,
            ApiError::InvalidBody(_) => INVALID_BODY_MESSAGE,
            ApiError::NotFound => NOT_FOUND_MESSAGE,
            ApiError::Internal { .. } => INTERNAL_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { operation, source } => {
                tracing::error!(operation, error = %source, "store failure");
            }
            ApiError::InvalidBody(detail) => {
                tracing::debug!(%detail, "rejected request body");
            }
            _ => {}
        }
        let body = ErrorBody {
            message: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
