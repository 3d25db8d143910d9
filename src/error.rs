use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::submission::MessageResponse;

/// Errors surfaced to HTTP clients. Every variant renders as `{"message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Méthode non autorisée")]
    MethodNotAllowed,

    /// Aggregated `field: reason` list.
    #[error("{0}")]
    Validation(String),

    #[error("Trop de requêtes. Veuillez réessayer plus tard.")]
    RateLimited { retry_after_secs: u64 },

    /// Required server configuration is missing; the message names it.
    #[error("{0}")]
    Configuration(String),

    #[error("Erreur lors de l'enregistrement de votre demande: {0}")]
    Persistence(String),

    #[error("Service externe indisponible: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Configuration(_) | ApiError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Configuration(msg) => tracing::error!("Configuration error: {}", msg),
            ApiError::Persistence(msg) => tracing::error!("Persistence error: {}", msg),
            ApiError::Upstream(msg) => tracing::error!("Upstream error: {}", msg),
            _ => {}
        }

        let mut response = (status, Json(MessageResponse::new(self.to_string()))).into_response();

        match self {
            ApiError::MethodNotAllowed => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST"));
            }
            ApiError::RateLimited { retry_after_secs } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            }
            _ => {}
        }

        response
    }
}
