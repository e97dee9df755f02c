//! Error taxonomy for the HTTP surface.
//!
//! Every failure maps to a fixed status and a short message. Store, provider
//! and signing details are logged here and never sent to the client.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ironlog::{AuthError, StoreError};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    InvalidInput(String),
    #[error("resource not found")]
    NotFound,
    #[error("resource already exists")]
    DuplicateResource,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::DuplicateResource => (StatusCode::CONFLICT, "DUPLICATE_RESOURCE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(detail) => {
                error!("Internal server error: {}", detail);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({ "error": { "code": code, "message": message } });
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::DuplicateResource => ApiError::DuplicateResource,
            StoreError::Internal(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenInvalid => ApiError::Unauthenticated,
            AuthError::IdentityInvalid(reason) => {
                warn!("Identity assertion rejected: {}", reason);
                ApiError::Unauthenticated
            }
            AuthError::ProviderUnavailable(e) => ApiError::Internal(e.to_string()),
            AuthError::Signing(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_stable_statuses() {
        let (status, _) = ApiError::from(StoreError::NotFound).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, code) = ApiError::from(StoreError::DuplicateResource).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "DUPLICATE_RESOURCE");

        let internal = ApiError::from(StoreError::Internal(sqlx_pool_closed()));
        assert_eq!(
            internal.status_and_code().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failures_are_unauthenticated() {
        assert!(matches!(
            ApiError::from(AuthError::TokenInvalid),
            ApiError::Unauthenticated
        ));
        assert!(matches!(
            ApiError::from(AuthError::IdentityInvalid("bad audience".into())),
            ApiError::Unauthenticated
        ));
    }

    #[tokio::test]
    async fn internal_detail_is_not_exposed() {
        let response =
            ApiError::Internal("disk I/O error at /var/lib/ironlog".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL");
        assert!(!body.to_string().contains("/var/lib/ironlog"));
    }

    fn sqlx_pool_closed() -> ironlog::db::SqlxError {
        ironlog::db::SqlxError::PoolClosed
    }
}
