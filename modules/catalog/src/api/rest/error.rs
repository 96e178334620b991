use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::error::CatalogError;

/// Stable machine-readable error body returned by every catalog endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// REST-level error wrapper carrying the HTTP status for a domain failure.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                code: "bad_request",
                message: message.into(),
            },
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let (status, code) = match &err {
            CatalogError::BookNotFound { .. } => (StatusCode::NOT_FOUND, "book_not_found"),
            CatalogError::CategoryNotFound { .. } => (StatusCode::NOT_FOUND, "category_not_found"),
            CatalogError::IsbnAlreadyExists { .. } => (StatusCode::CONFLICT, "isbn_conflict"),
            CatalogError::UnknownSearchField { .. } | CatalogError::Database { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };
        Self {
            status,
            body: ErrorBody {
                code,
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.body.code, "{}", self.body.message);
        } else {
            warn!(code = self.body.code, "{}", self.body.message);
        }
        // Internal details stay in the log, not on the wire.
        let body = if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            ErrorBody {
                code: self.body.code,
                message: "internal error".to_string(),
            }
        } else {
            self.body
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::from(CatalogError::book_not_found(Uuid::new_v4()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.code, "book_not_found");
    }

    #[test]
    fn isbn_conflict_maps_to_409() {
        let err = ApiError::from(CatalogError::isbn_already_exists("9780441013593"));
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn database_error_maps_to_500() {
        let err = ApiError::from(CatalogError::database("boom"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
