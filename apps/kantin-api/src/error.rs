//! Error types for the Kantin API.
//!
//! Every failure leaves the server as `{ "status": false, "error": "..." }`
//! with a status code picked from the error kind.
//!
//! ```text
//! CoreError::Validation / InsufficientStock / InsufficientPayment → 400
//! missing or malformed actor headers                               → 401
//! capability denied                                                → 403
//! CoreError::NotFound / DbError::NotFound                          → 404
//! DbError::ConcurrencyConflict / PoolExhausted                     → 503
//! anything else                                                    → 500
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use kantin_core::{CoreError, ValidationError};
use kantin_db::DbError;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Error envelope body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: bool,
    error: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Db(err) => match err {
                DbError::Core(CoreError::NotFound { .. }) | DbError::NotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                DbError::Core(_)
                | DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::ConcurrencyConflict(_) | DbError::PoolExhausted => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Db(DbError::Core(err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Db(DbError::Core(CoreError::Validation(err)))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Persistence details stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            status: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kantin_core::types::StockTier;
    use kantin_core::Money;

    #[test]
    fn test_domain_errors_map_to_bad_request() {
        let stock: ApiError = CoreError::InsufficientStock {
            tier: StockTier::Counter,
            product: "Teh Botol".to_string(),
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(stock.status_code(), StatusCode::BAD_REQUEST);

        let payment: ApiError = CoreError::InsufficientPayment {
            total: Money::from_major(5_000),
            cash_given: Money::from_major(1_000),
        }
        .into();
        assert_eq!(payment.status_code(), StatusCode::BAD_REQUEST);

        let validation: ApiError = ValidationError::Required {
            field: "items".to_string(),
        }
        .into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_and_conflict_codes() {
        let missing: ApiError = CoreError::not_found("Counter product", "x").into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let busy = ApiError::Db(DbError::ConcurrencyConflict("database is locked".into()));
        assert_eq!(busy.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let internal = ApiError::Db(DbError::Internal("boom".into()));
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_codes() {
        assert_eq!(
            ApiError::Unauthenticated("x-actor-id".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("view reports".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
