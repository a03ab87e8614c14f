//! Unified error handling for the sync service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::holded::HoldedError;
use crate::sync::{BatchError, ExportError};
use crate::woocommerce::WooCommerceError;

/// Application-level error type for the HTTP triggers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Holded API operation failed.
    #[error("Holded error: {0}")]
    Holded(#[from] HoldedError),

    /// WooCommerce API operation failed.
    #[error("WooCommerce error: {0}")]
    WooCommerce(#[from] WooCommerceError),

    /// Order could not be mapped to a Holded document.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Repository(e) => Self::Database(e),
            BatchError::Holded(e) => Self::Holded(e),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::WooCommerce(WooCommerceError::NotFound(what)) => Self::NotFound(what),
            ExportError::WooCommerce(e) => Self::WooCommerce(e),
            ExportError::Holded(e) => Self::Holded(e),
            ExportError::Mapping(e) => Self::Unprocessable(e.to_string()),
            ExportError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Holded(_) | Self::WooCommerce(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Sync request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Holded(_) | Self::WooCommerce(_) => StatusCode::BAD_GATEWAY,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Holded(_) | Self::WooCommerce(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 123".to_string());
        assert_eq!(err.to_string(), "Not found: order 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Holded(HoldedError::RateLimited(30))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_export_errors_map_to_client_statuses() {
        let missing = ExportError::WooCommerce(WooCommerceError::NotFound("order".to_string()));
        assert_eq!(get_status(missing.into()), StatusCode::NOT_FOUND);

        let unmappable = ExportError::Mapping(MappingError::EmptyOrder);
        assert_eq!(
            get_status(unmappable.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
