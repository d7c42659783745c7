pub mod categories;
pub mod health;
pub mod subscriptions;
pub mod users;

use axum::http::StatusCode;
use axum::response::Json;
use store::StoreError;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Maps a store error onto the HTTP status and body it should surface as.
///
/// Database and hashing failures are logged server-side and genericized so
/// driver internals never leak to the caller.
pub(crate) fn store_error_response(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::DuplicateName(_) | StoreError::DuplicateEmail(_) => StatusCode::CONFLICT,
        StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        StoreError::Database(_) | StoreError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Store operation failed: {}", err);
        "Internal server error".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: err.code().to_string(),
            success: false,
        }),
    )
}
