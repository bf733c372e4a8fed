use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use cartview_carts::GetShoppingCartDetailsError;
use cartview_core::ValidationError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 carrying the validation code as the message.
pub fn validation_error_response(err: ValidationError) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", err.code())
}

pub fn get_shopping_cart_details_status(err: GetShoppingCartDetailsError) -> StatusCode {
    match err {
        GetShoppingCartDetailsError::ShoppingCartDoesNotExist => StatusCode::NOT_FOUND,
    }
}

/// Expected query failures map to a bare status with an empty body.
pub fn get_shopping_cart_details_error_response(err: GetShoppingCartDetailsError) -> Response {
    get_shopping_cart_details_status(err).into_response()
}

/// Details stay in the logs; clients get a generic body.
pub fn internal_error_response(err: &anyhow::Error) -> Response {
    tracing::error!(error = %err, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}
