use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use cartview_carts::{GetShoppingCartDetails, get_shopping_cart_details_query};
use cartview_core::{QueryFailure, QueryHandler, ValidationError, if_none_match_satisfied, to_weak_etag};

use crate::app::errors::{get_shopping_cart_details_error_response, internal_error_response, validation_error_response};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/clients/:client_id/shopping-carts/:shopping_cart_id", get(get_by_id))
        .route("/clients/:client_id/shopping-carts", get(get_without_id))
        .route("/clients/:client_id/shopping-carts/", get(get_without_id))
}

/// The client id only scopes the route; carts are looked up by their own id.
fn map_request_to_query(shopping_cart_id: Option<&str>) -> Result<GetShoppingCartDetails, ValidationError> {
    get_shopping_cart_details_query(shopping_cart_id)
}

pub async fn get_by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path((_client_id, shopping_cart_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    get_details(&services, Some(&shopping_cart_id), &headers).await
}

pub async fn get_without_id(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    get_details(&services, None, &headers).await
}

async fn get_details(services: &AppServices, shopping_cart_id: Option<&str>, headers: &HeaderMap) -> Response {
    let query = match map_request_to_query(shopping_cart_id) {
        Ok(query) => query,
        Err(err) => return validation_error_response(err),
    };

    let details = match services.get_shopping_cart_details.handle(query).await {
        Ok(details) => details,
        Err(QueryFailure::Rejected(err)) => return get_shopping_cart_details_error_response(err),
        Err(QueryFailure::Infrastructure(err)) => return internal_error_response(&err),
    };

    let etag = to_weak_etag(details.revision).to_string();

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| if_none_match_satisfied(v, details.revision.as_u64()));

    if not_modified {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (StatusCode::OK, [(header::ETAG, etag)], Json(details)).into_response()
}
