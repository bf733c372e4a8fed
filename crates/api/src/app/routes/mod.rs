use axum::Router;

pub mod shopping_carts;
pub mod system;

pub fn router() -> Router {
    Router::new().merge(shopping_carts::router())
}
