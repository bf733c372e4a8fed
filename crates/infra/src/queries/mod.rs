//! Query handlers backed by read-model stores.

mod get_shopping_cart_details;

pub use get_shopping_cart_details::GetShoppingCartDetailsHandler;
