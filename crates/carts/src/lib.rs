//! Shopping cart read side.
//!
//! The read model as the projection leaves it, and the queries answered from
//! it. No IO lives here; stores and handlers are in `cartview-infra`.

pub mod details;
pub mod query;

pub use details::{PricedProductItem, ShoppingCartDetails, ShoppingCartStatus};
pub use query::{
    GET_SHOPPING_CART_DETAILS, GetShoppingCartDetails, GetShoppingCartDetailsData,
    GetShoppingCartDetailsError, MISSING_SHOPPING_CARD_ID, get_shopping_cart_details_query,
};
