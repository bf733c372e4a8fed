use serde::Serialize;

use cartview_core::{Query, QueryError, ShoppingCartId, ValidationError};

/// Discriminant of [`GetShoppingCartDetails`].
pub const GET_SHOPPING_CART_DETAILS: &str = "get-shopping-cart-details";

/// The request did not name a cart.
pub const MISSING_SHOPPING_CARD_ID: ValidationError = ValidationError::new("MISSING_SHOPPING_CARD_ID");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetShoppingCartDetailsData {
    pub shopping_cart_id: ShoppingCartId,
}

pub type GetShoppingCartDetails = Query<GetShoppingCartDetailsData>;

/// Build the query from a raw path parameter.
///
/// An absent, empty, or whitespace-only id is rejected before any handler runs.
pub fn get_shopping_cart_details_query(
    shopping_cart_id: Option<&str>,
) -> Result<GetShoppingCartDetails, ValidationError> {
    let shopping_cart_id = shopping_cart_id
        .and_then(|raw| ShoppingCartId::new(raw).ok())
        .ok_or(MISSING_SHOPPING_CARD_ID)?;

    Ok(Query::new(
        GET_SHOPPING_CART_DETAILS,
        GetShoppingCartDetailsData { shopping_cart_id },
    ))
}

/// Expected failures of [`GetShoppingCartDetails`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GetShoppingCartDetailsError {
    /// No details became visible for the cart within the retry budget.
    ShoppingCartDoesNotExist,
}

impl QueryError for GetShoppingCartDetailsError {
    const ALL: &'static [Self] = &[Self::ShoppingCartDoesNotExist];

    fn code(&self) -> &'static str {
        match self {
            Self::ShoppingCartDoesNotExist => "SHOPPING_CART_DOES_NOT_EXIST",
        }
    }
}
