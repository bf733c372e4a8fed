//! Read model storage.
//!
//! Read models lag the write side: a row written by the projection may not be
//! visible to the very next lookup. [`guard`] turns "absent" and "no rows
//! affected" into retryable failures so callers can poll until the row shows up.

pub mod guard;
pub mod shopping_carts;

use thiserror::Error;

pub use guard::{ReadModelError, assert_found, assert_updated, retry_if_not_found, retry_if_not_updated};
pub use shopping_carts::{
    InMemoryShoppingCartDetailsStore, PostgresShoppingCartDetailsStore, ShoppingCartDetailsStore,
};

/// Failure of the store itself (as opposed to an absent row).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to decode read model row: {0}")]
    Decode(String),

    #[error("read model store unavailable: {0}")]
    Unavailable(String),
}
