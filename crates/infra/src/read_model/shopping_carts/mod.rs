//! Shopping cart details read model storage.

mod in_memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use cartview_carts::ShoppingCartDetails;
use cartview_core::ShoppingCartId;
use cartview_events::StreamRevision;

use super::StoreError;

pub use in_memory::InMemoryShoppingCartDetailsStore;
pub use postgres::PostgresShoppingCartDetailsStore;

/// Storage for cart details with eventually visible writes.
///
/// Writes report the ids they affected; an empty vector means nothing matched
/// (row missing, not yet visible, or at a different revision).
#[async_trait]
pub trait ShoppingCartDetailsStore: Send + Sync {
    async fn find_by_id(&self, id: &ShoppingCartId) -> Result<Option<ShoppingCartDetails>, StoreError>;

    /// Insert a new row; an existing row with the same id is left untouched.
    async fn insert(&self, details: ShoppingCartDetails) -> Result<Vec<ShoppingCartId>, StoreError>;

    /// Replace the row only if it is still at `expected` (optimistic concurrency).
    async fn update_if_revision(
        &self,
        expected: StreamRevision,
        details: ShoppingCartDetails,
    ) -> Result<Vec<ShoppingCartId>, StoreError>;
}

#[async_trait]
impl<S> ShoppingCartDetailsStore for Arc<S>
where
    S: ShoppingCartDetailsStore + ?Sized,
{
    async fn find_by_id(&self, id: &ShoppingCartId) -> Result<Option<ShoppingCartDetails>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, details: ShoppingCartDetails) -> Result<Vec<ShoppingCartId>, StoreError> {
        (**self).insert(details).await
    }

    async fn update_if_revision(
        &self,
        expected: StreamRevision,
        details: ShoppingCartDetails,
    ) -> Result<Vec<ShoppingCartId>, StoreError> {
        (**self).update_if_revision(expected, details).await
    }
}
