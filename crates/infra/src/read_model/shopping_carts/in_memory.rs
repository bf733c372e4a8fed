use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use cartview_carts::ShoppingCartDetails;
use cartview_core::ShoppingCartId;
use cartview_events::StreamRevision;

use super::ShoppingCartDetailsStore;
use crate::read_model::StoreError;

#[derive(Debug)]
struct Row {
    details: ShoppingCartDetails,
    /// Lookups that still miss this row before it becomes visible.
    hidden_reads: u32,
}

/// In-memory cart details store for tests/dev.
///
/// [`with_visibility_lag`](Self::with_visibility_lag) simulates a projection
/// that has not caught up yet: freshly inserted rows stay invisible for a
/// number of reads.
#[derive(Debug, Default)]
pub struct InMemoryShoppingCartDetailsStore {
    inner: RwLock<HashMap<ShoppingCartId, Row>>,
    visibility_lag: u32,
}

impl InMemoryShoppingCartDetailsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every inserted row is missed by the next `reads` lookups.
    pub fn with_visibility_lag(reads: u32) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            visibility_lag: reads,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl ShoppingCartDetailsStore for InMemoryShoppingCartDetailsStore {
    async fn find_by_id(&self, id: &ShoppingCartId) -> Result<Option<ShoppingCartDetails>, StoreError> {
        {
            let rows = self.inner.read().map_err(poisoned)?;
            match rows.get(id) {
                None => return Ok(None),
                Some(row) if row.hidden_reads == 0 => return Ok(Some(row.details.clone())),
                Some(_) => {}
            }
        }

        // Still hidden: consume one of its remaining misses.
        let mut rows = self.inner.write().map_err(poisoned)?;

        let Some(row) = rows.get_mut(id) else {
            return Ok(None);
        };

        if row.hidden_reads > 0 {
            row.hidden_reads -= 1;
            tracing::trace!(shopping_cart_id = %id, remaining = row.hidden_reads, "row not visible yet");
            return Ok(None);
        }

        Ok(Some(row.details.clone()))
    }

    async fn insert(&self, details: ShoppingCartDetails) -> Result<Vec<ShoppingCartId>, StoreError> {
        let mut rows = self.inner.write().map_err(poisoned)?;

        if rows.contains_key(&details.id) {
            return Ok(Vec::new());
        }

        let id = details.id.clone();
        rows.insert(
            id.clone(),
            Row {
                details,
                hidden_reads: self.visibility_lag,
            },
        );
        Ok(vec![id])
    }

    async fn update_if_revision(
        &self,
        expected: StreamRevision,
        details: ShoppingCartDetails,
    ) -> Result<Vec<ShoppingCartId>, StoreError> {
        let mut rows = self.inner.write().map_err(poisoned)?;

        match rows.get_mut(&details.id) {
            Some(row) if row.hidden_reads == 0 && row.details.revision == expected => {
                let id = details.id.clone();
                row.details = details;
                Ok(vec![id])
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartview_core::ClientId;
    use chrono::Utc;

    fn cart(id: &str) -> ShoppingCartDetails {
        ShoppingCartDetails::opened(
            ShoppingCartId::new(id).unwrap(),
            ClientId::new("client-1").unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn inserted_row_is_found() {
        let store = InMemoryShoppingCartDetailsStore::new();
        let details = cart("abc");

        assert_eq!(store.insert(details.clone()).await.unwrap(), vec![details.id.clone()]);
        assert_eq!(store.find_by_id(&details.id).await.unwrap(), Some(details));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn visible_rows_are_read_under_a_shared_lock() {
        let store = InMemoryShoppingCartDetailsStore::new();
        let details = cart("abc");
        store.insert(details.clone()).await.unwrap();

        let _reader = store.inner.read().unwrap();

        assert_eq!(store.find_by_id(&details.id).await.unwrap(), Some(details));
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = InMemoryShoppingCartDetailsStore::new();
        let id = ShoppingCartId::new("missing").unwrap();

        assert_eq!(store.find_by_id(&id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_affects_nothing() {
        let store = InMemoryShoppingCartDetailsStore::new();

        store.insert(cart("abc")).await.unwrap();
        assert!(store.insert(cart("abc")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lagging_row_appears_after_configured_reads() {
        let store = InMemoryShoppingCartDetailsStore::with_visibility_lag(2);
        let details = cart("abc");
        store.insert(details.clone()).await.unwrap();

        assert_eq!(store.find_by_id(&details.id).await.unwrap(), None);
        assert_eq!(store.find_by_id(&details.id).await.unwrap(), None);
        assert_eq!(store.find_by_id(&details.id).await.unwrap(), Some(details));
    }

    #[tokio::test]
    async fn update_requires_matching_revision() {
        let store = InMemoryShoppingCartDetailsStore::new();
        let details = cart("abc");
        store.insert(details.clone()).await.unwrap();

        let mut next = details.clone();
        next.revision = StreamRevision::new(1);

        assert!(
            store
                .update_if_revision(StreamRevision::new(5), next.clone())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            store.update_if_revision(StreamRevision::START, next.clone()).await.unwrap(),
            vec![details.id.clone()]
        );
        assert_eq!(store.find_by_id(&details.id).await.unwrap(), Some(next));
    }

    #[tokio::test]
    async fn update_of_invisible_row_affects_nothing() {
        let store = InMemoryShoppingCartDetailsStore::with_visibility_lag(1);
        let details = cart("abc");
        store.insert(details.clone()).await.unwrap();

        let updated = store
            .update_if_revision(StreamRevision::START, details.clone())
            .await
            .unwrap();
        assert!(updated.is_empty());

        store.find_by_id(&details.id).await.unwrap();
        let updated = store.update_if_revision(StreamRevision::START, details).await.unwrap();
        assert_eq!(updated.len(), 1);
    }
}
