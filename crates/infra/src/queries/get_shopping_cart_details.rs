use async_trait::async_trait;
use tracing::instrument;

use cartview_carts::{GetShoppingCartDetails, GetShoppingCartDetailsData, GetShoppingCartDetailsError, ShoppingCartDetails};
use cartview_core::{QueryFailure, QueryHandler};

use crate::config::ReadModelRetrySettings;
use crate::read_model::{ReadModelError, ShoppingCartDetailsStore, retry_if_not_found};

/// Answers [`GetShoppingCartDetails`] from the details read model, polling
/// while the row is not visible yet.
pub struct GetShoppingCartDetailsHandler<S> {
    store: S,
    retry: ReadModelRetrySettings,
}

impl<S> GetShoppingCartDetailsHandler<S>
where
    S: ShoppingCartDetailsStore,
{
    pub fn new(store: S, retry: ReadModelRetrySettings) -> Self {
        Self { store, retry }
    }
}

#[async_trait]
impl<S> QueryHandler<GetShoppingCartDetailsData> for GetShoppingCartDetailsHandler<S>
where
    S: ShoppingCartDetailsStore,
{
    type Value = ShoppingCartDetails;
    type Error = GetShoppingCartDetailsError;

    #[instrument(skip_all, fields(shopping_cart_id = %query.data().shopping_cart_id))]
    async fn handle(
        &self,
        query: GetShoppingCartDetails,
    ) -> Result<ShoppingCartDetails, QueryFailure<GetShoppingCartDetailsError>> {
        let id = query.into_data().shopping_cart_id;
        let store = &self.store;
        let id_ref = &id;

        let found = retry_if_not_found(move || store.find_by_id(id_ref), Some(self.retry.options())).await;

        match found {
            Ok(details) => Ok(details),
            Err(ReadModelError::RowNotFound) => {
                tracing::info!(shopping_cart_id = %id, "shopping cart details not found");
                Err(QueryFailure::rejected(GetShoppingCartDetailsError::ShoppingCartDoesNotExist))
            }
            Err(ReadModelError::Store(e)) => Err(QueryFailure::Infrastructure(e.into())),
            Err(ReadModelError::FailedToUpdateRow) => Err(QueryFailure::Infrastructure(anyhow::anyhow!(
                "unexpected update failure while reading shopping cart details"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use cartview_carts::get_shopping_cart_details_query;
    use cartview_core::{ClientId, ShoppingCartId};
    use cartview_events::StreamRevision;
    use chrono::Utc;

    use crate::read_model::{InMemoryShoppingCartDetailsStore, StoreError};

    fn retry(max_attempts: u32) -> ReadModelRetrySettings {
        ReadModelRetrySettings {
            max_attempts,
            delay: Duration::from_millis(10),
            deadline: None,
        }
    }

    async fn seeded(lag: u32, id: &str) -> Arc<InMemoryShoppingCartDetailsStore> {
        let store = Arc::new(InMemoryShoppingCartDetailsStore::with_visibility_lag(lag));
        let mut details = ShoppingCartDetails::opened(
            ShoppingCartId::new(id).unwrap(),
            ClientId::new("client-1").unwrap(),
            Utc::now(),
        );
        details.revision = StreamRevision::new(7);
        store.insert(details).await.unwrap();
        store
    }

    #[tokio::test(start_paused = true)]
    async fn returns_details_once_visible() {
        let handler = GetShoppingCartDetailsHandler::new(seeded(2, "abc").await, retry(5));

        let details = handler
            .handle(get_shopping_cart_details_query(Some("abc")).unwrap())
            .await
            .unwrap();

        assert_eq!(details.id.as_str(), "abc");
        assert_eq!(details.revision, StreamRevision::new(7));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_cart_is_rejected_after_retries() {
        let handler = GetShoppingCartDetailsHandler::new(seeded(0, "abc").await, retry(3));

        let err = handler
            .handle(get_shopping_cart_details_query(Some("other")).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QueryFailure::Rejected(GetShoppingCartDetailsError::ShoppingCartDoesNotExist)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn lag_longer_than_budget_is_rejected() {
        let handler = GetShoppingCartDetailsHandler::new(seeded(5, "abc").await, retry(3));

        let err = handler
            .handle(get_shopping_cart_details_query(Some("abc")).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, QueryFailure::Rejected(_)));
    }

    struct BrokenStore;

    #[async_trait]
    impl ShoppingCartDetailsStore for BrokenStore {
        async fn find_by_id(&self, _: &ShoppingCartId) -> Result<Option<ShoppingCartDetails>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn insert(&self, _: ShoppingCartDetails) -> Result<Vec<ShoppingCartId>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn update_if_revision(
            &self,
            _: StreamRevision,
            _: ShoppingCartDetails,
        ) -> Result<Vec<ShoppingCartId>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_is_infrastructure() {
        let handler = GetShoppingCartDetailsHandler::new(BrokenStore, retry(5));

        let err = handler
            .handle(get_shopping_cart_details_query(Some("abc")).unwrap())
            .await
            .unwrap_err();

        match err {
            QueryFailure::Infrastructure(e) => assert!(e.to_string().contains("down")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
