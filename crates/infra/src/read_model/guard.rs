//! "Found" / "updated" postconditions for read-model access.
//!
//! A transient absence is retried; a store failure is not. After the retry
//! budget is spent, `RowNotFound` / `FailedToUpdateRow` is the caller's answer
//! (a normal outcome, usually a 404).

use std::future::Future;

use thiserror::Error;

use crate::retry::{RetryOptions, retry};

#[derive(Debug, Error)]
pub enum ReadModelError<E> {
    /// The lookup returned nothing.
    #[error("ROW_NOT_FOUND")]
    RowNotFound,

    /// The update affected no rows.
    #[error("FAILED_TO_UPDATE_ROW")]
    FailedToUpdateRow,

    /// The store failed; propagated unchanged.
    #[error(transparent)]
    Store(E),
}

impl<E> ReadModelError<E> {
    /// Failures explained by eventual visibility (worth re-polling).
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::RowNotFound | Self::FailedToUpdateRow)
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::RowNotFound => Some("ROW_NOT_FOUND"),
            Self::FailedToUpdateRow => Some("FAILED_TO_UPDATE_ROW"),
            Self::Store(_) => None,
        }
    }
}

async fn found<T, E>(lookup: impl Future<Output = Result<Option<T>, E>>) -> Result<T, ReadModelError<E>> {
    lookup
        .await
        .map_err(ReadModelError::Store)?
        .ok_or(ReadModelError::RowNotFound)
}

async fn updated<T, E>(update: impl Future<Output = Result<Vec<T>, E>>) -> Result<Vec<T>, ReadModelError<E>> {
    let rows = update.await.map_err(ReadModelError::Store)?;
    if rows.is_empty() {
        return Err(ReadModelError::FailedToUpdateRow);
    }
    Ok(rows)
}

/// Run `lookup` once; an absent result becomes [`ReadModelError::RowNotFound`].
pub async fn assert_found<T, E, F, Fut>(lookup: F) -> Result<T, ReadModelError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    found(lookup()).await
}

/// Run `update` once; no affected rows becomes [`ReadModelError::FailedToUpdateRow`].
pub async fn assert_updated<T, E, F, Fut>(update: F) -> Result<Vec<T>, ReadModelError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    updated(update()).await
}

/// Poll `lookup` until it finds a row or the retry budget runs out.
///
/// Only `RowNotFound` is retried, further narrowed by any `retry_if` already on
/// `options`. `None` uses [`RetryOptions::default`].
pub async fn retry_if_not_found<T, E, F, Fut>(
    mut lookup: F,
    options: Option<RetryOptions<ReadModelError<E>>>,
) -> Result<T, ReadModelError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: core::fmt::Display + 'static,
{
    let options = options
        .unwrap_or_default()
        .narrowed(|e: &ReadModelError<E>| matches!(e, ReadModelError::RowNotFound));

    retry(|| found(lookup()), &options).await
}

/// Re-run `update` until it affects at least one row or the retry budget runs out.
///
/// Only `FailedToUpdateRow` is retried. `None` uses [`RetryOptions::default`].
pub async fn retry_if_not_updated<T, E, F, Fut>(
    mut update: F,
    options: Option<RetryOptions<ReadModelError<E>>>,
) -> Result<Vec<T>, ReadModelError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: core::fmt::Display + 'static,
{
    let options = options
        .unwrap_or_default()
        .narrowed(|e: &ReadModelError<E>| matches!(e, ReadModelError::FailedToUpdateRow));

    retry(|| updated(update()), &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::DelayPolicy;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    type TestError = ReadModelError<String>;

    fn options(max_attempts: u32) -> Option<RetryOptions<TestError>> {
        Some(RetryOptions::new(
            max_attempts,
            DelayPolicy::Fixed(Duration::from_millis(20)),
        ))
    }

    /// Lookup that is absent for the first `hidden` calls.
    async fn lagging_lookup(calls: &AtomicU32, hidden: u32) -> Result<Option<&'static str>, String> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((n > hidden).then_some("row"))
    }

    #[tokio::test]
    async fn assert_found_maps_absence_to_row_not_found() {
        let missing = assert_found(|| async { Ok::<Option<u32>, String>(None) }).await;
        assert!(matches!(missing, Err(ReadModelError::RowNotFound)));
        assert_eq!(missing.unwrap_err().to_string(), "ROW_NOT_FOUND");

        let present = assert_found(|| async { Ok::<_, String>(Some(7)) }).await;
        assert_eq!(present.unwrap(), 7);
    }

    #[tokio::test]
    async fn assert_updated_checks_affected_rows() {
        let none = assert_updated(|| async { Ok::<Vec<u32>, String>(vec![]) }).await;
        assert!(matches!(none, Err(ReadModelError::FailedToUpdateRow)));
        assert_eq!(none.unwrap_err().code(), Some("FAILED_TO_UPDATE_ROW"));

        let some = assert_updated(|| async { Ok::<_, String>(vec![1, 2]) }).await;
        assert_eq!(some.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn store_errors_pass_through_unchanged() {
        let err = assert_found(|| async { Err::<Option<u32>, _>("connection refused".to_string()) })
            .await
            .unwrap_err();

        assert!(!err.is_absence());
        match err {
            ReadModelError::Store(msg) => assert_eq!(msg, "connection refused"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retry_if_not_found_succeeds_when_budget_exceeds_lag() {
        let calls = AtomicU32::new(0);

        let row = retry_if_not_found(|| lagging_lookup(&calls, 2), options(3)).await;

        assert_eq!(row.unwrap(), "row");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_if_not_found_gives_up_after_exactly_max_attempts() {
        let calls = AtomicU32::new(0);

        let row = retry_if_not_found(|| lagging_lookup(&calls, 3), options(3)).await;

        assert!(matches!(row, Err(ReadModelError::RowNotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_if_not_found_does_not_retry_store_errors() {
        let calls = AtomicU32::new(0);

        let row = retry_if_not_found(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<Option<u32>, _>("timeout".to_string()) }
            },
            options(5),
        )
        .await;

        assert!(matches!(row, Err(ReadModelError::Store(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_if_not_updated_polls_until_rows_affected() {
        let calls = AtomicU32::new(0);

        let rows = retry_if_not_updated(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, String>(if n < 2 { vec![] } else { vec!["abc"] }) }
            },
            None,
        )
        .await;

        assert_eq!(rows.unwrap(), vec!["abc"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn caller_predicate_can_disable_retries() {
        let calls = AtomicU32::new(0);
        let opts = options(5).map(|o| o.retry_if(|_: &TestError| false));

        let row = retry_if_not_found(|| lagging_lookup(&calls, 1), opts).await;

        assert!(matches!(row, Err(ReadModelError::RowNotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
