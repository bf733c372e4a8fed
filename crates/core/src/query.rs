//! Query protocol.
//!
//! An inbound request is mapped either to a well-formed [`Query`] or to a
//! [`ValidationError`]; only the former ever reaches a [`QueryHandler`]. A
//! handler answers with the value, a member of its closed error set, or an
//! infrastructure failure:
//!
//! ```text
//! Received -> Validated -> Dispatched -> Succeeded | NotFound (closed error)
//!          \-> Rejected (ValidationError)
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Boundary rejection: a request that could not be turned into a query.
///
/// Always returned, never raised; the transport maps it to a client error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Error)]
#[error("{0}")]
pub struct ValidationError(&'static str);

impl ValidationError {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn code(&self) -> &'static str {
        self.0
    }
}

/// A well-formed query: a kind discriminant plus validated input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query<D> {
    #[serde(rename = "type")]
    query_type: &'static str,
    data: D,
}

impl<D> Query<D> {
    pub fn new(query_type: &'static str, data: D) -> Self {
        Self { query_type, data }
    }

    pub fn query_type(&self) -> &'static str {
        self.query_type
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn into_data(self) -> D {
        self.data
    }
}

/// Structural gate for untyped candidates: an object carrying `type` and `data`.
///
/// A validation-error string (or any other non-object) is never a query.
pub fn is_query(candidate: &JsonValue) -> bool {
    candidate
        .as_object()
        .is_some_and(|fields| fields.contains_key("type") && fields.contains_key("data"))
}

/// Closed set of expected failures declared by one query kind.
///
/// `ALL` must list every variant; transport adapters are tested against it so a
/// new variant cannot ship without a mapped response.
pub trait QueryError: Copy + Eq + core::fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Stable wire code (e.g. `SHOPPING_CART_DOES_NOT_EXIST`).
    fn code(&self) -> &'static str;
}

/// Failure branch of a query handler.
#[derive(Debug, Error)]
pub enum QueryFailure<E: QueryError> {
    /// Expected, typed outcome from the query's closed error set.
    #[error("query rejected: {}", .0.code())]
    Rejected(E),

    /// Anything else (connection errors, decoding failures, ...). Not retried.
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

impl<E: QueryError> QueryFailure<E> {
    pub fn rejected(error: E) -> Self {
        Self::Rejected(error)
    }
}

/// Answers one kind of query.
#[async_trait]
pub trait QueryHandler<D>: Send + Sync
where
    D: Send + 'static,
{
    type Value: Send;
    type Error: QueryError;

    async fn handle(&self, query: Query<D>) -> Result<Self::Value, QueryFailure<Self::Error>>;
}
