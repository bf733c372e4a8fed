//! `cartview-core`: read-side building blocks shared by every crate.
//!
//! This crate contains **pure** primitives (no infrastructure concerns): typed
//! identifiers, the query protocol, and the revision-to-ETag mapping.

pub mod error;
pub mod etag;
pub mod id;
pub mod query;

pub use error::DomainError;
pub use etag::{ETagError, WeakETag, if_none_match_satisfied, to_weak_etag};
pub use id::{ClientId, ShoppingCartId};
pub use query::{Query, QueryError, QueryFailure, QueryHandler, ValidationError, is_query};
