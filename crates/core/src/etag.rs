//! Revision-to-ETag mapping.
//!
//! A stream revision is rendered as a weak validator (`W/"<revision>"`): two
//! representations carrying the same revision are semantically equivalent even
//! if their bytes differ (field order, formatting).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ETagError {
    #[error("entity tag must be a quoted string")]
    Unquoted,

    #[error("entity tag does not carry a revision: {0}")]
    InvalidRevision(String),
}

/// Weak cache-validation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeakETag(String);

impl WeakETag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the revision from an entity tag.
    ///
    /// Accepts both the weak (`W/"7"`) and strong (`"7"`) forms; comparison of
    /// validators on this read path is always weak.
    pub fn parse(tag: &str) -> Result<u64, ETagError> {
        let tag = tag.trim();
        let opaque = tag.strip_prefix("W/").unwrap_or(tag);
        let inner = opaque
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .ok_or(ETagError::Unquoted)?;

        inner
            .parse::<u64>()
            .map_err(|_| ETagError::InvalidRevision(inner.to_string()))
    }
}

impl core::fmt::Display for WeakETag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<WeakETag> for String {
    fn from(value: WeakETag) -> Self {
        value.0
    }
}

/// Render a revision as a weak entity tag.
pub fn to_weak_etag(revision: impl Into<u64>) -> WeakETag {
    WeakETag(format!("W/\"{}\"", revision.into()))
}

/// Whether an `If-None-Match` header value matches the current revision.
///
/// `*` matches any existing representation. Entries that fail to parse are
/// ignored rather than rejecting the request.
pub fn if_none_match_satisfied(header: &str, revision: u64) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || WeakETag::parse(candidate).is_ok_and(|r| r == revision)
    })
}
