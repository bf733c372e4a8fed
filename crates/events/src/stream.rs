use serde::{Deserialize, Serialize};

use cartview_core::{DomainError, ShoppingCartId};

use crate::EventEnvelope;

/// Position of an event within its stream.
///
/// Assigned by the store at append time: the first event of a stream is at
/// [`StreamRevision::START`] and each accepted write advances it by exactly one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamRevision(u64);

impl StreamRevision {
    pub const START: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Revision of the next accepted write; `None` once the stream is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for StreamRevision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<StreamRevision> for u64 {
    fn from(value: StreamRevision) -> Self {
        value.0
    }
}

impl core::fmt::Display for StreamRevision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Unique, non-empty identifier of an append-only stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamName(String);

impl StreamName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("stream name must not be empty"));
        }
        Ok(Self(name))
    }

    /// `shopping_cart-<id>`, the stream holding one cart's history.
    pub fn for_shopping_cart(id: &ShoppingCartId) -> Self {
        Self(format!("shopping_cart-{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StreamName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StreamName> for String {
    fn from(value: StreamName) -> Self {
        value.0
    }
}

impl core::fmt::Display for StreamName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An envelope as read back from a stream, with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEvent {
    event: EventEnvelope,
    stream_revision: StreamRevision,
    stream_name: StreamName,
}

impl StreamEvent {
    pub fn new(event: EventEnvelope, stream_revision: StreamRevision, stream_name: StreamName) -> Self {
        Self {
            event,
            stream_revision,
            stream_name,
        }
    }

    pub fn event(&self) -> &EventEnvelope {
        &self.event
    }

    pub fn stream_revision(&self) -> StreamRevision {
        self.stream_revision
    }

    pub fn stream_name(&self) -> &StreamName {
        &self.stream_name
    }

    pub fn into_event(self) -> EventEnvelope {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventData;
    use cartview_core::to_weak_etag;
    use serde_json::json;

    #[test]
    fn revisions_start_at_zero_and_advance_by_one() {
        let first = StreamRevision::START;
        assert_eq!(first.as_u64(), 0);
        assert_eq!(first.next(), Some(StreamRevision::new(1)));
        assert_eq!(StreamRevision::new(u64::MAX).next(), None);
    }

    #[test]
    fn shopping_cart_streams_are_named_after_the_cart() {
        let id = ShoppingCartId::new("abc").unwrap();
        assert_eq!(StreamName::for_shopping_cart(&id).as_str(), "shopping_cart-abc");
        assert!(StreamName::new("").is_err());
    }

    #[test]
    fn stream_event_wire_format_uses_camel_case() {
        let envelope = EventEnvelope::new("ShoppingCartConfirmed", EventData::new()).unwrap();
        let event = StreamEvent::new(
            envelope,
            StreamRevision::new(7),
            StreamName::new("shopping_cart-abc").unwrap(),
        );

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": { "type": "ShoppingCartConfirmed", "data": {} },
                "streamRevision": 7,
                "streamName": "shopping_cart-abc",
            })
        );

        let back: StreamEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
        assert_eq!(to_weak_etag(back.stream_revision()).as_str(), r#"W/"7""#);
    }
}
