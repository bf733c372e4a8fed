use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Event payload: field name to JSON value, keys unique by construction.
pub type EventData = serde_json::Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("event type must not be empty")]
    EmptyType,

    #[error("candidate is not an event (expected an object with `type` and `data`)")]
    NotAnEvent,

    #[error("malformed event: {0}")]
    Malformed(String),
}

/// Immutable record of a domain occurrence.
///
/// Wire shape: `{"type": "...", "data": {...}, "metadata": {...}}` with
/// `metadata` omitted when absent. Fields are private; an envelope is read
/// back exactly as the write side recorded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<EventData>,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, data: EventData) -> Result<Self, EnvelopeError> {
        let event_type = event_type.into();
        if event_type.trim().is_empty() {
            return Err(EnvelopeError::EmptyType);
        }

        Ok(Self {
            event_type,
            data,
            metadata: None,
        })
    }

    pub fn with_metadata(mut self, metadata: EventData) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn metadata(&self) -> Option<&EventData> {
        self.metadata.as_ref()
    }
}

/// Shape check for ingestion boundaries: a non-null object with `type` and `data`.
///
/// Does not inspect the contents of `data`.
pub fn is_event(candidate: &JsonValue) -> bool {
    candidate
        .as_object()
        .is_some_and(|fields| fields.contains_key("type") && fields.contains_key("data"))
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
    #[serde(default)]
    metadata: Option<EventData>,
}

impl TryFrom<RawEnvelope> for EventEnvelope {
    type Error = EnvelopeError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        let envelope = Self::new(raw.event_type, raw.data)?;
        Ok(match raw.metadata {
            Some(metadata) => envelope.with_metadata(metadata),
            None => envelope,
        })
    }
}

impl TryFrom<JsonValue> for EventEnvelope {
    type Error = EnvelopeError;

    fn try_from(candidate: JsonValue) -> Result<Self, Self::Error> {
        if !is_event(&candidate) {
            return Err(EnvelopeError::NotAnEvent);
        }

        let raw: RawEnvelope =
            serde_json::from_value(candidate).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
        raw.try_into()
    }
}
