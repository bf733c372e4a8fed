//! Event envelopes and their stream positions.
//!
//! The read side never appends events; it only receives them verbatim from the
//! write side and uses their revisions for cache validation.

pub mod envelope;
pub mod stream;

pub use envelope::{EnvelopeError, EventData, EventEnvelope, is_event};
pub use stream::{StreamEvent, StreamName, StreamRevision};
