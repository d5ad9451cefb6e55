use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// Envelope for an event, carrying the metadata subscribers route on.
///
/// Notes:
/// - `entity_type` is a stable dotted name (e.g. "products.product").
/// - `entity_id` is the textual id of the record the event is about.
/// - `payload` is the typed domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    entity_type: String,
    entity_id: String,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a domain event with a fresh event id.
    pub fn wrap(entity_type: impl Into<String>, entity_id: impl ToString, payload: E) -> Self {
        Self::new(Uuid::now_v7(), entity_type, entity_id.to_string(), payload)
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}
