//! The event value dispatched through channels.
//!
//! An [`Event`] carries the simulation time at which it was emitted
//! (stamped by the manager, never by the producer), the set of population
//! members it affects, and an opaque payload for listener-specific data.
//! The population table itself lives outside the framework -- events only
//! reference its rows by [`EntityId`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier of one member of the externally-held population table.
///
/// The framework never interprets the value. It is an opaque row
/// identifier assigned by whatever owns the population data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Return the inner numeric value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The context of one event occurrence.
///
/// An event is immutable once constructed, except for its time, which the
/// manager stamps from the bound clock at emission. Producers never set
/// the time themselves; any value they supply is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Simulation time at which the event was emitted, or `None` before
    /// the event has passed through an emitter.
    time: Option<NaiveDateTime>,

    /// Population members affected by this event.
    index: Vec<EntityId>,

    /// Opaque payload interpreted only by listeners.
    payload: serde_json::Value,
}

impl Event {
    /// Create an event affecting the given population members, with an
    /// empty payload.
    pub const fn new(index: Vec<EntityId>) -> Self {
        Self {
            time: None,
            index,
            payload: serde_json::Value::Null,
        }
    }

    /// Create an event affecting the given population members, carrying
    /// an arbitrary payload.
    pub const fn with_payload(index: Vec<EntityId>, payload: serde_json::Value) -> Self {
        Self {
            time: None,
            index,
            payload,
        }
    }

    /// The simulation time at which this event was emitted.
    ///
    /// `None` until the event has been stamped by an emitter.
    pub const fn time(&self) -> Option<NaiveDateTime> {
        self.time
    }

    /// The population members affected by this event.
    pub fn index(&self) -> &[EntityId] {
        &self.index
    }

    /// The opaque payload attached at construction.
    pub const fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Create a new event which is a copy of this one but with a new index.
    ///
    /// The derived event shares the payload and the time stamp; only the
    /// affected population differs. Used by listeners that act on a subset
    /// of the original event's population.
    pub fn split(&self, new_index: Vec<EntityId>) -> Self {
        Self {
            time: self.time,
            index: new_index,
            payload: self.payload.clone(),
        }
    }

    /// Stamp the emission time. Called by the emitter, exactly once per
    /// dispatch.
    pub(crate) const fn stamp(&mut self, time: NaiveDateTime) {
        self.time = Some(time);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn index(ids: &[u64]) -> Vec<EntityId> {
        ids.iter().copied().map(EntityId).collect()
    }

    #[test]
    fn new_event_has_no_time() {
        let event = Event::new(index(&[1, 2, 3]));
        assert_eq!(event.time(), None);
        assert_eq!(event.index().len(), 3);
        assert_eq!(*event.payload(), serde_json::Value::Null);
    }

    #[test]
    fn split_shares_payload_and_time() {
        let payload = serde_json::json!({ "cause": "ihd" });
        let mut event = Event::with_payload(index(&[1, 2, 3, 4]), payload.clone());
        let stamp = NaiveDate::from_ymd_opt(2005, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        event.stamp(stamp);

        let derived = event.split(index(&[2, 4]));
        assert_eq!(derived.time(), Some(stamp));
        assert_eq!(derived.payload(), &payload);
        assert_eq!(derived.index(), &index(&[2, 4])[..]);
        // The original is untouched.
        assert_eq!(event.index().len(), 4);
    }

    #[test]
    fn entity_ids_round_trip_through_u64() {
        let id = EntityId::from(42_u64);
        assert_eq!(id.into_inner(), 42);
        assert_eq!(u64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }
}
