//! Per-event listener storage and the dispatch loop.
//!
//! A channel holds the listeners for one event name, grouped into
//! priority buckets. Within a bucket listeners stay sorted by name, with
//! equal names preserving registration order, so dispatch order is a pure
//! function of the registered set -- never of registration order.
//! Channels are internal: client code reaches them only through
//! [`Emitter`](crate::manager::Emitter) handles and the manager.

use std::collections::BTreeMap;

use crate::error::EventError;
use crate::event::Event;
use crate::registry::{ListenerFn, Priority};

/// One registered listener: a stable name plus the callback.
pub(crate) struct RegisteredListener {
    name: String,
    callback: ListenerFn,
}

/// The listener set for a single event name.
pub(crate) struct EventChannel {
    name: String,
    buckets: BTreeMap<Priority, Vec<RegisteredListener>>,
}

impl EventChannel {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            buckets: BTreeMap::new(),
        }
    }

    /// Append a listener to its priority bucket.
    ///
    /// The same listener registered twice occupies two slots and is
    /// invoked twice per emission; there is no dedup.
    pub(crate) fn register(&mut self, listener_name: &str, priority: Priority, callback: ListenerFn) {
        let bucket = self.buckets.entry(priority).or_default();
        // Insert after any equal name so registration order breaks ties.
        let position = bucket.partition_point(|entry| entry.name.as_str() <= listener_name);
        bucket.insert(
            position,
            RegisteredListener {
                name: listener_name.to_owned(),
                callback,
            },
        );
        tracing::debug!(
            event = %self.name,
            listener = %listener_name,
            priority = %priority,
            "registered listener"
        );
    }

    /// Invoke every listener in ascending priority order, then name order
    /// within a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::ListenerFailed`] as soon as a listener
    /// returns an error; remaining listeners are not run.
    pub(crate) fn dispatch(&mut self, event: &Event) -> Result<(), EventError> {
        let name = self.name.as_str();
        for bucket in self.buckets.values_mut() {
            for listener in bucket.iter_mut() {
                (listener.callback)(event).map_err(|source| EventError::ListenerFailed {
                    event: name.to_owned(),
                    listener: listener.name.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Number of registered listeners across all buckets.
    pub(crate) fn listener_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
