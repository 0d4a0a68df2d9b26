//! The event manager: channel ownership, clock binding, component wiring.
//!
//! One manager exists per simulation run. Channels are created lazily on
//! first reference (by an emitter or a listener registration) and persist
//! for the run. The manager binds the clock source at setup; every
//! emission stamps its event's time from that clock before dispatch.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDateTime;

use crate::channel::EventChannel;
use crate::error::{EventError, ListenerError};
use crate::event::Event;
use crate::registry::{Component, Declarations, Priority};

/// Shared time source bound at setup.
///
/// The manager calls it once per emission to stamp the outgoing event.
pub type Clock = Rc<dyn Fn() -> NaiveDateTime>;

type SharedChannel = Rc<RefCell<EventChannel>>;
type SharedClock = Rc<RefCell<Option<Clock>>>;

/// Owns the set of event channels and the bound clock source.
///
/// Client code usually interacts with the manager only through
/// [`Emitter`] handles and component declarations; direct listener
/// registration exists for callers outside the component system.
#[derive(Default)]
pub struct EventManager {
    channels: BTreeMap<String, SharedChannel>,
    clock: SharedClock,
}

impl EventManager {
    /// Create a manager with no channels and no clock bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the time source. Must precede any emission.
    pub fn setup(&mut self, clock: Clock) {
        *self.clock.borrow_mut() = Some(clock);
    }

    /// Get an emitter handle for the named event, creating the channel if
    /// absent.
    ///
    /// The handle is cheap to clone and stays valid for the life of the
    /// run. Emitting to a channel with zero listeners is not an error.
    pub fn get_emitter(&mut self, name: &str) -> Emitter {
        let channel = self.channel(name);
        Emitter {
            event: name.to_owned(),
            channel,
            clock: Rc::clone(&self.clock),
        }
    }

    /// Register a listener on the named event's channel.
    ///
    /// Registering the same listener twice invokes it twice per emission;
    /// there is no dedup.
    pub fn register_listener<F>(
        &mut self,
        name: &str,
        listener_name: &str,
        priority: Priority,
        callback: F,
    ) where
        F: FnMut(&Event) -> Result<(), ListenerError> + 'static,
    {
        self.channel(name)
            .borrow_mut()
            .register(listener_name, priority, Box::new(callback));
    }

    /// Install a collection of components.
    ///
    /// Each component's declarations are collected and wired: listener
    /// declarations are processed in sorted handler-name order for
    /// determinism and registered under `component.handler` names;
    /// declared emitters get their channels created eagerly (so
    /// [`list_events`](Self::list_events) is accurate before the first
    /// emission) and are handed to their install hooks.
    pub fn setup_components(&mut self, components: &[&dyn Component]) {
        for component in components {
            let mut declarations = Declarations::new();
            component.register(&mut declarations);
            let (mut listeners, mut emitters) = declarations.into_parts();

            listeners.sort_by(|a, b| a.handler.cmp(&b.handler));
            for decl in listeners {
                let listener_name = format!("{}.{}", component.name(), decl.handler);
                self.channel(&decl.event).borrow_mut().register(
                    &listener_name,
                    decl.priority,
                    decl.callback,
                );
            }

            emitters.sort_by(|a, b| a.0.cmp(&b.0));
            for (event, install) in emitters {
                let emitter = self.get_emitter(&event);
                tracing::debug!(
                    component = %component.name(),
                    event = %event,
                    "installed emitter"
                );
                install(emitter);
            }
        }
    }

    /// List all event names known to the manager, sorted.
    ///
    /// This reflects every channel created so far and can grow after
    /// setup if components dynamically reference new event names.
    pub fn list_events(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Number of listeners currently registered on the named channel.
    ///
    /// Zero for channels that do not exist yet.
    pub fn listener_count(&self, name: &str) -> usize {
        self.channels
            .get(name)
            .map_or(0, |channel| channel.borrow().listener_count())
    }

    fn channel(&mut self, name: &str) -> SharedChannel {
        if let Some(channel) = self.channels.get(name) {
            return Rc::clone(channel);
        }
        tracing::debug!(event = %name, "created event channel");
        let channel = Rc::new(RefCell::new(EventChannel::new(name)));
        self.channels.insert(name.to_owned(), Rc::clone(&channel));
        channel
    }
}

/// A handle that emits one named event.
///
/// Calling [`emit`](Self::emit) stamps the event's time from the bound
/// clock and dispatches it to every listener of the channel, in ascending
/// priority order then lexicographic listener-name order within a
/// priority. The stamped event is returned on success.
#[derive(Clone)]
pub struct Emitter {
    event: String,
    channel: SharedChannel,
    clock: SharedClock,
}

impl Emitter {
    /// Name of the event this handle emits.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Emit an event to all listeners of this channel.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::ClockNotBound`] if the manager has not been
    /// set up, [`EventError::ReentrantEmission`] if this channel is
    /// already mid-dispatch, or the first listener failure as
    /// [`EventError::ListenerFailed`].
    pub fn emit(&self, mut event: Event) -> Result<Event, EventError> {
        let now = {
            let clock = self.clock.borrow();
            let clock = clock.as_ref().ok_or(EventError::ClockNotBound)?;
            clock()
        };
        event.stamp(now);

        let mut channel =
            self.channel
                .try_borrow_mut()
                .map_err(|_already_borrowed| EventError::ReentrantEmission {
                    event: self.event.clone(),
                })?;
        channel.dispatch(&event)?;
        drop(channel);

        Ok(event)
    }
}
