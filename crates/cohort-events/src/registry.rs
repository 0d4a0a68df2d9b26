//! Listener and emitter declarations for simulation components.
//!
//! Components declare their event wiring through an explicit side-table:
//! each one fills a [`Declarations`] builder at install time, keyed by
//! handler name. The manager consumes the declarations, registers the
//! listeners, and installs emitters through their hooks. Declared
//! metadata stays inspectable via [`Declarations::listener_metadata`]
//! and [`Declarations::emitted_events`].

use serde::{Deserialize, Serialize};

use crate::error::{EventError, ListenerError};
use crate::event::Event;
use crate::manager::Emitter;

/// Dispatch priority of a listener within a channel.
///
/// Priorities range over `0..=9`; lower values fire earlier. The default
/// is the mid-range 5. Priority keys an ordered map in the channel, so
/// there is no fixed bucket array and no magic bound beyond the validated
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority(u8);

impl Priority {
    /// The earliest-firing priority.
    pub const MIN: Self = Self(0);

    /// The latest-firing priority.
    pub const MAX: Self = Self(9);

    /// Validate a raw priority value.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::PriorityOutOfRange`] if `value` exceeds 9.
    pub const fn new(value: u8) -> Result<Self, EventError> {
        if value > Self::MAX.0 {
            return Err(EventError::PriorityOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Return the raw priority value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(5)
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback type stored for each registered listener.
pub(crate) type ListenerFn = Box<dyn FnMut(&Event) -> Result<(), ListenerError>>;

/// Hook through which a component receives its emitter during setup.
pub(crate) type InstallFn = Box<dyn FnOnce(Emitter)>;

/// One declared listener: metadata plus the callback itself.
pub(crate) struct ListenerDecl {
    pub(crate) event: String,
    pub(crate) handler: String,
    pub(crate) priority: Priority,
    pub(crate) callback: ListenerFn,
}

/// Metadata describing one declared listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerMetadata {
    /// Name of the event listened for.
    pub event: String,
    /// Name of the handler within its component.
    pub handler: String,
    /// Dispatch priority.
    pub priority: Priority,
}

/// Builder through which a component declares its listeners and emitters.
///
/// A handler may be declared for several events, each with its own
/// priority; declarations accumulate. The manager consumes the builder in
/// [`EventManager::setup_components`].
///
/// [`EventManager::setup_components`]: crate::manager::EventManager::setup_components
#[derive(Default)]
pub struct Declarations {
    listeners: Vec<ListenerDecl>,
    emitters: Vec<(String, InstallFn)>,
}

impl Declarations {
    /// Create an empty declaration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `handler` listens for `event` at the given priority.
    pub fn listens_for<F>(&mut self, event: &str, handler: &str, priority: Priority, callback: F)
    where
        F: FnMut(&Event) -> Result<(), ListenerError> + 'static,
    {
        self.listeners.push(ListenerDecl {
            event: event.to_owned(),
            handler: handler.to_owned(),
            priority,
            callback: Box::new(callback),
        });
    }

    /// Declare that the component emits `event`.
    ///
    /// During setup the manager creates the channel eagerly (so
    /// `list_events` reflects it before the first emission) and calls
    /// `install` with a ready [`Emitter`] for the component to store.
    pub fn emits<F>(&mut self, event: &str, install: F)
    where
        F: FnOnce(Emitter) + 'static,
    {
        self.emitters.push((event.to_owned(), Box::new(install)));
    }

    /// All declared listener metadata, in declaration order.
    pub fn listener_metadata(&self) -> Vec<ListenerMetadata> {
        self.listeners
            .iter()
            .map(|decl| ListenerMetadata {
                event: decl.event.clone(),
                handler: decl.handler.clone(),
                priority: decl.priority,
            })
            .collect()
    }

    /// Names of all events declared as emitted, in declaration order.
    pub fn emitted_events(&self) -> Vec<String> {
        self.emitters.iter().map(|(event, _)| event.clone()).collect()
    }

    /// True when nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.emitters.is_empty()
    }

    /// Decompose into listener declarations and emitter hooks.
    pub(crate) fn into_parts(self) -> (Vec<ListenerDecl>, Vec<(String, InstallFn)>) {
        (self.listeners, self.emitters)
    }
}

/// An external object providing handlers wireable as listeners or
/// emitters during setup.
///
/// The trait is the capability seam: anything implementing it can be
/// installed, regardless of concrete type. State shared between the
/// component and its handler closures is the component's own business
/// (typically `Rc<Cell<_>>` or `Rc<RefCell<_>>` handles cloned into the
/// closures).
pub trait Component {
    /// Stable component name, used as the prefix of registered listener
    /// names (`component.handler`).
    fn name(&self) -> &str;

    /// Fill `declarations` with this component's listeners and emitters.
    fn register(&self, declarations: &mut Declarations);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn priority_validates_range() {
        assert_eq!(Priority::new(0).unwrap(), Priority::MIN);
        assert_eq!(Priority::new(9).unwrap(), Priority::MAX);
        assert_eq!(Priority::default().get(), 5);

        let err = Priority::new(10).unwrap_err();
        assert!(matches!(err, EventError::PriorityOutOfRange { value: 10 }));
    }

    #[test]
    fn declarations_expose_metadata() {
        let mut declarations = Declarations::new();
        assert!(declarations.is_empty());

        declarations.listens_for("time_step", "track_cost", Priority::default(), |_| Ok(()));
        declarations.listens_for(
            "collect_metrics",
            "track_cost",
            Priority::new(1).unwrap(),
            |_| Ok(()),
        );
        declarations.emits("intervention_applied", |_emitter| {});

        let metadata = declarations.listener_metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].event, "time_step");
        assert_eq!(metadata[0].handler, "track_cost");
        assert_eq!(metadata[1].priority.get(), 1);

        assert_eq!(declarations.emitted_events(), vec!["intervention_applied"]);
        assert!(!declarations.is_empty());
    }
}
