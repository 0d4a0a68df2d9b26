//! Error types for the cohort-events crate.
//!
//! All failures are local and synchronous: they surface immediately as
//! `Result` values and the caller decides disposition. There is no retry
//! and no recovery inside the dispatch engine itself.

/// Boxed error type a listener may return to abort an emission.
///
/// Listeners are external collaborators with their own failure domains, so
/// the channel accepts any error type and wraps it with dispatch context.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during event registration and emission.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A priority outside the supported `0..=9` range was requested.
    #[error("priority {value} is out of range (expected 0..=9)")]
    PriorityOutOfRange {
        /// The rejected priority value.
        value: u8,
    },

    /// Emission was attempted before a clock source was bound.
    #[error("event manager has no clock bound: call setup before emitting")]
    ClockNotBound,

    /// A listener returned an error mid-emission.
    ///
    /// Remaining listeners for that emission were not run. A listener
    /// failure signals corrupted simulation state that must not be
    /// silently skipped.
    #[error("listener '{listener}' failed while handling '{event}': {source}")]
    ListenerFailed {
        /// Name of the event being dispatched.
        event: String,
        /// Name of the listener that failed.
        listener: String,
        /// The listener's own error.
        source: ListenerError,
    },

    /// A listener emitted into the channel that was already dispatching it.
    #[error("re-entrant emission on channel '{event}'")]
    ReentrantEmission {
        /// Name of the event whose channel was re-entered.
        event: String,
    },
}
