//! The simulation step clock.
//!
//! Population-level models run on calendar time: a start date plus a
//! fixed step duration, advanced once per simulation step. The clock is
//! the single time source for the run -- the event manager stamps every
//! emitted event from it, so listeners never disagree about "now".
//!
//! The current time lives behind a shared cell so that cloned handles
//! (including the closure bound into the event manager) observe every
//! advance.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, NaiveDateTime};

use cohort_events::Clock;

/// Errors that can occur during clock construction and advancement.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The step duration must be strictly positive.
    #[error("step duration must be positive, got {step:?}")]
    InvalidStep {
        /// The rejected step duration.
        step: Duration,
    },

    /// Advancing would leave the representable date range.
    #[error("advancing the clock past the representable date range")]
    TimeOverflow,
}

/// Calendar clock advancing by a fixed step.
///
/// Cloning is cheap and all clones share the same current time.
#[derive(Debug, Clone)]
pub struct SimClock {
    time: Rc<RefCell<NaiveDateTime>>,
    step: Duration,
}

impl SimClock {
    /// Create a clock at `start`, advancing by `step` per simulation
    /// step.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidStep`] if `step` is zero or negative.
    pub fn new(start: NaiveDateTime, step: Duration) -> Result<Self, ClockError> {
        if step <= Duration::zero() {
            return Err(ClockError::InvalidStep { step });
        }
        Ok(Self {
            time: Rc::new(RefCell::new(start)),
            step,
        })
    }

    /// The current simulation time.
    pub fn time(&self) -> NaiveDateTime {
        *self.time.borrow()
    }

    /// The fixed step duration.
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Advance by one step and return the new time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TimeOverflow`] if the new time is not
    /// representable.
    pub fn advance(&mut self) -> Result<NaiveDateTime, ClockError> {
        let next = self
            .time()
            .checked_add_signed(self.step)
            .ok_or(ClockError::TimeOverflow)?;
        *self.time.borrow_mut() = next;
        Ok(next)
    }

    /// A closure handle suitable for [`EventManager::setup`].
    ///
    /// The handle tracks this clock: events emitted after an advance are
    /// stamped with the advanced time.
    ///
    /// [`EventManager::setup`]: cohort_events::EventManager::setup
    pub fn clock(&self) -> Clock {
        let time = Rc::clone(&self.time);
        Rc::new(move || *time.borrow())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2005, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn advances_by_the_step_duration() {
        let mut clock = SimClock::new(start(), Duration::days(30)).unwrap();
        assert_eq!(clock.time(), start());

        let next = clock.advance().unwrap();
        assert_eq!(next, start() + Duration::days(30));
        assert_eq!(clock.time(), next);

        clock.advance().unwrap();
        assert_eq!(clock.time(), start() + Duration::days(60));
    }

    #[test]
    fn rejects_non_positive_steps() {
        assert!(matches!(
            SimClock::new(start(), Duration::zero()),
            Err(ClockError::InvalidStep { .. })
        ));
        assert!(matches!(
            SimClock::new(start(), Duration::days(-1)),
            Err(ClockError::InvalidStep { .. })
        ));
    }

    #[test]
    fn handles_share_the_current_time() {
        let mut clock = SimClock::new(start(), Duration::days(1)).unwrap();
        let handle = clock.clock();
        assert_eq!(handle(), start());

        clock.advance().unwrap();
        assert_eq!(handle(), start() + Duration::days(1));
    }

    #[test]
    fn overflow_is_reported() {
        let mut clock = SimClock::new(NaiveDateTime::MAX, Duration::days(1)).unwrap();
        assert!(matches!(clock.advance(), Err(ClockError::TimeOverflow)));
    }
}
