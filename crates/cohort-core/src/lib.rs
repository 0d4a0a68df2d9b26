//! Simulation scaffolding for the Cohort framework.
//!
//! This crate ties the two core subsystems together: the layered
//! configuration store (`cohort-config`) and the event dispatch engine
//! (`cohort-events`). A [`SimulationContext`] owns one of each plus the
//! step clock, installs components (configuration defaults first, event
//! wiring second), and drives the run by emitting `time_step` events over
//! the caller-supplied population index.
//!
//! # Modules
//!
//! - [`clock`] -- [`SimClock`]: calendar time advancing by a fixed step.
//! - [`context`] -- [`SimulationContext`] and the [`SimComponent`] trait.
//!
//! [`SimClock`]: clock::SimClock
//! [`SimulationContext`]: context::SimulationContext
//! [`SimComponent`]: context::SimComponent

pub mod clock;
pub mod context;

pub use clock::{ClockError, SimClock};
pub use context::{
    ContextError, SimComponent, SimulationContext, COMPONENT_CONFIGS_LAYER, CONFIG_LAYERS,
    TIME_STEP_EVENT,
};
