//! The simulation context: configuration, events, and clock in one place.
//!
//! A context is created once per run. It builds the standard layer stack,
//! seeds the framework's own defaults at the weakest layer, binds the
//! clock into the event manager, and installs components: configuration
//! defaults first (so components can be reconfigured by stronger layers),
//! event wiring second. After setup the configuration is typically frozen
//! and the run proceeds by calling [`SimulationContext::step`] with the
//! population index for each time step.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use cohort_config::{ConfigError, ConfigTree, ConfigValue};
use cohort_events::{Component, EntityId, Event, EventError, EventManager};

use crate::clock::{ClockError, SimClock};

/// The standard override layer stack, strongest first.
///
/// `override` is reserved for run-time overrides (CLI and the like),
/// `model_override` for model specifications, `component_configs` for
/// component-supplied defaults, and `base` for framework defaults.
pub const CONFIG_LAYERS: [&str; 4] = ["override", "model_override", "component_configs", "base"];

/// The layer components' configuration defaults are written to.
pub const COMPONENT_CONFIGS_LAYER: &str = "component_configs";

/// The event emitted once per simulation step.
pub const TIME_STEP_EVENT: &str = "time_step";

/// Errors that can occur while building or driving a context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// `simulation.start_time` did not parse as a `YYYY-MM-DD` date.
    #[error("invalid simulation.start_time '{value}': {source}")]
    InvalidStartTime {
        /// The offending configured value.
        value: String,
        /// The underlying parse error.
        source: chrono::ParseError,
    },

    /// `simulation.step_days` was not a positive integer.
    #[error("invalid simulation.step_days: expected a positive integer, got {value:?}")]
    InvalidStepDays {
        /// The offending configured value.
        value: ConfigValue,
    },

    /// A component's configuration defaults were not a nested table.
    #[error("configuration defaults for component '{component}' must be a table")]
    InvalidDefaults {
        /// Name of the offending component.
        component: String,
    },

    /// A configuration operation failed.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An event operation failed.
    #[error("event error: {source}")]
    Event {
        /// The underlying event error.
        #[from]
        source: EventError,
    },
}

/// A simulation component: event declarations plus configuration
/// defaults.
///
/// The supertrait carries the event seam; this trait adds the
/// configuration hook. Components with no defaults implement only the
/// supertrait methods.
pub trait SimComponent: Component {
    /// Nested table of configuration defaults applied at install time,
    /// at the [`COMPONENT_CONFIGS_LAYER`] layer with the component name
    /// as source.
    fn configuration_defaults(&self) -> Option<ConfigValue> {
        None
    }
}

/// Owns the configuration tree, the event manager, and the step clock.
pub struct SimulationContext {
    config: ConfigTree,
    events: EventManager,
    clock: SimClock,
}

impl SimulationContext {
    /// Create a context with an empty configuration over the standard
    /// layer stack and the framework's default clock settings.
    ///
    /// # Errors
    ///
    /// Propagates any failure of [`with_config`](Self::with_config).
    pub fn new() -> Result<Self, ContextError> {
        Self::with_config(ConfigTree::with_layers(CONFIG_LAYERS))
    }

    /// Create a context around an existing configuration tree.
    ///
    /// Framework defaults (`simulation.start_time` = `"2005-01-01"`,
    /// `simulation.step_days` = `1`) are seeded at the weakest declared
    /// layer for any of the two keys not already resolvable. The clock
    /// is then built from the resolved values and bound into the event
    /// manager.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidStartTime`] or
    /// [`ContextError::InvalidStepDays`] for unusable clock settings,
    /// or a wrapped configuration error.
    pub fn with_config(config: ConfigTree) -> Result<Self, ContextError> {
        let mut config = config;
        seed_framework_defaults(&mut config)?;

        let start = resolve_start_time(&config)?;
        let step = resolve_step(&config)?;
        let clock = SimClock::new(start, step)?;

        let mut events = EventManager::new();
        events.setup(clock.clock());

        tracing::debug!(start = %start, step_days = step.num_days(), "simulation context ready");
        Ok(Self {
            config,
            events,
            clock,
        })
    }

    /// The configuration tree.
    pub const fn config(&self) -> &ConfigTree {
        &self.config
    }

    /// Mutable access to the configuration tree (setup phase only).
    pub const fn config_mut(&mut self) -> &mut ConfigTree {
        &mut self.config
    }

    /// The event manager.
    pub const fn events(&mut self) -> &mut EventManager {
        &mut self.events
    }

    /// The step clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Install a collection of components.
    ///
    /// Configuration defaults of every component are applied first, each
    /// at the [`COMPONENT_CONFIGS_LAYER`] layer with the component name
    /// as source; then all event declarations are wired through
    /// [`EventManager::setup_components`].
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidDefaults`] if a component's
    /// defaults are not a table, or a wrapped configuration error.
    pub fn install_components(
        &mut self,
        components: &[&dyn SimComponent],
    ) -> Result<(), ContextError> {
        for component in components {
            let Some(defaults) = component.configuration_defaults() else {
                continue;
            };
            let ConfigValue::Table(table) = defaults else {
                return Err(ContextError::InvalidDefaults {
                    component: component.name().to_owned(),
                });
            };
            self.config.read_table(
                table,
                Some(COMPONENT_CONFIGS_LAYER),
                Some(component.name()),
            )?;
        }

        let event_components: Vec<&dyn Component> = components
            .iter()
            .map(|component| -> &dyn Component { *component })
            .collect();
        self.events.setup_components(&event_components);
        Ok(())
    }

    /// Permanently freeze the configuration tree.
    ///
    /// Called after setup, before the steady-state loop, so that no
    /// listener can mutate configuration mid-run.
    pub fn freeze_config(&mut self) {
        self.config.freeze();
    }

    /// Advance the clock one step and emit [`TIME_STEP_EVENT`] over the
    /// given population index.
    ///
    /// The emitted event is stamped with the post-advance time and
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns a wrapped clock error on time overflow, or a wrapped
    /// event error if a listener fails.
    pub fn step(&mut self, index: Vec<EntityId>) -> Result<Event, ContextError> {
        self.clock.advance()?;
        let emitter = self.events.get_emitter(TIME_STEP_EVENT);
        Ok(emitter.emit(Event::new(index))?)
    }
}

fn seed_framework_defaults(config: &mut ConfigTree) -> Result<(), ConfigError> {
    // A layer of `None` targets the weakest declared layer.
    if config.get("simulation.start_time").is_err() {
        config.set_with_metadata(
            "simulation.start_time",
            "2005-01-01",
            None,
            Some("framework_defaults"),
        )?;
    }
    if config.get("simulation.step_days").is_err() {
        config.set_with_metadata(
            "simulation.step_days",
            1_i64,
            None,
            Some("framework_defaults"),
        )?;
    }
    Ok(())
}

fn resolve_start_time(config: &ConfigTree) -> Result<NaiveDateTime, ContextError> {
    let value = config.get("simulation.start_time")?;
    let text = value.as_str().unwrap_or_default();
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|source| {
        ContextError::InvalidStartTime {
            value: text.to_owned(),
            source,
        }
    })?;
    Ok(NaiveDateTime::from(date))
}

fn resolve_step(config: &ConfigTree) -> Result<Duration, ContextError> {
    let value = config.get("simulation.step_days")?;
    let days = value
        .as_integer()
        .filter(|days| *days > 0)
        .ok_or_else(|| ContextError::InvalidStepDays {
            value: value.clone(),
        })?;
    Ok(Duration::days(days))
}
