//! Layered configuration store for the Cohort simulation framework.
//!
//! A configuration is a tree of names. Leaves are [`ConfigNode`]s holding
//! one value per override layer, with provenance (which source set each
//! value). Resolution walks the declared layer sequence from most to
//! least specific and returns the first layer holding a value; the last
//! declared layer doubles as the default target for writes that do not
//! name a layer. Freezing a tree is recursive and permanent, turning any
//! further mutation into an error.
//!
//! Reads are side-effect-free: looking up an absent path fails with
//! [`ConfigError::NotFound`] rather than materializing structure.
//! Intermediate trees are created only by mutation entry points.
//!
//! # Modules
//!
//! - [`value`] -- The [`ConfigValue`] enum written to and read from trees.
//! - [`node`] -- [`ConfigNode`]: one value across override layers.
//! - [`tree`] -- [`ConfigTree`]: nested names, bulk loads, layer surgery.
//! - [`error`] -- [`ConfigError`].

pub mod error;
pub mod node;
pub mod tree;
pub mod value;

pub use error::ConfigError;
pub use node::{ConfigNode, ValueMetadata};
pub use tree::ConfigTree;
pub use value::ConfigValue;
