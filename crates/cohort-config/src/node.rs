//! Leaf storage: one configurable value across override layers.
//!
//! A node declares an ordered layer sequence, strongest first. Each layer
//! may hold one `(source, value)` pair, where the source is a free-form
//! provenance label independent of the layer. Resolution without an
//! explicit layer scans the declared sequence and returns the first layer
//! holding a value; the last declared layer is both the weakest fallback
//! and the default target for writes that do not name a layer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConfigError;
use crate::value::ConfigValue;

/// One metadata record: the stored value at one layer, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueMetadata {
    /// The layer holding the value.
    pub layer: String,
    /// The stored value.
    pub value: ConfigValue,
    /// Free-form provenance label, if one was recorded.
    pub source: Option<String>,
    /// True iff the layer is the last declared (the default layer).
    pub default: bool,
}

/// A single configurable value across multiple override layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    path: String,
    layers: Vec<String>,
    values: BTreeMap<String, (Option<String>, ConfigValue)>,
    frozen: bool,
}

impl ConfigNode {
    /// Create an empty node.
    ///
    /// `path` is the node's dotted location, used only in error messages.
    /// `layers` is the declared sequence, strongest first; an empty
    /// sequence is replaced by the single layer `"base"`.
    pub fn new(path: impl Into<String>, layers: Vec<String>) -> Self {
        let layers = if layers.is_empty() {
            vec!["base".to_owned()]
        } else {
            layers
        };
        Self {
            path: path.into(),
            layers,
            values: BTreeMap::new(),
            frozen: false,
        }
    }

    /// The node's dotted location.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The declared layer sequence, strongest first.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// True once [`freeze`](Self::freeze) has been called.
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Permanently forbid further mutation. There is no unfreeze.
    pub const fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Resolve the stored `(source, value)` pair.
    ///
    /// With an explicit `layer`, returns that layer's pair. Without one,
    /// scans the declared sequence from most to least specific and
    /// returns the first pair found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no consulted layer holds a
    /// value.
    pub fn get_value_with_source(
        &self,
        layer: Option<&str>,
    ) -> Result<(Option<&str>, &ConfigValue), ConfigError> {
        let found = match layer {
            Some(layer) => self.values.get(layer).ok_or_else(|| ConfigError::NotFound {
                path: format!("{} (layer '{layer}')", self.path),
            })?,
            None => self
                .layers
                .iter()
                .find_map(|layer| self.values.get(layer))
                .ok_or_else(|| ConfigError::NotFound {
                    path: self.path.clone(),
                })?,
        };
        Ok((found.0.as_deref(), &found.1))
    }

    /// Resolve the stored value, discarding provenance.
    ///
    /// # Errors
    ///
    /// Same as [`get_value_with_source`](Self::get_value_with_source).
    pub fn get_value(&self, layer: Option<&str>) -> Result<&ConfigValue, ConfigError> {
        self.get_value_with_source(layer).map(|(_source, value)| value)
    }

    /// Store a value at the given layer, or at the last declared
    /// (default) layer when none is named.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Frozen`] if the node is frozen, or
    /// [`ConfigError::LayerNotDeclared`] if an explicitly named layer is
    /// not in the declared sequence (or the sequence is empty).
    pub fn set_value(
        &mut self,
        value: impl Into<ConfigValue>,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> Result<(), ConfigError> {
        if self.frozen {
            return Err(ConfigError::Frozen {
                path: self.path.clone(),
            });
        }
        let layer = match layer {
            Some(layer) => {
                self.check_declared(layer)?;
                layer.to_owned()
            }
            None => self
                .layers
                .last()
                .cloned()
                .ok_or_else(|| ConfigError::LayerNotDeclared {
                    layer: "(default)".to_owned(),
                })?,
        };
        self.values
            .insert(layer, (source.map(ToOwned::to_owned), value.into()));
        Ok(())
    }

    /// Metadata for every declared layer holding a value, in declaration
    /// order. The record for the last declared layer is flagged
    /// `default`.
    pub fn metadata(&self) -> Vec<ValueMetadata> {
        let default_layer = self.layers.last();
        self.layers
            .iter()
            .filter_map(|layer| {
                self.values.get(layer).map(|(source, value)| ValueMetadata {
                    layer: layer.clone(),
                    value: value.clone(),
                    source: source.clone(),
                    default: Some(layer) == default_layer,
                })
            })
            .collect()
    }

    /// Remove the layer's stored value, keeping the layer declared.
    ///
    /// Idempotent for declared layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Frozen`] if the node is frozen, or
    /// [`ConfigError::LayerNotDeclared`] if the layer was never declared.
    pub fn reset_layer(&mut self, layer: &str) -> Result<(), ConfigError> {
        if self.frozen {
            return Err(ConfigError::Frozen {
                path: self.path.clone(),
            });
        }
        self.check_declared(layer)?;
        self.values.remove(layer);
        Ok(())
    }

    /// Remove the layer's stored value and the layer itself from the
    /// declared sequence. Irreversible.
    ///
    /// # Errors
    ///
    /// Same failure rules as [`reset_layer`](Self::reset_layer).
    pub fn drop_layer(&mut self, layer: &str) -> Result<(), ConfigError> {
        self.reset_layer(layer)?;
        self.layers.retain(|declared| declared != layer);
        Ok(())
    }

    fn check_declared(&self, layer: &str) -> Result<(), ConfigError> {
        if self.layers.iter().any(|declared| declared == layer) {
            Ok(())
        } else {
            Err(ConfigError::LayerNotDeclared {
                layer: layer.to_owned(),
            })
        }
    }
}
