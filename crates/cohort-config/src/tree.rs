//! Hierarchical configuration: nested names over layered leaf nodes.
//!
//! A tree maps names to children, each either a nested [`ConfigTree`] or
//! a leaf [`ConfigNode`]. All descendants share the tree's declared layer
//! sequence. Access is by dotted path (`"population.sample_size"`).
//!
//! Reads never mutate: resolving an absent path fails with
//! [`ConfigError::NotFound`]. Intermediate structure is materialized by
//! the mutation entry points only, via the internal `ensure_*` helpers.
//!
//! Binding rules: a name bound to a nested structure is a tree; writing a
//! nested structure over a leaf converts it to a tree, and writing a leaf
//! over a tree replaces it with a fresh node. Both directions discard the
//! previous child.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::node::{ConfigNode, ValueMetadata};
use crate::value::ConfigValue;

/// A child slot: nested tree or leaf node.
#[derive(Debug, Clone, PartialEq)]
enum Child {
    Tree(ConfigTree),
    Node(ConfigNode),
}

/// Hierarchical mapping from names to nested trees or leaf nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    path: String,
    layers: Vec<String>,
    children: BTreeMap<String, Child>,
    frozen: bool,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// Create an empty tree with the single layer `"base"`.
    pub fn new() -> Self {
        Self::with_layers(["base"])
    }

    /// Create an empty tree with the given layer sequence, strongest
    /// first. An empty sequence is replaced by the single layer `"base"`.
    pub fn with_layers<I, S>(layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut layers: Vec<String> = layers.into_iter().map(Into::into).collect();
        if layers.is_empty() {
            layers.push("base".to_owned());
        }
        Self {
            path: String::new(),
            layers,
            children: BTreeMap::new(),
            frozen: false,
        }
    }

    /// The declared layer sequence, strongest first.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// The tree's dotted location (empty for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True once [`freeze`](Self::freeze) has been called.
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// True iff a child has already been materialized under `name`.
    ///
    /// Never autocreates and never implies the child resolves to a value.
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Number of immediate materialized children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when the tree has no materialized children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    // -----------------------------------------------------------------
    // Reads (side-effect-free)
    // -----------------------------------------------------------------

    /// Resolve the value at a dotted path, walking layers from most to
    /// least specific.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] on an absent path segment, a
    /// path terminating at a nested tree, or a node with no stored value.
    pub fn get(&self, path: &str) -> Result<&ConfigValue, ConfigError> {
        self.get_from_layer(path, None)
    }

    /// Resolve the value at a dotted path from one explicit layer.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), with the layer lookup applied at the
    /// terminal node.
    pub fn get_from_layer(
        &self,
        path: &str,
        layer: Option<&str>,
    ) -> Result<&ConfigValue, ConfigError> {
        self.terminal_node(path)?.get_value(layer)
    }

    /// Resolve the `(source, value)` pair at a dotted path.
    ///
    /// # Errors
    ///
    /// Same as [`get_from_layer`](Self::get_from_layer).
    pub fn get_with_source(
        &self,
        path: &str,
        layer: Option<&str>,
    ) -> Result<(Option<&str>, &ConfigValue), ConfigError> {
        self.terminal_node(path)?.get_value_with_source(layer)
    }

    /// Borrow the nested tree at a dotted path for chained inspection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] on an absent segment or a path
    /// terminating at a leaf node.
    pub fn subtree(&self, path: &str) -> Result<&Self, ConfigError> {
        match self.lookup(path)? {
            Child::Tree(tree) => Ok(tree),
            Child::Node(node) => Err(ConfigError::NotFound {
                path: node.path().to_owned(),
            }),
        }
    }

    /// Metadata records of the node at a dotted path, in layer
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] on an absent segment or a path
    /// terminating at a nested tree.
    pub fn metadata(&self, path: &str) -> Result<Vec<ValueMetadata>, ConfigError> {
        Ok(self.terminal_node(path)?.metadata())
    }

    fn terminal_node(&self, path: &str) -> Result<&ConfigNode, ConfigError> {
        match self.lookup(path)? {
            Child::Node(node) => Ok(node),
            Child::Tree(tree) => Err(ConfigError::NotFound {
                path: tree.path.clone(),
            }),
        }
    }

    fn lookup(&self, path: &str) -> Result<&Child, ConfigError> {
        let (head, rest) = split_path(path);
        let child = self.children.get(head).ok_or_else(|| ConfigError::NotFound {
            path: self.full_path(head),
        })?;
        match (child, rest) {
            (child, None) => Ok(child),
            (Child::Tree(tree), Some(rest)) => tree.lookup(rest),
            (Child::Node(_), Some(_rest)) => Err(ConfigError::NotFound {
                path: self.full_path(path),
            }),
        }
    }

    // -----------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------

    /// Write a value at a dotted path, at the default layer, source
    /// unset.
    ///
    /// # Errors
    ///
    /// Same as [`set_with_metadata`](Self::set_with_metadata).
    pub fn set(&mut self, path: &str, value: impl Into<ConfigValue>) -> Result<(), ConfigError> {
        self.set_with_metadata(path, value, None, None)
    }

    /// Write a value at a dotted path, recording layer and provenance.
    ///
    /// A [`ConfigValue::Table`] merges recursively into (or creates) a
    /// nested tree; any other value creates or reuses a leaf node.
    /// Intermediate trees along the path are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Frozen`] if any tree along the path is
    /// frozen, or [`ConfigError::LayerNotDeclared`] if an explicitly
    /// named layer is not declared.
    pub fn set_with_metadata(
        &mut self,
        path: &str,
        value: impl Into<ConfigValue>,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> Result<(), ConfigError> {
        if self.frozen {
            return Err(ConfigError::Frozen {
                path: self.full_path(path),
            });
        }
        if let Some(layer) = layer {
            if !self.layers.iter().any(|declared| declared == layer) {
                return Err(ConfigError::LayerNotDeclared {
                    layer: layer.to_owned(),
                });
            }
        }
        let (head, rest) = split_path(path);
        match rest {
            Some(rest) => self
                .ensure_subtree(head)
                .set_with_metadata(rest, value, layer, source),
            None => match value.into() {
                ConfigValue::Table(table) => {
                    self.ensure_subtree(head).read_table(table, layer, source)
                }
                leaf => self.ensure_node(head).set_value(leaf, layer, source),
            },
        }
    }

    /// Write every pair of a nested mapping, delegating each to
    /// [`set_with_metadata`](Self::set_with_metadata).
    ///
    /// # Errors
    ///
    /// Stops at the first failing write.
    pub fn read_table(
        &mut self,
        table: BTreeMap<String, ConfigValue>,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> Result<(), ConfigError> {
        for (name, value) in table {
            self.set_with_metadata(&name, value, layer, source)?;
        }
        Ok(())
    }

    /// Parse a YAML document and merge it at the given layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or a top-level
    /// shape that is not a mapping, plus any failure of the underlying
    /// writes.
    pub fn load_str(
        &mut self,
        yaml: &str,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> Result<(), ConfigError> {
        let document: serde_yml::Value = serde_yml::from_str(yaml)?;
        match ConfigValue::from(document) {
            ConfigValue::Table(table) => {
                tracing::debug!(
                    keys = table.len(),
                    layer = layer.unwrap_or("(default)"),
                    "loading configuration document"
                );
                self.read_table(table, layer, source)
            }
            // An empty document is a no-op, not an error.
            ConfigValue::Null => Ok(()),
            _other => Err(ConfigError::Parse {
                source: serde::de::Error::custom("top-level YAML must be a mapping"),
            }),
        }
    }

    /// Read a YAML file and merge it at the given layer.
    ///
    /// When no source is given, the file path itself is recorded as the
    /// provenance of every loaded value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, plus any
    /// failure of [`load_str`](Self::load_str).
    pub fn load_file(
        &mut self,
        path: &Path,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let file_source = source.map_or_else(|| path.display().to_string(), ToOwned::to_owned);
        self.load_str(&contents, layer, Some(&file_source))
    }

    // -----------------------------------------------------------------
    // Layer surgery and freezing
    // -----------------------------------------------------------------

    /// Clear `layer` from every descendant node, except nodes whose
    /// dotted path exactly matches an entry of `preserve_keys` (a
    /// preserved subtree path skips its whole subtree).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Frozen`] if the tree is frozen, or
    /// [`ConfigError::LayerNotDeclared`] if the layer was never declared.
    pub fn reset_layer(&mut self, layer: &str, preserve_keys: &[&str]) -> Result<(), ConfigError> {
        if self.frozen {
            return Err(ConfigError::Frozen {
                path: self.path.clone(),
            });
        }
        self.check_declared(layer)?;
        let preserve: Vec<Vec<&str>> = preserve_keys
            .iter()
            .map(|key| key.split('.').collect())
            .collect();
        let mut prefix = Vec::new();
        self.reset_layer_inner(layer, &preserve, &mut prefix)
    }

    fn reset_layer_inner(
        &mut self,
        layer: &str,
        preserve: &[Vec<&str>],
        prefix: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        for (name, child) in &mut self.children {
            prefix.push(name.clone());
            let preserved = preserve.iter().any(|key| {
                key.len() == prefix.len()
                    && key.iter().zip(prefix.iter()).all(|(a, b)| *a == b.as_str())
            });
            let result = if preserved {
                Ok(())
            } else {
                match child {
                    Child::Tree(tree) => tree.reset_layer_inner(layer, preserve, prefix),
                    Child::Node(node) => node.reset_layer(layer),
                }
            };
            prefix.pop();
            result?;
        }
        Ok(())
    }

    /// Remove `layer` from every descendant and from this tree's own
    /// declared sequence. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Frozen`] if the tree is frozen, or
    /// [`ConfigError::LayerNotDeclared`] if the layer was never declared.
    pub fn drop_layer(&mut self, layer: &str) -> Result<(), ConfigError> {
        if self.frozen {
            return Err(ConfigError::Frozen {
                path: self.path.clone(),
            });
        }
        self.check_declared(layer)?;
        tracing::debug!(layer = %layer, tree = %self.path, "dropping configuration layer");
        for child in self.children.values_mut() {
            match child {
                Child::Tree(tree) => tree.drop_layer(layer)?,
                Child::Node(node) => node.drop_layer(layer)?,
            }
        }
        self.layers.retain(|declared| declared != layer);
        Ok(())
    }

    /// Recursively and permanently forbid further mutation of this tree
    /// and every current descendant.
    ///
    /// Descendants created later under a frozen ancestor are impossible:
    /// the mutation that would create them is rejected first.
    pub fn freeze(&mut self) {
        self.frozen = true;
        for child in self.children.values_mut() {
            match child {
                Child::Tree(tree) => tree.freeze(),
                Child::Node(node) => node.freeze(),
            }
        }
    }

    // -----------------------------------------------------------------
    // Internal structure management (mutation entry points only)
    // -----------------------------------------------------------------

    /// Materialize (or convert to) a nested tree under `name`.
    ///
    /// An existing leaf node under the name is discarded and replaced.
    fn ensure_subtree(&mut self, name: &str) -> &mut Self {
        let needs_replacement = !matches!(self.children.get(name), Some(Child::Tree(_)));
        if needs_replacement {
            let tree = Self {
                path: self.full_path(name),
                layers: self.layers.clone(),
                children: BTreeMap::new(),
                frozen: false,
            };
            self.children.insert(name.to_owned(), Child::Tree(tree));
        }
        match self.children.get_mut(name) {
            Some(Child::Tree(tree)) => tree,
            // The slot was just guaranteed to hold a tree.
            _ => unreachable!(),
        }
    }

    /// Materialize (or convert to) a leaf node under `name`.
    ///
    /// An existing nested tree under the name is discarded and replaced.
    fn ensure_node(&mut self, name: &str) -> &mut ConfigNode {
        let needs_replacement = !matches!(self.children.get(name), Some(Child::Node(_)));
        if needs_replacement {
            let node = ConfigNode::new(self.full_path(name), self.layers.clone());
            self.children.insert(name.to_owned(), Child::Node(node));
        }
        match self.children.get_mut(name) {
            Some(Child::Node(node)) => node,
            // The slot was just guaranteed to hold a node.
            _ => unreachable!(),
        }
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

    fn full_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{name}", self.path)
        }
    }
}

/// Split a dotted path into its first segment and the remainder.
fn split_path(path: &str) -> (&str, Option<&str>) {
    path.split_once('.')
        .map_or((path, None), |(head, rest)| (head, Some(rest)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn override_base_tree() -> ConfigTree {
        ConfigTree::with_layers(["override", "base"])
    }

    #[test]
    fn provenance_scenario_from_two_layers() {
        let mut tree = override_base_tree();
        tree.set_with_metadata("x", 1_i64, Some("base"), Some("defaults"))
            .unwrap();
        tree.set_with_metadata("x", 2_i64, Some("override"), Some("cli"))
            .unwrap();

        let (source, value) = tree.get_with_source("x", None).unwrap();
        assert_eq!(source, Some("cli"));
        assert_eq!(value.as_integer(), Some(2));

        let (source, value) = tree.get_with_source("x", Some("base")).unwrap();
        assert_eq!(source, Some("defaults"));
        assert_eq!(value.as_integer(), Some(1));

        let records = tree.metadata("x").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].layer, "override");
        assert_eq!(records[1].layer, "base");
        assert!(records[1].default);
        assert!(!records[0].default);
    }

    #[test]
    fn reads_never_materialize_structure() {
        let mut tree = ConfigTree::new();
        assert!(matches!(
            tree.get("population.sample_size"),
            Err(ConfigError::NotFound { .. })
        ));
        assert!(!tree.contains("population"));
        assert_eq!(tree.len(), 0);

        // The failed read above must not have created anything.
        tree.set("population.sample_size", 1000_i64).unwrap();
        assert!(tree.contains("population"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn dotted_writes_create_intermediate_trees() {
        let mut tree = ConfigTree::new();
        tree.set("population.cohort.sample_size", 1000_i64).unwrap();

        let population = tree.subtree("population").unwrap();
        assert_eq!(population.path(), "population");
        assert!(population.contains("cohort"));
        assert_eq!(
            tree.get("population.cohort.sample_size")
                .unwrap()
                .as_integer(),
            Some(1000)
        );
    }

    #[test]
    fn nested_table_writes_merge_into_subtrees() {
        let mut tree = override_base_tree();
        let mut inner = BTreeMap::new();
        inner.insert("sample_size".to_owned(), ConfigValue::from(1000_i64));
        inner.insert("year_start".to_owned(), ConfigValue::from(1990_i64));
        let mut outer = BTreeMap::new();
        outer.insert("population".to_owned(), ConfigValue::Table(inner));

        tree.read_table(outer, Some("base"), Some("model_spec"))
            .unwrap();

        let (source, value) = tree
            .get_with_source("population.sample_size", None)
            .unwrap();
        assert_eq!(source, Some("model_spec"));
        assert_eq!(value.as_integer(), Some(1000));
        assert_eq!(
            tree.get("population.year_start").unwrap().as_integer(),
            Some(1990)
        );

        // Merging more data into the same subtree keeps existing leaves.
        let mut more = BTreeMap::new();
        more.insert("year_end".to_owned(), ConfigValue::from(2010_i64));
        let mut outer = BTreeMap::new();
        outer.insert("population".to_owned(), ConfigValue::Table(more));
        tree.read_table(outer, Some("base"), None).unwrap();
        assert_eq!(
            tree.get("population.sample_size").unwrap().as_integer(),
            Some(1000)
        );
        assert_eq!(
            tree.get("population.year_end").unwrap().as_integer(),
            Some(2010)
        );
    }

    #[test]
    fn scalar_over_tree_replaces_and_table_over_node_converts() {
        let mut tree = ConfigTree::new();
        tree.set("population.sample_size", 1000_i64).unwrap();

        // Scalar over a tree-bound name discards the subtree.
        tree.set("population", 5_i64).unwrap();
        assert_eq!(tree.get("population").unwrap().as_integer(), Some(5));
        assert!(matches!(
            tree.get("population.sample_size"),
            Err(ConfigError::NotFound { .. })
        ));

        // Table over a node-bound name converts it back to a tree.
        let mut table = BTreeMap::new();
        table.insert("sample_size".to_owned(), ConfigValue::from(50_i64));
        tree.set("population", ConfigValue::Table(table)).unwrap();
        assert_eq!(
            tree.get("population.sample_size").unwrap().as_integer(),
            Some(50)
        );
        assert!(matches!(
            tree.get("population"),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn load_str_places_leaves_at_the_requested_layer() {
        let mut tree = override_base_tree();
        tree.load_str(
            "population:\n  sample_size: 1000\n  labels:\n    - ihd\n    - stroke\ncost: 2.5\n",
            Some("base"),
            Some("model_spec"),
        )
        .unwrap();

        let (source, value) = tree.get_with_source("cost", None).unwrap();
        assert_eq!(source, Some("model_spec"));
        assert_eq!(value.as_float(), Some(2.5));

        let labels = tree
            .get("population.labels")
            .unwrap()
            .as_sequence()
            .unwrap();
        assert_eq!(labels.len(), 2);

        // An override layer load wins resolution afterwards.
        tree.load_str("cost: 9.0\n", Some("override"), Some("cli"))
            .unwrap();
        let (source, value) = tree.get_with_source("cost", None).unwrap();
        assert_eq!(source, Some("cli"));
        assert_eq!(value.as_float(), Some(9.0));
    }

    #[test]
    fn load_str_rejects_non_mapping_documents() {
        let mut tree = ConfigTree::new();
        assert!(matches!(
            tree.load_str("- 1\n- 2\n", None, None),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            tree.load_str("a: [unclosed\n", None, None),
            Err(ConfigError::Parse { .. })
        ));
        // Empty documents are no-ops.
        tree.load_str("", None, None).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn load_file_records_the_path_as_source() {
        let mut path = std::env::temp_dir();
        path.push(format!("cohort-config-test-{}.yaml", std::process::id()));
        std::fs::write(&path, "population:\n  sample_size: 250\n").unwrap();

        let mut tree = ConfigTree::new();
        tree.load_file(&path, None, None).unwrap();
        let (source, value) = tree
            .get_with_source("population.sample_size", None)
            .unwrap();
        assert_eq!(source, Some(path.display().to_string().as_str()));
        assert_eq!(value.as_integer(), Some(250));

        std::fs::remove_file(&path).ok();

        let mut missing = ConfigTree::new();
        assert!(matches!(
            missing.load_file(Path::new("/definitely/not/here.yaml"), None, None),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn freeze_propagates_to_all_descendants() {
        let mut tree = ConfigTree::new();
        tree.set("population.sample_size", 1000_i64).unwrap();
        tree.set("cost", 2.5).unwrap();
        tree.freeze();

        assert!(matches!(
            tree.set("cost", 3.0),
            Err(ConfigError::Frozen { .. })
        ));
        assert!(matches!(
            tree.set("population.sample_size", 1_i64),
            Err(ConfigError::Frozen { .. })
        ));
        // New names cannot be materialized either.
        assert!(matches!(
            tree.set("brand_new", 1_i64),
            Err(ConfigError::Frozen { .. })
        ));
        assert!(matches!(
            tree.get("brand_new"),
            Err(ConfigError::NotFound { .. })
        ));
        // Reads still resolve.
        assert_eq!(
            tree.get("population.sample_size").unwrap().as_integer(),
            Some(1000)
        );
    }

    #[test]
    fn drop_layer_scenario_falls_back_and_then_fails() {
        let mut tree = ConfigTree::with_layers(["clinical", "base"]);
        tree.set_with_metadata("cost", 5.0, Some("clinical"), Some("trial"))
            .unwrap();
        tree.set_with_metadata("cost", 2.0, Some("base"), Some("defaults"))
            .unwrap();
        tree.set_with_metadata("coverage.fraction", 0.9, Some("clinical"), None)
            .unwrap();

        tree.drop_layer("clinical").unwrap();

        let (source, value) = tree.get_with_source("cost", None).unwrap();
        assert_eq!(source, Some("defaults"));
        assert_eq!(value.as_float(), Some(2.0));
        assert!(matches!(
            tree.get("coverage.fraction"),
            Err(ConfigError::NotFound { .. })
        ));

        assert!(matches!(
            tree.drop_layer("clinical"),
            Err(ConfigError::LayerNotDeclared { .. })
        ));
        assert_eq!(tree.layers(), ["base".to_owned()]);
    }

    #[test]
    fn reset_layer_preserves_named_paths() {
        let mut tree = override_base_tree();
        tree.set_with_metadata("a.x", 1_i64, Some("override"), None)
            .unwrap();
        tree.set_with_metadata("a.y", 2_i64, Some("override"), None)
            .unwrap();
        tree.set_with_metadata("b", 3_i64, Some("override"), None)
            .unwrap();
        tree.set_with_metadata("b", 30_i64, Some("base"), None)
            .unwrap();

        tree.reset_layer("override", &["a.x"]).unwrap();

        // The preserved path keeps its override value.
        assert_eq!(
            tree.get_from_layer("a.x", Some("override"))
                .unwrap()
                .as_integer(),
            Some(1)
        );
        // Everything else lost the layer's values.
        assert!(matches!(
            tree.get("a.y"),
            Err(ConfigError::NotFound { .. })
        ));
        assert_eq!(tree.get("b").unwrap().as_integer(), Some(30));
        // The layer stays declared and writable.
        tree.set_with_metadata("b", 300_i64, Some("override"), None)
            .unwrap();
        assert_eq!(tree.get("b").unwrap().as_integer(), Some(300));
    }

    #[test]
    fn reset_layer_can_preserve_whole_subtrees() {
        let mut tree = override_base_tree();
        tree.set_with_metadata("a.x", 1_i64, Some("override"), None)
            .unwrap();
        tree.set_with_metadata("c.z", 4_i64, Some("override"), None)
            .unwrap();

        tree.reset_layer("override", &["a"]).unwrap();
        assert_eq!(tree.get("a.x").unwrap().as_integer(), Some(1));
        assert!(matches!(tree.get("c.z"), Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn undeclared_layer_operations_fail() {
        let mut tree = ConfigTree::new();
        tree.set("x", 1_i64).unwrap();

        assert!(matches!(
            tree.drop_layer("clinical"),
            Err(ConfigError::LayerNotDeclared { .. })
        ));
        assert!(matches!(
            tree.reset_layer("clinical", &[]),
            Err(ConfigError::LayerNotDeclared { .. })
        ));
        assert!(matches!(
            tree.set_with_metadata("x", 2_i64, Some("clinical"), None),
            Err(ConfigError::LayerNotDeclared { .. })
        ));
    }

    #[test]
    fn containment_and_len_track_materialized_children_only() {
        let mut tree = ConfigTree::new();
        tree.set("population.sample_size", 1000_i64).unwrap();
        tree.set("cost", 2.5).unwrap();

        assert!(tree.contains("population"));
        assert!(tree.contains("cost"));
        assert!(!tree.contains("sample_size"));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.subtree("population").unwrap().len(), 1);
    }

    #[test]
    fn metadata_fails_on_any_absent_segment() {
        let mut tree = ConfigTree::new();
        tree.set("a.b.c", 1_i64).unwrap();

        assert!(tree.metadata("a.b.c").is_ok());
        assert!(matches!(
            tree.metadata("a.b.missing"),
            Err(ConfigError::NotFound { .. })
        ));
        assert!(matches!(
            tree.metadata("missing.b.c"),
            Err(ConfigError::NotFound { .. })
        ));
        // A path stopping at a subtree does not denote a value.
        assert!(matches!(
            tree.metadata("a.b"),
            Err(ConfigError::NotFound { .. })
        ));
    }
}
