//! The feature graph: named definitions linked by node → child edges.
//!
//! The parent/child relation is a DAG in ordinary use, but a feature may have
//! several parents. Parents are never stored; [`FeatureGraph::parents`] scans
//! every definition's child list.
//!
//! # Batch semantics
//!
//! [`FeatureGraph::add_feature`] and [`FeatureGraph::change_feature`] validate
//! each entry on its own. A bad entry is logged, recorded in the returned
//! [`BatchReport`], and skipped; the rest of the batch is still applied.
//!
//! # Invariants
//!
//! - Only node features hold children; a node with children cannot become a non-node.
//! - A child must be defined when it is attached. Dropping a feature leaves any
//!   reference to it in other nodes' child lists in place.
//! - Cycles are allowed unless [`GraphConfig::cycle_policy`] is [`CyclePolicy::Reject`].
//! - Mutating the graph while a rule pass is processing segments bound to it is
//!   the caller's responsibility to avoid; nothing here locks.

use alloc::collections::BTreeSet;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};

use hashbrown::HashMap;

use crate::coerce;
use crate::error::{FeatureError, FeatureResult};
use crate::feature::{FeatureDefinition, FeatureSpec, FeatureType};
use crate::value::Value;

/// Handle through which segments share one graph.
pub type SharedGraph = Rc<RefCell<FeatureGraph>>;

/// Borrow a shared graph for reading. Fails with [`FeatureError::Guard`] while
/// the graph is mutably borrowed.
pub(crate) fn read(graph: &SharedGraph) -> FeatureResult<Ref<'_, FeatureGraph>> {
    graph
        .try_borrow()
        .map_err(|_| FeatureError::Guard("feature graph is being modified".into()))
}

// ─── Config ─────────────────────────────────────────────────────────────────

/// What [`FeatureGraph::add_child`] does with an edge that closes a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CyclePolicy {
    /// Accept the edge. Traversals stay cycle-safe.
    #[default]
    Allow,
    /// Refuse the edge with [`FeatureError::Cycle`].
    Reject,
}

/// Configuration for a [`FeatureGraph`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphConfig {
    /// Feature whose truthy value marks a segment as an immutable word boundary.
    /// Default: `"BOUNDARY"`. Ignored if the graph does not define it.
    pub boundary_feature: String,
    /// Cycle handling for new edges. Default: [`CyclePolicy::Allow`].
    pub cycle_policy: CyclePolicy,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            boundary_feature: "BOUNDARY".to_string(),
            cycle_policy: CyclePolicy::Allow,
        }
    }
}

// ─── BatchReport ────────────────────────────────────────────────────────────

/// Outcome of a batch mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Every feature name defined after the batch, sorted.
    pub features: Vec<String>,
    /// One error per rejected entry or edge, in the order encountered.
    pub skipped: Vec<FeatureError>,
}

impl BatchReport {
    /// `true` if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

// ─── FeatureGraph ───────────────────────────────────────────────────────────

/// Owns every feature definition and the node → child edges between them.
#[derive(Clone, Debug, Default)]
pub struct FeatureGraph {
    defs: HashMap<String, FeatureDefinition>,
    config: GraphConfig,
}

impl FeatureGraph {
    /// Empty graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self { defs: HashMap::new(), config }
    }

    /// Active configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Wrap the graph for sharing between segments.
    pub fn into_shared(self) -> SharedGraph {
        Rc::new(RefCell::new(self))
    }

    // ── Batch mutation ─────────────────────────────────────────────────────

    /// Define features from `name → spec` entries.
    ///
    /// Redefining an existing feature changes its type (validated) and attaches
    /// any listed edges; existing children are kept.
    pub fn add_feature<I, K>(&mut self, defs: I) -> BatchReport
    where
        I: IntoIterator<Item = (K, FeatureSpec)>,
        K: Into<String>,
    {
        let mut skipped = Vec::new();
        for (name, spec) in defs {
            self.apply_spec(name.into(), spec, false, &mut skipped);
        }
        self.report(skipped)
    }

    /// As [`add_feature`](Self::add_feature), but every entry must name an
    /// existing feature.
    pub fn change_feature<I, K>(&mut self, defs: I) -> BatchReport
    where
        I: IntoIterator<Item = (K, FeatureSpec)>,
        K: Into<String>,
    {
        let mut skipped = Vec::new();
        for (name, spec) in defs {
            self.apply_spec(name.into(), spec, true, &mut skipped);
        }
        self.report(skipped)
    }

    /// Remove definitions. Former children become unparented; other nodes
    /// that list a dropped name keep the dangling entry.
    pub fn drop_feature<I, S>(&mut self, names: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skipped = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.defs.remove(name).is_some() {
                tracing::debug!(feature = name, "dropped feature");
            } else {
                let err = FeatureError::UndefinedFeature(name.to_string());
                tracing::warn!(error = %err, "cannot drop feature");
                skipped.push(err);
            }
        }
        self.report(skipped)
    }

    fn apply_spec(
        &mut self,
        name: String,
        spec: FeatureSpec,
        require_existing: bool,
        skipped: &mut Vec<FeatureError>,
    ) {
        let outcome = self.define(&name, spec.kind.as_deref(), require_existing);
        if let Err(err) = outcome {
            tracing::warn!(feature = %name, error = %err, "skipping feature definition");
            skipped.push(err);
            return;
        }
        for child in &spec.children {
            if let Err(err) = self.add_child(&name, child) {
                skipped.push(err);
            }
        }
        for parent in &spec.parents {
            if let Err(err) = self.add_parent(&name, parent) {
                skipped.push(err);
            }
        }
    }

    pub(crate) fn define(&mut self, name: &str, kind: Option<&str>, require_existing: bool) -> FeatureResult<()> {
        if name.trim().is_empty() {
            return Err(FeatureError::validation(name, "empty feature name"));
        }
        let kind: FeatureType = kind
            .ok_or_else(|| FeatureError::validation(name, "missing feature type"))?
            .parse()
            .map_err(|_| FeatureError::validation(name, "invalid feature type"))?;
        if self.defs.contains_key(name) {
            self.retype(name, kind)
        } else if require_existing {
            Err(FeatureError::UndefinedFeature(name.to_string()))
        } else {
            self.defs.insert(name.to_string(), FeatureDefinition::new(name.to_string(), kind));
            tracing::debug!(feature = name, kind = kind.as_str(), "defined feature");
            Ok(())
        }
    }

    pub(crate) fn report(&self, skipped: Vec<FeatureError>) -> BatchReport {
        BatchReport { features: self.feature_names(), skipped }
    }

    // ── Lookup ─────────────────────────────────────────────────────────────

    /// Definition record for `name`.
    pub fn feature(&self, name: &str) -> FeatureResult<&FeatureDefinition> {
        self.defs
            .get(name)
            .ok_or_else(|| FeatureError::UndefinedFeature(name.to_string()))
    }

    /// `true` if `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Number of defined features.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// `true` if no feature is defined.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// All defined names, sorted.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.defs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Type of `name`.
    pub fn feature_type(&self, name: &str) -> FeatureResult<FeatureType> {
        self.feature(name).map(FeatureDefinition::feature_type)
    }

    /// Change the type of `name`. `kind` is matched case-insensitively.
    pub fn set_feature_type(&mut self, name: &str, kind: &str) -> FeatureResult<()> {
        self.feature(name)?;
        let kind: FeatureType = kind
            .parse()
            .map_err(|_| FeatureError::validation(name, "invalid feature type"))?;
        self.retype(name, kind).inspect_err(|err| {
            tracing::warn!(feature = name, error = %err, "type change rejected");
        })
    }

    fn retype(&mut self, name: &str, kind: FeatureType) -> FeatureResult<()> {
        let def = self
            .defs
            .get_mut(name)
            .ok_or_else(|| FeatureError::UndefinedFeature(name.to_string()))?;
        if !kind.is_node() && !def.children.is_empty() {
            return Err(FeatureError::type_mismatch(
                name,
                "a node with children cannot become a non-node",
            ));
        }
        if def.kind != kind {
            tracing::debug!(feature = name, from = def.kind.as_str(), to = kind.as_str(), "retyped feature");
            def.kind = kind;
        }
        Ok(())
    }

    // ── Edges ──────────────────────────────────────────────────────────────

    /// Attach `child` under the node `parent`.
    ///
    /// Fails if either is undefined, `parent` is not a node, `child` is already
    /// listed, or the edge closes a cycle under [`CyclePolicy::Reject`].
    pub fn add_child(&mut self, parent: &str, child: &str) -> FeatureResult<()> {
        self.check_edge(parent, child).inspect_err(|err| {
            tracing::warn!(parent, child, error = %err, "cannot add child");
        })?;
        if let Some(def) = self.defs.get_mut(parent) {
            def.children.push(child.to_string());
        }
        tracing::debug!(parent, child, "added child");
        Ok(())
    }

    fn check_edge(&self, parent: &str, child: &str) -> FeatureResult<()> {
        let def = self.feature(parent)?;
        self.feature(child)?;
        if !def.kind.is_node() {
            return Err(FeatureError::type_mismatch(parent, "only node features can have children"));
        }
        if def.children.iter().any(|c| c == child) {
            return Err(FeatureError::validation(child, alloc::format!("already a child of '{parent}'")));
        }
        if self.config.cycle_policy == CyclePolicy::Reject
            && (parent == child || self.reaches(child, parent))
        {
            return Err(FeatureError::Cycle { parent: parent.to_string(), child: child.to_string() });
        }
        Ok(())
    }

    /// Attach several children; failures are reported, not fatal.
    pub fn add_children<I, S>(&mut self, parent: &str, children: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skipped = children
            .into_iter()
            .filter_map(|c| self.add_child(parent, c.as_ref()).err())
            .collect();
        self.report(skipped)
    }

    /// Detach `child` from `parent`. Detaching an unlisted child is a no-op.
    pub fn drop_child(&mut self, parent: &str, child: &str) -> FeatureResult<()> {
        let def = self
            .defs
            .get_mut(parent)
            .ok_or_else(|| FeatureError::UndefinedFeature(parent.to_string()))?;
        let before = def.children.len();
        def.children.retain(|c| c != child);
        if def.children.len() != before {
            tracing::debug!(parent, child, "dropped child");
        }
        Ok(())
    }

    /// Detach several children.
    pub fn drop_children<I, S>(&mut self, parent: &str, children: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skipped = children
            .into_iter()
            .filter_map(|c| self.drop_child(parent, c.as_ref()).err())
            .collect();
        self.report(skipped)
    }

    /// Attach `child` under `parent`; argument order reversed from [`add_child`](Self::add_child).
    pub fn add_parent(&mut self, child: &str, parent: &str) -> FeatureResult<()> {
        self.add_child(parent, child)
    }

    /// Detach `child` from `parent`; argument order reversed from [`drop_child`](Self::drop_child).
    pub fn drop_parent(&mut self, child: &str, parent: &str) -> FeatureResult<()> {
        self.drop_child(parent, child)
    }

    // ── Hierarchy queries ──────────────────────────────────────────────────

    /// Ordered children of `name`.
    pub fn children(&self, name: &str) -> FeatureResult<&[String]> {
        self.feature(name).map(FeatureDefinition::children)
    }

    /// Every node that lists `name` as a child, sorted. Full scan per call.
    pub fn parents(&self, name: &str) -> FeatureResult<Vec<String>> {
        self.feature(name)?;
        let mut parents: Vec<String> = self
            .defs
            .values()
            .filter(|def| def.children.iter().any(|c| c == name))
            .map(|def| def.name.clone())
            .collect();
        parents.sort();
        Ok(parents)
    }

    /// Every defined feature reachable below `name`, depth-first, each once.
    pub fn descendants(&self, name: &str) -> FeatureResult<Vec<String>> {
        self.feature(name)?;
        let mut seen = BTreeSet::new();
        seen.insert(name.to_string());
        let mut out = Vec::new();
        self.walk(name, &mut seen, &mut out);
        Ok(out)
    }

    fn walk(&self, name: &str, seen: &mut BTreeSet<String>, out: &mut Vec<String>) {
        let Some(def) = self.defs.get(name) else { return };
        for child in &def.children {
            if self.defs.contains_key(child) && seen.insert(child.clone()) {
                out.push(child.clone());
                self.walk(child, seen, out);
            }
        }
    }

    /// The non-node features that carry values for `name`: the feature itself
    /// if it is not a node, otherwise every non-node descendant.
    pub fn terminals(&self, name: &str) -> FeatureResult<Vec<String>> {
        if !self.feature_type(name)?.is_node() {
            return Ok(alloc::vec![name.to_string()]);
        }
        Ok(self
            .descendants(name)?
            .into_iter()
            .filter(|d| self.defs.get(d).is_some_and(|def| !def.kind.is_node()))
            .collect())
    }

    fn reaches(&self, from: &str, target: &str) -> bool {
        self.descendants(from)
            .map(|d| d.iter().any(|n| n == target))
            .unwrap_or(false)
    }

    // ── Value coercion ─────────────────────────────────────────────────────

    /// Internal form of `value` for feature `name`. See [`coerce::number_form`].
    pub fn number_form(&self, name: &str, value: Option<&Value>) -> FeatureResult<Option<Value>> {
        Ok(coerce::number_form(self.feature_type(name)?, value))
    }

    /// Text form of `value` for feature `name`. See [`coerce::text_form`].
    pub fn text_form(&self, name: &str, value: Option<&Value>) -> FeatureResult<String> {
        Ok(coerce::text_form(self.feature_type(name)?, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn place_graph() -> FeatureGraph {
        let mut g = FeatureGraph::new();
        let report = g.add_feature([
            ("anterior", FeatureSpec::new("binary")),
            ("distributed", FeatureSpec::new("binary")),
            ("Coronal", FeatureSpec::new("node").with_children(["anterior", "distributed"])),
            ("round", FeatureSpec::new("privative")),
            ("Labial", FeatureSpec::new("Node").with_children(["round"])),
            ("Place", FeatureSpec::new("NODE").with_children(["Labial", "Coronal"])),
        ]);
        assert!(report.is_clean(), "{:?}", report.skipped);
        g
    }

    #[test]
    fn test_add_feature_returns_all_names() {
        let g = place_graph();
        assert_eq!(g.len(), 6);
        assert_eq!(g.feature_names()[0], "Coronal");
        assert_eq!(g.feature_type("Labial").unwrap(), FeatureType::Node);
    }

    #[test]
    fn test_bad_entries_are_skipped_not_fatal() {
        let mut g = FeatureGraph::new();
        let report = g.add_feature([
            ("voice", FeatureSpec::new("privative")),
            ("weird", FeatureSpec::new("ternary")),
            ("untyped", FeatureSpec::default()),
            ("high", FeatureSpec::new("binary")),
        ]);
        assert_eq!(report.features, vec!["high", "voice"]);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped.iter().all(|e| e.kind() == "validation"));
    }

    #[test]
    fn test_change_feature_requires_existing() {
        let mut g = place_graph();
        let report = g.change_feature([
            ("round", FeatureSpec::new("binary")),
            ("ghost", FeatureSpec::new("binary")),
        ]);
        assert_eq!(g.feature_type("round").unwrap(), FeatureType::Binary);
        assert!(!g.contains("ghost"));
        assert_eq!(report.skipped, vec![FeatureError::UndefinedFeature("ghost".into())]);
    }

    #[test]
    fn test_add_child_rejects_non_node_parent() {
        let mut g = place_graph();
        let err = g.add_child("anterior", "round").unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
        assert!(g.children("anterior").unwrap().is_empty());
    }

    #[test]
    fn test_add_child_rejects_duplicate() {
        let mut g = place_graph();
        assert!(g.add_child("Coronal", "anterior").is_err());
        assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed"]);
    }

    #[test]
    fn test_add_child_rejects_undefined_child() {
        let mut g = place_graph();
        let err = g.add_child("Coronal", "laminal").unwrap_err();
        assert_eq!(err, FeatureError::UndefinedFeature("laminal".into()));
    }

    #[test]
    fn test_parents_and_multiple_parents() {
        let mut g = place_graph();
        g.add_feature([("Dorsal", FeatureSpec::new("node").with_children(["round"]))]);
        assert_eq!(g.parents("round").unwrap(), ["Dorsal", "Labial"]);
        assert_eq!(g.parents("Place").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parent_child_relation_is_symmetric() {
        let g = place_graph();
        for p in g.feature_names() {
            for c in g.feature_names() {
                let is_parent = g.parents(&c).unwrap().contains(&p);
                let is_child = g.children(&p).unwrap().contains(&c);
                assert_eq!(is_parent, is_child, "{p} / {c}");
            }
        }
    }

    #[test]
    fn test_add_parent_is_reversed_add_child() {
        let mut g = place_graph();
        g.add_feature([("laminal", FeatureSpec::new("privative").with_parents(["Coronal"]))]);
        assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed", "laminal"]);
        g.drop_parent("laminal", "Coronal").unwrap();
        assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed"]);
    }

    #[test]
    fn test_drop_feature_leaves_dangling_child_entry() {
        let mut g = place_graph();
        g.drop_feature(["anterior"]);
        assert!(!g.contains("anterior"));
        assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed"]);
        assert_eq!(g.descendants("Coronal").unwrap(), ["distributed"]);
    }

    #[test]
    fn test_drop_node_unparents_children() {
        let mut g = place_graph();
        g.drop_feature(["Coronal"]);
        assert!(g.contains("anterior"));
        assert!(g.parents("anterior").unwrap().is_empty());
    }

    #[test]
    fn test_node_with_children_cannot_become_terminal() {
        let mut g = place_graph();
        assert_eq!(g.set_feature_type("Coronal", "binary").unwrap_err().kind(), "type_mismatch");
        g.set_feature_type("round", "SCALAR").unwrap();
        assert_eq!(g.feature_type("round").unwrap(), FeatureType::Scalar);
    }

    #[test]
    fn test_terminals_and_descendants() {
        let g = place_graph();
        assert_eq!(g.descendants("Place").unwrap(), ["Labial", "round", "Coronal", "anterior", "distributed"]);
        assert_eq!(g.terminals("Place").unwrap(), ["round", "anterior", "distributed"]);
        assert_eq!(g.terminals("round").unwrap(), ["round"]);
    }

    #[test]
    fn test_cycles_allowed_by_default_and_traversal_terminates() {
        let mut g = place_graph();
        g.add_child("Coronal", "Place").unwrap();
        let d = g.descendants("Place").unwrap();
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn test_cycle_policy_reject() {
        let mut g = FeatureGraph::with_config(GraphConfig {
            cycle_policy: CyclePolicy::Reject,
            ..GraphConfig::default()
        });
        g.add_feature([
            ("A", FeatureSpec::new("node")),
            ("B", FeatureSpec::new("node").with_parents(["A"])),
        ]);
        assert_eq!(g.add_child("B", "A").unwrap_err().kind(), "cycle");
        assert_eq!(g.add_child("A", "A").unwrap_err().kind(), "cycle");
    }

    #[test]
    fn test_invalid_type_change_names_the_feature() {
        let mut g = place_graph();
        let err = g.set_feature_type("round", "contour").unwrap_err();
        assert!(
            matches!(&err, FeatureError::Validation { name, .. } if name == "round"),
            "{err:?}"
        );
        assert_eq!(g.feature_type("round").unwrap(), FeatureType::Privative);
    }

    #[test]
    fn test_shared_read_fails_while_graph_is_mutably_borrowed() {
        let shared = place_graph().into_shared();
        assert!(read(&shared).is_ok());
        let guard = shared.borrow_mut();
        assert_eq!(read(&shared).unwrap_err().kind(), "guard");
        drop(guard);
        assert!(read(&shared).is_ok());
    }

    #[test]
    fn test_coercion_through_graph() {
        let g = place_graph();
        assert_eq!(g.number_form("anterior", Some(&Value::from("+"))).unwrap(), Some(Value::Int(1)));
        assert_eq!(g.text_form("round", None).unwrap(), "*");
        assert!(g.number_form("nope", None).is_err());
    }
}
