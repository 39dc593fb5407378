//! Reference implementations of the segment and symbol-set interfaces.
//!
//! [`BasicSegment`] stores one [`ValueCell`] per bound non-node feature and
//! derives node values from descendants. [`SymbolTable`] maps symbols to
//! coerced prototype values. Rule engines with their own storage implement
//! [`Segment`] and [`SymbolSet`] directly; these types show what a conforming
//! implementation looks like and back the crate's tests.
//!
//! ```rust
//! use feature_geometry::basic::BasicSegment;
//! use feature_geometry::feature::FeatureSpec;
//! use feature_geometry::graph::FeatureGraph;
//! use feature_geometry::segment::Segment;
//! use feature_geometry::value::Value;
//!
//! let mut graph = FeatureGraph::new();
//! graph.add_feature([("voice", FeatureSpec::new("privative"))]);
//! let mut seg = BasicSegment::new(graph.into_shared());
//! seg.set_value("voice", Some(Value::Int(1))).unwrap();
//! assert_eq!(seg.value("voice").unwrap(), Some(Value::Int(1)));
//! assert!(seg.value("nasal").is_err());
//! ```

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::cell::ValueCell;
use crate::coerce;
use crate::error::{FeatureError, FeatureResult};
use crate::graph::{self, FeatureGraph, SharedGraph};
use crate::segment::{Prototype, Segment, SymbolSet};
use crate::value::Value;

// ─── Insertion requests ─────────────────────────────────────────────────────

/// Which side of the anchor an insertion request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Immediately before the anchor.
    Before,
    /// Immediately after the anchor.
    After,
}

/// A pending insertion, drained by the rule engine via
/// [`BasicSegment::take_insertions`].
#[derive(Debug)]
pub struct Insertion {
    /// Placement relative to the anchor segment.
    pub side: Side,
    /// Segment to insert.
    pub segment: BasicSegment,
}

// ─── BasicSegment ───────────────────────────────────────────────────────────

/// Segment backed by a map of feature name → [`ValueCell`].
///
/// Writes are coerced with [`coerce::number_form`], so `"+"` on a binary
/// feature is stored as `1`.
pub struct BasicSegment {
    graph: Option<SharedGraph>,
    bindings: HashMap<String, ValueCell>,
    symbols: Option<Rc<dyn SymbolSet>>,
    insertions: Vec<Insertion>,
}

impl BasicSegment {
    /// Empty segment over `graph`.
    pub fn new(graph: SharedGraph) -> Self {
        Self {
            graph: Some(graph),
            bindings: HashMap::new(),
            symbols: None,
            insertions: Vec::new(),
        }
    }

    /// Segment bound to no graph. Every operation rejects it.
    pub fn detached() -> Self {
        Self {
            graph: None,
            bindings: HashMap::new(),
            symbols: None,
            insertions: Vec::new(),
        }
    }

    /// Attach a symbol set for [`crate::ops::change`].
    pub fn with_symbols(mut self, symbols: Rc<dyn SymbolSet>) -> Self {
        self.symbols = Some(symbols);
        self
    }

    /// Set `feature` from its text form (`"+"`, `"-"`, `"*"`, …).
    pub fn set_text(&mut self, feature: &str, text: &str) -> FeatureResult<()> {
        self.set_value(feature, Some(Value::from(text)))
    }

    /// Text form of the current value of `feature`.
    pub fn text_value(&self, feature: &str) -> FeatureResult<String> {
        let value = self.value(feature)?;
        let graph = self.require_graph()?;
        let text = graph::read(&graph)?.text_form(feature, value.as_ref());
        text
    }

    /// Names of features with a binding, sorted.
    pub fn bound_features(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    /// `true` if no bound feature holds a value.
    pub fn is_void(&self) -> bool {
        self.bindings.values().all(|cell| cell.get().is_none())
    }

    /// `true` if both segments bind `feature` to the same storage.
    pub fn shares_storage(&self, other: &Self, feature: &str) -> bool {
        match (self.bindings.get(feature), other.bindings.get(feature)) {
            (Some(a), Some(b)) => a.shares_with(b),
            _ => false,
        }
    }

    /// Drain the insertion requests issued against this segment.
    pub fn take_insertions(&mut self) -> Vec<Insertion> {
        core::mem::take(&mut self.insertions)
    }

    fn require_graph(&self) -> FeatureResult<SharedGraph> {
        self.graph
            .clone()
            .ok_or_else(|| FeatureError::Guard("segment is not bound to a feature graph".into()))
    }

    fn node_value(&self, graph: &FeatureGraph, name: &str, seen: &mut BTreeSet<String>) -> Option<Value> {
        let mut children = BTreeMap::new();
        for child in graph.children(name).unwrap_or(&[]) {
            if !seen.insert(child.clone()) {
                continue;
            }
            let value = match graph.feature_type(child) {
                Ok(kind) if kind.is_node() => self.node_value(graph, child, seen),
                Ok(_) => self.bindings.get(child).and_then(ValueCell::get),
                Err(_) => None,
            };
            if let Some(value) = value {
                children.insert(child.clone(), value);
            }
        }
        (!children.is_empty()).then_some(Value::Node(children))
    }

    fn non_node(graph: &FeatureGraph, feature: &str) -> FeatureResult<()> {
        if graph.feature_type(feature)?.is_node() {
            return Err(FeatureError::type_mismatch(feature, "node features have no storage cell"));
        }
        Ok(())
    }
}

impl Segment for BasicSegment {
    fn featureset(&self) -> Option<SharedGraph> {
        self.graph.clone()
    }

    fn value(&self, feature: &str) -> FeatureResult<Option<Value>> {
        let graph = self.require_graph()?;
        let graph = graph::read(&graph)?;
        if graph.feature_type(feature)?.is_node() {
            let mut seen = BTreeSet::new();
            seen.insert(feature.to_string());
            return Ok(self.node_value(&graph, feature, &mut seen));
        }
        Ok(self.bindings.get(feature).and_then(ValueCell::get))
    }

    fn set_value(&mut self, feature: &str, value: Option<Value>) -> FeatureResult<()> {
        let graph = self.require_graph()?;
        let graph = graph::read(&graph)?;
        let kind = graph.feature_type(feature)?;
        if kind.is_node() {
            return match coerce::number_form(kind, value.as_ref()) {
                Some(Value::Node(children)) => {
                    let listed = graph.children(feature)?;
                    if let Some(stray) = children.keys().find(|c| !listed.contains(*c)) {
                        return Err(FeatureError::type_mismatch(
                            stray,
                            alloc::format!("not a child of '{feature}'"),
                        ));
                    }
                    drop(graph);
                    for (child, child_value) in children {
                        self.set_value(&child, Some(child_value))?;
                    }
                    Ok(())
                }
                _ => {
                    for name in graph.terminals(feature)? {
                        if let Some(cell) = self.bindings.get(&name) {
                            cell.set(None);
                        }
                    }
                    Ok(())
                }
            };
        }
        let stored = coerce::number_form(kind, value.as_ref());
        match self.bindings.get(feature) {
            Some(cell) => cell.set(stored),
            None if stored.is_some() => {
                self.bindings.insert(feature.to_string(), ValueCell::new(stored));
            }
            None => {}
        }
        Ok(())
    }

    fn delink(&mut self, feature: &str) -> FeatureResult<()> {
        let graph = self.require_graph()?;
        for name in graph::read(&graph)?.terminals(feature)? {
            self.bindings.remove(&name);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.bindings.clear();
    }

    fn duplicate(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            bindings: self
                .bindings
                .iter()
                .map(|(name, cell)| (name.clone(), cell.detached()))
                .collect(),
            symbols: self.symbols.clone(),
            insertions: Vec::new(),
        }
    }

    fn value_ref(&mut self, feature: &str) -> FeatureResult<ValueCell> {
        let graph = self.require_graph()?;
        Self::non_node(&*graph::read(&graph)?, feature)?;
        Ok(self.bindings.entry(feature.to_string()).or_default().alias())
    }

    fn bind_ref(&mut self, feature: &str, cell: ValueCell) -> FeatureResult<()> {
        let graph = self.require_graph()?;
        Self::non_node(&*graph::read(&graph)?, feature)?;
        self.bindings.insert(feature.to_string(), cell);
        Ok(())
    }

    fn symbolset(&self) -> Option<Rc<dyn SymbolSet>> {
        self.symbols.clone()
    }

    fn insert_left(&mut self, segment: Self) -> FeatureResult<()> {
        self.insertions.push(Insertion { side: Side::Before, segment });
        Ok(())
    }

    fn insert_right(&mut self, segment: Self) -> FeatureResult<()> {
        self.insertions.push(Insertion { side: Side::After, segment });
        Ok(())
    }
}

impl fmt::Debug for BasicSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: BTreeMap<&str, Option<Value>> = self
            .bindings
            .iter()
            .map(|(name, cell)| (name.as_str(), cell.get()))
            .collect();
        f.debug_struct("BasicSegment")
            .field("bound", &self.graph.is_some())
            .field("values", &values)
            .field("has_symbols", &self.symbols.is_some())
            .field("pending_insertions", &self.insertions.len())
            .finish()
    }
}

// ─── SymbolTable ────────────────────────────────────────────────────────────

/// Coerced feature values for one symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolPrototype {
    values: BTreeMap<String, Value>,
}

impl Prototype for SymbolPrototype {
    fn all_values(&self) -> BTreeMap<String, Value> {
        self.values.clone()
    }
}

/// In-memory symbol set over one feature graph.
pub struct SymbolTable {
    graph: SharedGraph,
    symbols: HashMap<String, SymbolPrototype>,
}

impl SymbolTable {
    /// Empty table whose values are coerced against `graph`.
    pub fn new(graph: SharedGraph) -> Self {
        Self { graph, symbols: HashMap::new() }
    }

    /// Define (or redefine) `symbol`. Values are coerced to their internal
    /// form; values that coerce to undefined are dropped.
    pub fn define<I, K>(&mut self, symbol: &str, values: I) -> FeatureResult<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let graph = graph::read(&self.graph)?;
        let mut coerced = BTreeMap::new();
        for (name, value) in values {
            let name = name.into();
            if let Some(v) = graph.number_form(&name, Some(&value))? {
                coerced.insert(name, v);
            }
        }
        drop(graph);
        self.symbols.insert(symbol.to_string(), SymbolPrototype { values: coerced });
        Ok(())
    }

    /// Defined symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self.symbols.keys().cloned().collect();
        names.sort();
        names
    }
}

impl SymbolSet for SymbolTable {
    fn prototype(&self, symbol: &str) -> Option<&dyn Prototype> {
        self.symbols.get(symbol).map(|p| p as &dyn Prototype)
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.symbols())
            .finish()
    }
}
