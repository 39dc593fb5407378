//! Capability interfaces for the collaborators segment operations act on.
//!
//! The crate never owns segment storage. Anything that implements [`Segment`]
//! can be handed to [`crate::ops`]; [`crate::basic::BasicSegment`] is the
//! reference implementation.
//!
//! # Implementing for a rule engine
//!
//! ```rust,ignore
//! impl Segment for MySegment {
//!     fn featureset(&self) -> Option<SharedGraph> { Some(self.graph.clone()) }
//!     fn value(&self, feature: &str) -> FeatureResult<Option<Value>> { /* ... */ }
//!     // ...
//! }
//! ```
//!
//! Rule-scoped state is not stored on segments. The engine passes a
//! [`RuleContext`] to the operations that need one.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;

use crate::cell::ValueCell;
use crate::error::FeatureResult;
use crate::graph::SharedGraph;
use crate::value::Value;

/// A sound unit holding feature bindings for a subset of a graph's features.
///
/// Every name-taking method must reject names the bound graph does not define
/// with [`FeatureError::UndefinedFeature`](crate::error::FeatureError::UndefinedFeature)
/// rather than creating storage for them.
pub trait Segment: Sized {
    /// The graph this segment's features are drawn from. `None` marks a
    /// detached segment, which every operation rejects.
    fn featureset(&self) -> Option<SharedGraph>;

    /// Current value of `feature`; `None` when undefined.
    fn value(&self, feature: &str) -> FeatureResult<Option<Value>>;

    /// Write `value` into the storage bound to `feature`, creating a binding if
    /// there is none. Aliases of that storage observe the write.
    fn set_value(&mut self, feature: &str, value: Option<Value>) -> FeatureResult<()>;

    /// Remove the binding for `feature` (and, for a node, every descendant)
    /// without touching any storage it was shared with.
    fn delink(&mut self, feature: &str) -> FeatureResult<()>;

    /// Remove every binding.
    fn clear(&mut self);

    /// Independent copy: same values, no shared storage.
    fn duplicate(&self) -> Self;

    /// The aliasable cell bound to the non-node `feature`, binding an empty
    /// cell first if needed.
    fn value_ref(&mut self, feature: &str) -> FeatureResult<ValueCell>;

    /// Bind the non-node `feature` to `cell`, replacing any existing binding.
    fn bind_ref(&mut self, feature: &str, cell: ValueCell) -> FeatureResult<()>;

    /// Symbol set used by [`crate::ops::change`]. Default: none.
    fn symbolset(&self) -> Option<Rc<dyn SymbolSet>> {
        None
    }

    /// Ask the enclosing word to place `segment` immediately before this one.
    fn insert_left(&mut self, segment: Self) -> FeatureResult<()>;

    /// Ask the enclosing word to place `segment` immediately after this one.
    fn insert_right(&mut self, segment: Self) -> FeatureResult<()>;
}

/// Direction in which the active rule is scanning the word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// End of the word towards the start.
    Leftward,
    /// Start of the word towards the end.
    #[default]
    Rightward,
}

/// Execution context of an active rule application.
///
/// Operations that reorder or insert segments take `Option<&RuleContext>`;
/// `None` means "not inside a rule".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuleContext {
    /// Scan direction of the rule being applied.
    pub direction: Direction,
}

impl RuleContext {
    /// Context for a rule scanning in `direction`.
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

/// Canonical feature values for one symbol.
pub trait Prototype {
    /// Feature name → coerced value for every feature the symbol specifies.
    fn all_values(&self) -> BTreeMap<String, Value>;
}

/// Maps phoneme symbols to their prototypes.
pub trait SymbolSet {
    /// Prototype for `symbol`, if known.
    fn prototype(&self, symbol: &str) -> Option<&dyn Prototype>;
}
