//! Segment transformation primitives.
//!
//! Each operation runs two guards before touching anything:
//!
//! 1. **Validity**: every segment must be bound to a feature graph, and all
//!    segments in one call must be bound to the same graph.
//! 2. **Boundary**: if the graph defines the configured boundary feature
//!    (`BOUNDARY` by default), no segment may have it set. Boundaries are
//!    immutable sentinels.
//!
//! A failed guard or lookup returns an error and leaves every argument as it
//! was. Failures are also logged at `warn` level.
//!
//! # Assimilate vs copy
//!
//! ```text
//! assimilate(f, a, b)   b.f ──┐
//!                             ├──▶ [ cell ]   later writes through a or b are shared
//!                       a.f ──┘
//!
//! copy(f, a, b)         a.f ──▶ [ cell ]
//!                       b.f ──▶ [ copy ]      no coupling afterwards
//! ```
//!
//! On a node feature both operate on every non-node descendant.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::{FeatureError, FeatureResult};
use crate::graph::{self, FeatureGraph, SharedGraph};
use crate::segment::{Direction, RuleContext, Segment};
use crate::value::{truthy, Value};

fn logged<T>(op: &'static str, run: impl FnOnce() -> FeatureResult<T>) -> FeatureResult<T> {
    run().inspect_err(|err| tracing::warn!(op, error = %err, "segment operation failed"))
}

fn guard<S: Segment>(segments: &[&S]) -> FeatureResult<SharedGraph> {
    let mut bound: Option<SharedGraph> = None;
    for seg in segments {
        let graph = seg
            .featureset()
            .ok_or_else(|| FeatureError::Guard("segment is not bound to a feature graph".into()))?;
        match &bound {
            Some(first) if !Rc::ptr_eq(first, &graph) => {
                return Err(FeatureError::Guard("segments belong to different feature graphs".into()));
            }
            Some(_) => {}
            None => bound = Some(graph),
        }
    }
    let graph =
        bound.ok_or_else(|| FeatureError::Guard("no segment supplied".into()))?;

    let boundary = graph::read(&graph)?.config().boundary_feature.clone();
    if graph::read(&graph)?.contains(&boundary) {
        for seg in segments {
            if truthy(seg.value(&boundary)?.as_ref()) {
                return Err(FeatureError::Guard("boundary segments are immutable".into()));
            }
        }
    }
    Ok(graph)
}

fn terminals(graph: &SharedGraph, feature: &str) -> FeatureResult<Vec<String>> {
    graph::read(graph)?.terminals(feature)
}

/// Deep assimilation: after the call `dst` shares `src`'s storage for `feature`.
///
/// Any later write to `feature` through either segment is seen by both.
pub fn assimilate<S: Segment>(feature: &str, src: &mut S, dst: &mut S) -> FeatureResult<()> {
    logged("assimilate", || {
        let graph = guard(&[&*src, &*dst])?;
        let targets = terminals(&graph, feature)?;
        dst.delink(feature)?;
        for name in &targets {
            let cell = src.value_ref(name)?;
            dst.bind_ref(name, cell.alias())?;
        }
        tracing::debug!(feature, "assimilated");
        Ok(())
    })
}

/// Same as [`assimilate`].
pub fn adjoin<S: Segment>(feature: &str, src: &mut S, dst: &mut S) -> FeatureResult<()> {
    assimilate(feature, src, dst)
}

/// Shallow assimilation: `dst` gets its own copy of `src`'s current value.
pub fn copy<S: Segment>(feature: &str, src: &S, dst: &mut S) -> FeatureResult<()> {
    logged("copy", || {
        let graph = guard(&[src, &*dst])?;
        let values = terminals(&graph, feature)?
            .into_iter()
            .map(|name| src.value(&name).map(|v| (name, v)))
            .collect::<FeatureResult<Vec<_>>>()?;
        dst.delink(feature)?;
        for (name, value) in values {
            if value.is_some() {
                dst.set_value(&name, value)?;
            }
        }
        Ok(())
    })
}

/// Set `dst`'s `feature` to the boolean opposite of `src`'s.
///
/// For a node, a truthy `src` delinks `dst`'s node and so voids every
/// descendant; a falsy `src` leaves `dst` untouched.
pub fn dissimilate<S: Segment>(feature: &str, src: &S, dst: &mut S) -> FeatureResult<()> {
    logged("dissimilate", || {
        let graph = guard(&[src, &*dst])?;
        let kind = graph::read(&graph)?.feature_type(feature)?;
        let source_truthy = truthy(src.value(feature)?.as_ref());
        if kind.is_node() {
            if source_truthy {
                dst.delink(feature)?;
            }
            return Ok(());
        }
        dst.delink(feature)?;
        dst.set_value(feature, Some(Value::Int(i64::from(!source_truthy))))
    })
}

/// Replace every binding on `segment` with the prototype values of `symbol`.
///
/// Fails without mutating if the segment has no symbol set, the symbol is
/// unknown, or the prototype names a feature the graph does not define.
pub fn change<S: Segment>(segment: &mut S, symbol: &str) -> FeatureResult<()> {
    logged("change", || {
        let graph = guard(&[&*segment])?;
        let symbols = segment
            .symbolset()
            .ok_or_else(|| FeatureError::Unsupported("segment has no symbol set".into()))?;
        let values = symbols
            .prototype(symbol)
            .ok_or_else(|| FeatureError::UnknownSymbol(symbol.to_string()))?
            .all_values();
        {
            let graph = graph::read(&graph)?;
            for (name, value) in &values {
                check_value_shape(&graph, name, value)?;
            }
        }
        segment.clear();
        for (name, value) in values {
            segment.set_value(&name, Some(value))?;
        }
        tracing::debug!(symbol, "changed segment");
        Ok(())
    })
}

fn check_value_shape(graph: &FeatureGraph, name: &str, value: &Value) -> FeatureResult<()> {
    let def = graph.feature(name)?;
    if let (true, Value::Node(children)) = (def.feature_type().is_node(), value) {
        for (child, child_value) in children {
            if !def.children().iter().any(|c| c == child) {
                return Err(FeatureError::type_mismatch(
                    child,
                    alloc::format!("not a child of '{name}'"),
                ));
            }
            check_value_shape(graph, child, child_value)?;
        }
    }
    Ok(())
}

/// Swap the positions of two adjacent segments; `seg1` must be the earlier.
///
/// Outside a rule the two segments' contents are exchanged in place. Inside a
/// rule the swap is requested from the word: scanning rightward, a copy of
/// `seg2` is inserted before `seg1` and `seg2` is voided; scanning leftward, a
/// copy of `seg1` is inserted after `seg2` and `seg1` is voided. The word only
/// changes when the rule engine finishes the current step.
pub fn metathesize<S: Segment>(ctx: Option<&RuleContext>, seg1: &mut S, seg2: &mut S) -> FeatureResult<()> {
    logged("metathesize", || {
        guard(&[&*seg1, &*seg2])?;
        match ctx.map(|c| c.direction) {
            None => core::mem::swap(seg1, seg2),
            Some(Direction::Rightward) => {
                seg1.insert_left(seg2.duplicate())?;
                seg2.clear();
            }
            Some(Direction::Leftward) => {
                seg2.insert_right(seg1.duplicate())?;
                seg1.clear();
            }
        }
        Ok(())
    })
}

/// Swap the values (not the storage) of `feature` between two segments.
pub fn metathesize_feature<S: Segment>(feature: &str, seg1: &mut S, seg2: &mut S) -> FeatureResult<()> {
    logged("metathesize_feature", || {
        let graph = guard(&[&*seg1, &*seg2])?;
        let mut pairs = Vec::new();
        for name in terminals(&graph, feature)? {
            let a = seg1.value(&name)?;
            let b = seg2.value(&name)?;
            if a != b {
                pairs.push((name, a, b));
            }
        }
        for (name, a, b) in pairs {
            seg1.set_value(&name, b)?;
            seg2.set_value(&name, a)?;
        }
        Ok(())
    })
}

/// Void every binding on `segment`. The segment stays in its word.
pub fn delete_seg<S: Segment>(segment: &mut S) -> FeatureResult<()> {
    logged("delete_seg", || {
        guard(&[&*segment])?;
        segment.clear();
        Ok(())
    })
}

/// Request `new` be placed immediately after `anchor`. Only inside a rule.
pub fn insert_after<S: Segment>(ctx: Option<&RuleContext>, anchor: &mut S, new: S) -> FeatureResult<()> {
    logged("insert_after", || {
        guard(&[&*anchor, &new])?;
        require_rule(ctx, "insert_after")?;
        anchor.insert_right(new)
    })
}

/// Request `new` be placed immediately before `anchor`. Only inside a rule.
pub fn insert_before<S: Segment>(ctx: Option<&RuleContext>, anchor: &mut S, new: S) -> FeatureResult<()> {
    logged("insert_before", || {
        guard(&[&*anchor, &new])?;
        require_rule(ctx, "insert_before")?;
        anchor.insert_left(new)
    })
}

fn require_rule(ctx: Option<&RuleContext>, op: &str) -> FeatureResult<()> {
    ctx.map(|_| ())
        .ok_or_else(|| FeatureError::Unsupported(alloc::format!("{op} outside a rule context")))
}
