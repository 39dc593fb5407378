//! Feature definitions: the four feature types and the per-name definition record.
//!
//! A [`FeatureDefinition`] is owned by the [`FeatureGraph`]. Callers describe new
//! or changed features with a [`FeatureSpec`], whose type is still free text so
//! that malformed entries can be rejected one at a time.
//!
//! [`FeatureGraph`]: crate::graph::FeatureGraph

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::FeatureError;

// ─── FeatureType ────────────────────────────────────────────────────────────

/// Category of a feature; determines how its values are read and written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FeatureType {
    /// Present or absent.
    Privative,
    /// `+`, `-`, or undefined.
    Binary,
    /// Any value.
    Scalar,
    /// Has child features; its value is derived from its descendants.
    Node,
}

impl FeatureType {
    /// All types, in grammar order.
    pub const ALL: [FeatureType; 4] = [Self::Privative, Self::Binary, Self::Scalar, Self::Node];

    /// Lowercase name as used in definition sources.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Privative => "privative",
            Self::Binary => "binary",
            Self::Scalar => "scalar",
            Self::Node => "node",
        }
    }

    /// `true` for [`FeatureType::Node`].
    pub fn is_node(self) -> bool {
        matches!(self, Self::Node)
    }
}

impl FromStr for FeatureType {
    type Err = FeatureError;

    /// Case-insensitive match against the four type names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FeatureError::validation(trimmed, "unknown feature type"))
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── FeatureDefinition ──────────────────────────────────────────────────────

/// The stored record for one feature.
///
/// Parents are not stored; they are derived by [`FeatureGraph::parents`].
///
/// [`FeatureGraph::parents`]: crate::graph::FeatureGraph::parents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureDefinition {
    pub(crate) name: String,
    pub(crate) kind: FeatureType,
    pub(crate) children: Vec<String>,
}

impl FeatureDefinition {
    pub(crate) fn new(name: String, kind: FeatureType) -> Self {
        Self { name, kind, children: Vec::new() }
    }

    /// Unique feature name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feature type.
    pub fn feature_type(&self) -> FeatureType {
        self.kind
    }

    /// Ordered child names. Empty for every non-node feature.
    ///
    /// May contain names that have since been dropped from the graph.
    pub fn children(&self) -> &[String] {
        &self.children
    }
}

// ─── FeatureSpec ────────────────────────────────────────────────────────────

/// Unvalidated description of a feature, as handed to
/// [`FeatureGraph::add_feature`] and [`FeatureGraph::change_feature`].
///
/// ```rust
/// use feature_geometry::feature::FeatureSpec;
///
/// let coronal = FeatureSpec::new("node").with_children(["anterior", "distributed"]);
/// assert_eq!(coronal.kind.as_deref(), Some("node"));
/// ```
///
/// [`FeatureGraph::add_feature`]: crate::graph::FeatureGraph::add_feature
/// [`FeatureGraph::change_feature`]: crate::graph::FeatureGraph::change_feature
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeatureSpec {
    /// Type name, matched case-insensitively. Required.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: Option<String>,
    /// Children to attach (the feature must be a node).
    pub children: Vec<String>,
    /// Nodes to attach this feature under.
    pub parents: Vec<String>,
}

impl FeatureSpec {
    /// Spec with the given type name and no edges.
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: Some(kind.into()), ..Self::default() }
    }

    /// Add children to attach.
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Add parents to attach under.
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents.extend(parents.into_iter().map(Into::into));
        self
    }
}
