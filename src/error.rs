//! Error taxonomy for feature definitions and segment operations.
//!
//! One enum, `thiserror` only. Batch operations on [`FeatureGraph`] collect these
//! into a [`BatchReport`] instead of aborting; segment primitives return them
//! directly after logging a diagnostic.
//!
//! [`FeatureGraph`]: crate::graph::FeatureGraph
//! [`BatchReport`]: crate::graph::BatchReport

use alloc::string::String;

/// Errors raised by the feature graph, value coercion, and segment operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// A definition entry or source line is malformed.
    #[error("invalid definition for '{name}': {reason}")]
    Validation {
        /// Feature name (or raw line) that failed validation.
        name: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Reference to a feature name the graph does not define.
    #[error("undefined feature: {0}")]
    UndefinedFeature(String),

    /// Node-only operation applied to a non-node feature, or the reverse.
    #[error("type mismatch on '{feature}': {reason}")]
    TypeMismatch {
        /// Offending feature.
        feature: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Edge rejected because it would close a cycle under `CyclePolicy::Reject`.
    #[error("adding '{child}' under '{parent}' would create a cycle")]
    Cycle {
        /// Would-be parent node.
        parent: String,
        /// Would-be child.
        child: String,
    },

    /// The symbol set has no prototype for this symbol.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Operation needs a collaborator or context that is absent.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A segment argument failed the validity or boundary guard.
    #[error("segment rejected: {0}")]
    Guard(String),
}

impl FeatureError {
    /// Stable short code for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::UndefinedFeature(_) => "undefined_feature",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::Cycle { .. } => "cycle",
            Self::UnknownSymbol(_) => "unknown_symbol",
            Self::Unsupported(_) => "unsupported",
            Self::Guard(_) => "guard",
        }
    }

    pub(crate) fn validation(name: &str, reason: impl Into<String>) -> Self {
        Self::Validation { name: name.into(), reason: reason.into() }
    }

    pub(crate) fn type_mismatch(feature: &str, reason: impl Into<String>) -> Self {
        Self::TypeMismatch { feature: feature.into(), reason: reason.into() }
    }
}

/// Result alias used throughout the crate.
pub type FeatureResult<T> = Result<T, FeatureError>;
