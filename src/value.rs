//! Feature values and their truthiness.
//!
//! "Undefined" is never a [`Value`]; it is `None` wherever an `Option<Value>`
//! appears. Node values are derived maps from child name to child value.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

/// A defined feature value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Numeric form; `0`/`1` for binary and privative features.
    Int(i64),
    /// Text form, or an arbitrary scalar.
    Text(String),
    /// Child name → child value, for node features.
    Node(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness used by coercion, the boundary guard, and `dissimilate`.
    ///
    /// `Int(0)`, `Text("")`, `Text("0")`, and a node with no truthy entry are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(n) => *n != 0,
            Self::Text(s) => !s.is_empty() && s != "0",
            Self::Node(children) => children.values().any(Value::is_truthy),
        }
    }

    /// The literal text, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The child map, if this is a `Node` value.
    pub fn as_node(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Node(children) => Some(children),
            _ => None,
        }
    }
}

/// Truthiness of a possibly undefined value.
pub fn truthy(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_truthy)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Node(children) => {
                f.write_str("[")?;
                for (i, (name, value)) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Int(i64::from(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(children: BTreeMap<String, Value>) -> Self {
        Self::Node(children)
    }
}
