//! Per-type conversion between internal (numeric) and text forms.
//!
//! ```text
//! type       number_form(v)                          text_form(v)
//! privative  1 if truthy, else undefined             ""  if defined, else "*"
//! binary     "-" → 0, "+" → 1, else truthy ? 1 : 0   "+" if truthy, else "-"
//! scalar     unchanged                               unchanged
//! node       unchanged if a child map, else undef    as privative
//! ```
//!
//! `"*"` is the text sentinel for "undefined" in both directions. The two forms
//! are not inverses for scalar and node values built from degenerate inputs.

use alloc::string::{String, ToString};

use crate::feature::FeatureType;
use crate::value::Value;

/// Text sentinel for an undefined value.
pub const UNDEFINED_TEXT: &str = "*";

/// Convert `value` to the internal form stored for a feature of type `kind`.
pub fn number_form(kind: FeatureType, value: Option<&Value>) -> Option<Value> {
    let value = value.filter(|v| v.as_text() != Some(UNDEFINED_TEXT))?;
    match kind {
        FeatureType::Privative => value.is_truthy().then_some(Value::Int(1)),
        FeatureType::Binary => Some(Value::Int(match value.as_text() {
            Some("-") => 0,
            Some("+") => 1,
            _ => i64::from(value.is_truthy()),
        })),
        FeatureType::Scalar => Some(value.clone()),
        FeatureType::Node => value.as_node().map(|_| value.clone()),
    }
}

/// Render `value` in the human-readable form for a feature of type `kind`.
pub fn text_form(kind: FeatureType, value: Option<&Value>) -> String {
    let Some(value) = value else {
        return UNDEFINED_TEXT.to_string();
    };
    match kind {
        FeatureType::Privative | FeatureType::Node => String::new(),
        FeatureType::Binary => (if value.is_truthy() { "+" } else { "-" }).to_string(),
        FeatureType::Scalar => value.to_string(),
    }
}
