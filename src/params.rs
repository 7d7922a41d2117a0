//! Parameter Tree Module
//!
//! Rates are configured from and serialized back to a self-describing tree:
//! a string-keyed mapping whose values are numbers, strings, booleans,
//! sequences or nested mappings. A node may carry a [`UnitSystem`] that
//! governs how its bare numbers are interpreted; quantity strings such as
//! `"0.01 atm"` carry their own unit inline.
//!
//! The tree derives serde support, so nodes load directly from JSON or any
//! other serde-backed document format:
//!
//! ```
//! use ratelaw::params::ParamMap;
//! use serde_json::json;
//!
//! let node: ParamMap = serde_json::from_value(json!({
//!     "rate-constant": {"A": 38.7, "b": 2.7, "Ea": 6260.0},
//! }))
//! .unwrap();
//! assert!(node.contains_key("rate-constant"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::units::UnitSystem;

/// A single value in the parameter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag
    Bool(bool),
    /// Scalar number
    Number(f64),
    /// String, possibly a quantity with an inline unit suffix
    String(String),
    /// Homogeneous sequence of values
    Sequence(Vec<ParamValue>),
    /// Nested mapping
    Map(ParamMap),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ParamMap> {
        match self {
            ParamValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        ParamValue::Sequence(value)
    }
}

impl From<ParamMap> for ParamValue {
    fn from(value: ParamMap) -> Self {
        ParamValue::Map(value)
    }
}

/// A node of the parameter tree: string-keyed entries plus an optional unit
/// context.
///
/// The unit context is attached programmatically by whatever loads the
/// document (it typically comes from a top-level `units` block) and is not
/// part of the serialized form of the node itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamMap {
    #[serde(flatten)]
    entries: BTreeMap<String, ParamValue>,

    #[serde(skip)]
    units: Option<UnitSystem>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a unit context to this node.
    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = Some(units);
        self
    }

    pub fn set_units(&mut self, units: UnitSystem) {
        self.units = Some(units);
    }

    pub fn units(&self) -> Option<&UnitSystem> {
        self.units.as_ref()
    }

    /// The node's unit context, or SI defaults when none is attached.
    pub fn units_or_default(&self) -> UnitSystem {
        self.units.clone().unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.entries.iter()
    }

    /// Reads a boolean entry, falling back to `default` when absent.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(ParamValue::as_bool).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_f64)
    }

    pub fn get_map(&self, key: &str) -> Option<&ParamMap> {
        self.get(key).and_then(ParamValue::as_map)
    }

    pub fn get_sequence(&self, key: &str) -> Option<&[ParamValue]> {
        self.get(key).and_then(ParamValue::as_sequence)
    }
}
