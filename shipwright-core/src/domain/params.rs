//! Typed input parameters for workflow steps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single argument or option value passed to a workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    String(String),
}

impl ParamValue {
    /// Returns the boolean value, or None for strings
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::String(_) => None,
        }
    }

    /// Returns the string value, or None for booleans
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            ParamValue::Bool(_) => None,
        }
    }

    /// Human readable name of the value kind, used in validation messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::String(_) => "string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

/// Named parameters in a stable (sorted) order
pub type InputParams = BTreeMap<String, ParamValue>;

/// Builds an [`InputParams`] map from `name => value` pairs.
///
/// ```
/// use shipwright_core::params;
///
/// let opts = params! { "clean" => true, "img" => "platform.pi" };
/// assert_eq!(opts.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::domain::params::InputParams::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::domain::params::InputParams::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::domain::params::ParamValue::from($value),
            );
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_macro_builds_sorted_map() {
        let p = crate::params! { "z" => "last", "a" => true };
        let keys: Vec<_> = p.keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "z".to_string()]);
        assert_eq!(p["a"].as_bool(), Some(true));
        assert_eq!(p["z"].as_str(), Some("last"));
    }

    #[test]
    fn test_untagged_deserialization() {
        let p: InputParams = serde_json::from_str(r#"{"debug": true, "img": "a.pi"}"#).unwrap();
        assert_eq!(p["debug"], ParamValue::Bool(true));
        assert_eq!(p["img"], ParamValue::String("a.pi".to_string()));
    }
}
