//! JSON interop for values and match results (feature = `"serde"`).
//!
//! JSON has no `undefined`, no lazy sequences, and no accessor-backed
//! objects, so the mapping is lossy in one direction:
//!
//! | Value | JSON |
//! |-------|------|
//! | `Undefined`, `Null`, non-finite numbers | `null` |
//! | integral `Number` | integer |
//! | `BigInt` | integer, or a decimal string outside `i64` |
//! | `Object` | object (reads every property) |
//! | `Sequence` | `"<sequence>"` (never drained) |
//! | `Custom` | `"<custom type name>"` |

use serde::{Serialize, Serializer};

use crate::result::MatchResult;
use crate::Value;

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(fields) => {
                Self::Record(fields.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl Value {
    /// Render as JSON. See the [module docs](self) for the mapping.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::BigInt(n) => i64::try_from(*n).map_or_else(
                |_| serde_json::Value::String(n.to_string()),
                serde_json::Value::from,
            ),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Object(source) => serde_json::Value::Object(
                source
                    .keys()
                    .into_iter()
                    .filter_map(|k| source.get(&k).map(|v| (k, v.to_json())))
                    .collect(),
            ),
            Self::Sequence(_) => serde_json::Value::String("<sequence>".into()),
            Self::Custom(custom) => {
                serde_json::Value::String(format!("<{}>", custom.custom_type_name()))
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl MatchResult {
    /// Render the result with all diagnostics, for tooling.
    ///
    /// ```
    /// use rematch::{build_matcher, Value};
    ///
    /// let result = build_matcher([1, 2]).apply(&Value::from_iter([1, 3])).unwrap();
    /// let json = result.to_json();
    /// assert_eq!(json["outcome"], "unmatched");
    /// assert_eq!(json["mismatch"]["kind"], "element");
    /// assert_eq!(json["mismatch"]["index"], 1);
    /// ```
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
