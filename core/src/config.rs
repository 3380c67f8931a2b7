//! Config types for declarative pattern construction.
//!
//! [`PatternConfig`] mirrors the pattern constructors but is
//! serde-deserializable, so patterns can live in JSON or YAML files and be
//! compiled with [`Registry::load_pattern()`](crate::Registry::load_pattern).
//!
//! # Relationship to runtime matchers
//!
//! | Config `type` | Matcher |
//! |---------------|---------|
//! | `literal` | [`build_matcher`](crate::build_matcher) of the value |
//! | `any` / `defined` | [`any`](crate::any) / [`defined`](crate::defined) |
//! | `boolean` / `number` / `bigint` / `string` | `match_*` typed primitives |
//! | `regex` | [`match_regex`](crate::match_regex) |
//! | `array` / `object` | [`match_array`](crate::match_array) / [`match_object`](crate::match_object) |
//! | `rest` / `maybe` / `group` / `some` | quantifiers |
//! | `one_of` / `all_of` / `not` | combinators |
//! | `named` | a matcher registered via [`IntoMatcher`](crate::IntoMatcher) |
//!
//! ```yaml
//! type: object
//! fields:
//!   status: { type: literal, value: 200 }
//!   tags:
//!     type: array
//!     items:
//!       - { type: string }
//!       - { type: rest }
//!   extra: { type: rest }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// Configuration for one pattern.
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "literal", "value": [1, 2] }
/// { "type": "number" }
/// { "type": "one_of", "patterns": [ ... ] }
/// { "type": "named", "name": "between", "config": { "lower": 0, "upper": 10 } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternConfig {
    /// Match a literal value. Arrays and objects become structural patterns.
    Literal {
        /// The literal to match.
        value: serde_json::Value,
    },

    /// Match anything.
    Any,

    /// Match anything but `undefined`.
    Defined,

    /// The `rest` marker.
    Rest,

    /// Any boolean, or one specific boolean.
    Boolean {
        #[serde(default)]
        expected: Option<bool>,
    },

    /// Any number, or one specific number.
    Number {
        #[serde(default)]
        expected: Option<f64>,
    },

    /// Any big integer, or one specific big integer.
    #[serde(rename = "bigint")]
    BigInt {
        #[serde(default)]
        expected: Option<i64>,
    },

    /// Any string, or one specific string.
    String {
        #[serde(default)]
        expected: Option<String>,
    },

    /// A string matching a regex.
    Regex {
        /// Regex source, `regex` crate syntax.
        pattern: String,
        #[serde(default)]
        case_insensitive: bool,
    },

    /// A sequence; element-wise when `items` is given.
    Array {
        #[serde(default)]
        items: Option<Vec<PatternConfig>>,
    },

    /// A record; key-wise when `fields` is given.
    Object {
        #[serde(default)]
        fields: Option<BTreeMap<String, PatternConfig>>,
    },

    /// Zero or one occurrence.
    Maybe {
        pattern: Box<PatternConfig>,
    },

    /// Patterns in order, as one unit.
    Group {
        patterns: Vec<PatternConfig>,
    },

    /// One or more occurrences.
    #[serde(rename = "some")]
    OneOrMore {
        pattern: Box<PatternConfig>,
    },

    /// First matching alternative.
    OneOf {
        patterns: Vec<PatternConfig>,
    },

    /// Every component must match.
    AllOf {
        patterns: Vec<PatternConfig>,
    },

    /// Negation.
    Not {
        pattern: Box<PatternConfig>,
    },

    /// A matcher resolved through the registry by name.
    Named {
        /// Name the matcher was registered under.
        name: String,
        /// Matcher-specific configuration payload.
        #[serde(default = "default_config")]
        config: serde_json::Value,
    },
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for named matchers that take no parameters.
///
/// Accepts any JSON value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}
