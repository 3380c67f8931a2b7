//! Leaf matchers: literals, typed primitives, predicates, regex.
//!
//! These never look inside containers and never touch a cursor. Every one of
//! them binds the value it was given.

use regex::Regex;

use crate::matcher::{Kind, Predicate, Primitive};
use crate::result::{matched, MatchResult, Matched, Mismatch, RegexMatch, Unmatched, UNMATCHED};
use crate::{Matcher, Value};

/// Matches any value, including `Undefined`.
#[must_use]
pub fn any() -> Matcher {
    Matcher::new(Kind::Any)
}

/// Matches any value except `Undefined`.
#[must_use]
pub fn defined() -> Matcher {
    match_predicate_labeled("defined", |value| !value.is_undefined())
}

/// Matches values strictly equal to `expected`.
///
/// `equals(Value::Undefined)` binds without constraining: it matches anything.
///
/// # Example
///
/// ```
/// use rematch::{equals, Value};
///
/// assert!(equals(1).matches(&Value::from(1)).unwrap());
/// assert!(!equals(1).matches(&Value::from("1")).unwrap());
/// assert!(equals(Value::Undefined).matches(&Value::from("anything")).unwrap());
/// ```
#[must_use]
pub fn equals(expected: impl Into<Value>) -> Matcher {
    Matcher::new(Kind::Equals(expected.into()))
}

/// Any boolean, or exactly `expected`.
#[must_use]
pub fn match_boolean(expected: Option<bool>) -> Matcher {
    typed(Primitive::Boolean, expected.map(Value::from))
}

/// Any number, or exactly `expected`.
#[must_use]
pub fn match_number(expected: Option<f64>) -> Matcher {
    typed(Primitive::Number, expected.map(Value::from))
}

/// Any big integer, or exactly `expected`.
#[must_use]
pub fn match_bigint(expected: Option<i128>) -> Matcher {
    typed(Primitive::BigInt, expected.map(Value::from))
}

/// Any string, or exactly `expected`.
#[must_use]
pub fn match_string(expected: Option<&str>) -> Matcher {
    typed(Primitive::String, expected.map(Value::from))
}

fn typed(primitive: Primitive, expected: Option<Value>) -> Matcher {
    Matcher::new(Kind::Typed(primitive, expected))
}

/// Matches when `test` returns `true`, binding the value unchanged.
pub fn match_predicate(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Matcher {
    match_predicate_labeled("predicate", test)
}

fn match_predicate_labeled(
    label: impl Into<String>,
    test: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> Matcher {
    Matcher::new(Kind::Predicate(Predicate {
        label: label.into(),
        test: Box::new(test),
    }))
}

/// Matches strings the regex finds a match in.
///
/// Success carries the capture groups in [`Matched::regex`]. Failure tells
/// "not a string" ([`Mismatch::Type`]) apart from "no match" ([`Mismatch::Regex`]).
///
/// # Example
///
/// ```
/// use regex::Regex;
/// use rematch::{match_regex, Value};
///
/// let m = match_regex(Regex::new(r"(?P<n>\d+) ball").unwrap());
/// let result = m.apply(&Value::from("3 ball")).unwrap();
/// let captures = result.as_matched().and_then(|m| m.regex.as_ref()).unwrap();
/// assert_eq!(captures.named["n"], "3");
/// ```
#[must_use]
pub fn match_regex(regex: Regex) -> Matcher {
    Matcher::new(Kind::Regex(regex))
}

/// Numbers in the half-open range `[lower, upper)`.
#[must_use]
pub fn between(lower: f64, upper: f64) -> Matcher {
    match_predicate_labeled(format!("between({lower}, {upper})"), move |value| {
        value.as_number().is_some_and(|n| lower <= n && n < upper)
    })
}

/// Numbers strictly greater than `bound`.
#[must_use]
pub fn greater_than(bound: f64) -> Matcher {
    match_predicate_labeled(format!("greater_than({bound})"), move |value| {
        value.as_number().is_some_and(|n| n > bound)
    })
}

/// Numbers greater than or equal to `bound`.
#[must_use]
pub fn greater_than_or_equal(bound: f64) -> Matcher {
    match_predicate_labeled(format!("greater_than_or_equal({bound})"), move |value| {
        value.as_number().is_some_and(|n| n >= bound)
    })
}

/// Numbers strictly less than `bound`.
#[must_use]
pub fn less_than(bound: f64) -> Matcher {
    match_predicate_labeled(format!("less_than({bound})"), move |value| {
        value.as_number().is_some_and(|n| n < bound)
    })
}

/// Numbers less than or equal to `bound`.
#[must_use]
pub fn less_than_or_equal(bound: f64) -> Matcher {
    match_predicate_labeled(format!("less_than_or_equal({bound})"), move |value| {
        value.as_number().is_some_and(|n| n <= bound)
    })
}

/// Record-shaped values that have `key`. The property is not read.
#[must_use]
pub fn has_prop(key: impl Into<String>) -> Matcher {
    let key = key.into();
    match_predicate_labeled(format!("has_prop({key:?})"), move |value| value.has_key(&key))
}

/// The empty string, an empty array, or a record with no keys.
#[must_use]
pub fn empty() -> Matcher {
    match_predicate_labeled("empty", |value| match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Record(fields) => fields.is_empty(),
        Value::Object(source) => source.keys().is_empty(),
        _ => false,
    })
}

/// Strings with at least one character.
#[must_use]
pub fn match_non_empty_string() -> Matcher {
    match_predicate_labeled("non_empty_string", |value| {
        value.as_str().is_some_and(|s| !s.is_empty())
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn equals_result(expected: &Value, value: &Value) -> MatchResult {
    if expected.is_undefined() || expected == value {
        matched(value.clone())
    } else {
        UNMATCHED
    }
}

pub(crate) fn typed_result(
    primitive: Primitive,
    expected: Option<&Value>,
    value: &Value,
) -> MatchResult {
    let accepted = match expected {
        Some(expected) => expected == value,
        None => primitive.admits(value),
    };
    if accepted {
        matched(value.clone())
    } else {
        UNMATCHED
    }
}

pub(crate) fn regex_result(regex: &Regex, value: &Value) -> MatchResult {
    let Some(text) = value.as_str() else {
        return Unmatched::because(Mismatch::Type {
            expected: "string",
            found: value.type_name(),
        })
        .into();
    };
    match regex.captures(text) {
        Some(captures) => Matched::new(value.clone())
            .with_regex(RegexMatch::from_captures(regex, &captures))
            .into(),
        None => Unmatched::because(Mismatch::Regex {
            pattern: regex.as_str().to_owned(),
        })
        .into(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry integration
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "registry")]
mod into_matcher {
    use serde::Deserialize;

    use crate::config::UnitConfig;
    use crate::registry::IntoMatcher;
    use crate::{Matcher, MatcherError};

    /// Config for range matchers.
    #[derive(Debug, Clone, Deserialize)]
    pub struct RangeConfig {
        /// Inclusive lower bound.
        pub lower: f64,
        /// Exclusive upper bound.
        pub upper: f64,
    }

    /// Config for one-sided comparisons.
    #[derive(Debug, Clone, Deserialize)]
    pub struct BoundConfig {
        pub bound: f64,
    }

    /// Config for [`has_prop`](super::has_prop).
    #[derive(Debug, Clone, Deserialize)]
    pub struct PropConfig {
        pub key: String,
    }

    /// Registry handle for [`between`](super::between).
    pub struct Between;
    /// Registry handle for [`greater_than`](super::greater_than).
    pub struct GreaterThan;
    /// Registry handle for [`greater_than_or_equal`](super::greater_than_or_equal).
    pub struct GreaterThanOrEqual;
    /// Registry handle for [`less_than`](super::less_than).
    pub struct LessThan;
    /// Registry handle for [`less_than_or_equal`](super::less_than_or_equal).
    pub struct LessThanOrEqual;
    /// Registry handle for [`has_prop`](super::has_prop).
    pub struct HasProp;
    /// Registry handle for [`empty`](super::empty).
    pub struct Empty;
    /// Registry handle for [`match_non_empty_string`](super::match_non_empty_string).
    pub struct NonEmptyString;

    impl IntoMatcher for Between {
        type Config = RangeConfig;

        fn from_config(config: RangeConfig) -> Result<Matcher, MatcherError> {
            if config.lower > config.upper {
                return Err(MatcherError::InvalidConfig {
                    reason: format!(
                        "between: lower bound {} exceeds upper bound {}",
                        config.lower, config.upper
                    ),
                });
            }
            Ok(super::between(config.lower, config.upper))
        }
    }

    impl IntoMatcher for GreaterThan {
        type Config = BoundConfig;

        fn from_config(config: BoundConfig) -> Result<Matcher, MatcherError> {
            Ok(super::greater_than(config.bound))
        }
    }

    impl IntoMatcher for GreaterThanOrEqual {
        type Config = BoundConfig;

        fn from_config(config: BoundConfig) -> Result<Matcher, MatcherError> {
            Ok(super::greater_than_or_equal(config.bound))
        }
    }

    impl IntoMatcher for LessThan {
        type Config = BoundConfig;

        fn from_config(config: BoundConfig) -> Result<Matcher, MatcherError> {
            Ok(super::less_than(config.bound))
        }
    }

    impl IntoMatcher for LessThanOrEqual {
        type Config = BoundConfig;

        fn from_config(config: BoundConfig) -> Result<Matcher, MatcherError> {
            Ok(super::less_than_or_equal(config.bound))
        }
    }

    impl IntoMatcher for HasProp {
        type Config = PropConfig;

        fn from_config(config: PropConfig) -> Result<Matcher, MatcherError> {
            Ok(super::has_prop(config.key))
        }
    }

    impl IntoMatcher for Empty {
        type Config = UnitConfig;

        fn from_config(_: UnitConfig) -> Result<Matcher, MatcherError> {
            Ok(super::empty())
        }
    }

    impl IntoMatcher for NonEmptyString {
        type Config = UnitConfig;

        fn from_config(_: UnitConfig) -> Result<Matcher, MatcherError> {
            Ok(super::match_non_empty_string())
        }
    }
}

#[cfg(feature = "registry")]
pub use into_matcher::{
    BoundConfig, Between, Empty, GreaterThan, GreaterThanOrEqual, HasProp, LessThan,
    LessThanOrEqual, NonEmptyString, PropConfig, RangeConfig,
};
