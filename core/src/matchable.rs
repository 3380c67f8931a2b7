//! `Matchable` — declarative patterns and their normalization
//!
//! Callers write patterns as literals, regexes, sequences, and records;
//! [`build_matcher`] turns any of them into a [`Matcher`] once, up front:
//!
//! | Matchable | Matcher |
//! |-----------|---------|
//! | `Undefined` (a hole) | [`any`](crate::any) |
//! | `Bool` / `Number` / `BigInt` / `String` | [`equals`](crate::equals) |
//! | `Regex` | [`match_regex`](crate::match_regex) |
//! | `Sequence` | [`match_array`](crate::match_array) |
//! | `Record` | [`match_object`](crate::match_object) |
//! | `Matcher` | returned unchanged |
//!
//! # Example
//!
//! ```
//! use rematch::{build_matcher, rest, Matchable, Value};
//!
//! let pattern = Matchable::record([("status", Matchable::from(200)), ("rest", rest().into())]);
//! let m = build_matcher(pattern);
//!
//! let response = Value::record([("status", Value::from(200)), ("body", Value::from("ok"))]);
//! let result = m.apply(&response).unwrap();
//! assert_eq!(
//!     result.as_matched().and_then(|m| m.rest.clone()),
//!     Some(Value::record([("body", Value::from("ok"))]))
//! );
//! ```

use std::collections::BTreeMap;

use regex::Regex;

use crate::combinator::When;
use crate::primitives::{any, equals, match_regex};
use crate::structural::{match_array, match_object};
use crate::{Matcher, MatcherError, Value};

/// A declarative pattern.
#[derive(Debug, Clone, Default)]
pub enum Matchable {
    /// A hole: binds anything.
    #[default]
    Undefined,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Regex(Regex),
    /// Element-by-element sequence pattern.
    Sequence(Vec<Matchable>),
    /// Key-by-key record pattern.
    Record(BTreeMap<String, Matchable>),
    /// An already-built matcher.
    Matcher(Matcher),
}

impl Matchable {
    /// Build a record pattern from key/pattern pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Matchable)>,
    {
        Self::Record(fields.into_iter().map(|(k, m)| (k.into(), m)).collect())
    }

    /// Build a sequence pattern.
    pub fn seq<T, I>(items: I) -> Self
    where
        T: Into<Matchable>,
        I: IntoIterator<Item = T>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Normalize any pattern into a [`Matcher`].
///
/// Idempotent: a `Matcher` passes through as the same handle.
///
/// ```
/// use rematch::{build_matcher, equals};
///
/// let m = equals(1);
/// assert!(build_matcher(m.clone()).ptr_eq(&m));
/// ```
pub fn build_matcher(matchable: impl Into<Matchable>) -> Matcher {
    match matchable.into() {
        Matchable::Undefined => any(),
        Matchable::Bool(b) => equals(b),
        Matchable::Number(n) => equals(n),
        Matchable::BigInt(n) => equals(n),
        Matchable::String(s) => equals(s),
        Matchable::Regex(regex) => match_regex(regex),
        Matchable::Sequence(items) => match_array(Some(items)),
        Matchable::Record(fields) => match_object(Some(fields)),
        Matchable::Matcher(m) => m,
    }
}

impl From<Matchable> for Matcher {
    fn from(matchable: Matchable) -> Self {
        build_matcher(matchable)
    }
}

impl From<bool> for Matchable {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Matchable {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Matchable {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Matchable {
    #[allow(clippy::cast_precision_loss)] // Numbers are doubles
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<f64> for Matchable {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i128> for Matchable {
    fn from(n: i128) -> Self {
        Self::BigInt(n)
    }
}

impl From<&str> for Matchable {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Matchable {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Regex> for Matchable {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<Matcher> for Matchable {
    fn from(m: Matcher) -> Self {
        Self::Matcher(m)
    }
}

impl From<When> for Matchable {
    fn from(when: When) -> Self {
        Self::Matcher(when.build())
    }
}

impl From<Vec<Matchable>> for Matchable {
    fn from(items: Vec<Matchable>) -> Self {
        Self::Sequence(items)
    }
}

impl<T: Into<Matchable>, const N: usize> From<[T; N]> for Matchable {
    fn from(items: [T; N]) -> Self {
        Self::seq(items)
    }
}

impl From<BTreeMap<String, Matchable>> for Matchable {
    fn from(fields: BTreeMap<String, Matchable>) -> Self {
        Self::Record(fields)
    }
}

/// Read a literal pattern out of dynamic data.
///
/// Arrays and records become structural patterns of their contents.
/// `Null`, lazy sequences, accessor-backed objects, and custom host data
/// have no pattern reading and fail with [`MatcherError::UnableToBuild`].
impl TryFrom<Value> for Matchable {
    type Error = MatcherError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Undefined => Ok(Self::Undefined),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => Ok(Self::Number(n)),
            Value::BigInt(n) => Ok(Self::BigInt(n)),
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Sequence),
            Value::Record(fields) => fields
                .into_iter()
                .map(|(k, v)| Self::try_from(v).map(|m| (k, m)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Self::Record),
            other @ (Value::Null | Value::Object(_) | Value::Sequence(_) | Value::Custom(_)) => {
                Err(MatcherError::UnableToBuild {
                    found: other.type_name().to_owned(),
                })
            }
        }
    }
}
