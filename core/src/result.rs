//! Match outcomes and their diagnostics.
//!
//! A [`MatchResult`] is exactly one of [`Matched`] or [`Unmatched`]. Both may
//! carry diagnostic payloads; none of them is needed for control flow, they
//! exist so callers can see *what* bound and *why* a pattern failed.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::Value;

/// The shared, payload-free failure.
pub const UNMATCHED: MatchResult = MatchResult::Unmatched(Unmatched { mismatch: None });

/// A bare success binding `value`.
#[must_use]
pub fn matched(value: Value) -> MatchResult {
    MatchResult::Matched(Matched::new(value))
}

/// Outcome of applying a [`Matcher`](crate::Matcher).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "outcome", rename_all = "snake_case")
)]
pub enum MatchResult {
    /// The pattern applied; carries the bound value.
    Matched(Matched),
    /// The pattern did not apply.
    Unmatched(Unmatched),
}

impl MatchResult {
    /// Returns `true` for `Matched`.
    #[inline]
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Returns `true` for `Unmatched`.
    #[inline]
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched(_))
    }

    /// The bound value, if matched.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.as_matched().map(|m| &m.value)
    }

    /// Consume the result, keeping only the bound value.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Matched(m) => Some(m.value),
            Self::Unmatched(_) => None,
        }
    }

    #[must_use]
    pub fn as_matched(&self) -> Option<&Matched> {
        match self {
            Self::Matched(m) => Some(m),
            Self::Unmatched(_) => None,
        }
    }

    #[must_use]
    pub fn as_unmatched(&self) -> Option<&Unmatched> {
        match self {
            Self::Unmatched(u) => Some(u),
            Self::Matched(_) => None,
        }
    }

    /// Key diagnostics of a failed record match, if any.
    #[must_use]
    pub fn key_report(&self) -> Option<&KeyReport> {
        match self.as_unmatched()?.mismatch.as_ref()? {
            Mismatch::Keys(report) => Some(report),
            _ => None,
        }
    }

    /// Replace the bound value of a `Matched`, keeping its diagnostics.
    ///
    /// `Unmatched` passes through untouched.
    #[must_use]
    pub fn map_value(self, mapper: impl FnOnce(&Matched) -> Value) -> Self {
        match self {
            Self::Matched(mut m) => {
                m.value = mapper(&m);
                Self::Matched(m)
            }
            unmatched @ Self::Unmatched(_) => unmatched,
        }
    }
}

impl From<Matched> for MatchResult {
    fn from(m: Matched) -> Self {
        Self::Matched(m)
    }
}

impl From<Unmatched> for MatchResult {
    fn from(u: Unmatched) -> Self {
        Self::Unmatched(u)
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Matched {
    /// The bound value.
    pub value: Value,
    /// Per-component sub-results (array elements, record keys, group members).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub results: Option<Results>,
    /// Values captured by a `rest` marker: an array or a record.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rest: Option<Value>,
    /// Capture groups of a regex match.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub regex: Option<RegexMatch>,
}

impl Matched {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            results: None,
            rest: None,
            regex: None,
        }
    }

    #[must_use]
    pub fn with_results(mut self, results: Results) -> Self {
        self.results = Some(results);
        self
    }

    #[must_use]
    pub fn with_rest(mut self, rest: Value) -> Self {
        self.rest = Some(rest);
        self
    }

    #[must_use]
    pub fn with_regex(mut self, regex: RegexMatch) -> Self {
        self.regex = Some(regex);
        self
    }

    /// Sub-result at `index` of a list-shaped match.
    #[must_use]
    pub fn result_at(&self, index: usize) -> Option<&MatchResult> {
        match self.results.as_ref()? {
            Results::List(list) => list.get(index),
            _ => None,
        }
    }

    /// Sub-result for `key` of a record match.
    #[must_use]
    pub fn result_for(&self, key: &str) -> Option<&MatchResult> {
        match self.results.as_ref()? {
            Results::Keyed(map) => map.get(key),
            _ => None,
        }
    }
}

/// Nested sub-results of a composite match.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Results {
    /// Positional: array elements, group members, `some` iterations, `all_of` components.
    List(Vec<MatchResult>),
    /// By key: record fields.
    Keyed(BTreeMap<String, MatchResult>),
}

/// What a regex found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegexMatch {
    /// The text of the whole match.
    pub matched: String,
    /// Positional capture groups (group 1 onward). `None` for groups that did not participate.
    pub groups: Vec<Option<String>>,
    /// Named capture groups that participated.
    pub named: BTreeMap<String, String>,
}

impl RegexMatch {
    pub(crate) fn from_captures(regex: &Regex, captures: &Captures<'_>) -> Self {
        let matched = captures
            .get(0)
            .map_or_else(String::new, |m| m.as_str().to_owned());
        let groups = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_owned()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_owned(), m.as_str().to_owned()))
            })
            .collect();
        Self {
            matched,
            groups,
            named,
        }
    }
}

/// A failed match.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Unmatched {
    /// Why the pattern failed, when the matcher knows.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub mismatch: Option<Mismatch>,
}

impl Unmatched {
    #[must_use]
    pub fn because(mismatch: Mismatch) -> Self {
        Self {
            mismatch: Some(mismatch),
        }
    }
}

/// Diagnostic reason attached to an [`Unmatched`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum Mismatch {
    /// A record pattern failed; see [`KeyReport`].
    Keys(KeyReport),
    /// The value has the wrong shape for this matcher.
    Type {
        /// What the matcher accepts.
        expected: &'static str,
        /// [`Value::type_name`] of what it got.
        found: &'static str,
    },
    /// A string was given but the regex did not match it.
    Regex {
        /// Source of the regex.
        pattern: String,
    },
    /// Element pattern `index` of a sequence or group failed.
    Element {
        index: usize,
        cause: Box<Unmatched>,
    },
    /// The sequence ended where a value was required.
    Exhausted {
        /// Cursor position of the missing value.
        position: usize,
    },
    /// The sequence continued after every pattern was satisfied.
    Trailing {
        /// How many values the patterns consumed.
        consumed: usize,
    },
    /// Component `index` of an `all_of` failed.
    Failed {
        index: usize,
        cause: Box<Unmatched>,
    },
}

/// Key-level diagnostics of a failed record match. All lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyReport {
    /// Keys the pattern names (excluding the rest key).
    pub expected_keys: Vec<String>,
    /// Expected keys whose matcher succeeded.
    pub matched_keys: Vec<String>,
    /// Expected keys that were missing or failed, plus unclaimed keys when no rest key exists.
    pub unmatched_keys: Vec<String>,
    /// The key bound to the `rest` marker, if any.
    pub rest_key: Option<String>,
}

impl KeyReport {
    #[must_use]
    pub fn new(
        mut expected_keys: Vec<String>,
        mut matched_keys: Vec<String>,
        mut unmatched_keys: Vec<String>,
        rest_key: Option<String>,
    ) -> Self {
        for keys in [&mut expected_keys, &mut matched_keys, &mut unmatched_keys] {
            keys.sort_unstable();
            keys.dedup();
        }
        Self {
            expected_keys,
            matched_keys,
            unmatched_keys,
            rest_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_constant_has_no_payload() {
        assert!(UNMATCHED.is_unmatched());
        assert_eq!(UNMATCHED.as_unmatched().and_then(|u| u.mismatch.as_ref()), None);
        assert_eq!(UNMATCHED.value(), None);
    }

    #[test]
    fn matched_binds_value() {
        let result = matched(Value::from(3));
        assert!(result.is_matched());
        assert_eq!(result.value(), Some(&Value::from(3)));
        assert_eq!(result.into_value(), Some(Value::from(3)));
    }

    #[test]
    fn map_value_keeps_diagnostics() {
        let result: MatchResult = Matched::new(Value::from(vec![Value::from(1)]))
            .with_rest(Value::Array(vec![]))
            .into();
        let mapped = result.map_value(|m| Value::from(m.value.as_array().map_or(0, <[Value]>::len) as f64));
        let m = mapped.as_matched().expect("matched");
        assert_eq!(m.value, Value::from(1));
        assert_eq!(m.rest, Some(Value::Array(vec![])));
    }

    #[test]
    fn map_value_skips_unmatched() {
        assert_eq!(UNMATCHED.map_value(|_| Value::Null), UNMATCHED);
    }

    #[test]
    fn key_report_sorts_and_dedups() {
        let report = KeyReport::new(
            vec!["z".into(), "a".into()],
            vec!["m".into(), "b".into()],
            vec!["y".into(), "c".into(), "c".into()],
            Some("rest".into()),
        );
        assert_eq!(report.expected_keys, ["a", "z"]);
        assert_eq!(report.matched_keys, ["b", "m"]);
        assert_eq!(report.unmatched_keys, ["c", "y"]);
    }

    #[test]
    fn regex_match_collects_groups() {
        let regex = Regex::new(r"(?P<word>[a-z]+)-(\d+)?").unwrap();
        let captures = regex.captures("ab-").unwrap();
        let found = RegexMatch::from_captures(&regex, &captures);
        assert_eq!(found.matched, "ab-");
        assert_eq!(found.groups, vec![Some("ab".to_string()), None]);
        assert_eq!(found.named.get("word").map(String::as_str), Some("ab"));
    }

    #[test]
    fn sub_result_lookup() {
        let m = Matched::new(Value::Null).with_results(Results::List(vec![matched(Value::from(1))]));
        assert_eq!(m.result_at(0).and_then(MatchResult::value), Some(&Value::from(1)));
        assert!(m.result_for("x").is_none());
    }
}
