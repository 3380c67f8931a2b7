//! Structural matchers: sequences element by element, records key by key.
//!
//! # Sequences
//!
//! A sequence pattern walks a [`Cursor`] over the input. Each element pattern
//! consumes from the cursor: plain patterns read one value, quantifiers read
//! as many as they need. The match is exact: after the last pattern the
//! source must be exhausted, which costs one read past the last element.
//! A top-level `rest` ends the walk and captures whatever remains.
//!
//! # Records
//!
//! Every expected key must be present and match. Keys the pattern does not
//! name are captured under the rest key when one exists, and otherwise count
//! as unmatched. Failure reports sorted key lists.

use std::collections::BTreeMap;

use tracing::debug;

use crate::matchable::{build_matcher, Matchable};
use crate::matcher::{Eval, Kind, ObjectPattern};
use crate::result::{matched, KeyReport, MatchResult, Matched, Mismatch, Results, Unmatched};
use crate::{Cursor, Matcher, Value};

/// Sequence pattern.
///
/// With `None`, matches any sequence-like value (array or lazy sequence),
/// binding it as a materialized array. With `Some(patterns)`, matches
/// element by element; see the [module docs](self).
///
/// # Example
///
/// ```
/// use rematch::{match_array, maybe, rest, Matchable, Value};
///
/// let m = match_array(Some(vec![Matchable::from(1), maybe(2).into(), rest().into()]));
///
/// let result = m.apply(&Value::from_iter([1, 3, 4])).unwrap();
/// let matched = result.as_matched().unwrap();
/// assert_eq!(matched.rest, Some(Value::from_iter([3, 4])));
/// ```
#[must_use]
pub fn match_array(expected: Option<Vec<Matchable>>) -> Matcher {
    let items = expected.map(|items| items.into_iter().map(build_matcher).collect());
    Matcher::new(Kind::Array(items))
}

/// Record pattern.
///
/// With `None`, matches any record-shaped value. With `Some(fields)`, every
/// field pattern must match the property of the same name. A field whose
/// pattern is [`rest`](crate::rest) names the rest key instead.
#[must_use]
pub fn match_object(expected: Option<BTreeMap<String, Matchable>>) -> Matcher {
    let pattern = expected.map(|fields| {
        let mut rest_key = None;
        let mut compiled = Vec::with_capacity(fields.len());
        for (key, matchable) in fields {
            let matcher = build_matcher(matchable);
            if matcher.is_rest() && rest_key.is_none() {
                rest_key = Some(key);
            } else {
                compiled.push((key, matcher));
            }
        }
        ObjectPattern {
            fields: compiled,
            rest_key,
        }
    });
    Matcher::new(Kind::Object(pattern))
}

pub(crate) fn match_sequence(items: Option<&[Matcher]>, value: &Value) -> Eval {
    let mut cursor = match value {
        Value::Array(values) => Cursor::new(values.iter().cloned()),
        Value::Sequence(seq) => Cursor::new(seq.clone()),
        other => {
            return Ok(Unmatched::because(Mismatch::Type {
                expected: "sequence",
                found: other.type_name(),
            })
            .into())
        }
    };

    let Some(items) = items else {
        return Ok(matched(Value::Array(cursor.drain())));
    };

    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.is_rest() {
            let remainder = Value::Array(cursor.drain());
            results.push(matched(remainder.clone()));
            let read = Value::Array(cursor.consumed().to_vec());
            return Ok(Matched::new(read)
                .with_results(Results::List(results))
                .with_rest(remainder)
                .into());
        }
        match item.consume(&mut cursor)? {
            MatchResult::Matched(m) => results.push(m.into()),
            MatchResult::Unmatched(cause) => {
                debug!(index, "sequence element unmatched");
                return Ok(Unmatched::because(Mismatch::Element {
                    index,
                    cause: Box::new(cause),
                })
                .into());
            }
        }
    }

    let consumed = cursor.now().position();
    if cursor.next().is_some() {
        debug!(consumed, "sequence has trailing values");
        return Ok(Unmatched::because(Mismatch::Trailing { consumed }).into());
    }
    Ok(Matched::new(Value::Array(cursor.consumed().to_vec()))
        .with_results(Results::List(results))
        .into())
}

pub(crate) fn match_record(pattern: Option<&ObjectPattern>, value: &Value) -> Eval {
    if !value.is_record_like() {
        return Ok(Unmatched::because(Mismatch::Type {
            expected: "record",
            found: value.type_name(),
        })
        .into());
    }
    let Some(pattern) = pattern else {
        return Ok(matched(value.clone()));
    };

    let mut results = BTreeMap::new();
    let mut matched_keys = Vec::new();
    let mut unmatched_keys = Vec::new();
    for (key, matcher) in &pattern.fields {
        let Some(field) = value.get(key) else {
            unmatched_keys.push(key.clone());
            continue;
        };
        match matcher.apply(&field)? {
            result @ MatchResult::Matched(_) => {
                matched_keys.push(key.clone());
                results.insert(key.clone(), result);
            }
            MatchResult::Unmatched(_) => unmatched_keys.push(key.clone()),
        }
    }

    let unclaimed: Vec<String> = value
        .keys()
        .unwrap_or_default()
        .into_iter()
        .filter(|key| !pattern.claims(key))
        .collect();
    if pattern.rest_key.is_none() {
        unmatched_keys.extend(unclaimed.iter().cloned());
    }

    if !unmatched_keys.is_empty() {
        let expected_keys = pattern.fields.iter().map(|(k, _)| k.clone()).collect();
        let report = KeyReport::new(
            expected_keys,
            matched_keys,
            unmatched_keys,
            pattern.rest_key.clone(),
        );
        debug!(unmatched = ?report.unmatched_keys, "record keys unmatched");
        return Ok(Unmatched::because(Mismatch::Keys(report)).into());
    }

    let mut result = Matched::new(value.clone());
    if let Some(rest_key) = &pattern.rest_key {
        let rest: BTreeMap<String, Value> = unclaimed
            .into_iter()
            .filter_map(|key| value.get(&key).map(|v| (key, v)))
            .collect();
        let rest = Value::Record(rest);
        results.insert(rest_key.clone(), matched(rest.clone()));
        result = result.with_rest(rest);
    }
    Ok(result.with_results(Results::Keyed(results)).into())
}
