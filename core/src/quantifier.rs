//! Quantifiers: cursor-mode matchers that decide how many values to read.
//!
//! Each quantifier is an ordinary recursive function over the shared
//! [`Cursor`]. Speculation works through checkpoints only: record
//! [`Cursor::now`] before an attempt, [`Cursor::jump`] back on failure. That
//! discipline is all that composition needs, so `maybe(group(..))`,
//! `some(group(..))`, and `group(maybe(..), ..)` work without any quantifier
//! knowing another's internals.
//!
//! | Quantifier | Reads | Fails |
//! |------------|-------|-------|
//! | [`maybe`] | zero or one match of its pattern | never |
//! | [`group`] | each pattern in order | if any member fails (no rollback) |
//! | [`some`] | one or more matches, greedily | if zero iterations match |
//! | [`rest`] | everything left | never |
//!
//! Quantifiers are only meaningful inside [`match_array`](crate::match_array);
//! calling [`Matcher::apply`] on one returns [`MatcherError::MarkerInvoked`].

use std::sync::OnceLock;

use tracing::debug;

use crate::matchable::{build_matcher, Matchable};
use crate::matcher::{Eval, Kind};
use crate::result::{matched, MatchResult, Matched, Mismatch, Results, Unmatched};
use crate::{Cursor, Matcher, MatcherError, Value};

static REST: OnceLock<Matcher> = OnceLock::new();

/// The `rest` marker.
///
/// Every call returns the same handle, so `rest().ptr_eq(&rest())` holds.
/// In a sequence pattern it captures the remaining elements; as a record
/// field it names the key that receives the unclaimed properties.
#[must_use]
pub fn rest() -> Matcher {
    REST.get_or_init(|| Matcher::new(Kind::Rest)).clone()
}

/// Zero or one occurrence of `pattern`.
///
/// ```
/// use rematch::{match_array, maybe, Matchable, Value};
///
/// let m = match_array(Some(vec![maybe(1).into(), Matchable::from(2)]));
/// assert!(m.matches(&Value::from_iter([1, 2])).unwrap());
/// assert!(m.matches(&Value::from_iter([2])).unwrap());
/// ```
#[must_use]
pub fn maybe(pattern: impl Into<Matchable>) -> Matcher {
    Matcher::new(Kind::Maybe(build_matcher(pattern)))
}

/// Each pattern in order, as one unit.
#[must_use]
pub fn group<T, I>(patterns: I) -> Matcher
where
    T: Into<Matchable>,
    I: IntoIterator<Item = T>,
{
    Matcher::new(Kind::Group(
        patterns.into_iter().map(build_matcher).collect(),
    ))
}

/// One or more occurrences of `pattern`, greedy.
///
/// Every iteration must advance the cursor. A pattern that can match
/// without reading, such as `maybe(..)`, makes `some` fail with
/// [`MatcherError::NoProgress`].
#[must_use]
pub fn some(pattern: impl Into<Matchable>) -> Matcher {
    Matcher::new(Kind::Repeat(build_matcher(pattern)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Cursor mode
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn consume_rest(cursor: &mut Cursor<'_>) -> MatchResult {
    matched(Value::Array(cursor.drain()))
}

pub(crate) fn consume_maybe(inner: &Matcher, cursor: &mut Cursor<'_>) -> Eval {
    let start = cursor.now();
    match inner.consume(cursor)? {
        result @ MatchResult::Matched(_) => Ok(result),
        MatchResult::Unmatched(_) => {
            debug!(position = start.position(), "maybe rolled back");
            cursor.jump(start);
            Ok(matched(Value::Undefined))
        }
    }
}

pub(crate) fn consume_group(items: &[Matcher], cursor: &mut Cursor<'_>) -> Eval {
    let mut bindings = Vec::with_capacity(items.len());
    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.consume(cursor)? {
            MatchResult::Matched(m) => {
                bindings.push(m.value.clone());
                results.push(MatchResult::Matched(m));
            }
            MatchResult::Unmatched(cause) => {
                return Ok(Unmatched::because(Mismatch::Element {
                    index,
                    cause: Box::new(cause),
                })
                .into());
            }
        }
    }
    Ok(Matched::new(Value::Array(bindings))
        .with_results(Results::List(results))
        .into())
}

pub(crate) fn consume_some(inner: &Matcher, cursor: &mut Cursor<'_>) -> Eval {
    let mut bindings = Vec::new();
    let mut results = Vec::new();
    loop {
        let before = cursor.now();
        match inner.consume(cursor)? {
            MatchResult::Matched(m) => {
                if cursor.now() == before {
                    return Err(MatcherError::NoProgress {
                        pattern: format!("{inner:?}"),
                    });
                }
                bindings.push(m.value.clone());
                results.push(MatchResult::Matched(m));
            }
            MatchResult::Unmatched(cause) => {
                cursor.jump(before);
                if bindings.is_empty() {
                    return Ok(cause.into());
                }
                debug!(
                    iterations = bindings.len(),
                    position = before.position(),
                    "some stopped"
                );
                return Ok(Matched::new(Value::Array(bindings))
                    .with_results(Results::List(results))
                    .into());
            }
        }
    }
}
