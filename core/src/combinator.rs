//! Composition combinators: alternation, conjunction, negation, guards.
//!
//! [`one_of`] and [`all_of`] probe one input with several patterns, so they
//! wrap it in a [`CachedValue`] first: accessor-backed records and one-pass
//! sequences look identical to every candidate.
//!
//! Inside a sequence pattern, [`one_of`] is cursor-aware. Alternatives that
//! each read one element share that element through the cache; alternatives
//! containing quantifiers are tried from a checkpoint and rolled back on
//! failure, so `one_of([group(..), group(..)])` works element-wise.
//!
//! # Example
//!
//! ```
//! use rematch::{match_number, match_string, one_of, otherwise, when, Value};
//!
//! let describe = one_of([
//!     when(match_number(None)).then(|m| Value::from(format!("number {:?}", m.value.as_number()))),
//!     when(match_string(None)).then(|_| Value::from("string")),
//!     otherwise().then(|_| Value::from("other")),
//! ]);
//!
//! assert_eq!(describe.evaluate(&Value::from("x")).unwrap(), Some(Value::from("string")));
//! assert_eq!(describe.evaluate(&Value::Null).unwrap(), Some(Value::from("other")));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::matchable::{build_matcher, Matchable};
use crate::matcher::{Eval, Kind};
use crate::result::{matched, MatchResult, Matched, Mismatch, Results, Unmatched, UNMATCHED};
use crate::{any, CachedValue, Cursor, Matcher, Value};

type Guard = Arc<dyn Fn(&Matched) -> bool + Send + Sync>;
type Mapper = Arc<dyn Fn(&Matched) -> Value + Send + Sync>;

/// First alternative that matches.
///
/// Zero alternatives never match.
#[must_use]
pub fn one_of<T, I>(alternatives: I) -> Matcher
where
    T: Into<Matchable>,
    I: IntoIterator<Item = T>,
{
    Matcher::new(Kind::OneOf(
        alternatives.into_iter().map(build_matcher).collect(),
    ))
}

/// Every component must match the same input.
///
/// Binds the input itself, with each component's result in
/// [`Matched::results`]. Zero components always match.
#[must_use]
pub fn all_of<T, I>(components: I) -> Matcher
where
    T: Into<Matchable>,
    I: IntoIterator<Item = T>,
{
    Matcher::new(Kind::AllOf(
        components.into_iter().map(build_matcher).collect(),
    ))
}

/// Matches exactly when `pattern` does not, binding the input.
#[must_use]
pub fn not(pattern: impl Into<Matchable>) -> Matcher {
    Matcher::new(Kind::Not(build_matcher(pattern)))
}

/// Start a guarded, transforming matcher over `pattern`.
///
/// ```
/// use rematch::{match_number, when, Value};
///
/// let halve_even = when(match_number(None))
///     .guard(|m| m.value.as_number().is_some_and(|n| n % 2.0 == 0.0))
///     .then(|m| Value::from(m.value.as_number().unwrap_or_default() / 2.0));
///
/// assert_eq!(halve_even.evaluate(&Value::from(8)).unwrap(), Some(Value::from(4)));
/// assert_eq!(halve_even.evaluate(&Value::from(7)).unwrap(), None);
/// ```
#[must_use]
pub fn when(pattern: impl Into<Matchable>) -> When {
    When {
        matcher: build_matcher(pattern),
        guards: Vec::new(),
    }
}

/// `when(any())`: the catch-all arm of an alternation.
#[must_use]
pub fn otherwise() -> When {
    when(any())
}

/// Builder returned by [`when`].
#[must_use = "a When does nothing until turned into a Matcher with `then` or `build`"]
pub struct When {
    matcher: Matcher,
    guards: Vec<Guard>,
}

impl When {
    /// Add a guard. Guards run left to right after the pattern matches,
    /// and the first one returning `false` fails the match.
    pub fn guard(mut self, guard: impl Fn(&Matched) -> bool + Send + Sync + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Finish with a mapper producing the bound value.
    ///
    /// The mapped result keeps the pattern's diagnostics.
    #[must_use]
    pub fn then(self, mapper: impl Fn(&Matched) -> Value + Send + Sync + 'static) -> Matcher {
        Matcher::new(Kind::When(Guarded {
            matcher: self.matcher,
            guards: self.guards,
            mapper: Some(Arc::new(mapper)),
        }))
    }

    /// Finish without a mapper, binding the pattern's value.
    ///
    /// With no guards this is the pattern's own matcher.
    #[must_use]
    pub fn build(self) -> Matcher {
        if self.guards.is_empty() {
            return self.matcher;
        }
        Matcher::new(Kind::When(Guarded {
            matcher: self.matcher,
            guards: self.guards,
            mapper: None,
        }))
    }
}

impl From<When> for Matcher {
    fn from(when: When) -> Self {
        when.build()
    }
}

impl fmt::Debug for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("matcher", &self.matcher)
            .field("guards", &self.guards.len())
            .finish()
    }
}

pub(crate) struct Guarded {
    pub(crate) matcher: Matcher,
    guards: Vec<Guard>,
    mapper: Option<Mapper>,
}

impl Guarded {
    pub(crate) fn finish(&self, result: MatchResult) -> MatchResult {
        let m = match result {
            MatchResult::Matched(m) => m,
            unmatched @ MatchResult::Unmatched(_) => return unmatched,
        };
        if let Some(index) = self.guards.iter().position(|guard| !guard(&m)) {
            debug!(guard = index, "guard rejected match");
            return UNMATCHED;
        }
        match &self.mapper {
            Some(mapper) => MatchResult::Matched(m).map_value(|m| mapper(m)),
            None => MatchResult::Matched(m),
        }
    }
}

impl fmt::Debug for Guarded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("matcher", &self.matcher)
            .field("guards", &self.guards.len())
            .field("mapped", &self.mapper.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn one_of_value(alternatives: &[Matcher], value: &Value) -> Eval {
    if alternatives.is_empty() {
        return Ok(UNMATCHED);
    }
    let cache = CachedValue::new(value);
    for (index, alternative) in alternatives.iter().enumerate() {
        let result = alternative.apply(&cache.view())?;
        if result.is_matched() {
            debug!(index, "alternative matched");
            return Ok(result);
        }
    }
    debug!(count = alternatives.len(), "no alternative matched");
    Ok(UNMATCHED)
}

pub(crate) fn all_of_value(components: &[Matcher], value: &Value) -> Eval {
    let cache = CachedValue::new(value);
    let mut results = Vec::with_capacity(components.len());
    for (index, component) in components.iter().enumerate() {
        match component.apply(&cache.view())? {
            result @ MatchResult::Matched(_) => results.push(result),
            MatchResult::Unmatched(cause) => {
                debug!(index, "all_of component failed");
                return Ok(Unmatched::because(Mismatch::Failed {
                    index,
                    cause: Box::new(cause),
                })
                .into());
            }
        }
    }
    Ok(Matched::new(cache.view().into_owned())
        .with_results(Results::List(results))
        .into())
}

pub(crate) fn not_value(inner: &Matcher, value: &Value) -> Eval {
    let cache = CachedValue::new(value);
    Ok(match inner.apply(&cache.view())? {
        MatchResult::Matched(_) => UNMATCHED,
        MatchResult::Unmatched(_) => matched(cache.view().into_owned()),
    })
}

pub(crate) fn one_of_cursor(alternatives: &[Matcher], cursor: &mut Cursor<'_>) -> Eval {
    let start = cursor.now();
    if alternatives.iter().all(Matcher::is_single_read) {
        return match cursor.next() {
            Some(value) => one_of_value(alternatives, &value),
            None => Ok(Unmatched::because(Mismatch::Exhausted {
                position: start.position(),
            })
            .into()),
        };
    }
    for (index, alternative) in alternatives.iter().enumerate() {
        let result = alternative.consume(cursor)?;
        if result.is_matched() {
            debug!(index, "alternative matched in sequence");
            return Ok(result);
        }
        cursor.jump(start);
    }
    Ok(UNMATCHED)
}
