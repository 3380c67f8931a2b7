//! `Matcher` — the executable form of a pattern
//!
//! Every pattern normalizes to a [`Matcher`]: a cheap-to-clone handle over a
//! closed set of matcher kinds, resolved once at construction. Two entry
//! points share the same matchers:
//!
//! - [`Matcher::apply`] — value mode, `value -> MatchResult`.
//! - [`Matcher::consume`] — cursor mode, used inside sequence patterns. Plain
//!   matchers read one value; quantifiers decide how many to read.
//!
//! Both return `Err` only for programmer errors (a marker applied outside a
//! sequence, a `some` that cannot make progress). Data that does not fit is
//! always `Ok(Unmatched)`.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::combinator::Guarded;
use crate::result::{matched, MatchResult, Mismatch, Unmatched, UNMATCHED};
use crate::{combinator, primitives, quantifier, structural};
use crate::{Cursor, MatcherError, Value, MAX_DEPTH};

/// Result of evaluating a matcher: a match outcome, or a fatal error.
pub type Eval = Result<MatchResult, MatcherError>;

/// User-supplied matching logic.
///
/// Implement this for matchers the built-in kinds cannot express, then wrap
/// with [`Matcher::custom`]. For one-off closures use [`Matcher::from_fn`].
///
/// # Example
///
/// ```
/// use rematch::{matched, CustomMatcher, Eval, Matcher, Value, UNMATCHED};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl CustomMatcher for Even {
///     fn apply(&self, value: &Value) -> Eval {
///         Ok(match value.as_number() {
///             Some(n) if n % 2.0 == 0.0 => matched(value.clone()),
///             _ => UNMATCHED,
///         })
///     }
/// }
///
/// let even = Matcher::custom(Even);
/// assert!(even.apply(&Value::from(4)).unwrap().is_matched());
/// assert!(even.apply(&Value::from(3)).unwrap().is_unmatched());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a CustomMatcher",
    label = "expected a type implementing `apply(&self, &Value) -> Eval`",
    note = "for a closure, use `Matcher::from_fn(|value| ...)` instead"
)]
pub trait CustomMatcher: Send + Sync + fmt::Debug {
    /// Apply this matcher to one value.
    ///
    /// # Errors
    ///
    /// Return `Err` only for programmer errors; a value that does not fit is
    /// `Ok(Unmatched)`.
    fn apply(&self, value: &Value) -> Eval;
}

impl CustomMatcher for Box<dyn CustomMatcher> {
    fn apply(&self, value: &Value) -> Eval {
        (**self).apply(value)
    }
}

type MatchFn = dyn Fn(&Value) -> MatchResult + Send + Sync;

struct FnMatcher(Box<MatchFn>);

impl CustomMatcher for FnMatcher {
    fn apply(&self, value: &Value) -> Eval {
        Ok((self.0)(value))
    }
}

impl fmt::Debug for FnMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnMatcher(..)")
    }
}

/// Runtime-checked primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    Boolean,
    Number,
    BigInt,
    String,
}

impl Primitive {
    pub(crate) fn admits(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_bool(),
            Self::Number => value.is_number(),
            Self::BigInt => value.is_bigint(),
            Self::String => value.is_string(),
        }
    }
}

/// A named boolean test over one value.
pub(crate) struct Predicate {
    pub(crate) label: String,
    pub(crate) test: Box<dyn Fn(&Value) -> bool + Send + Sync>,
}

/// Compiled record pattern. The rest key, if any, is split out at build time.
#[derive(Debug)]
pub(crate) struct ObjectPattern {
    pub(crate) fields: Vec<(String, Matcher)>,
    pub(crate) rest_key: Option<String>,
}

impl ObjectPattern {
    pub(crate) fn claims(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }
}

pub(crate) enum Kind {
    Any,
    Equals(Value),
    Typed(Primitive, Option<Value>),
    Predicate(Predicate),
    Regex(Regex),
    Array(Option<Vec<Matcher>>),
    Object(Option<ObjectPattern>),
    Rest,
    Maybe(Matcher),
    Group(Vec<Matcher>),
    Repeat(Matcher),
    OneOf(Vec<Matcher>),
    AllOf(Vec<Matcher>),
    Not(Matcher),
    When(Guarded),
    Custom(Arc<dyn CustomMatcher>),
}

/// An executable pattern.
///
/// Cloning is cheap and preserves identity: [`build_matcher`](crate::build_matcher)
/// on a `Matcher` returns the same handle.
#[derive(Clone)]
pub struct Matcher {
    kind: Arc<Kind>,
}

impl Matcher {
    pub(crate) fn new(kind: Kind) -> Self {
        Self {
            kind: Arc::new(kind),
        }
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Wrap a closure as a matcher.
    pub fn from_fn(f: impl Fn(&Value) -> MatchResult + Send + Sync + 'static) -> Self {
        Self::custom(FnMatcher(Box::new(f)))
    }

    /// Wrap a [`CustomMatcher`] implementation.
    pub fn custom(matcher: impl CustomMatcher + 'static) -> Self {
        Self::new(Kind::Custom(Arc::new(matcher)))
    }

    /// Apply this matcher to a value.
    ///
    /// # Errors
    ///
    /// - [`MatcherError::MarkerInvoked`] — a quantifier or `rest` was reached
    ///   outside a sequence pattern.
    /// - [`MatcherError::NoProgress`] — a nested `some` cannot terminate.
    /// - Whatever a [`CustomMatcher`] returns.
    pub fn apply(&self, value: &Value) -> Eval {
        match self.kind() {
            Kind::Any => Ok(matched(value.clone())),
            Kind::Equals(expected) => Ok(primitives::equals_result(expected, value)),
            Kind::Typed(primitive, expected) => {
                Ok(primitives::typed_result(*primitive, expected.as_ref(), value))
            }
            Kind::Predicate(predicate) => Ok(predicate.apply(value)),
            Kind::Regex(regex) => Ok(primitives::regex_result(regex, value)),
            Kind::Array(items) => structural::match_sequence(items.as_deref(), value),
            Kind::Object(pattern) => structural::match_record(pattern.as_ref(), value),
            Kind::Rest | Kind::Maybe(_) | Kind::Group(_) | Kind::Repeat(_) => {
                Err(MatcherError::MarkerInvoked {
                    marker: self.marker_name().unwrap_or("rest"),
                })
            }
            Kind::OneOf(alternatives) => combinator::one_of_value(alternatives, value),
            Kind::AllOf(components) => combinator::all_of_value(components, value),
            Kind::Not(inner) => combinator::not_value(inner, value),
            Kind::When(guarded) => Ok(guarded.finish(guarded.matcher.apply(value)?)),
            Kind::Custom(custom) => custom.apply(value),
        }
    }

    /// Apply this matcher at the cursor's read head.
    ///
    /// Quantifiers (`maybe`, `group`, `some`, `rest`) and alternations over
    /// them decide how far to advance. Every other matcher reads exactly one
    /// value, or fails with [`Mismatch::Exhausted`] at the end of the source.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn consume(&self, cursor: &mut Cursor<'_>) -> Eval {
        match self.kind() {
            Kind::Rest => Ok(quantifier::consume_rest(cursor)),
            Kind::Maybe(inner) => quantifier::consume_maybe(inner, cursor),
            Kind::Group(items) => quantifier::consume_group(items, cursor),
            Kind::Repeat(inner) => quantifier::consume_some(inner, cursor),
            Kind::OneOf(alternatives) => combinator::one_of_cursor(alternatives, cursor),
            Kind::When(guarded) => Ok(guarded.finish(guarded.matcher.consume(cursor)?)),
            _ => {
                let position = cursor.now().position();
                match cursor.next() {
                    Some(value) => self.apply(&value),
                    None => Ok(Unmatched::because(Mismatch::Exhausted { position }).into()),
                }
            }
        }
    }

    /// Apply and keep only the outcome: the bound value, or `None`.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn evaluate(&self, value: &Value) -> Result<Option<Value>, MatcherError> {
        self.apply(value).map(MatchResult::into_value)
    }

    /// Whether this matcher accepts `value`.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn matches(&self, value: &Value) -> Result<bool, MatcherError> {
        self.apply(value).map(|result| result.is_matched())
    }

    /// Returns `true` for the `rest` marker.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        matches!(self.kind(), Kind::Rest)
    }

    /// Returns `true` for matchers only valid in cursor mode: `rest`, `maybe`, `group`, `some`.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.marker_name().is_some()
    }

    /// Whether cursor mode reads exactly one value for this matcher.
    pub(crate) fn is_single_read(&self) -> bool {
        match self.kind() {
            Kind::Rest | Kind::Maybe(_) | Kind::Group(_) | Kind::Repeat(_) => false,
            Kind::OneOf(alternatives) => alternatives.iter().all(Matcher::is_single_read),
            Kind::When(guarded) => guarded.matcher.is_single_read(),
            _ => true,
        }
    }

    fn marker_name(&self) -> Option<&'static str> {
        match self.kind() {
            Kind::Rest => Some("rest"),
            Kind::Maybe(_) => Some("maybe"),
            Kind::Group(_) => Some("group"),
            Kind::Repeat(_) => Some("some"),
            _ => None,
        }
    }

    /// Returns `true` if both handles are the same matcher.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.kind, &other.kind)
    }

    /// Nesting depth of this matcher (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        let children: Vec<&Matcher> = match self.kind() {
            Kind::Array(Some(items))
            | Kind::Group(items)
            | Kind::OneOf(items)
            | Kind::AllOf(items) => items.iter().collect(),
            Kind::Object(Some(pattern)) => pattern.fields.iter().map(|(_, m)| m).collect(),
            Kind::Maybe(inner) | Kind::Repeat(inner) | Kind::Not(inner) => vec![inner],
            Kind::When(guarded) => vec![&guarded.matcher],
            _ => Vec::new(),
        };
        1 + children.into_iter().map(Matcher::depth).max().unwrap_or(0)
    }

    /// Check this matcher against [`MAX_DEPTH`].
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DepthExceeded`] if nesting exceeds the limit.
    pub fn validate(&self) -> Result<(), MatcherError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(MatcherError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }
}

impl Predicate {
    fn apply(&self, value: &Value) -> MatchResult {
        if (self.test)(value) {
            matched(value.clone())
        } else {
            UNMATCHED
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Kind::Any => f.write_str("Any"),
            Kind::Equals(expected) => f.debug_tuple("Equals").field(expected).finish(),
            Kind::Typed(primitive, expected) => f
                .debug_struct("Typed")
                .field("primitive", primitive)
                .field("expected", expected)
                .finish(),
            Kind::Predicate(predicate) => f.debug_tuple("Predicate").field(&predicate.label).finish(),
            Kind::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Kind::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Kind::Object(pattern) => f.debug_tuple("Object").field(pattern).finish(),
            Kind::Rest => f.write_str("Rest"),
            Kind::Maybe(inner) => f.debug_tuple("Maybe").field(inner).finish(),
            Kind::Group(items) => f.debug_tuple("Group").field(items).finish(),
            Kind::Repeat(inner) => f.debug_tuple("Some").field(inner).finish(),
            Kind::OneOf(items) => f.debug_tuple("OneOf").field(items).finish(),
            Kind::AllOf(items) => f.debug_tuple("AllOf").field(items).finish(),
            Kind::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Kind::When(guarded) => fmt::Debug::fmt(guarded, f),
            Kind::Custom(custom) => f.debug_tuple("Custom").field(custom).finish(),
        }
    }
}
