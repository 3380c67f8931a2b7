//! rematch - structural pattern matching over dynamic values
//!
//! Declarative patterns (literals, regexes, sequences, records) compile into
//! [`Matcher`]s; a matcher applied to a [`Value`] yields a [`MatchResult`].
//!
//! # Architecture
//!
//! - [`Value`] — Dynamic data: scalars, arrays, records, plus accessor-backed
//!   objects ([`RecordSource`]) and one-pass generators ([`Sequence`])
//! - [`Matchable`] — Declarative pattern; [`build_matcher`] normalizes it once
//! - [`Matcher`] — Executable pattern, `Value -> Result<MatchResult, MatcherError>`
//! - [`Cursor`] — Buffered read head that lets quantifiers backtrack over a
//!   one-pass source without pulling any position twice
//! - [`CachedValue`] — Memo over an impure input so every alternative of an
//!   alternation sees identical data
//!
//! # Key Design Insights
//!
//! 1. **Two failure channels**: data that does not fit is `Ok(Unmatched)`;
//!    programmer errors (a quantifier outside a sequence, `some(maybe(..))`)
//!    are `Err(MatcherError)` and are never downgraded.
//!
//! 2. **Quantifiers are checkpoint discipline**: `maybe`, `group`, `some`, and
//!    `rest` each record [`Cursor::now`] and [`Cursor::jump`] back on failure.
//!    Nothing else is needed for them to compose.
//!
//! 3. **Markers are identity sentinels**: [`rest()`] always returns the same
//!    handle, recognized only by structural patterns.
//!
//! # Example
//!
//! ```
//! use rematch::prelude::*;
//!
//! let route = one_of([
//!     when(Matchable::seq([Matchable::from("users"), match_string(None).into()]))
//!         .then(|m| {
//!             let name = m.value.as_array().and_then(|parts| parts[1].as_str());
//!             Value::from(format!("user {}", name.unwrap_or_default()))
//!         }),
//!     when(Matchable::seq([Matchable::from("files"), rest().into()]))
//!         .then(|m| m.rest.clone().unwrap_or_default()),
//!     otherwise().then(|_| Value::from("not found")),
//! ]);
//!
//! let path = |parts: &[&str]| Value::from_iter(parts.iter().copied());
//!
//! assert_eq!(route.evaluate(&path(&["users", "ada"])).unwrap(), Some(Value::from("user ada")));
//! assert_eq!(
//!     route.evaluate(&path(&["files", "a", "b"])).unwrap(),
//!     Some(path(&["a", "b"]))
//! );
//! assert_eq!(route.evaluate(&path(&["admin"])).unwrap(), Some(Value::from("not found")));
//! ```
//!
//! # Features
//!
//! - `serde` — JSON interop: `From<serde_json::Value>`, [`Value::to_json`],
//!   `MatchResult::to_json`
//! - `registry` — declarative [`PatternConfig`] and the named-matcher
//!   [`Registry`]

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod cache;
mod combinator;
mod cursor;
mod matchable;
mod matcher;
mod primitives;
mod quantifier;
mod result;
mod structural;
mod value;

#[cfg(feature = "serde")]
mod json;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use cache::{CachedRecord, CachedValue, SequenceCache};
pub use cursor::{Checkpoint, Cursor};
pub use matchable::{build_matcher, Matchable};
pub use matcher::{CustomMatcher, Eval, Matcher};
pub use result::{
    matched, KeyReport, MatchResult, Matched, Mismatch, RegexMatch, Results, Unmatched, UNMATCHED,
};
pub use value::{CustomValue, RecordSource, Sequence, Value};

// Pattern constructors
pub use combinator::{all_of, not, one_of, otherwise, when, When};
pub use primitives::{
    any, between, defined, empty, equals, greater_than, greater_than_or_equal, has_prop,
    less_than, less_than_or_equal, match_bigint, match_boolean, match_non_empty_string,
    match_number, match_predicate, match_regex, match_string,
};
pub use quantifier::{group, maybe, rest, some};
pub use structural::{match_array, match_object};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{PatternConfig, UnitConfig};
#[cfg(feature = "registry")]
pub use primitives::{
    Between, BoundConfig, Empty, GreaterThan, GreaterThanOrEqual, HasProp, LessThan,
    LessThanOrEqual, NonEmptyString, PropConfig, RangeConfig,
};
#[cfg(feature = "registry")]
pub use registry::{register_core_matchers, IntoMatcher, Registry, RegistryBuilder};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use rematch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Combinators
        all_of,
        // Primitives
        any,
        build_matcher,
        defined,
        equals,
        // Quantifiers
        group,
        match_array,
        match_boolean,
        match_number,
        match_object,
        match_predicate,
        match_regex,
        match_string,
        matched,
        maybe,
        not,
        one_of,
        otherwise,
        rest,
        some,
        when,
        // Core types
        Cursor,
        MatchResult,
        Matchable,
        Matched,
        Matcher,
        // Errors
        MatcherError,
        Unmatched,
        Value,
        UNMATCHED,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth for nested matchers.
///
/// Matching recurses once per nesting level. Checked by [`Matcher::validate`],
/// which config loading calls automatically.
pub const MAX_DEPTH: usize = 32;

/// Maximum number of child patterns in one compound (`array` items, `object`
/// fields, `group`, `one_of`, `all_of`) loaded from config.
pub const MAX_PATTERNS_PER_COMPOUND: usize = 256;

/// Maximum length for regex patterns loaded from config.
///
/// Regex compilation is expensive even with the linear-time `regex` crate.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Fatal errors from matcher construction and evaluation.
///
/// None of these are data-driven: a value that does not fit a pattern is
/// `Ok(Unmatched)`, never an error. Fix the pattern and rebuild.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// A dynamic value has no pattern reading (see `TryFrom<Value> for Matchable`).
    #[error("unable to build matcher from {found}; patterns are literals, regexes, arrays, records, or matchers")]
    UnableToBuild {
        /// [`Value::type_name`] of the offending value.
        found: String,
    },
    /// A quantifier or `rest` was applied outside a sequence pattern.
    #[error("`{marker}` is only valid inside an array pattern; it was applied to a value directly")]
    MarkerInvoked {
        /// Which marker: `rest`, `maybe`, `group`, or `some`.
        marker: &'static str,
    },
    /// A `some` iteration matched without reading anything.
    #[error("`some` cannot repeat {pattern}: it matches without consuming input and would loop forever")]
    NoProgress {
        /// Debug rendering of the repeated pattern.
        pattern: String,
    },
    /// Matcher nesting exceeds [`MAX_DEPTH`].
    #[error("matcher nesting depth is {depth}, but maximum allowed is {max}; reduce nesting")]
    DepthExceeded {
        /// Actual depth of the matcher tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },
    /// Configuration deserialization or construction failed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
    /// A named matcher was not found in the registry.
    #[error("unknown matcher \"{name}\"{}", registered_suffix(.available))]
    UnknownMatcher {
        /// The unregistered name.
        name: String,
        /// Names that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },
    /// Too many child patterns in one compound.
    #[error("compound pattern has {count} children, but maximum allowed is {max}")]
    TooManyPatterns {
        /// Actual count of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A regex pattern exceeds [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

fn registered_suffix(available: &[String]) -> String {
    if available.is_empty() {
        "; no matchers are registered".to_owned()
    } else {
        format!("; registered: {}", available.join(", "))
    }
}
