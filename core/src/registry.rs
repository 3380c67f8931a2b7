//! Named-matcher registry for config-driven pattern construction.
//!
//! The registry enables **declarative pattern loading**: JSON/YAML config ->
//! compiled [`Matcher`] without hand-written construction code.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each named matcher type registers itself via [`IntoMatcher`]. At
//! registration time the concrete type `T` is monomorphized into a closure
//! and erased behind `Box<dyn Fn>`: early type erasure at registration, late
//! invocation at load time.
//!
//! Built-in pattern kinds (`literal`, `array`, `one_of`, ...) need no
//! registration; only `{ "type": "named", "name": ... }` goes through the
//! factories.
//!
//! # Example
//!
//! ```
//! use rematch::{register_core_matchers, PatternConfig, RegistryBuilder, Value};
//!
//! let registry = register_core_matchers(RegistryBuilder::new()).build();
//!
//! let config: PatternConfig = serde_json::from_value(serde_json::json!({
//!     "type": "array",
//!     "items": [
//!         { "type": "named", "name": "between", "config": { "lower": 0, "upper": 10 } },
//!         { "type": "rest" }
//!     ]
//! }))
//! .unwrap();
//!
//! let m = registry.load_pattern(config).unwrap();
//! assert!(m.matches(&Value::from_iter([3, 100])).unwrap());
//! assert!(!m.matches(&Value::from_iter([10])).unwrap());
//! ```

use std::collections::{BTreeMap, HashMap};

use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::PatternConfig;
use crate::{
    all_of, any, build_matcher, defined, equals, group, match_array, match_bigint, match_boolean,
    match_number, match_object, match_regex, match_string, maybe, not, one_of, rest, some,
    Matchable, Matcher, MatcherError, Value, MAX_PATTERNS_PER_COMPOUND, MAX_REGEX_PATTERN_LENGTH,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for matcher types that can be constructed from configuration.
///
/// Each named matcher knows its own config shape via the associated `Config`
/// type. The registry calls [`from_config`](Self::from_config) at load time.
///
/// # Example
///
/// ```
/// use rematch::{greater_than, IntoMatcher, Matcher, MatcherError, RegistryBuilder};
///
/// #[derive(serde::Deserialize)]
/// struct AdultConfig {
///     age: f64,
/// }
///
/// struct Adult;
///
/// impl IntoMatcher for Adult {
///     type Config = AdultConfig;
///
///     fn from_config(config: AdultConfig) -> Result<Matcher, MatcherError> {
///         Ok(greater_than(config.age))
///     }
/// }
///
/// let registry = RegistryBuilder::new().matcher::<Adult>("adult").build();
/// assert!(registry.contains("adult"));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be registered as a named matcher",
    label = "missing `IntoMatcher` implementation",
    note = "implement `IntoMatcher` with a `Config` type and `from_config`"
)]
pub trait IntoMatcher: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a `Matcher` from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidConfig`] if the config is semantically invalid
    /// (e.g., an inverted range).
    fn from_config(config: Self::Config) -> Result<Matcher, MatcherError>;
}

/// Type-erased matcher factory closure.
type BoxedMatcherFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Matcher, MatcherError> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register matcher types under names, then call [`build()`](Self::build)
/// to produce an immutable `Registry`. No runtime registration is possible
/// after that.
pub struct RegistryBuilder {
    factories: HashMap<String, BoxedMatcherFactory>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a matcher type under `name`.
    ///
    /// At load time, the registry deserializes config as `T::Config` and
    /// calls `T::from_config()`. Registering a name twice keeps the last.
    #[must_use]
    pub fn matcher<T: IntoMatcher>(mut self, name: &str) -> Self {
        self.factories.insert(
            name.to_owned(),
            Box::new(|value: &serde_json::Value| {
                let config: T::Config = serde_json::from_value(value.clone()).map_err(|e| {
                    MatcherError::InvalidConfig {
                        reason: e.to_string(),
                    }
                })?;
                T::from_config(config)
            }),
        );
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            factories: self.factories,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in named matchers.
///
/// | Name | Config |
/// |------|--------|
/// | `between` | `{ lower, upper }`, half-open |
/// | `greater_than`, `greater_than_or_equal` | `{ bound }` |
/// | `less_than`, `less_than_or_equal` | `{ bound }` |
/// | `has_prop` | `{ key }` |
/// | `empty` | none |
/// | `non_empty_string` | none |
#[must_use]
pub fn register_core_matchers(builder: RegistryBuilder) -> RegistryBuilder {
    use crate::primitives::{
        Between, Empty, GreaterThan, GreaterThanOrEqual, HasProp, LessThan, LessThanOrEqual,
        NonEmptyString,
    };
    builder
        .matcher::<Between>("between")
        .matcher::<GreaterThan>("greater_than")
        .matcher::<GreaterThanOrEqual>("greater_than_or_equal")
        .matcher::<LessThan>("less_than")
        .matcher::<LessThanOrEqual>("less_than_or_equal")
        .matcher::<HasProp>("has_prop")
        .matcher::<Empty>("empty")
        .matcher::<NonEmptyString>("non_empty_string")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of named matcher factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_pattern()`](Self::load_pattern)
/// to compile config into a runtime [`Matcher`].
pub struct Registry {
    factories: HashMap<String, BoxedMatcherFactory>,
}

impl Registry {
    /// Load a `Matcher` from configuration.
    ///
    /// Walks the config tree, resolves named matchers via registered
    /// factories, compiles regexes, and validates depth.
    ///
    /// # Errors
    ///
    /// - [`MatcherError::UnknownMatcher`] — `named` pattern not registered
    /// - [`MatcherError::InvalidConfig`] — named config deserialization or construction failed
    /// - [`MatcherError::UnableToBuild`] — a literal has no pattern reading
    /// - [`MatcherError::InvalidPattern`] — regex does not compile
    /// - [`MatcherError::PatternTooLong`] — regex exceeds [`MAX_REGEX_PATTERN_LENGTH`]
    /// - [`MatcherError::TooManyPatterns`] — a compound exceeds [`MAX_PATTERNS_PER_COMPOUND`]
    /// - [`MatcherError::DepthExceeded`] — nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH)
    pub fn load_pattern(&self, config: PatternConfig) -> Result<Matcher, MatcherError> {
        let matcher = self.load(config)?;
        matcher.validate()?;
        debug!(depth = matcher.depth(), "pattern loaded");
        Ok(matcher)
    }

    /// Returns the number of registered named matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no named matchers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns all registered names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn load(&self, config: PatternConfig) -> Result<Matcher, MatcherError> {
        match config {
            PatternConfig::Literal { value } => Self::load_literal(value),
            PatternConfig::Any => Ok(any()),
            PatternConfig::Defined => Ok(defined()),
            PatternConfig::Rest => Ok(rest()),
            PatternConfig::Boolean { expected } => Ok(match_boolean(expected)),
            PatternConfig::Number { expected } => Ok(match_number(expected)),
            PatternConfig::BigInt { expected } => Ok(match_bigint(expected.map(i128::from))),
            PatternConfig::String { expected } => Ok(match_string(expected.as_deref())),
            PatternConfig::Regex {
                pattern,
                case_insensitive,
            } => Self::load_regex(&pattern, case_insensitive),
            PatternConfig::Array { items } => {
                let items = items.map(|items| self.load_all(items)).transpose()?;
                Ok(match_array(
                    items.map(|items| items.into_iter().map(Matchable::from).collect()),
                ))
            }
            PatternConfig::Object { fields } => {
                let Some(fields) = fields else {
                    return Ok(match_object(None));
                };
                Self::check_width(fields.len())?;
                let fields: BTreeMap<String, Matchable> = fields
                    .into_iter()
                    .map(|(key, pattern)| Ok((key, Matchable::from(self.load(pattern)?))))
                    .collect::<Result<_, MatcherError>>()?;
                Ok(match_object(Some(fields)))
            }
            PatternConfig::Maybe { pattern } => Ok(maybe(self.load(*pattern)?)),
            PatternConfig::Group { patterns } => Ok(group(self.load_all(patterns)?)),
            PatternConfig::OneOrMore { pattern } => Ok(some(self.load(*pattern)?)),
            PatternConfig::OneOf { patterns } => Ok(one_of(self.load_all(patterns)?)),
            PatternConfig::AllOf { patterns } => Ok(all_of(self.load_all(patterns)?)),
            PatternConfig::Not { pattern } => Ok(not(self.load(*pattern)?)),
            PatternConfig::Named { name, config } => self.load_named(&name, &config),
        }
    }

    fn load_all(&self, patterns: Vec<PatternConfig>) -> Result<Vec<Matcher>, MatcherError> {
        Self::check_width(patterns.len())?;
        patterns.into_iter().map(|p| self.load(p)).collect()
    }

    fn load_named(&self, name: &str, config: &serde_json::Value) -> Result<Matcher, MatcherError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| MatcherError::UnknownMatcher {
                name: name.to_owned(),
                available: self.names().into_iter().map(str::to_owned).collect(),
            })?;
        factory(config)
    }

    fn load_literal(value: serde_json::Value) -> Result<Matcher, MatcherError> {
        if value.is_null() {
            return Ok(equals(Value::Null));
        }
        Matchable::try_from(Value::from(value)).map(build_matcher)
    }

    fn load_regex(pattern: &str, case_insensitive: bool) -> Result<Matcher, MatcherError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(MatcherError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| MatcherError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(match_regex(regex))
    }

    fn check_width(count: usize) -> Result<(), MatcherError> {
        if count > MAX_PATTERNS_PER_COMPOUND {
            return Err(MatcherError::TooManyPatterns {
                count,
                max: MAX_PATTERNS_PER_COMPOUND,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
