//! rematch-test: test doubles for conformance testing
//!
//! Provides instrumented inputs that count how often the engine reads them,
//! so tests can assert the engine's laziness and caching guarantees instead of
//! just its answers.
//!
//! # Example
//!
//! ```
//! use rematch_test::prelude::*;
//!
//! let (input, reads) = counted_sequence((1..=10).map(Value::from));
//! let pattern = build_matcher(Matchable::seq([Matchable::from(1), rest().into()]));
//!
//! assert!(pattern.matches(&input).unwrap());
//! assert_eq!(reads.count(), 10);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rematch::{RecordSource, Value};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Shared read counter handed out alongside an instrumented input.
#[derive(Debug, Clone, Default)]
pub struct ReadCounter(Arc<AtomicUsize>);

impl ReadCounter {
    /// Reads observed so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Wrap `values` in a one-pass sequence that counts every pull.
pub fn counted_sequence<I>(values: I) -> (Value, ReadCounter)
where
    I: IntoIterator<Item = Value>,
    I::IntoIter: Send + 'static,
{
    let counter = ReadCounter::default();
    let pulls = counter.clone();
    let source = values.into_iter().inspect(move |_| {
        pulls.bump();
    });
    (Value::sequence(source), counter)
}

/// Accessor-backed record that counts property reads.
///
/// Listing keys and membership checks are free; only [`RecordSource::get`]
/// counts.
#[derive(Debug)]
pub struct CountingRecord {
    fields: BTreeMap<String, Value>,
    reads: ReadCounter,
}

impl CountingRecord {
    /// Build a counting record and return it with its counter.
    pub fn new<K, I>(fields: I) -> (Value, ReadCounter)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let reads = ReadCounter::default();
        let record = Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            reads: reads.clone(),
        };
        (Value::Object(Arc::new(record)), reads)
    }
}

impl RecordSource for CountingRecord {
    fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.reads.bump();
        self.fields.get(key).cloned()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn type_name(&self) -> &'static str {
        "counting_record"
    }
}

/// Record whose properties change on every read: each `get` returns the
/// running read count.
///
/// Without caching, two alternatives that read the same key see different
/// numbers.
#[derive(Debug)]
pub struct TickingRecord {
    keys: Vec<String>,
    reads: ReadCounter,
}

impl TickingRecord {
    /// Build a ticking record exposing `keys` and return it with its counter.
    pub fn new<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> (Value, ReadCounter) {
        let reads = ReadCounter::default();
        let record = Self {
            keys: keys.into_iter().map(Into::into).collect(),
            reads: reads.clone(),
        };
        (Value::Object(Arc::new(record)), reads)
    }
}

impl RecordSource for TickingRecord {
    fn keys(&self) -> Vec<String> {
        self.keys.clone()
    }

    fn get(&self, key: &str) -> Option<Value> {
        if !self.keys.iter().any(|k| k == key) {
            return None;
        }
        Some(Value::from(u32::try_from(self.reads.bump()).unwrap_or(u32::MAX)))
    }

    fn type_name(&self) -> &'static str {
        "ticking_record"
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{counted_sequence, CountingRecord, ReadCounter, TickingRecord};
    pub use rematch::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Strings beginning with a prefix. Registered as `starts_with` by [`register`].
#[cfg(feature = "registry")]
#[derive(Debug, Clone, Copy)]
pub struct StartsWith;

/// Configuration for [`StartsWith`].
#[cfg(feature = "registry")]
#[derive(Debug, serde::Deserialize)]
pub struct StartsWithConfig {
    /// Required prefix.
    pub prefix: String,
}

#[cfg(feature = "registry")]
impl rematch::IntoMatcher for StartsWith {
    type Config = StartsWithConfig;

    fn from_config(config: StartsWithConfig) -> Result<rematch::Matcher, rematch::MatcherError> {
        let prefix = config.prefix;
        Ok(rematch::match_predicate(move |value| {
            value.as_str().is_some_and(|s| s.starts_with(prefix.as_str()))
        }))
    }
}

/// Register the core named matchers plus the test-domain ones:
/// - `starts_with` -> [`StartsWith`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register(builder: rematch::RegistryBuilder) -> rematch::RegistryBuilder {
    rematch::register_core_matchers(builder).matcher::<StartsWith>("starts_with")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_sequence_counts_pulls() {
        let (input, reads) = counted_sequence((0..3).map(Value::from));
        let Value::Sequence(seq) = input else {
            panic!("expected a sequence");
        };
        assert_eq!(reads.count(), 0);
        assert_eq!(seq.pull(), Some(Value::from(0)));
        assert_eq!(reads.count(), 1);
        assert_eq!(seq.count(), 2);
        assert_eq!(reads.count(), 3);
    }

    #[test]
    fn test_counting_record_counts_gets_only() {
        let (input, reads) = CountingRecord::new([("a", Value::from(1))]);
        assert_eq!(input.keys(), Some(vec!["a".to_owned()]));
        assert!(input.has_key("a"));
        assert_eq!(reads.count(), 0);
        assert_eq!(input.get("a"), Some(Value::from(1)));
        assert_eq!(reads.count(), 1);
    }

    #[test]
    fn test_ticking_record_changes_between_reads() {
        let (input, _) = TickingRecord::new(["n"]);
        assert_eq!(input.get("n"), Some(Value::from(1)));
        assert_eq!(input.get("n"), Some(Value::from(2)));
        assert_eq!(input.get("missing"), None);
    }

    #[cfg(feature = "registry")]
    #[test]
    fn test_register_adds_test_matchers() {
        let registry = register(rematch::RegistryBuilder::new()).build();
        assert!(registry.contains("starts_with"));
        assert!(registry.contains("between"));
    }
}
