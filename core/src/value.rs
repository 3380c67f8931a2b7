//! `Value` — the dynamic data every matcher inspects
//!
//! Scalars and materialized containers are plain variants. Two variants carry
//! behavior instead of data:
//!
//! - [`Value::Object`] reads properties through a [`RecordSource`], whose
//!   accessors may be impure (counters, randomness, computed getters).
//! - [`Value::Sequence`] wraps a one-pass [`Sequence`]; pulling a value consumes it.
//!
//! Both are shared by handle: cloning a `Value` never re-reads a source.
//!
//! # Extensibility via `Custom`
//!
//! Opaque host data that patterns only compare by identity (or inspect in a
//! custom matcher) goes in `Value::Custom(Arc::new(your_type))`.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex, PoisonError};

/// A keyed record whose properties are produced on demand.
///
/// `get` may have side effects: every call is a real read. The engine never
/// assumes two reads return the same value; alternation wraps sources in a
/// memoizing layer instead (see [`CachedValue`](crate::CachedValue)).
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use rematch::{RecordSource, Value};
///
/// #[derive(Debug, Default)]
/// struct Ticker(AtomicUsize);
///
/// impl RecordSource for Ticker {
///     fn keys(&self) -> Vec<String> {
///         vec!["tick".into()]
///     }
///
///     fn get(&self, key: &str) -> Option<Value> {
///         (key == "tick").then(|| Value::from(self.0.fetch_add(1, Ordering::SeqCst) as f64))
///     }
/// }
///
/// let value = Value::Object(Arc::new(Ticker::default()));
/// assert_eq!(value.get("tick"), Some(Value::from(0.0)));
/// assert_eq!(value.get("tick"), Some(Value::from(1.0)));
/// ```
pub trait RecordSource: Send + Sync + Debug {
    /// Property names, in any order.
    fn keys(&self) -> Vec<String>;

    /// Read one property. `None` when the property does not exist.
    fn get(&self, key: &str) -> Option<Value>;

    /// Whether `key` names a property. Must not run the accessor.
    fn contains_key(&self, key: &str) -> bool {
        self.keys().iter().any(|k| k == key)
    }

    /// Human-readable type identifier, reported in type mismatches.
    fn type_name(&self) -> &'static str {
        "object"
    }
}

/// Extension trait for opaque host values.
///
/// Implement this for domain types that patterns should carry around
/// untouched, then wrap with `Value::Custom(Arc::new(your_type))`.
/// Custom matchers downcast through [`as_any`](Self::as_any).
pub trait CustomValue: Send + Sync + Debug {
    /// Returns a human-readable type identifier, e.g. `"timestamp"`.
    fn custom_type_name(&self) -> &'static str;

    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

type Source = Box<dyn Iterator<Item = Value> + Send>;

/// A one-pass, lazily produced sequence of values.
///
/// Clones share the same underlying source: a value pulled through one clone
/// is gone for all of them. Replaying requires a [`Cursor`](crate::Cursor)
/// or a [`SequenceCache`](crate::SequenceCache).
#[derive(Clone)]
pub struct Sequence {
    source: Arc<Mutex<Source>>,
}

impl Sequence {
    /// Wrap any sendable iterator.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            source: Arc::new(Mutex::new(Box::new(values.into_iter()))),
        }
    }

    /// Pull the next value from the source.
    pub fn pull(&self) -> Option<Value> {
        let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
        source.next()
    }

    /// Returns `true` if both handles share one source.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl Iterator for Sequence {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.pull()
    }
}

impl Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sequence(..)")
    }
}

/// The dynamic value type matched by every [`Matcher`](crate::Matcher).
///
/// # Example
///
/// ```
/// use rematch::Value;
///
/// let point = Value::record([("x", Value::from(1)), ("y", Value::from(2))]);
/// assert_eq!(point.get("x"), Some(Value::from(1)));
/// assert_eq!(point.type_name(), "record");
/// assert!(point.is_record_like());
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value. Doubles as the "unbound" sentinel in patterns.
    #[default]
    Undefined,

    /// Explicit null.
    Null,

    /// Boolean.
    Bool(bool),

    /// Double-precision number.
    Number(f64),

    /// Arbitrary-size integer, kept apart from `Number`.
    BigInt(i128),

    /// Text.
    String(String),

    /// Materialized ordered sequence.
    Array(Vec<Value>),

    /// Plain keyed record.
    Record(BTreeMap<String, Value>),

    /// Keyed record backed by (possibly impure) accessors.
    Object(Arc<dyn RecordSource>),

    /// One-pass lazy sequence.
    Sequence(Sequence),

    /// Opaque host data.
    Custom(Arc<dyn CustomValue>),
}

// Handle-backed variants compare by identity, everything else by value.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b),
            (Self::Custom(a), Self::Custom(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::BigInt(n) => f.debug_tuple("BigInt").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Array(items) => f.debug_list().entries(items).finish(),
            Self::Record(fields) => f.debug_map().entries(fields).finish(),
            Self::Object(source) => f.debug_tuple("Object").field(source).finish(),
            Self::Sequence(seq) => seq.fmt(f),
            Self::Custom(custom) => f.debug_tuple("Custom").field(custom).finish(),
        }
    }
}

impl Value {
    /// Build a record from key/value pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap an iterator as a one-pass lazy sequence.
    pub fn sequence<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self::Sequence(Sequence::new(values))
    }

    /// Returns `true` if this is the `Undefined` variant.
    #[inline]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` if this is the `Null` variant.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this is the `Bool` variant.
    #[inline]
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns `true` if this is the `Number` variant.
    #[inline]
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Returns `true` if this is the `BigInt` variant.
    #[inline]
    #[must_use]
    pub fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    /// Returns `true` if this is the `String` variant.
    #[inline]
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns `true` for values a sequence pattern can iterate: `Array` and `Sequence`.
    ///
    /// Strings are scalars here, not sequences of characters.
    #[inline]
    #[must_use]
    pub fn is_sequence_like(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Sequence(_))
    }

    /// Returns `true` for keyed values: `Record` and `Object`.
    #[inline]
    #[must_use]
    pub fn is_record_like(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Object(_))
    }

    /// Returns `true` if no part of this value is accessor-backed or one-pass.
    ///
    /// Plain values can be read any number of times with identical results.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        match self {
            Self::Object(_) | Self::Sequence(_) => false,
            Self::Array(items) => items.iter().all(Self::is_plain),
            Self::Record(fields) => fields.values().all(Self::is_plain),
            _ => true,
        }
    }

    /// Try to get the value as a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a big integer.
    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<i128> {
        match self {
            Self::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a materialized array.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Try to get the value as a plain record.
    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Try to get the value as custom host data.
    #[inline]
    #[must_use]
    pub fn as_custom(&self) -> Option<&dyn CustomValue> {
        match self {
            Self::Custom(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    /// Read a property of a record-shaped value.
    ///
    /// For `Object` this runs the accessor. Returns `None` for missing keys
    /// and for values that are not record-shaped.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Record(fields) => fields.get(key).cloned(),
            Self::Object(source) => source.get(key),
            _ => None,
        }
    }

    /// Whether a record-shaped value has `key`, without reading it.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            Self::Record(fields) => fields.contains_key(key),
            Self::Object(source) => source.contains_key(key),
            _ => false,
        }
    }

    /// Property names of a record-shaped value.
    #[must_use]
    pub fn keys(&self) -> Option<Vec<String>> {
        match self {
            Self::Record(fields) => Some(fields.keys().cloned().collect()),
            Self::Object(source) => Some(source.keys()),
            _ => None,
        }
    }

    /// Returns a string describing the type of this value.
    ///
    /// Reported in [`Mismatch::Type`](crate::Mismatch::Type) diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
            Self::Object(source) => source.type_name(),
            Self::Sequence(_) => "sequence",
            Self::Custom(c) => c.custom_type_name(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)] // Numbers are doubles
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Self::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self::Record(fields)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Self::Sequence(seq)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Undefined, Into::into)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Array(iter.into_iter().map(Into::into).collect())
    }
}
