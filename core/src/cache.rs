//! Caching layer: one stable view of an impure input across competing patterns.
//!
//! An alternation probes one input with several candidate patterns. If the
//! input reads through accessors with side effects, or is a one-pass
//! generator, each candidate could see different data. [`CachedValue`] makes
//! every candidate observe the same values for the same logical reads:
//!
//! - `Object` inputs become a [`CachedRecord`]: each property is read from the
//!   source at most once and the result is reused.
//! - `Sequence` inputs become a [`SequenceCache`]: a shared backtracking
//!   [`Cursor`], with every [`view`](CachedValue::view) replaying from
//!   position 0.
//! - Plain subtrees are passed through untouched.
//!
//! Caching is recursive and lazy: nested objects and sequences are wrapped
//! when first reached, never eagerly walked.
//!
//! ```
//! use rematch::{CachedValue, Value};
//!
//! let generator = Value::sequence((1..=3).map(Value::from));
//! let cache = CachedValue::new(&generator);
//!
//! let Value::Sequence(a) = cache.view().into_owned() else { unreachable!() };
//! let Value::Sequence(b) = cache.view().into_owned() else { unreachable!() };
//! assert_eq!(a.take(2).collect::<Vec<_>>(), vec![Value::from(1), Value::from(2)]);
//! assert_eq!(b.collect::<Vec<_>>(), vec![Value::from(1), Value::from(2), Value::from(3)]);
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::{debug, trace};

use crate::cursor::Checkpoint;
use crate::value::{RecordSource, Sequence};
use crate::{Cursor, Value};

/// A memoizing wrapper around one input value.
///
/// Build one per alternation; drop it when the alternation resolves.
#[derive(Debug)]
pub struct CachedValue<'a> {
    root: Node<'a>,
}

impl<'a> CachedValue<'a> {
    /// Wrap `value`. Nothing is read from the input yet.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self {
            root: Node::borrowed(value),
        }
    }

    /// The value to hand to one candidate pattern.
    ///
    /// Plain inputs are returned as borrowed. Each call replays cached
    /// sequences from the start.
    #[must_use]
    pub fn view(&self) -> Cow<'_, Value> {
        self.root.view()
    }

    /// Returns `true` if the input has nothing to cache.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        matches!(self.root, Node::Pure(_))
    }
}

enum Node<'a> {
    Pure(Cow<'a, Value>),
    Object(Arc<CachedRecord>),
    Sequence(SequenceCache),
    Array(Vec<Node<'a>>),
    Record(BTreeMap<String, Node<'a>>),
}

impl<'a> Node<'a> {
    fn borrowed(value: &'a Value) -> Self {
        if value.is_plain() {
            return Self::Pure(Cow::Borrowed(value));
        }
        match value {
            Value::Object(source) => Self::Object(Arc::new(CachedRecord::new(Arc::clone(source)))),
            Value::Sequence(seq) => Self::Sequence(SequenceCache::new(seq.clone())),
            Value::Array(items) => Self::Array(items.iter().map(Node::borrowed).collect()),
            Value::Record(fields) => Self::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Node::borrowed(v)))
                    .collect(),
            ),
            other => Self::Pure(Cow::Borrowed(other)),
        }
    }

    fn view(&self) -> Cow<'_, Value> {
        match self {
            Self::Pure(value) => Cow::Borrowed(value.as_ref()),
            Self::Object(record) => {
                let source: Arc<dyn RecordSource> = Arc::clone(record) as Arc<dyn RecordSource>;
                Cow::Owned(Value::Object(source))
            }
            Self::Sequence(cache) => Cow::Owned(Value::Sequence(cache.replay())),
            Self::Array(nodes) => Cow::Owned(Value::Array(
                nodes.iter().map(|n| n.view().into_owned()).collect(),
            )),
            Self::Record(nodes) => Cow::Owned(Value::Record(
                nodes
                    .iter()
                    .map(|(k, n)| (k.clone(), n.view().into_owned()))
                    .collect(),
            )),
        }
    }
}

impl Node<'static> {
    fn owned(value: Value) -> Self {
        if value.is_plain() {
            return Self::Pure(Cow::Owned(value));
        }
        match value {
            Value::Object(source) => Self::Object(Arc::new(CachedRecord::new(source))),
            Value::Sequence(seq) => Self::Sequence(SequenceCache::new(seq)),
            Value::Array(items) => Self::Array(items.into_iter().map(Node::owned).collect()),
            Value::Record(fields) => Self::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Node::owned(v)))
                    .collect(),
            ),
            other => Self::Pure(Cow::Owned(other)),
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pure(value) => f.debug_tuple("Pure").field(value).finish(),
            Self::Object(record) => f.debug_tuple("Object").field(record).finish(),
            Self::Sequence(cache) => f.debug_tuple("Sequence").field(cache).finish(),
            Self::Array(nodes) => f.debug_tuple("Array").field(nodes).finish(),
            Self::Record(nodes) => f.debug_tuple("Record").field(nodes).finish(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════════════

/// A [`RecordSource`] that reads each property of its source at most once.
pub struct CachedRecord {
    source: Arc<dyn RecordSource>,
    keys: OnceLock<Vec<String>>,
    memo: Mutex<HashMap<String, Option<Node<'static>>>>,
}

impl CachedRecord {
    /// Wrap `source` with an empty memo.
    #[must_use]
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            keys: OnceLock::new(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Count of distinct properties read so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl RecordSource for CachedRecord {
    fn keys(&self) -> Vec<String> {
        self.keys.get_or_init(|| self.source.keys()).clone()
    }

    fn get(&self, key: &str) -> Option<Value> {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(node) = memo.get(key) {
            debug!(key, "property cache hit");
            return node.as_ref().map(|n| n.view().into_owned());
        }
        trace!(key, "property read from source");
        let node = self.source.get(key).map(Node::owned);
        let value = node.as_ref().map(|n| n.view().into_owned());
        memo.insert(key.to_owned(), node);
        value
    }

    fn contains_key(&self, key: &str) -> bool {
        self.keys().iter().any(|k| k == key)
    }

    fn type_name(&self) -> &'static str {
        self.source.type_name()
    }
}

impl fmt::Debug for CachedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedRecord")
            .field("source", &self.source)
            .field("reads", &self.reads())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sequences
// ═══════════════════════════════════════════════════════════════════════════════

struct Pulled {
    cursor: Cursor<'static>,
    nodes: Vec<Node<'static>>,
}

/// A one-pass source behind a shared backtracking cursor.
///
/// Every [`replay`](Self::replay) starts at position 0. Values already
/// pulled are served from the buffer; the source is pulled at most once per
/// position across all replays.
#[derive(Clone)]
pub struct SequenceCache {
    state: Arc<Mutex<Pulled>>,
}

impl SequenceCache {
    /// Wrap `source`. Nothing is pulled yet.
    #[must_use]
    pub fn new(source: Sequence) -> Self {
        Self {
            state: Arc::new(Mutex::new(Pulled {
                cursor: Cursor::new(source),
                nodes: Vec::new(),
            })),
        }
    }

    /// A fresh lazy sequence reading this cache from position 0.
    #[must_use]
    pub fn replay(&self) -> Sequence {
        Sequence::new(Replay {
            state: Arc::clone(&self.state),
            position: 0,
        })
    }

    /// Count of values pulled from the underlying source.
    #[must_use]
    pub fn source_position(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cursor
            .source_position()
    }
}

impl fmt::Debug for SequenceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCache")
            .field("source_position", &self.source_position())
            .finish()
    }
}

struct Replay {
    state: Arc<Mutex<Pulled>>,
    position: usize,
}

impl Iterator for Replay {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Pulled { cursor, nodes } = &mut *state;
        cursor.jump(Checkpoint::at(self.position));
        let raw = cursor.next()?;
        if self.position == nodes.len() {
            nodes.push(Node::owned(raw));
        }
        let value = nodes.get(self.position).map(|n| n.view().into_owned());
        self.position += 1;
        value
    }
}
