//! `Cursor` — replayable read head over a one-pass source
//!
//! Quantifiers speculate: they read ahead, and on failure jump back to a
//! [`Checkpoint`]. The cursor buffers every value it pulls, so re-reading a
//! position replays from the buffer instead of touching the source again.
//!
//! ```text
//!   buffer:  [ v0 | v1 | v2 ]      source_position = 3
//!                  ^
//!                  position = 1    next() replays v1, v2, then pulls v3
//! ```
//!
//! Each source position is pulled at most once, however many patterns probe it.
//!
//! # Example
//!
//! ```
//! use rematch::{Cursor, Value};
//!
//! let mut cursor = Cursor::new((1..=3).map(Value::from));
//! assert_eq!(cursor.next(), Some(Value::from(1)));
//! let after_first = cursor.now();
//! cursor.next();
//! cursor.next();
//!
//! cursor.jump(after_first);
//! assert_eq!(cursor.next(), Some(Value::from(2)));
//! assert_eq!(cursor.source_position(), 3);
//! ```

use std::fmt;

use tracing::trace;

use crate::Value;

/// Opaque position token returned by [`Cursor::now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint(usize);

impl Checkpoint {
    /// The start of any cursor.
    pub const START: Self = Self(0);

    pub(crate) fn at(position: usize) -> Self {
        Self(position)
    }

    /// Logical position this checkpoint refers to.
    #[must_use]
    pub fn position(self) -> usize {
        self.0
    }
}

/// A buffered, rewindable cursor over any forward iterator.
pub struct Cursor<'a> {
    source: Box<dyn Iterator<Item = Value> + Send + 'a>,
    buffer: Vec<Value>,
    source_exhausted: bool,
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at position 0. Nothing is pulled until the first read.
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'a,
    {
        Self {
            source: Box::new(source.into_iter()),
            buffer: Vec::new(),
            source_exhausted: false,
            position: 0,
        }
    }

    /// The current logical position.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    /// Move the read head back to `checkpoint`.
    ///
    /// Only positions already read are reachable; a checkpoint past the
    /// buffered values is clamped to the end of the buffer.
    pub fn jump(&mut self, checkpoint: Checkpoint) {
        debug_assert!(
            checkpoint.0 <= self.buffer.len(),
            "jump past source position {}",
            self.buffer.len()
        );
        if checkpoint.0 < self.position {
            trace!(from = self.position, to = checkpoint.0, "cursor rewound");
        }
        self.position = checkpoint.0.min(self.buffer.len());
    }

    /// Jump back to position 0.
    pub fn rewind(&mut self) {
        self.jump(Checkpoint::START);
    }

    /// Count of values pulled from the underlying source.
    #[inline]
    #[must_use]
    pub fn source_position(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the underlying source has reported its end.
    #[inline]
    #[must_use]
    pub fn is_source_exhausted(&self) -> bool {
        self.source_exhausted
    }

    /// Values between position 0 and the read head.
    #[must_use]
    pub fn consumed(&self) -> &[Value] {
        &self.buffer[..self.position]
    }

    /// Read everything from the head to the end of the source.
    pub fn drain(&mut self) -> Vec<Value> {
        self.by_ref().collect()
    }
}

impl Iterator for Cursor<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if let Some(value) = self.buffer.get(self.position) {
            self.position += 1;
            return Some(value.clone());
        }
        if self.source_exhausted {
            return None;
        }
        match self.source.next() {
            Some(value) => {
                trace!(position = self.position, "cursor pulled from source");
                self.buffer.push(value.clone());
                self.position += 1;
                Some(value)
            }
            None => {
                trace!(position = self.position, "cursor source exhausted");
                self.source_exhausted = true;
                None
            }
        }
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("source_position", &self.buffer.len())
            .field("source_exhausted", &self.source_exhausted)
            .finish_non_exhaustive()
    }
}
