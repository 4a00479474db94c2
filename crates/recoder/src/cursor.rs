//! Position/limit/capacity views over caller-owned buffers.
//!
//! A cursor borrows a slice for the duration of one engine call and tracks
//! how far it has been read or written. The engine only ever moves
//! `position` forward within `[position, limit)`; `limit` and `capacity`
//! belong to the caller. Input sides of a conversion use [`ReadCursor`],
//! output sides use [`WriteCursor`].

use core::fmt;

/// A bounded read window over a caller-owned buffer.
///
/// Invariant: `position <= limit <= capacity`, where `capacity` is the
/// length of the underlying slice. Elements outside `[position, limit)` are
/// never touched by the conversion engine.
pub struct ReadCursor<'a, T> {
    buf: &'a [T],
    position: usize,
    limit: usize,
}

/// A bounded write window over a caller-owned buffer; the mutable mirror of
/// [`ReadCursor`] with the same geometry invariant.
pub struct WriteCursor<'a, T> {
    buf: &'a mut [T],
    position: usize,
    limit: usize,
}

macro_rules! impl_cursor_geometry {
    ($cursor:ident) => {
        impl<'a, T: Copy> $cursor<'a, T> {
            /// Next element index to read or write.
            #[must_use]
            pub fn position(&self) -> usize {
                self.position
            }

            /// One past the last usable element.
            #[must_use]
            pub fn limit(&self) -> usize {
                self.limit
            }

            /// Physical size of the underlying buffer.
            #[must_use]
            pub fn capacity(&self) -> usize {
                self.buf.len()
            }

            /// Elements left between `position` and `limit`.
            #[must_use]
            pub fn remaining(&self) -> usize {
                self.limit - self.position
            }

            /// `true` while `position < limit`.
            #[must_use]
            pub fn has_remaining(&self) -> bool {
                self.position < self.limit
            }

            /// Moves `position`.
            ///
            /// # Panics
            ///
            /// Panics if `position > limit`.
            pub fn set_position(&mut self, position: usize) {
                assert!(
                    position <= self.limit,
                    "cursor position {position} exceeds limit {}",
                    self.limit
                );
                self.position = position;
            }

            /// Moves `limit`. A `position` beyond the new limit is pulled
            /// back to it.
            ///
            /// # Panics
            ///
            /// Panics if `limit > capacity`.
            pub fn set_limit(&mut self, limit: usize) {
                assert!(
                    limit <= self.buf.len(),
                    "cursor limit {limit} exceeds capacity {}",
                    self.buf.len()
                );
                self.limit = limit;
                if self.position > limit {
                    self.position = limit;
                }
            }

            /// Consumes `n` elements.
            ///
            /// # Panics
            ///
            /// Panics if `n > remaining()`.
            pub fn advance(&mut self, n: usize) {
                assert!(
                    n <= self.remaining(),
                    "cannot advance {n} past {} remaining",
                    self.remaining()
                );
                self.position += n;
            }
        }

        impl<T> fmt::Debug for $cursor<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($cursor))
                    .field("position", &self.position)
                    .field("limit", &self.limit)
                    .field("capacity", &self.buf.len())
                    .finish()
            }
        }
    };
}

impl_cursor_geometry!(ReadCursor);
impl_cursor_geometry!(WriteCursor);

impl<'a, T: Copy> ReadCursor<'a, T> {
    /// Wraps `buf` with `position = 0` and `limit = capacity = buf.len()`.
    pub fn new(buf: &'a [T]) -> Self {
        let limit = buf.len();
        ReadCursor { buf, position: 0, limit }
    }

    /// The unread window `[position, limit)`.
    #[must_use]
    pub fn remaining_slice(&self) -> &[T] {
        &self.buf[self.position..self.limit]
    }

    /// The element at `position`, if any, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.remaining_slice().first().copied()
    }

    /// Consumes and returns the element at `position`, if any.
    pub fn read(&mut self) -> Option<T> {
        let v = self.peek()?;
        self.position += 1;
        Some(v)
    }
}

impl<'a, T: Copy> WriteCursor<'a, T> {
    /// Wraps `buf` with `position = 0` and `limit = capacity = buf.len()`.
    pub fn new(buf: &'a mut [T]) -> Self {
        let limit = buf.len();
        WriteCursor { buf, position: 0, limit }
    }

    /// Writes one element at `position`. Returns `false`, writing nothing,
    /// when the cursor is full.
    pub fn put(&mut self, v: T) -> bool {
        if self.position < self.limit {
            self.buf[self.position] = v;
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Writes all of `vs` or nothing. Returns `false` when fewer than
    /// `vs.len()` elements remain.
    pub fn put_all(&mut self, vs: &[T]) -> bool {
        if self.remaining() < vs.len() {
            return false;
        }
        self.buf[self.position..self.position + vs.len()].copy_from_slice(vs);
        self.position += vs.len();
        true
    }
}

impl WriteCursor<'_, char> {
    /// Writes every `char` of `s` or nothing. Returns `false` when the
    /// cursor cannot hold all of them.
    pub fn put_str(&mut self, s: &str) -> bool {
        let n = s.chars().count();
        if self.remaining() < n {
            return false;
        }
        for c in s.chars() {
            self.buf[self.position] = c;
            self.position += 1;
        }
        true
    }
}
