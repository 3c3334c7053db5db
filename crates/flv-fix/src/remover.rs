//! In-place removal of scattered elements in a single forward pass.
//!
//! The caller walks the sequence front to back and calls [`Remover::skip`]
//! or [`Remover::remove`] for every index, then [`Remover::finish`]. Kept
//! elements are moved down over the gaps as they are seen, so the cost is
//! one move per kept element instead of one shift of the whole tail per
//! removed element.
//!
//! A limit restricts the walk to a prefix window. Elements at or beyond the
//! limit are never looked at; `finish` moves them down as one block behind
//! the last kept element.

use std::collections::VecDeque;

/// A sequence the [`Remover`] can compact.
pub trait Compact {
    type Item;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&Self::Item>;

    /// Moves the element at `from` to `to` (`to <= from`). What ends up at
    /// `from` is unspecified; it is either moved again or truncated away.
    fn relocate(&mut self, from: usize, to: usize);

    fn truncate(&mut self, len: usize);
}

impl<T> Compact for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn relocate(&mut self, from: usize, to: usize) {
        self.swap(from, to);
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }
}

impl<T> Compact for VecDeque<T> {
    type Item = T;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn relocate(&mut self, from: usize, to: usize) {
        self.swap(from, to);
    }

    fn truncate(&mut self, len: usize) {
        VecDeque::truncate(self, len);
    }
}

pub struct Remover<'a, S: Compact + ?Sized> {
    items: &'a mut S,
    limit: usize,
    read: usize,
    write: usize,
    removed: usize,
}

impl<'a, S: Compact + ?Sized> Remover<'a, S> {
    pub fn new(items: &'a mut S) -> Self {
        let limit = items.len();
        Self::with_limit(items, limit)
    }

    /// Only indices below `limit` may be skipped or removed. A limit past
    /// the end is clamped to the length.
    pub fn with_limit(items: &'a mut S, limit: usize) -> Self {
        let limit = limit.min(items.len());
        Self {
            items,
            limit,
            read: 0,
            write: 0,
            removed: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// The element at `index`, valid for indices not yet skipped or removed.
    pub fn get(&self, index: usize) -> Option<&S::Item> {
        self.items.get(index)
    }

    pub fn skip(&mut self, index: usize) {
        debug_assert_eq!(index, self.read, "indices must be visited in order");
        debug_assert!(index < self.limit);
        if self.removed > 0 {
            self.items.relocate(index, self.write);
        }
        self.read += 1;
        self.write += 1;
    }

    pub fn remove(&mut self, index: usize) {
        debug_assert_eq!(index, self.read, "indices must be visited in order");
        debug_assert!(index < self.limit);
        self.read += 1;
        self.removed += 1;
    }

    /// Moves the unvisited tail `[index, len)` down behind the last kept
    /// element and shrinks the sequence. Returns the number of removed
    /// elements.
    pub fn finish(self, index: usize) -> usize {
        let len = self.items.len();
        if self.removed > 0 {
            let mut write = self.write;
            for from in index..len {
                self.items.relocate(from, write);
                write += 1;
            }
            self.items.truncate(len - self.removed);
        }
        self.removed
    }

    /// Visits every index below the limit, removing those for which
    /// `remove` returns true, then finishes at the limit.
    pub fn remove_where<F>(mut self, mut remove: F) -> usize
    where
        F: FnMut(usize, &S::Item) -> bool,
    {
        for index in 0..self.limit {
            let discard = self.items.get(index).is_some_and(|item| remove(index, item));
            if discard {
                self.remove(index);
            } else {
                self.skip(index);
            }
        }
        let limit = self.limit;
        self.finish(limit)
    }
}
